//! Parses the `value` grammar (§9 dynamic reference model) and the
//! `state_value_ref` production used inside transition state lists.

use crate::parser::Parser;
use stl_ast::{Name, StateValueRef, Value};
use stl_token::TokenKind;

impl Parser<'_> {
    /// `value := INTEGER | STRING | "true" | "false" | "null"
    ///         | "$" path | "&" path
    ///         | "[" value,* "]" | "{" NAME ":" value ,* "}"
    ///         | NAME "{" NAME ":" value ,* "}"
    ///         | NAME "(" value,* ")"`
    pub(crate) fn parse_value(&mut self) -> Result<Value, crate::error::Abort> {
        match self.cursor.peek_kind() {
            TokenKind::Integer => {
                let tok = self.cursor.advance();
                let n: i64 = tok.text.parse().unwrap_or(0);
                Ok(Value::Int(n))
            }
            TokenKind::String => {
                let tok = self.cursor.advance();
                Ok(Value::Str(unescape(&tok.text)))
            }
            TokenKind::True => {
                self.cursor.advance();
                Ok(Value::Bool(true))
            }
            TokenKind::False => {
                self.cursor.advance();
                Ok(Value::Bool(false))
            }
            TokenKind::Null => {
                self.cursor.advance();
                Ok(Value::Null)
            }
            TokenKind::Dollar => {
                self.cursor.advance();
                Ok(Value::Get(self.parse_path()?))
            }
            TokenKind::Ampersand => {
                self.cursor.advance();
                Ok(Value::Set(self.parse_path()?))
            }
            TokenKind::LeftBracket => {
                self.cursor.advance();
                let mut items = Vec::new();
                if !self.cursor.at(TokenKind::RightBracket) {
                    loop {
                        items.push(self.parse_value()?);
                        if self.cursor.eat(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RightBracket)?;
                Ok(Value::List(items))
            }
            TokenKind::LeftBrace => {
                self.cursor.advance();
                let mut entries = Vec::new();
                if !self.cursor.at(TokenKind::RightBrace) {
                    loop {
                        let key = self.expect_identifier()?;
                        self.expect(TokenKind::Colon)?;
                        let value = self.parse_value()?;
                        entries.push((key, value));
                        if self.cursor.eat(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RightBrace)?;
                Ok(Value::Map(entries))
            }
            TokenKind::Identifier if self.cursor.peek_ahead_kind(1) == TokenKind::LeftBrace => {
                let name = self.expect_identifier()?;
                self.expect(TokenKind::LeftBrace)?;
                let mut fields = Vec::new();
                if !self.cursor.at(TokenKind::RightBrace) {
                    loop {
                        let key = self.expect_identifier()?;
                        self.expect(TokenKind::Colon)?;
                        let value = self.parse_value()?;
                        fields.push((key, value));
                        if self.cursor.eat(TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RightBrace)?;
                Ok(Value::Message { name, fields })
            }
            TokenKind::Identifier => {
                let name = self.expect_identifier()?;
                self.expect(TokenKind::LeftParen)?;
                let args = self.parse_value_list(TokenKind::RightParen)?;
                self.expect(TokenKind::RightParen)?;
                Ok(Value::QualifierCall { name, args })
            }
            _ => Err(self.abort()),
        }
    }

    /// `"(" value,* ")"`-style argument list, already past the opening paren.
    pub(crate) fn parse_value_list(
        &mut self,
        terminator: TokenKind,
    ) -> Result<Vec<Value>, crate::error::Abort> {
        let mut items = Vec::new();
        if self.cursor.at(terminator) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_value()?);
            if self.cursor.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(items)
    }

    /// `NAME ("." NAME)*`
    pub(crate) fn parse_path(&mut self) -> Result<Vec<Name>, crate::error::Abort> {
        let mut path = vec![self.expect_identifier()?];
        while self.cursor.eat(TokenKind::Dot).is_some() {
            path.push(self.expect_identifier()?);
        }
        Ok(path)
    }

    /// `NAME ["(" value,* ")"] "." NAME`
    pub(crate) fn parse_state_value_ref(&mut self) -> Result<StateValueRef, crate::error::Abort> {
        let state = self.expect_identifier()?;
        let params = if self.cursor.eat(TokenKind::LeftParen).is_some() {
            let args = self.parse_value_list(TokenKind::RightParen)?;
            self.expect(TokenKind::RightParen)?;
            args
        } else {
            Vec::new()
        };
        self.expect(TokenKind::Dot)?;
        let value = self.expect_identifier()?;
        Ok(StateValueRef { state, params, value })
    }
}

/// Strips the surrounding quotes and resolves `\"` / `\\` escapes.
fn unescape(raw: &str) -> String {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}
