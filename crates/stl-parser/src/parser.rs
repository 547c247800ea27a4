//! Recursive-descent parser for STL source (§4.B).
//!
//! Concrete grammar (the spec describes shapes informally; this is the
//! grammar this parser actually implements):
//!
//! ```text
//! module      := "module" NAME ";" def*
//! def         := const_def | role_def | state_def | message_def
//!              | qualifier_def | event_def | transition_def
//!
//! const_def   := "const" prim_type NAME ("=" value)? ";"
//! role_def    := "role" NAME "{" field_decl* "}"
//! field_decl  := field_rule field_type NAME (":" prop ("," prop)*)? ";"
//! field_rule  := "required" | "optional" | "repeated"
//! field_type  := "bool" | "int" | "string" | NAME
//! prop        := NAME "=" value
//!
//! state_def   := "state" NAME ("(" name_list? ")")? "=" "[" name_list "]" ";"
//!
//! message_def := "message" NAME ("[" "]")? "{" message_member* "}"
//! message_member := "encode" STRING ";"
//!                 | "external" STRING ";"
//!                 | field_decl
//!                 | message_def
//!
//! qualifier_def := "qualifier" NAME ":" field_type "(" name_list? ")"
//!                  "{" "external" STRING ";" "}"
//!
//! event_def   := "event" NAME "(" name_list? ")"
//!                ( "{" "external" STRING ";" "}"
//!                | "=" NAME "(" value_list? ")" ";" )
//!
//! transition_def := "transition" NAME "(" name_list? ")"
//!                    ( "{" transition_body "}"
//!                    | "=" NAME "(" value_list? ")" ";" )
//! transition_body := locals? pre_states events post_states error_states?
//! locals       := "locals" "=" "[" name_list? "]" ";"
//! pre_states   := "pre_states" "=" "[" option_group ("," option_group)* "]" ";"
//! option_group := "[" state_value_ref ("," state_value_ref)* "]"
//! events       := "events" "{" (event_call ";")* "}"
//! event_call   := NAME "->" NAME "(" value_list? ")" "->" NAME
//! post_states  := "post_states" "=" "[" state_value_ref_list? "]" ";"
//! error_states := "error_states" "=" "[" state_value_ref_list? "]" ";"
//! ```

use crate::cursor::Cursor;
use crate::error::{abort_from_lex_error, Abort};
use stl_ast::{
    ConstDef, EventCall, EventDef, EventKind, FieldDecl, FieldRule, FieldType, MessageBody,
    MessageDef, Module, OptionGroup, PrimitiveType, QualifierDef, RoleDef, StateDef, TransitionDef,
    TransitionKind,
};
use stl_error::Symbol;
use stl_lexer::Lexer;
use stl_token::{ReservedWord, Token, TokenKind};

pub struct Parser<'a> {
    pub(crate) cursor: Cursor,
    pub(crate) stack: Vec<Symbol>,
    pub(crate) file: &'a str,
}

/// Parse a complete STL source file into a [`Module`].
///
/// The returned module is named for its `module NAME;` header; callers
/// merging multiple files into one module (§3) do so by appending each
/// file's definitions into a shared [`Module`] after parsing.
pub fn parse_module(source: &str, file: &str) -> Result<Module, Abort> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize();
    if let Some(last) = tokens.last() {
        if last.kind == TokenKind::Error {
            let mut probe = Lexer::new(&source[last.start..]);
            let err = probe.next_token().unwrap_err();
            return Err(abort_from_lex_error(&err, file, last.line, last.columns));
        }
    }
    let mut parser = Parser { cursor: Cursor::new(tokens), stack: Vec::new(), file };
    parser.parse()
}

impl<'a> Parser<'a> {
    fn parse(&mut self) -> Result<Module, Abort> {
        let checkpoint = self.checkpoint();
        self.stack.push(Symbol::Module);
        self.expect_reserved(ReservedWord::Module)?;
        let name = self.expect_identifier()?;
        self.stack.push(Symbol::Name);
        self.expect(TokenKind::Semicolon)?;
        self.commit(checkpoint);

        let mut module = Module::new(name.to_string());
        while !self.cursor.at(TokenKind::Eof) {
            self.parse_def(&mut module)?;
        }
        Ok(module)
    }

    fn parse_def(&mut self, module: &mut Module) -> Result<(), Abort> {
        let TokenKind::Reserved(word) = self.cursor.peek_kind() else {
            return Err(self.abort());
        };
        match word {
            ReservedWord::Const => module.consts.insert(self.parse_const()?),
            ReservedWord::Role => module.roles.insert(self.parse_role()?),
            ReservedWord::State => module.states.insert(self.parse_state()?),
            ReservedWord::Message => module.messages.insert(self.parse_message()?),
            ReservedWord::Qualifier => module.qualifiers.insert(self.parse_qualifier()?),
            ReservedWord::Event => module.events.insert(self.parse_event()?),
            ReservedWord::Transition => module.transitions.insert(self.parse_transition()?),
            _ => return Err(self.abort()),
        }
        Ok(())
    }

    // ---- const ---------------------------------------------------------

    fn parse_const(&mut self) -> Result<ConstDef, Abort> {
        let checkpoint = self.checkpoint();
        self.expect_reserved(ReservedWord::Const)?;
        self.stack.push(Symbol::Const);
        let ty = self.parse_primitive_type()?;
        self.stack.push(Symbol::Type);
        let name = self.expect_identifier()?;
        self.stack.push(Symbol::Name);
        let value = if self.cursor.eat(TokenKind::Equals).is_some() {
            Some(self.parse_value()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        self.commit(checkpoint);
        Ok(ConstDef { name, ty, value })
    }

    // ---- role / fields ---------------------------------------------------

    fn parse_role(&mut self) -> Result<RoleDef, Abort> {
        self.expect_reserved(ReservedWord::Role)?;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LeftBrace)?;
        let mut fields = Vec::new();
        while self.field_rule_ahead() {
            fields.push(self.parse_field_decl()?);
        }
        self.expect(TokenKind::RightBrace)?;
        Ok(RoleDef { name, fields })
    }

    fn field_rule_ahead(&self) -> bool {
        matches!(
            self.cursor.peek_kind(),
            TokenKind::Reserved(ReservedWord::Required)
                | TokenKind::Reserved(ReservedWord::Optional)
                | TokenKind::Reserved(ReservedWord::Repeated)
        )
    }

    fn parse_field_decl(&mut self) -> Result<FieldDecl, Abort> {
        let rule = match self.cursor.advance().kind {
            TokenKind::Reserved(ReservedWord::Required) => FieldRule::required(),
            TokenKind::Reserved(ReservedWord::Optional) => FieldRule::optional(),
            TokenKind::Reserved(ReservedWord::Repeated) => FieldRule::repeated(),
            _ => return Err(self.abort()),
        };
        let ty = self.parse_field_type()?;
        let name = self.expect_identifier()?;
        let mut encoding_props = Vec::new();
        if self.cursor.eat(TokenKind::Colon).is_some() {
            loop {
                let key = self.expect_identifier()?;
                self.expect(TokenKind::Equals)?;
                let value = self.parse_value()?;
                encoding_props.push((key, value));
                if self.cursor.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::Semicolon)?;
        Ok(FieldDecl { name, ty, rule, encoding_props })
    }

    fn parse_primitive_type(&mut self) -> Result<PrimitiveType, Abort> {
        match self.cursor.advance().kind {
            TokenKind::Reserved(ReservedWord::Bool) => Ok(PrimitiveType::Bool),
            TokenKind::Reserved(ReservedWord::Int) => Ok(PrimitiveType::Int),
            TokenKind::Reserved(ReservedWord::StringType) => Ok(PrimitiveType::String),
            _ => Err(self.abort()),
        }
    }

    fn parse_field_type(&mut self) -> Result<FieldType, Abort> {
        match self.cursor.peek_kind() {
            TokenKind::Reserved(ReservedWord::Bool) => {
                self.cursor.advance();
                Ok(FieldType::Bool)
            }
            TokenKind::Reserved(ReservedWord::Int) => {
                self.cursor.advance();
                Ok(FieldType::Int)
            }
            TokenKind::Reserved(ReservedWord::StringType) => {
                self.cursor.advance();
                Ok(FieldType::String)
            }
            TokenKind::Identifier => Ok(FieldType::Message(self.expect_identifier()?)),
            _ => Err(self.abort()),
        }
    }

    // ---- state -----------------------------------------------------------

    fn parse_state(&mut self) -> Result<StateDef, Abort> {
        self.expect_reserved(ReservedWord::State)?;
        let name = self.expect_identifier()?;
        let params = if self.cursor.eat(TokenKind::LeftParen).is_some() {
            let names = self.parse_name_list(TokenKind::RightParen)?;
            self.expect(TokenKind::RightParen)?;
            names
        } else {
            Vec::new()
        };
        self.expect(TokenKind::Equals)?;
        self.expect(TokenKind::LeftBracket)?;
        let values = self.parse_name_list(TokenKind::RightBracket)?;
        self.expect(TokenKind::RightBracket)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(StateDef { name, params, values })
    }

    fn parse_name_list(&mut self, terminator: TokenKind) -> Result<Vec<stl_ast::Name>, Abort> {
        let mut names = Vec::new();
        if self.cursor.at(terminator) {
            return Ok(names);
        }
        loop {
            names.push(self.expect_identifier()?);
            if self.cursor.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(names)
    }

    // ---- message -----------------------------------------------------------

    fn parse_message(&mut self) -> Result<MessageDef, Abort> {
        self.expect_reserved(ReservedWord::Message)?;
        let name = self.expect_identifier()?;
        let is_array = self.cursor.eat(TokenKind::LeftBracket).is_some();
        if is_array {
            self.expect(TokenKind::RightBracket)?;
        }
        self.expect(TokenKind::LeftBrace)?;

        let mut encode = None;
        let mut external = None;
        let mut fields = Vec::new();
        let mut nested = Vec::new();
        loop {
            match self.cursor.peek_kind() {
                TokenKind::Reserved(ReservedWord::Encode) => {
                    self.cursor.advance();
                    encode = Some(self.expect_string_name()?);
                    self.expect(TokenKind::Semicolon)?;
                }
                TokenKind::Reserved(ReservedWord::External) => {
                    self.cursor.advance();
                    external = Some(self.expect_string_name()?);
                    self.expect(TokenKind::Semicolon)?;
                }
                TokenKind::Reserved(ReservedWord::Message) => nested.push(self.parse_message()?),
                _ if self.field_rule_ahead() => fields.push(self.parse_field_decl()?),
                _ => break,
            }
        }
        self.expect(TokenKind::RightBrace)?;

        let body = match external {
            Some(descriptor) => MessageBody::External { descriptor },
            None => MessageBody::Declared { fields, nested },
        };
        Ok(MessageDef { name, encode, is_array, body })
    }

    // ---- qualifier -----------------------------------------------------------

    fn parse_qualifier(&mut self) -> Result<QualifierDef, Abort> {
        self.expect_reserved(ReservedWord::Qualifier)?;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::Colon)?;
        let qual_type = self.parse_field_type()?;
        self.expect(TokenKind::LeftParen)?;
        let params = self.parse_name_list(TokenKind::RightParen)?;
        self.expect(TokenKind::RightParen)?;
        self.expect(TokenKind::LeftBrace)?;
        self.expect_reserved(ReservedWord::External)?;
        let external = self.expect_string_name()?;
        self.expect(TokenKind::Semicolon)?;
        self.expect(TokenKind::RightBrace)?;
        Ok(QualifierDef { name, qual_type, params, external })
    }

    // ---- event -----------------------------------------------------------

    fn parse_event(&mut self) -> Result<EventDef, Abort> {
        self.expect_reserved(ReservedWord::Event)?;
        let name = self.expect_identifier()?;
        self.expect(TokenKind::LeftParen)?;
        let params = self.parse_name_list(TokenKind::RightParen)?;
        self.expect(TokenKind::RightParen)?;

        let kind = if self.cursor.eat(TokenKind::Equals).is_some() {
            let target = self.expect_identifier()?;
            self.expect(TokenKind::LeftParen)?;
            let args = self.parse_value_list(TokenKind::RightParen)?;
            self.expect(TokenKind::RightParen)?;
            self.expect(TokenKind::Semicolon)?;
            EventKind::Expansion { target, args }
        } else {
            self.expect(TokenKind::LeftBrace)?;
            self.expect_reserved(ReservedWord::External)?;
            let class = self.expect_string_name()?;
            self.expect(TokenKind::Semicolon)?;
            self.expect(TokenKind::RightBrace)?;
            EventKind::External { class }
        };
        Ok(EventDef { name, params, kind })
    }

    // ---- transition -----------------------------------------------------------

    fn parse_transition(&mut self) -> Result<TransitionDef, Abort> {
        let checkpoint = self.checkpoint();
        self.stack.push(Symbol::Transition);
        self.expect_reserved(ReservedWord::Transition)?;
        let name = self.expect_identifier()?;
        self.stack.push(Symbol::Name);
        self.expect(TokenKind::LeftParen)?;
        let params = self.parse_name_list(TokenKind::RightParen)?;
        self.expect(TokenKind::RightParen)?;
        self.stack.push(Symbol::Params);

        if self.cursor.eat(TokenKind::Equals).is_some() {
            let target = self.expect_identifier()?;
            self.expect(TokenKind::LeftParen)?;
            let args = self.parse_value_list(TokenKind::RightParen)?;
            self.expect(TokenKind::RightParen)?;
            self.expect(TokenKind::Semicolon)?;
            self.commit(checkpoint);
            return Ok(TransitionDef { name, params, kind: TransitionKind::Expansion { target, args } });
        }

        self.expect(TokenKind::LeftBrace)?;
        self.stack.push(Symbol::OpenBrace);

        let locals_ahead = self.cursor.at(TokenKind::Identifier) && &*self.cursor.peek().text == "locals";
        let pre_states_ahead = self.cursor.at(TokenKind::Reserved(ReservedWord::PreStates));
        if !locals_ahead && !pre_states_ahead {
            return Err(self.abort());
        }

        let locals = self.parse_locals_section()?;
        self.stack.push(Symbol::LocalVars);

        let pre_states = self.parse_pre_states_section()?;

        let events = self.parse_events_section()?;

        let post_states = self.parse_state_value_ref_section(ReservedWord::PostStates)?;

        let error_states = if self.cursor.at(TokenKind::Reserved(ReservedWord::ErrorStates)) {
            self.stack.push(Symbol::ErrorStates);
            let refs = self.parse_state_value_ref_section(ReservedWord::ErrorStates)?;
            self.stack.pop();
            refs
        } else {
            Vec::new()
        };

        self.expect(TokenKind::RightBrace)?;
        self.commit(checkpoint);

        Ok(TransitionDef {
            name,
            params,
            kind: TransitionKind::Full { locals, pre_states, events, post_states, error_states },
        })
    }

    /// Optional `"locals" "=" "[" name_list? "]" ";"`.
    fn parse_locals_section(&mut self) -> Result<Vec<stl_ast::Name>, Abort> {
        if !self.cursor.at(TokenKind::Identifier) || &*self.cursor.peek().text != "locals" {
            return Ok(Vec::new());
        }
        self.cursor.advance();
        self.expect(TokenKind::Equals)?;
        self.expect(TokenKind::LeftBracket)?;
        let names = self.parse_name_list(TokenKind::RightBracket)?;
        self.expect(TokenKind::RightBracket)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(names)
    }

    /// `"pre_states" "=" "[" option_group ("," option_group)* "]" ";"`.
    /// The outer list must be non-empty (303 empty-pre-states).
    fn parse_pre_states_section(&mut self) -> Result<Vec<OptionGroup>, Abort> {
        self.expect_reserved(ReservedWord::PreStates)?;
        self.stack.push(Symbol::PreStates);
        self.expect(TokenKind::Equals)?;
        self.expect(TokenKind::LeftBracket)?;
        self.stack.push(Symbol::PreStatesOpenBracket);

        if self.cursor.at(TokenKind::RightBracket) {
            return Err(self.abort());
        }
        let mut groups = Vec::new();
        loop {
            groups.push(self.parse_option_group()?);
            if self.cursor.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RightBracket)?;
        self.expect(TokenKind::Semicolon)?;
        self.stack.pop(); // PreStatesOpenBracket
        Ok(groups)
    }

    fn parse_option_group(&mut self) -> Result<OptionGroup, Abort> {
        self.expect(TokenKind::LeftBracket)?;
        let mut refs = Vec::new();
        if !self.cursor.at(TokenKind::RightBracket) {
            loop {
                refs.push(self.parse_state_value_ref()?);
                if self.cursor.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightBracket)?;
        Ok(refs)
    }

    /// `"events" "{" (event_call ";")* "}"`. Each call names its source and
    /// target role directly: `source -> name(args) -> target;`.
    fn parse_events_section(&mut self) -> Result<Vec<EventCall>, Abort> {
        self.expect_reserved(ReservedWord::Events)?;
        self.stack.push(Symbol::Events);
        self.expect(TokenKind::LeftBrace)?;
        let mut calls = Vec::new();
        while self.cursor.at(TokenKind::Identifier) {
            let source = self.expect_identifier()?;
            self.expect(TokenKind::Arrow)?;
            let name = self.expect_identifier()?;
            self.expect(TokenKind::LeftParen)?;
            let args = self.parse_value_list(TokenKind::RightParen)?;
            self.expect(TokenKind::RightParen)?;
            self.expect(TokenKind::Arrow)?;
            let target = self.expect_identifier()?;
            self.expect(TokenKind::Semicolon)?;
            calls.push(EventCall { name, source: stl_ast::Value::get([source]), target: stl_ast::Value::get([target]), args });
        }
        self.expect(TokenKind::RightBrace)?;
        Ok(calls)
    }

    /// `keyword "=" "[" state_value_ref,* "]" ";"`. Used for both
    /// `post_states` (required, may be empty) and `error_states` (optional).
    fn parse_state_value_ref_section(
        &mut self,
        keyword: ReservedWord,
    ) -> Result<Vec<stl_ast::StateValueRef>, Abort> {
        self.expect_reserved(keyword)?;
        if matches!(keyword, ReservedWord::PostStates) {
            self.stack.push(Symbol::PostStates);
        }
        self.expect(TokenKind::Equals)?;
        self.expect(TokenKind::LeftBracket)?;
        let mut refs = Vec::new();
        if !self.cursor.at(TokenKind::RightBracket) {
            loop {
                refs.push(self.parse_state_value_ref()?);
                if self.cursor.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightBracket)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(refs)
    }

    // ---- token helpers -----------------------------------------------------

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, Abort> {
        self.cursor.eat(kind).ok_or_else(|| self.abort())
    }

    fn expect_reserved(&mut self, word: ReservedWord) -> Result<Token, Abort> {
        if self.cursor.peek_kind() == TokenKind::Reserved(word) {
            Ok(self.cursor.advance())
        } else {
            Err(self.abort())
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<stl_ast::Name, Abort> {
        if self.cursor.at(TokenKind::Identifier) {
            let tok = self.cursor.advance();
            Ok(stl_ast::Name::from(&*tok.text))
        } else {
            Err(self.abort())
        }
    }

    /// A string-literal token, unescaped and interned as a [`Name`] (used for
    /// `encode "..."` / `external "..."` descriptor strings).
    fn expect_string_name(&mut self) -> Result<stl_ast::Name, Abort> {
        if self.cursor.at(TokenKind::String) {
            let tok = self.cursor.advance();
            let text: &str = &tok.text;
            let inner = &text[1..text.len() - 1];
            Ok(stl_ast::Name::from(inner))
        } else {
            Err(self.abort())
        }
    }

    pub(crate) fn checkpoint(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn commit(&mut self, checkpoint: usize) {
        self.stack.truncate(checkpoint);
    }

    pub(crate) fn abort(&self) -> Abort {
        crate::error::abort_from_stack(&self.stack, self.file, self.cursor.peek())
    }
}
