//! Resolved points of the combined state space (§3).

use crate::value::RuntimeValue;
use stl_ast::Name;

/// A [`stl_ast::StateDef`] paired with concrete parameter values. Two
/// `StateResolved` values are equal iff name and resolved parameter tuples
/// match — derived equality is correct since `RuntimeValue` compares
/// structurally.
#[derive(Debug, Clone, PartialEq)]
pub struct StateResolved {
    pub name: Name,
    pub params: Vec<RuntimeValue>,
}

impl StateResolved {
    pub fn new(name: Name, params: Vec<RuntimeValue>) -> Self {
        StateResolved { name, params }
    }

    /// Canonical string form used to sort and intern graph vertices (§4.F:
    /// "Canonicalize (sort by string)").
    pub fn canonical_key(&self) -> String {
        let mut s = self.name.to_string();
        for p in &self.params {
            s.push('(');
            s.push_str(&format!("{p:?}"));
            s.push(')');
        }
        s
    }
}

/// `(StateResolved, symbol)` — one point of the combined state space.
#[derive(Debug, Clone, PartialEq)]
pub struct StateValue {
    pub state: StateResolved,
    pub symbol: Name,
}

impl StateValue {
    pub fn new(state: StateResolved, symbol: Name) -> Self {
        StateValue { state, symbol }
    }

    pub fn canonical_key(&self) -> String {
        format!("{}.{}", self.state.canonical_key(), self.symbol)
    }
}
