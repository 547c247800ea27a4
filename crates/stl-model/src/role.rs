//! Mutable runtime state for a role instance (§3, §5).
//!
//! Declared field *shape* lives in [`stl_ast::RoleDef`] and never changes
//! after parsing; current field *values* live here and are the only
//! cross-transition mutable state besides locals and qualifier memory.

use crate::value::RuntimeValue;
use rustc_hash::{FxHashMap, FxHashSet};
use stl_ast::{Name, RoleDef};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RoleFieldError {
    #[error("role {role} has no declared field {field}")]
    UndeclaredField { role: Name, field: Name },
}

/// Runtime value store for one role under test.
#[derive(Debug, Clone)]
pub struct RoleState {
    pub name: Name,
    declared: FxHashSet<Name>,
    values: FxHashMap<Name, RuntimeValue>,
}

impl RoleState {
    pub fn new(def: &RoleDef) -> Self {
        RoleState {
            name: def.name.clone(),
            declared: def.fields.iter().map(|f| f.name.clone()).collect(),
            values: FxHashMap::default(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&RuntimeValue> {
        self.values.get(field)
    }

    /// Writing a field not declared on the role is fatal (§3 invariant).
    pub fn set(&mut self, field: Name, value: RuntimeValue) -> Result<(), RoleFieldError> {
        if !self.declared.contains(&field) {
            return Err(RoleFieldError::UndeclaredField { role: self.name.clone(), field });
        }
        self.values.insert(field, value);
        Ok(())
    }

    pub fn is_declared(&self, field: &str) -> bool {
        self.declared.contains(field)
    }
}
