//! The resolution-time environment: the module being resolved, the roles
//! under test, and a running `resolved_params` dictionary shadowed by
//! locals (§4.E).

use rustc_hash::FxHashMap;
use stl_ast::{Module, Name};
use stl_model::{ResolvedExpr, RuntimeValue};

pub struct ModuleEnv<'m> {
    pub module: &'m Module,
    pub consts: FxHashMap<Name, RuntimeValue>,
    pub roles_to_test: rustc_hash::FxHashSet<Name>,
}

/// One transition or event's resolution scope: its bound parameters
/// (already-resolved caller expressions) and its declared locals
/// (addressed by slot index once inside the body).
#[derive(Clone, Default)]
pub struct Scope {
    pub params: FxHashMap<Name, ResolvedExpr>,
    pub locals: FxHashMap<Name, usize>,
}

impl Scope {
    pub fn child_with_args(param_names: &[Name], args: Vec<ResolvedExpr>) -> Scope {
        let params = param_names.iter().cloned().zip(args).collect();
        Scope { params, locals: FxHashMap::default() }
    }

    pub fn with_locals(mut self, locals: &[Name]) -> Scope {
        for (index, name) in locals.iter().enumerate() {
            self.locals.insert(name.clone(), index);
        }
        self
    }
}
