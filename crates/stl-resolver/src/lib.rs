//! Binds every reference in a parsed [`stl_ast::Module`] and produces a
//! [`stl_model::ResolvedModule`] (§4.E).
//!
//! Resolution order: consts (literal or manifest-bound) first, since later
//! stages may read them; then messages (structural only); then the
//! non-parametric transitions, which drag their called events along and
//! resolve them lazily on first reference. Transitions declared with
//! parameters exist only to be expansion targets and never appear directly
//! in the resolved module — `TransitionResolved` carries no params field, so
//! a parametric transition can only reach the output by being inlined under
//! an expansion's argument bindings.

mod didyoumean;
mod error;
mod event;
mod message;
mod scope;
mod state;
mod transition;
mod value;

pub use error::ResolveError;
pub use scope::{ModuleEnv, Scope};
pub use value::resolve_value;

use message::resolve_message_def;
use rustc_hash::{FxHashMap, FxHashSet};
use stl_ast::{Module, Name};
use stl_model::{ResolvedModule, RuntimeValue};
use transition::resolve_transition_def;
use value::as_constant;

/// Resolves `module` against the roles under test and any manifest-supplied
/// constant values, returning the fully bound model the graph builder,
/// planner, and executor operate on.
pub fn resolve_module(
    module: &Module,
    roles_to_test: impl IntoIterator<Item = impl Into<Name>>,
    manifest_constants: &FxHashMap<Name, RuntimeValue>,
) -> Result<ResolvedModule, ResolveError> {
    let consts = resolve_consts(module, manifest_constants)?;
    let roles_to_test: FxHashSet<Name> = roles_to_test.into_iter().map(Into::into).collect();
    let env = ModuleEnv { module, consts, roles_to_test };
    let scope = Scope::default();

    let messages = module.messages.iter().map(|m| resolve_message_def(&env, &scope, m)).collect::<Result<Vec<_>, _>>()?;

    let transitions = module
        .transitions
        .iter()
        .filter(|t| t.params.is_empty())
        .map(|t| resolve_transition_def(&env, &scope, t))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResolvedModule {
        name: module.name.clone(),
        consts: module.consts.iter().cloned().collect(),
        roles: module.roles.iter().cloned().collect(),
        states: module.states.iter().cloned().collect(),
        messages,
        qualifiers: module.qualifiers.iter().cloned().collect(),
        transitions,
    })
}

fn resolve_consts(module: &Module, manifest_constants: &FxHashMap<Name, RuntimeValue>) -> Result<FxHashMap<Name, RuntimeValue>, ResolveError> {
    let mut consts: FxHashMap<Name, RuntimeValue> = FxHashMap::default();
    for c in module.consts.iter() {
        let value = match &c.value {
            Some(v) => {
                let env = ModuleEnv { module, consts: consts.clone(), roles_to_test: FxHashSet::default() };
                let resolved = resolve_value(&env, &Scope::default(), v)?;
                as_constant(&resolved).ok_or_else(|| ResolveError::UnboundConstant { name: c.name.clone() })?
            }
            None => manifest_constants
                .get(&c.name)
                .cloned()
                .ok_or_else(|| ResolveError::UnboundConstant { name: c.name.clone() })?,
        };
        consts.insert(c.name.clone(), value);
    }
    Ok(consts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_ast::{ConstDef, PrimitiveType, RoleDef, StateDef, StateValueRef, TransitionDef, TransitionKind, Value};

    fn sample_module() -> Module {
        let mut module = Module::new("m");
        module.consts.insert(ConstDef { name: "k".into(), ty: PrimitiveType::Int, value: Some(Value::Int(7)) });
        module.roles.insert(RoleDef { name: "Client".into(), fields: vec![] });
        module.states.insert(StateDef { name: "Conn".into(), params: vec![], values: vec!["Idle".into(), "Open".into()] });
        module.transitions.insert(TransitionDef {
            name: "tOpen".into(),
            params: vec![],
            kind: TransitionKind::Full {
                locals: vec![],
                pre_states: vec![vec![StateValueRef { state: "Conn".into(), params: vec![], value: "Idle".into() }]],
                events: vec![],
                post_states: vec![StateValueRef { state: "Conn".into(), params: vec![], value: "Open".into() }],
                error_states: vec![],
            },
        });
        module
    }

    #[test]
    fn resolves_consts_and_transitions() {
        let module = sample_module();
        let resolved = resolve_module(&module, Vec::<Name>::new(), &FxHashMap::default()).unwrap();
        assert_eq!(resolved.transitions.len(), 1);
        assert_eq!(resolved.const_value("k").unwrap().value, Some(Value::Int(7)));
    }

    #[test]
    fn unbound_const_without_manifest_value_is_fatal() {
        let mut module = sample_module();
        module.consts.insert(ConstDef { name: "needed".into(), ty: PrimitiveType::Int, value: None });
        let err = resolve_module(&module, Vec::<Name>::new(), &FxHashMap::default()).unwrap_err();
        assert_eq!(err, ResolveError::UnboundConstant { name: "needed".into() });
    }

    #[test]
    fn parametric_transitions_are_excluded_from_the_resolved_graph() {
        let mut module = sample_module();
        module.transitions.insert(TransitionDef {
            name: "tParam".into(),
            params: vec!["x".into()],
            kind: TransitionKind::Full { locals: vec![], pre_states: vec![], events: vec![], post_states: vec![], error_states: vec![] },
        });
        let resolved = resolve_module(&module, Vec::<Name>::new(), &FxHashMap::default()).unwrap();
        assert_eq!(resolved.transitions.len(), 1);
        assert_eq!(resolved.transitions[0].name.as_ref(), "tOpen");
    }
}
