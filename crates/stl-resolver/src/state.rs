//! Resolves a `StateValueRef` (as it appears in `pre_states`/`post_states`/
//! `error_states`) into a `stl_model::StateValue`: the named state must
//! exist, its parameter list must match arity and fold to constants, and the
//! named value must be one the state actually declares (§3, §4.F, §7).

use crate::didyoumean::suggest;
use crate::error::ResolveError;
use crate::scope::{ModuleEnv, Scope};
use crate::value::{as_constant, resolve_value};
use stl_ast::StateValueRef;
use stl_model::{StateResolved, StateValue};

pub fn resolve_state_value_ref(
    env: &ModuleEnv,
    scope: &Scope,
    state_ref: &StateValueRef,
) -> Result<StateValue, ResolveError> {
    let state = env.module.states.get(&state_ref.state).ok_or_else(|| ResolveError::UnknownState {
        name: state_ref.state.to_string(),
        suggestion: suggest(&state_ref.state, env.module.states.names().map(|n| n.as_ref())),
    })?;

    if state.params.len() != state_ref.params.len() {
        return Err(ResolveError::StateArityMismatch {
            state: state.name.clone(),
            expected: state.params.len(),
            actual: state_ref.params.len(),
        });
    }

    if !state.values.iter().any(|v| v == &state_ref.value) {
        return Err(ResolveError::UnknownStateValue {
            state: state.name.clone(),
            value: state_ref.value.to_string(),
            suggestion: suggest(&state_ref.value, state.values.iter().map(|n| n.as_ref())),
        });
    }

    let params = state_ref
        .params
        .iter()
        .map(|v| {
            let resolved = resolve_value(env, scope, v)?;
            as_constant(&resolved).ok_or_else(|| ResolveError::NonConstantStateParameter { state: state.name.clone() })
        })
        .collect::<Result<_, _>>()?;

    Ok(StateValue::new(StateResolved::new(state.name.clone(), params), state_ref.value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::{FxHashMap, FxHashSet};
    use stl_ast::{Module, StateDef, Value};

    fn env_with_state() -> Module {
        let mut module = Module::new("m");
        module.states.insert(StateDef { name: "Connection".into(), params: vec![], values: vec!["Idle".into(), "Open".into()] });
        module
    }

    #[test]
    fn unknown_value_suggests_closest() {
        let module = env_with_state();
        let env = ModuleEnv { module: &module, consts: FxHashMap::default(), roles_to_test: FxHashSet::default() };
        let scope = Scope::default();
        let state_ref = StateValueRef { state: "Connection".into(), params: vec![], value: "Opeen".into() };
        let err = resolve_state_value_ref(&env, &scope, &state_ref).unwrap_err();
        assert_eq!(err, ResolveError::UnknownStateValue { state: "Connection".into(), value: "Opeen".into(), suggestion: Some("Open".into()) });
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let module = env_with_state();
        let env = ModuleEnv { module: &module, consts: FxHashMap::default(), roles_to_test: FxHashSet::default() };
        let scope = Scope::default();
        let state_ref = StateValueRef { state: "Connection".into(), params: vec![Value::Int(1)], value: "Idle".into() };
        let err = resolve_state_value_ref(&env, &scope, &state_ref).unwrap_err();
        assert_eq!(err, ResolveError::StateArityMismatch { state: "Connection".into(), expected: 0, actual: 1 });
    }
}
