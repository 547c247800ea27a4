//! Resolves transition definitions: expansions inline the target's body
//! under the call's argument bindings, full bodies resolve their locals,
//! `pre_states`/`post_states`/`error_states`, and event calls directly
//! (§3, §4.E). The result always has `params = []`, enforced by
//! `TransitionResolved` carrying no params field at all.

use crate::didyoumean::suggest;
use crate::error::ResolveError;
use crate::event::resolve_event_call;
use crate::scope::{ModuleEnv, Scope};
use crate::state::resolve_state_value_ref;
use crate::value::resolve_value;
use stl_ast::{TransitionDef, TransitionKind};
use stl_model::TransitionResolved;

pub fn resolve_transition_def(env: &ModuleEnv, scope: &Scope, def: &TransitionDef) -> Result<TransitionResolved, ResolveError> {
    match &def.kind {
        TransitionKind::Expansion { target, args } => {
            let target_def = env.module.transitions.get(target).ok_or_else(|| ResolveError::UnknownTransition {
                name: target.to_string(),
                suggestion: suggest(target, env.module.transitions.names().map(|n| n.as_ref())),
            })?;
            if target_def.params.len() != args.len() {
                return Err(ResolveError::TransitionArityMismatch {
                    name: def.name.clone(),
                    expected: target_def.params.len(),
                    actual: args.len(),
                });
            }
            let resolved_args = args.iter().map(|v| resolve_value(env, scope, v)).collect::<Result<Vec<_>, _>>()?;
            let inner_scope = Scope::child_with_args(&target_def.params, resolved_args);
            let mut resolved = resolve_transition_def(env, &inner_scope, target_def)?;
            resolved.name = def.name.clone();
            Ok(resolved)
        }
        TransitionKind::Full { locals, pre_states, events, post_states, error_states } => {
            let body_scope = scope.clone().with_locals(locals);

            let pre_states = pre_states
                .iter()
                .map(|group| group.iter().map(|r| resolve_state_value_ref(env, &body_scope, r)).collect::<Result<Vec<_>, _>>())
                .collect::<Result<Vec<_>, _>>()?;
            let events = events
                .iter()
                .map(|call| resolve_event_call(env, &body_scope, call))
                .collect::<Result<Vec<_>, _>>()?;
            let post_states = post_states.iter().map(|r| resolve_state_value_ref(env, &body_scope, r)).collect::<Result<Vec<_>, _>>()?;
            let error_states = error_states.iter().map(|r| resolve_state_value_ref(env, &body_scope, r)).collect::<Result<Vec<_>, _>>()?;

            Ok(TransitionResolved { name: def.name.clone(), locals: locals.clone(), pre_states, events, post_states, error_states })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::{FxHashMap, FxHashSet};
    use stl_ast::{Module, StateDef, StateValueRef, Value};

    fn module_with_state() -> Module {
        let mut module = Module::new("m");
        module.states.insert(StateDef { name: "Conn".into(), params: vec![], values: vec!["Idle".into(), "Open".into()] });
        module
    }

    #[test]
    fn expansion_inlines_target_body_under_renamed_transition() {
        let mut module = module_with_state();
        module.transitions.insert(stl_ast::TransitionDef {
            name: "tBase".into(),
            params: vec!["x".into()],
            kind: TransitionKind::Full {
                locals: vec![],
                pre_states: vec![vec![StateValueRef { state: "Conn".into(), params: vec![], value: "Idle".into() }]],
                events: vec![],
                post_states: vec![StateValueRef { state: "Conn".into(), params: vec![], value: "Open".into() }],
                error_states: vec![],
            },
        });
        module.transitions.insert(stl_ast::TransitionDef {
            name: "tAlias".into(),
            params: vec![],
            kind: TransitionKind::Expansion { target: "tBase".into(), args: vec![Value::Int(1)] },
        });

        let env = ModuleEnv { module: &module, consts: FxHashMap::default(), roles_to_test: FxHashSet::default() };
        let alias = module.transitions.get("tAlias").unwrap();
        let resolved = resolve_transition_def(&env, &Scope::default(), alias).unwrap();
        assert_eq!(resolved.name.as_ref(), "tAlias");
        assert_eq!(resolved.post_states.len(), 1);
    }

    #[test]
    fn arity_mismatch_on_expansion_is_reported() {
        let mut module = module_with_state();
        module.transitions.insert(stl_ast::TransitionDef {
            name: "tBase".into(),
            params: vec!["x".into(), "y".into()],
            kind: TransitionKind::Full { locals: vec![], pre_states: vec![], events: vec![], post_states: vec![], error_states: vec![] },
        });
        module.transitions.insert(stl_ast::TransitionDef {
            name: "tAlias".into(),
            params: vec![],
            kind: TransitionKind::Expansion { target: "tBase".into(), args: vec![Value::Int(1)] },
        });
        let env = ModuleEnv { module: &module, consts: FxHashMap::default(), roles_to_test: FxHashSet::default() };
        let alias = module.transitions.get("tAlias").unwrap();
        let err = resolve_transition_def(&env, &Scope::default(), alias).unwrap_err();
        assert_eq!(err, ResolveError::TransitionArityMismatch { name: "tAlias".into(), expected: 2, actual: 1 });
    }
}
