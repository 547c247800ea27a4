//! Resolves event calls into `stl_model::EventCallResolved`, including the
//! source/target role extraction and `test_side` assignment of §4.E: a bare
//! role reference on exactly one side of an external event marks that side
//! as under test (the driver calls `Wait` there, `Fire` on the other);
//! naming both sides under test is a model error.
//!
//! `source`/`target` belong to the call site (`c -> Connect($c, $s) -> s;`),
//! not the event definition: resolution happens fresh for every call, so the
//! same named event called from two transitions with different role
//! arguments binds `source`/`target`/`test_side` independently each time,
//! exactly as each call's own source/target names dictate.

use crate::didyoumean::suggest;
use crate::error::ResolveError;
use crate::scope::{ModuleEnv, Scope};
use crate::value::resolve_value;
use stl_ast::{EventCall, EventKind, Name};
use stl_model::{EventCallResolved, ResolvedExpr, Slot, TestSide};

/// Resolves one call to a named event, binding its `source`/`target` from
/// this call's own role names and re-deriving `test_side` accordingly.
pub fn resolve_event_call(env: &ModuleEnv, scope: &Scope, call: &EventCall) -> Result<EventCallResolved, ResolveError> {
    let source = resolve_value(env, scope, &call.source)?;
    let target = resolve_value(env, scope, &call.target)?;
    let test_side = assign_test_side(env, &call.name, &source, &target)?;

    let args = call.args.iter().map(|v| resolve_value(env, scope, v)).collect::<Result<Vec<_>, _>>()?;
    let class = resolve_event_class(env, &call.name, args.clone())?;

    Ok(EventCallResolved { event: call.name.clone(), class, source, target, test_side, args })
}

/// Resolves `name`'s underlying external class, recursing through
/// `Expansion` chains. Each layer rebinds `args` into that layer's own
/// parameter scope; `source`/`target` never participate here, since every
/// expansion layer shares the outer call's source/target.
fn resolve_event_class(env: &ModuleEnv, name: &Name, args: Vec<ResolvedExpr>) -> Result<Name, ResolveError> {
    let def = env.module.events.get(name).ok_or_else(|| ResolveError::UnknownEvent {
        name: name.to_string(),
        suggestion: suggest(name, env.module.events.names().map(|n| n.as_ref())),
    })?;
    if def.params.len() != args.len() {
        return Err(ResolveError::EventArityMismatch { name: def.name.clone(), expected: def.params.len(), actual: args.len() });
    }

    match &def.kind {
        EventKind::External { class } => Ok(class.clone()),
        EventKind::Expansion { target, args: inner_args } => {
            let scope = Scope::child_with_args(&def.params, args);
            let resolved_inner_args = inner_args.iter().map(|v| resolve_value(env, &scope, v)).collect::<Result<Vec<_>, _>>()?;
            resolve_event_class(env, target, resolved_inner_args)
        }
    }
}

fn role_of(expr: &ResolvedExpr) -> Option<Name> {
    match expr {
        ResolvedExpr::Get(Slot::Role { role }) | ResolvedExpr::Set(Slot::Role { role }) => Some(role.clone()),
        _ => None,
    }
}

fn assign_test_side(
    env: &ModuleEnv,
    event_name: &Name,
    source: &ResolvedExpr,
    target: &ResolvedExpr,
) -> Result<Option<TestSide>, ResolveError> {
    let source_role = role_of(source);
    let target_role = role_of(target);

    if source_role.is_none() && target_role.is_none() {
        return Err(ResolveError::UnresolvableEventContext { name: event_name.clone() });
    }

    let source_under_test = source_role.as_ref().is_some_and(|r| env.roles_to_test.contains(r));
    let target_under_test = target_role.as_ref().is_some_and(|r| env.roles_to_test.contains(r));

    match (source_under_test, target_under_test) {
        (true, true) => Err(ResolveError::BothRolesUnderTest {
            name: event_name.clone(),
            role_a: source_role.unwrap(),
            role_b: target_role.unwrap(),
        }),
        (true, false) => Ok(Some(TestSide::Source)),
        (false, true) => Ok(Some(TestSide::Target)),
        (false, false) => Ok(None),
    }
}
