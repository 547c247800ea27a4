//! Resolves a `stl_ast::Value` into a `stl_model::ResolvedExpr` (§4.E).
//!
//! Reference lookup order for a path `foo` (or `foo.bar`):
//! (a) `role.field` — two-segment path whose head names a role (directly,
//!     or a param/local bound to one) binds to a get/set-field thunk;
//! (b) `resolved_params[foo]` — a transition/event parameter or local;
//! (c) current module constants;
//! (d) current module roles (a bare reference to the role itself, used to
//!     bind event contexts).
//! Anything else is an unresolved reference, reported with a "did you mean"
//! suggestion (§7, §8 property 7).

use crate::didyoumean::suggest;
use crate::error::ResolveError;
use crate::message::{resolve_message_def, validate_message_value};
use crate::scope::{ModuleEnv, Scope};
use stl_ast::{Name, Value};
use stl_model::{MessageValue, ResolvedExpr, RuntimeValue, Slot};

pub fn resolve_value(env: &ModuleEnv, scope: &Scope, value: &Value) -> Result<ResolvedExpr, ResolveError> {
    match value {
        Value::Bool(b) => Ok(ResolvedExpr::Literal(RuntimeValue::Bool(*b))),
        Value::Int(n) => Ok(ResolvedExpr::Literal(RuntimeValue::Int(*n))),
        Value::Str(s) => Ok(ResolvedExpr::Literal(RuntimeValue::Str(s.clone()))),
        Value::Null => Ok(ResolvedExpr::Literal(RuntimeValue::Null)),
        Value::Get(path) => resolve_path(env, scope, path, false),
        Value::Set(path) => resolve_path(env, scope, path, true),
        Value::List(items) => {
            let resolved = items.iter().map(|v| resolve_value(env, scope, v)).collect::<Result<_, _>>()?;
            Ok(ResolvedExpr::List(resolved))
        }
        Value::Map(entries) => {
            let resolved = entries
                .iter()
                .map(|(k, v)| resolve_value(env, scope, v).map(|v| (k.clone(), v)))
                .collect::<Result<_, _>>()?;
            Ok(ResolvedExpr::Map(resolved))
        }
        Value::Message { name, fields } => {
            let def = env.module.messages.get(name).ok_or_else(|| ResolveError::UnknownMessage {
                name: name.to_string(),
                suggestion: suggest(name, env.module.messages.names().map(|n| n.as_ref())),
            })?;
            let resolved: Vec<(Name, ResolvedExpr)> = fields
                .iter()
                .map(|(k, v)| resolve_value(env, scope, v).map(|v| (k.clone(), v)))
                .collect::<Result<_, _>>()?;

            // Field values bound to a runtime-only slot (a role reference or
            // qualifier call) can't be type-checked until the value actually
            // exists; only a literal-foldable message is checked here.
            let constants: Option<std::collections::HashMap<Name, RuntimeValue>> =
                resolved.iter().map(|(k, v)| as_constant(v).map(|cv| (k.clone(), cv))).collect();
            if let Some(map) = constants {
                let message_resolved = resolve_message_def(env, scope, def)?;
                validate_message_value(&message_resolved, &MessageValue::Single(map))?;
            }

            Ok(ResolvedExpr::Map(resolved))
        }
        Value::QualifierCall { name, args } => {
            if env.module.qualifiers.get(name).is_none() {
                return Err(ResolveError::UnknownQualifier {
                    name: name.to_string(),
                    suggestion: suggest(name, env.module.qualifiers.names().map(|n| n.as_ref())),
                });
            }
            let resolved_args = args.iter().map(|v| resolve_value(env, scope, v)).collect::<Result<_, _>>()?;
            Ok(ResolvedExpr::QualifierCall { qualifier: name.clone(), args: resolved_args })
        }
    }
}

fn resolve_path(env: &ModuleEnv, scope: &Scope, path: &[Name], write: bool) -> Result<ResolvedExpr, ResolveError> {
    if path.len() >= 2 {
        let role = role_behind(env, scope, &path[0]).ok_or_else(|| unresolved(env, scope, &path[0]))?;
        let field = path[1].clone();
        if !env.module.roles.get(&role).map(|r| r.fields.iter().any(|f| f.name == field)).unwrap_or(false) {
            let candidates: Vec<&str> = env
                .module
                .roles
                .get(&role)
                .map(|r| r.fields.iter().map(|f| f.name.as_ref()).collect())
                .unwrap_or_default();
            return Err(ResolveError::UnresolvedReference {
                name: format!("{role}.{field}"),
                suggestion: suggest(&field, candidates),
            });
        }
        let slot = Slot::RoleField { role, field };
        return Ok(if write { ResolvedExpr::Set(slot) } else { ResolvedExpr::Get(slot) });
    }

    let name = &path[0];

    if let Some(bound) = scope.params.get(name) {
        return Ok(bound.clone());
    }
    if let Some(&index) = scope.locals.get(name) {
        let slot = Slot::Local { index };
        return Ok(if write { ResolvedExpr::Set(slot) } else { ResolvedExpr::Get(slot) });
    }
    if let Some(value) = env.consts.get(name) {
        return Ok(ResolvedExpr::Literal(value.clone()));
    }
    if env.module.roles.get(name).is_some() {
        let slot = Slot::Role { role: name.clone() };
        return Ok(if write { ResolvedExpr::Set(slot) } else { ResolvedExpr::Get(slot) });
    }

    Err(unresolved(env, scope, name))
}

fn role_behind(env: &ModuleEnv, scope: &Scope, name: &Name) -> Option<Name> {
    if let Some(ResolvedExpr::Get(Slot::Role { role }) | ResolvedExpr::Set(Slot::Role { role })) = scope.params.get(name) {
        return Some(role.clone());
    }
    env.module.roles.get(name).map(|r| r.name.clone())
}

/// Folds a resolved expression down to a concrete `RuntimeValue`, for
/// contexts (state parameters) that must be fixed before execution rather
/// than evaluated at firing time. `None` means the expression names a
/// runtime-only slot or qualifier call.
pub fn as_constant(expr: &ResolvedExpr) -> Option<RuntimeValue> {
    match expr {
        ResolvedExpr::Literal(v) => Some(v.clone()),
        ResolvedExpr::List(items) => items.iter().map(as_constant).collect::<Option<_>>().map(RuntimeValue::List),
        ResolvedExpr::Map(entries) => entries
            .iter()
            .map(|(k, v)| as_constant(v).map(|v| (k.clone(), v)))
            .collect::<Option<std::collections::HashMap<_, _>>>()
            .map(RuntimeValue::Map),
        ResolvedExpr::Get(_) | ResolvedExpr::Set(_) | ResolvedExpr::QualifierCall { .. } => None,
    }
}

fn unresolved(env: &ModuleEnv, scope: &Scope, name: &Name) -> ResolveError {
    let candidates: Vec<&str> = scope
        .params
        .keys()
        .chain(scope.locals.keys())
        .chain(env.consts.keys())
        .chain(env.module.roles.names())
        .map(|n| n.as_ref())
        .collect();
    ResolveError::UnresolvedReference { name: name.to_string(), suggestion: suggest(name, candidates) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::{FxHashMap, FxHashSet};
    use stl_ast::{FieldDecl, FieldRule, FieldType, MessageBody, MessageDef, Module};

    fn module_with_packet() -> Module {
        let mut module = Module::new("m");
        module.messages.insert(MessageDef {
            name: "Packet".into(),
            encode: None,
            is_array: false,
            body: MessageBody::Declared {
                fields: vec![FieldDecl { name: "seq".into(), ty: FieldType::Int, rule: FieldRule::required(), encoding_props: vec![] }],
                nested: vec![],
            },
        });
        module
    }

    #[test]
    fn message_literal_with_all_required_fields_resolves() {
        let module = module_with_packet();
        let env = ModuleEnv { module: &module, consts: FxHashMap::default(), roles_to_test: FxHashSet::default() };
        let value = Value::Message { name: "Packet".into(), fields: vec![("seq".into(), Value::Int(1))] };
        assert!(resolve_value(&env, &Scope::default(), &value).is_ok());
    }

    #[test]
    fn message_literal_missing_required_field_is_rejected() {
        let module = module_with_packet();
        let env = ModuleEnv { module: &module, consts: FxHashMap::default(), roles_to_test: FxHashSet::default() };
        let value = Value::Message { name: "Packet".into(), fields: vec![] };
        let err = resolve_value(&env, &Scope::default(), &value).unwrap_err();
        assert_eq!(err, ResolveError::MissingRequiredField { message: "Packet".into(), field: "seq".into() });
    }

    #[test]
    fn message_literal_with_wrong_field_type_is_rejected() {
        let module = module_with_packet();
        let env = ModuleEnv { module: &module, consts: FxHashMap::default(), roles_to_test: FxHashSet::default() };
        let value = Value::Message { name: "Packet".into(), fields: vec![("seq".into(), Value::Str("nope".into()))] };
        let err = resolve_value(&env, &Scope::default(), &value).unwrap_err();
        assert_eq!(err, ResolveError::FieldTypeMismatch { message: "Packet".into(), field: "seq".into() });
    }
}
