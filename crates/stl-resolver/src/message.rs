//! Resolves message definitions and validates populated message values
//! against their resolved shape (§3, §4.E field-type rules, §7).

use crate::error::ResolveError;
use crate::scope::{ModuleEnv, Scope};
use crate::value::{as_constant, resolve_value};
use stl_ast::{FieldDecl, FieldType, MessageBody, MessageDef};
use stl_model::{FieldResolved, MessageBodyResolved, MessageResolved, MessageValue, RuntimeValue};

pub fn resolve_message_def(env: &ModuleEnv, scope: &Scope, def: &MessageDef) -> Result<MessageResolved, ResolveError> {
    let body = match &def.body {
        MessageBody::Declared { fields, nested } => {
            let fields = fields.iter().map(|f| resolve_field_decl(env, scope, f)).collect::<Result<_, _>>()?;
            let nested = nested.iter().map(|m| resolve_message_def(env, scope, m)).collect::<Result<_, _>>()?;
            MessageBodyResolved::Declared { fields, nested }
        }
        MessageBody::External { descriptor } => MessageBodyResolved::External { descriptor: descriptor.clone() },
    };
    Ok(MessageResolved { name: def.name.clone(), encode: def.encode.clone(), is_array: def.is_array, body })
}

fn resolve_field_decl(env: &ModuleEnv, scope: &Scope, field: &FieldDecl) -> Result<FieldResolved, ResolveError> {
    let encoding_props = field
        .encoding_props
        .iter()
        .map(|(k, v)| {
            let resolved = resolve_value(env, scope, v)?;
            let constant = as_constant(&resolved).ok_or_else(|| ResolveError::FieldTypeMismatch {
                message: field.name.clone(),
                field: k.clone(),
            })?;
            Ok((k.clone(), constant))
        })
        .collect::<Result<_, ResolveError>>()?;
    Ok(FieldResolved { name: field.name.clone(), ty: field.ty.clone(), rule: field.rule.clone(), encoding_props })
}

/// Checks a populated value against its resolved shape: required fields
/// present, repeated fields carrying a list, scalar fields carrying a
/// matching primitive, submessage fields validating recursively.
pub fn validate_message_value(resolved: &MessageResolved, value: &MessageValue) -> Result<(), ResolveError> {
    match (&resolved.body, value) {
        (MessageBodyResolved::Declared { fields, nested }, MessageValue::Single(map)) => {
            validate_fields(resolved, fields, nested, map)
        }
        (MessageBodyResolved::Declared { fields, nested }, MessageValue::Array(items)) => {
            for map in items {
                validate_fields(resolved, fields, nested, map)?;
            }
            Ok(())
        }
        (MessageBodyResolved::External { .. }, _) => Ok(()),
    }
}

fn validate_fields(
    resolved: &MessageResolved,
    fields: &[FieldResolved],
    nested: &[MessageResolved],
    map: &std::collections::HashMap<stl_ast::Name, RuntimeValue>,
) -> Result<(), ResolveError> {
    for field in fields {
        let Some(value) = map.get(&field.name) else {
            if field.rule.optional {
                continue;
            }
            return Err(ResolveError::MissingRequiredField { message: resolved.name.clone(), field: field.name.clone() });
        };

        if field.rule.repeated {
            let RuntimeValue::List(items) = value else {
                return Err(ResolveError::FieldTypeMismatch { message: resolved.name.clone(), field: field.name.clone() });
            };
            for item in items {
                check_scalar_or_message(resolved, field, item, nested)?;
            }
        } else {
            check_scalar_or_message(resolved, field, value, nested)?;
        }
    }
    Ok(())
}

fn check_scalar_or_message(
    resolved: &MessageResolved,
    field: &FieldResolved,
    value: &RuntimeValue,
    nested: &[MessageResolved],
) -> Result<(), ResolveError> {
    let mismatch = || ResolveError::FieldTypeMismatch { message: resolved.name.clone(), field: field.name.clone() };
    match (&field.ty, value) {
        (FieldType::Bool, RuntimeValue::Bool(_)) => Ok(()),
        (FieldType::Int, RuntimeValue::Int(_)) => Ok(()),
        (FieldType::String, RuntimeValue::Str(_)) => Ok(()),
        (FieldType::Message(name), RuntimeValue::Map(inner)) => {
            let submessage = nested.iter().find(|m| &m.name == name).ok_or_else(mismatch)?;
            validate_message_value(submessage, &MessageValue::Single(inner.clone()))
        }
        _ => Err(mismatch()),
    }
}
