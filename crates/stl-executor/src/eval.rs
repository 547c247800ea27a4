//! Evaluates a resolved expression against the mutable runtime state (§5):
//! role field maps and a transition's local variable slots.

use crate::error::ExecutorError;
use rustc_hash::FxHashMap;
use stl_ast::{Name, QualifierDef};
use stl_externals::{ExpectedValue, Qualifier};
use stl_model::{ResolvedExpr, RoleState, RuntimeValue, Slot};
use std::collections::HashMap;

/// The mutable state visible while running one transition: shared role
/// fields plus this call's local variable slots, addressed by declaration
/// index (§9 arena-plus-index ownership).
pub struct Frame<'a> {
    pub roles: &'a mut FxHashMap<Name, RoleState>,
    pub locals: Vec<RuntimeValue>,
}

impl<'a> Frame<'a> {
    pub fn new(roles: &'a mut FxHashMap<Name, RoleState>, local_count: usize) -> Self {
        Frame { roles, locals: vec![RuntimeValue::Null; local_count] }
    }
}

/// Resolves a `QualifierCall`'s definition name to the registered external
/// implementation behind its `external` binding.
pub struct QualifierLookup<'a> {
    pub defs: &'a [QualifierDef],
    pub registry: &'a FxHashMap<Name, Box<dyn Qualifier>>,
}

impl<'a> QualifierLookup<'a> {
    fn resolve(&self, qualifier: &Name) -> Result<&dyn Qualifier, ExecutorError> {
        let def = self.defs.iter().find(|d| &d.name == qualifier).ok_or_else(|| ExecutorError::UnknownQualifier(qualifier.clone()))?;
        self.registry.get(&def.external).map(|b| b.as_ref()).ok_or_else(|| ExecutorError::UnknownQualifier(def.external.clone()))
    }
}

pub fn eval(expr: &ResolvedExpr, frame: &mut Frame, qualifiers: &QualifierLookup) -> Result<RuntimeValue, ExecutorError> {
    match expr {
        ResolvedExpr::Literal(v) => Ok(v.clone()),
        ResolvedExpr::List(items) => {
            let values = items.iter().map(|item| eval(item, frame, qualifiers)).collect::<Result<Vec<_>, _>>()?;
            Ok(RuntimeValue::List(values))
        }
        ResolvedExpr::Map(entries) => {
            let mut map = HashMap::new();
            for (name, expr) in entries {
                map.insert(name.clone(), eval(expr, frame, qualifiers)?);
            }
            Ok(RuntimeValue::Map(map))
        }
        ResolvedExpr::Get(slot) => get_slot(slot, frame),
        ResolvedExpr::Set(slot) => Err(ExecutorError::UnsupportedSetInValuePosition(slot.clone())),
        ResolvedExpr::QualifierCall { qualifier, args } => {
            let args = args.iter().map(|a| eval(a, frame, qualifiers)).collect::<Result<Vec<_>, _>>()?;
            Ok(qualifiers.resolve(qualifier)?.generate(&args))
        }
    }
}

/// Evaluates a `Wait`-side event argument for matching against whatever
/// value the external actually receives. A top-level qualifier call is left
/// unresolved as a validator rather than generated, since there is nothing
/// to generate until the real value shows up — everything else evaluates as
/// usual and is matched by equality.
pub fn eval_expected<'q>(expr: &ResolvedExpr, frame: &mut Frame, qualifiers: &'q QualifierLookup) -> Result<ExpectedValue<'q>, ExecutorError> {
    match expr {
        ResolvedExpr::QualifierCall { qualifier, args } => {
            let q = qualifiers.resolve(qualifier)?;
            let evaluated_args = args.iter().map(|a| eval(a, frame, qualifiers)).collect::<Result<Vec<_>, _>>()?;
            Ok(ExpectedValue::Qualifier(Box::new(move |actual: &RuntimeValue| q.validate(actual, &evaluated_args))))
        }
        other => Ok(ExpectedValue::Concrete(eval(other, frame, qualifiers)?)),
    }
}

fn get_slot(slot: &Slot, frame: &Frame) -> Result<RuntimeValue, ExecutorError> {
    match slot {
        Slot::RoleField { role, field } => {
            let state = frame.roles.get(role).ok_or_else(|| ExecutorError::UnknownRole(role.clone()))?;
            Ok(state.get(field).cloned().unwrap_or(RuntimeValue::Null))
        }
        Slot::Local { index } => Ok(frame.locals.get(*index).cloned().unwrap_or(RuntimeValue::Null)),
        Slot::Role { role } => Ok(RuntimeValue::Str(role.to_string())),
    }
}

/// Writes through a `Set` slot produced by resolution (role field or local).
pub fn write_slot(slot: &Slot, value: RuntimeValue, frame: &mut Frame) -> Result<(), ExecutorError> {
    match slot {
        Slot::RoleField { role, field } => {
            let state = frame.roles.get_mut(role).ok_or_else(|| ExecutorError::UnknownRole(role.clone()))?;
            state.set(field.clone(), value).map_err(|_| ExecutorError::UnknownRole(role.clone()))
        }
        Slot::Local { index } => {
            if let Some(slot) = frame.locals.get_mut(*index) {
                *slot = value;
            }
            Ok(())
        }
        Slot::Role { .. } => Ok(()),
    }
}

/// Extracts the role name an event's `source`/`target` expression names,
/// per §4.E's "a bare reference to a role itself" context binding.
pub fn role_name_of(expr: &ResolvedExpr) -> Option<&Name> {
    match expr {
        ResolvedExpr::Get(Slot::Role { role }) => Some(role),
        ResolvedExpr::Get(Slot::RoleField { role, .. }) => Some(role),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_ast::RoleDef;

    fn empty_qualifiers() -> (Vec<QualifierDef>, FxHashMap<Name, Box<dyn Qualifier>>) {
        (Vec::new(), FxHashMap::default())
    }

    #[test]
    fn role_field_get_reads_current_value() {
        let def = RoleDef { name: "rClient".into(), fields: vec![] };
        let mut roles = FxHashMap::default();
        roles.insert(Name::from("rClient"), RoleState::new(&def));
        let (defs, registry) = empty_qualifiers();
        let qualifiers = QualifierLookup { defs: &defs, registry: &registry };
        let mut frame = Frame::new(&mut roles, 0);
        let expr = ResolvedExpr::Get(Slot::RoleField { role: "rClient".into(), field: "missing".into() });
        assert_eq!(eval(&expr, &mut frame, &qualifiers).unwrap(), RuntimeValue::Null);
    }

    #[test]
    fn set_in_value_position_is_rejected() {
        let mut roles = FxHashMap::default();
        let (defs, registry) = empty_qualifiers();
        let qualifiers = QualifierLookup { defs: &defs, registry: &registry };
        let mut frame = Frame::new(&mut roles, 0);
        let expr = ResolvedExpr::Set(Slot::Local { index: 0 });
        assert!(eval(&expr, &mut frame, &qualifiers).is_err());
    }

    #[test]
    fn expected_qualifier_call_validates_instead_of_generating() {
        use stl_ast::FieldType;
        use stl_externals::UniqueInt;

        let defs = vec![QualifierDef { name: "UniqueId".into(), qual_type: FieldType::Int, params: vec![], external: "UniqueInt".into() }];
        let mut registry: FxHashMap<Name, Box<dyn Qualifier>> = FxHashMap::default();
        registry.insert("UniqueInt".into(), Box::new(UniqueInt::new()));
        let qualifiers = QualifierLookup { defs: &defs, registry: &registry };

        let mut roles = FxHashMap::default();
        let mut frame = Frame::new(&mut roles, 0);

        // A value the qualifier never generated should fail to validate...
        let expr = ResolvedExpr::QualifierCall { qualifier: "UniqueId".into(), args: vec![] };
        let expected = eval_expected(&expr, &mut frame, &qualifiers).unwrap();
        assert!(!expected.matches(&RuntimeValue::Int(999)));

        // ...but a value it did generate should.
        let generated = eval(&expr, &mut frame, &qualifiers).unwrap();
        let expected = eval_expected(&expr, &mut frame, &qualifiers).unwrap();
        assert!(expected.matches(&generated));
    }
}
