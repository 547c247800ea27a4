//! Unresolved abstract syntax tree for the State Transition Language.
//!
//! Parsing produces immutable [`Module`] values holding the six definition
//! categories (§3). Resolution (`stl-resolver`) clones the relevant pieces
//! into fully-bound forms (`stl-model`); nothing here is mutated after the
//! parser returns it.

mod defs;
mod value;

pub use defs::{
    ConstDef, DefinitionTable, EventCall, EventDef, EventKind, FieldDecl, FieldRule, FieldType,
    MessageBody, MessageDef, Module, Named, OptionGroup, QualifierDef, RoleDef, StateDef,
    TransitionDef, TransitionKind,
};
pub use value::{Name, PrimitiveType, StateValueRef, Value};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_definitions_keep_the_first() {
        let mut table: DefinitionTable<ConstDef> = DefinitionTable::new();
        table.insert(ConstDef { name: "a".into(), ty: PrimitiveType::Int, value: Some(Value::Int(1)) });
        table.insert(ConstDef { name: "a".into(), ty: PrimitiveType::Int, value: Some(Value::Int(2)) });
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a").unwrap().value, Some(Value::Int(1)));
    }
}
