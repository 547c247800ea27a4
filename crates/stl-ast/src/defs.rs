//! Module-scoped definitions: consts, roles, states, messages, qualifiers,
//! events, and transitions, plus the duplicate-tolerant collection each of
//! their maps is stored in (§3 key invariant: "unique across the six
//! definition categories", duplicates logged, first wins).

use crate::value::{Name, PrimitiveType, StateValueRef, Value};

/// A named definition, usable as the element type of [`DefinitionTable`].
pub trait Named {
    fn name(&self) -> &Name;
}

/// Insertion-ordered, name-keyed collection that keeps the first definition
/// on a name collision and logs the rest, per §3/§4.B duplicate policy.
#[derive(Debug, Clone)]
pub struct DefinitionTable<T> {
    items: Vec<T>,
}

impl<T: Named> DefinitionTable<T> {
    pub fn new() -> Self {
        DefinitionTable { items: Vec::new() }
    }

    /// Insert `item`; if its name collides with an existing entry, the
    /// existing one is kept and the new one is dropped with a warning.
    pub fn insert(&mut self, item: T) {
        if self.items.iter().any(|existing| existing.name() == item.name()) {
            tracing::warn!(name = %item.name(), "duplicate definition, first one wins");
            return;
        }
        self.items.push(item);
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.iter().find(|item| &*item.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.items.iter().map(|item| item.name())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Named> Default for DefinitionTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// `(name, type, value)`. `value` is `None` until bound from the manifest's
/// `constants` map; unbound at execution time is fatal (§7 runtime errors).
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDef {
    pub name: Name,
    pub ty: PrimitiveType,
    pub value: Option<Value>,
}

impl Named for ConstDef {
    fn name(&self) -> &Name {
        &self.name
    }
}

/// A field's declared shape, independent of any value it may hold.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub optional: bool,
    pub repeated: bool,
}

impl FieldRule {
    pub fn required() -> Self {
        FieldRule { optional: false, repeated: false }
    }
    pub fn optional() -> Self {
        FieldRule { optional: true, repeated: false }
    }
    /// `repeated ⇒ optional` (§3).
    pub fn repeated() -> Self {
        FieldRule { optional: true, repeated: true }
    }
}

/// A field's declared type: a primitive, or the name of a nested/sibling
/// message.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Bool,
    Int,
    String,
    Message(Name),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: FieldType,
    pub rule: FieldRule,
    /// Arbitrary key/literal pairs consulted by custom encodings.
    pub encoding_props: Vec<(Name, Value)>,
}

/// A role's field declarations. Field *values* live in the resolved/runtime
/// model (`stl-model`), not here — the AST only carries the declared shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleDef {
    pub name: Name,
    pub fields: Vec<FieldDecl>,
}

impl Named for RoleDef {
    fn name(&self) -> &Name {
        &self.name
    }
}

/// `(name, parameter list, ordered list of value symbols)`. The first symbol
/// is the declared initial value.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDef {
    pub name: Name,
    pub params: Vec<Name>,
    pub values: Vec<Name>,
}

impl StateDef {
    pub fn initial_value(&self) -> &Name {
        &self.values[0]
    }
}

impl Named for StateDef {
    fn name(&self) -> &Name {
        &self.name
    }
}

/// A message body, or an external record the fields are derived from.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    Declared { fields: Vec<FieldDecl>, nested: Vec<MessageDef> },
    /// Wraps an externally described record (e.g. a Protobuf message type);
    /// fields and nested messages are derived from that descriptor at
    /// resolution time rather than declared in STL source.
    External { descriptor: Name },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageDef {
    pub name: Name,
    pub encode: Option<Name>,
    pub is_array: bool,
    pub body: MessageBody,
}

impl Named for MessageDef {
    fn name(&self) -> &Name {
        &self.name
    }
}

/// `(name, qualified type, parameter list, external implementation)`.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifierDef {
    pub name: Name,
    pub qual_type: FieldType,
    pub params: Vec<Name>,
    pub external: Name,
}

impl Named for QualifierDef {
    fn name(&self) -> &Name {
        &self.name
    }
}

/// Either an external event (wraps a Fire/Wait pair bound to a class) or an
/// expansion naming another event plus argument expressions. Neither variant
/// carries `source`/`target`: those belong to the call site (see
/// [`EventCall`]), not the definition.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    External { class: Name },
    Expansion { target: Name, args: Vec<Value> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDef {
    pub name: Name,
    pub params: Vec<Name>,
    pub kind: EventKind,
}

impl Named for EventDef {
    fn name(&self) -> &Name {
        &self.name
    }
}

/// One call to a named event inside a transition's `events { ... }` block,
/// written `source -> name(args) -> target;`. `source`/`target` are bound
/// fresh at this call site, not shared with any other call to the same
/// named event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventCall {
    pub name: Name,
    pub source: Value,
    pub target: Value,
    pub args: Vec<Value>,
}

/// A disjunction of state-value options; the whole `pre_states` list is a
/// conjunction of these groups (§3).
pub type OptionGroup = Vec<StateValueRef>;

/// Either a full transition body or an expansion of another transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionKind {
    Expansion { target: Name, args: Vec<Value> },
    Full {
        locals: Vec<Name>,
        pre_states: Vec<OptionGroup>,
        events: Vec<EventCall>,
        post_states: Vec<StateValueRef>,
        error_states: Vec<StateValueRef>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionDef {
    pub name: Name,
    pub params: Vec<Name>,
    pub kind: TransitionKind,
}

impl Named for TransitionDef {
    fn name(&self) -> &Name {
        &self.name
    }
}

/// A named container built from one or more STL source files (§3). Multiple
/// files may append definitions to the same module name.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: String,
    pub consts: DefinitionTable<ConstDef>,
    pub roles: DefinitionTable<RoleDef>,
    pub states: DefinitionTable<StateDef>,
    pub messages: DefinitionTable<MessageDef>,
    pub qualifiers: DefinitionTable<QualifierDef>,
    pub events: DefinitionTable<EventDef>,
    pub transitions: DefinitionTable<TransitionDef>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module { name: name.into(), ..Default::default() }
    }
}
