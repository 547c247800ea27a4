//! Runtime registries the executor consults to dispatch into external
//! collaborators (§6): one `EventExternal` per event class, one `Qualifier`
//! per qualifier external implementation, plus the per-role mutable field
//! state roles under test carry across the whole run (§5).

use rustc_hash::FxHashMap;
use stl_ast::{Name, RoleDef};
use stl_externals::{EventExternal, Qualifier};
use stl_model::RoleState;

#[derive(Default)]
pub struct Environment {
    pub roles: FxHashMap<Name, RoleState>,
    pub events: FxHashMap<Name, Box<dyn EventExternal>>,
    pub qualifiers: FxHashMap<Name, Box<dyn Qualifier>>,
}

impl Environment {
    pub fn new(role_defs: &[RoleDef]) -> Self {
        let roles = role_defs.iter().map(|def| (def.name.clone(), RoleState::new(def))).collect();
        Environment { roles, events: FxHashMap::default(), qualifiers: FxHashMap::default() }
    }

    pub fn register_event(&mut self, class: impl Into<Name>, external: Box<dyn EventExternal>) {
        self.events.insert(class.into(), external);
    }

    pub fn register_qualifier(&mut self, external: impl Into<Name>, qualifier: Box<dyn Qualifier>) {
        self.qualifiers.insert(external.into(), qualifier);
    }
}
