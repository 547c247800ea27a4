//! Resolved events and transitions (§3, §4.E).
//!
//! A resolved [`TransitionResolved`] has no `params` and no `expand` field
//! at all — the invariant "`params = [] ∧ expand = null`" is enforced by
//! the type rather than checked at runtime.

use crate::state::StateValue;
use crate::value::ResolvedExpr;
use stl_ast::Name;

/// Which side of an event context is under test, selecting whether the
/// driver calls `Fire` or `Wait` (§4.E, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestSide {
    Source,
    Target,
}

/// One call to a resolved event inside a transition's event list.
///
/// Every field here is derived from this call site's own argument bindings,
/// not shared with any other call to the same named event: the same event
/// called from two transitions with different role arguments can carry
/// different `source`/`target`/`test_side` at each call site.
#[derive(Debug, Clone, PartialEq)]
pub struct EventCallResolved {
    pub event: Name,
    pub class: Name,
    pub source: ResolvedExpr,
    pub target: ResolvedExpr,
    pub test_side: Option<TestSide>,
    pub args: Vec<ResolvedExpr>,
}

/// A fully resolved transition: expansions have been inlined and every
/// `pre_states` option group and `post_states`/`error_states` entry names a
/// concrete [`StateValue`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResolved {
    pub name: Name,
    pub locals: Vec<Name>,
    pub pre_states: Vec<Vec<StateValue>>,
    pub events: Vec<EventCallResolved>,
    pub post_states: Vec<StateValue>,
    pub error_states: Vec<StateValue>,
}

impl TransitionResolved {
    /// Whether vertex `v`'s `StateValue`s satisfy every option group: for
    /// each group at least one option must be compatible, where a state not
    /// mentioned in `v` is vacuously compatible (§4.F).
    pub fn matches(&self, vertex: &[StateValue]) -> bool {
        self.pre_states.iter().all(|group| {
            group.iter().any(|option| state_compatible(option, vertex))
        })
    }
}

fn state_compatible(option: &StateValue, vertex: &[StateValue]) -> bool {
    match vertex.iter().find(|sv| sv.state == option.state) {
        Some(sv) => sv.symbol == option.symbol,
        None => true,
    }
}
