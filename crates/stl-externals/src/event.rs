//! The `Event` external capability (§6): user code `Fire`s events it
//! originates and `Wait`s for events it expects to receive.

use crate::error::ExternalError;
use stl_model::{RuntimeValue, TestSide};

/// Everything a `Fire`/`Wait` call needs about the transition that invoked
/// it. `test_side` mirrors `stl_model::EventCallResolved::test_side`:
/// `None` when neither role is under test (both under test is rejected at
/// resolve time).
pub struct EventContext<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub test_side: Option<TestSide>,
}

/// One `Wait`-side argument, as handed to an external for matching against
/// whatever value it actually receives. A qualifier-typed argument isn't
/// pre-generated the way it is on the `Fire` side — there is nothing to
/// generate until a real value has arrived — so it's carried as a live
/// validator instead, closing over the qualifier and its own arguments.
/// `matches` is the one thing an external needs: compare the real value
/// this position received against what was expected here.
pub enum ExpectedValue<'a> {
    Concrete(RuntimeValue),
    Qualifier(Box<dyn Fn(&RuntimeValue) -> bool + 'a>),
}

impl ExpectedValue<'_> {
    pub fn matches(&self, actual: &RuntimeValue) -> bool {
        match self {
            ExpectedValue::Concrete(expected) => expected == actual,
            ExpectedValue::Qualifier(validate) => validate(actual),
        }
    }
}

pub trait EventExternal: Send + Sync {
    fn fire(&self, ctx: &EventContext, args: &[RuntimeValue]) -> Result<bool, ExternalError>;
    fn wait(&self, ctx: &EventContext, args: &[ExpectedValue]) -> Result<bool, ExternalError>;
}

/// Trivial built-in used by examples and by tests that don't exercise a
/// real transport: always succeeds, recording nothing.
pub struct Noop;

impl EventExternal for Noop {
    fn fire(&self, _ctx: &EventContext, _args: &[RuntimeValue]) -> Result<bool, ExternalError> {
        Ok(true)
    }

    fn wait(&self, _ctx: &EventContext, _args: &[ExpectedValue]) -> Result<bool, ExternalError> {
        Ok(true)
    }
}
