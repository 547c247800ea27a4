//! The `Qualifier` external capability (§6, §8 property 1): a generator and
//! validator pair with the contract `Validate(Generate(a), a) = true`.

use stl_model::RuntimeValue;
use rustc_hash::FxHashSet;
use std::sync::Mutex;

pub trait Qualifier: Send + Sync {
    fn generate(&self, args: &[RuntimeValue]) -> RuntimeValue;
    fn validate(&self, value: &RuntimeValue, args: &[RuntimeValue]) -> bool;
}

/// Generates a fresh integer each call; validates anything this instance has
/// generated, by its own memory. Canonical single-argument form per §9's
/// resolution of the `UniqueString`/`DifferentFrom` `__init__` ambiguity.
pub struct UniqueInt {
    next: Mutex<i64>,
    seen: Mutex<FxHashSet<i64>>,
}

impl UniqueInt {
    pub fn new() -> Self {
        UniqueInt { next: Mutex::new(0), seen: Mutex::new(FxHashSet::default()) }
    }
}

impl Default for UniqueInt {
    fn default() -> Self {
        Self::new()
    }
}

impl Qualifier for UniqueInt {
    fn generate(&self, _args: &[RuntimeValue]) -> RuntimeValue {
        let mut next = self.next.lock().unwrap();
        let value = *next;
        *next += 1;
        self.seen.lock().unwrap().insert(value);
        RuntimeValue::Int(value)
    }

    fn validate(&self, value: &RuntimeValue, _args: &[RuntimeValue]) -> bool {
        matches!(value, RuntimeValue::Int(n) if self.seen.lock().unwrap().contains(n))
    }
}

/// Validates that a value differs from the single argument supplied;
/// `generate` returns a value guaranteed different from it.
pub struct DifferentFrom;

impl Qualifier for DifferentFrom {
    fn generate(&self, args: &[RuntimeValue]) -> RuntimeValue {
        match args.first() {
            Some(RuntimeValue::Int(n)) => RuntimeValue::Int(n + 1),
            Some(RuntimeValue::Str(s)) => RuntimeValue::Str(format!("{s}_")),
            _ => RuntimeValue::Null,
        }
    }

    fn validate(&self, value: &RuntimeValue, args: &[RuntimeValue]) -> bool {
        args.first().is_some_and(|baseline| baseline != value)
    }
}
