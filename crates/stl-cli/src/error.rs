//! Exit-code taxonomy for the driver binary (§6): distinct non-zero codes
//! separate "the run never started" from "the run started and a
//! transition failed".

/// A run that completed without reaching the executor (bad CLI args,
/// manifest load, parse, or resolve failure).
pub const EXIT_SETUP_FAILURE: i32 = 2;

/// The executor ran to completion but a transition could not be recovered.
pub const EXIT_RUN_FAILED: i32 = 1;

pub const EXIT_SUCCESS: i32 = 0;
