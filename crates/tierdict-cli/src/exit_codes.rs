//! Exit codes of the `tierdict` binary.

use tierdict_core::TierError;

pub const EXIT_SUCCESS: i32 = 0;
/// `verify` found a package that does not match its file.
pub const EXIT_VERIFY_FAILED: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Map a command failure to an exit code.
pub fn from_error(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<TierError>())
        .map(TierError::exit_code)
        .unwrap_or(EXIT_CONFIG_ERROR)
}
