//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (unspecified)                      |
//! | 2    | Usage error (bad args, missing or unknown file)  |
//! | 3    | Input table could not be read or parsed         |
//! | 4    | Replay script could not be read or parsed        |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing file, unsupported format.
pub const EXIT_USAGE: u8 = 2;

/// Input table is not valid CSV or not a JSON array of objects.
pub const EXIT_INPUT_PARSE: u8 = 3;

/// Replay script is not a valid event script.
pub const EXIT_SCRIPT: u8 = 4;
