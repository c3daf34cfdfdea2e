//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Queried node does not exist
pub const NOTFOUND: i32 = 2;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (malformed tree document or filter)
pub const DATAERR: i32 = 65;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
