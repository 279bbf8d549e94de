// Constants for the stax interpreter

/// Flat memory capacity in bytes.
/// Far more than any bundled program needs, small enough that a runaway
/// allocation loop fails fast instead of eating host memory.
pub const MEMORY_CAPACITY: usize = 64 * 1024;

/// Longest string `puts` will scan before reporting a missing sentinel.
pub const MAX_STRING_SCAN: usize = 10_000;

/// Maximum guest call nesting before execution is cut off.
pub const MAX_CALL_DEPTH: usize = 256;
