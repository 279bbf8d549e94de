//! stax execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: Main interpreter walking op blocks
//! - [`errors`]: Runtime error types
//! - [`constants`]: Memory, scan, and call-depth limits
//!
//! # Execution Model
//!
//! The interpreter walks each function's op block depth-first, mutating the
//! operand stack and flat memory as it goes. `break`/`continue` propagate
//! out of nested blocks to the innermost enclosing loop. Execution starts
//! at `main` and runs to completion; every runtime error is fatal.
//!
//! # Output Words
//!
//! The output words (`putc`, `putu`, `puts`, `???`) are implemented
//! directly in the engine rather than as separate modules - they are the
//! machine's native I/O primitives, not guest code.

pub mod constants;
pub mod engine;
pub mod errors;
