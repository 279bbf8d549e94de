//! # Introduction
//!
//! stax parses and executes a tiny concatenative stack language: programs
//! are whitespace-separated words manipulating an operand stack and a
//! flat byte-addressable memory space with explicit allocate/free.
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → Ops → Interpreter → Output
//! ```
//!
//! 1. [`parser`] - tokenises the source and builds the op tree, resolving
//!    every word at parse time.
//! 2. [`interpreter`] - walks the ops, executing against the machine
//!    state and writing guest output to a caller-supplied sink.
//! 3. [`memory`] - the machine state: the [`memory::OperandStack`] of
//!    words and the flat [`memory::Memory`] byte space.
//!
//! ## Supported language
//!
//! Literals: unsigned integers, `"single-byte strings"` (stored in flat
//! memory with a zero sentinel; the literal's address is pushed).
//! Words: `+ - * < > =`, `dup swap over rot drop`, `<- -> alloc free`,
//! `putc putu puts ???`.
//! Control flow: `if { } else { }`, `loop { }`, `while { cond } { body }`,
//! `break`, `continue`, `let a b { ... }`, `fn name { ... }` definitions
//! and calls.
//!
//! ## The bundled demo
//!
//! [`FIB_DEMO`] is the flagship program: a bounded Fibonacci emitter that
//! prints `1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, ` and a newline,
//! printing each `", "` delimiter through `puts` from a fresh allocation
//! and freeing it with the byte count `puts` reports. The binary runs it
//! when invoked with no arguments.

pub mod interpreter;
pub mod memory;
pub mod parser;

/// The bundled demo program: the bounded Fibonacci emitter.
pub const FIB_DEMO: &str = include_str!("../demos/fib.stx");
