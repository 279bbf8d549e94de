//! Runtime error types for the stax interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can
//! occur during program execution (as opposed to parse errors or system
//! errors).
//!
//! All runtime errors are fatal - they halt execution and display diagnostic
//! information. Ops are compiled without source locations, so errors carry
//! operational context (the word being executed, the offending address or
//! limit) rather than a line number.

use std::fmt;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone)]
pub enum RuntimeError {
    /// Main function not found
    NoMainFunction,

    /// A word needed more stack than was available
    StackUnderflow { word: String, message: String },

    /// Load/store/scan touched an address outside reserved memory
    InvalidAddress { word: String, message: String },

    /// Flat memory capacity exhausted
    OutOfMemory { message: String },

    /// `free` of a span that is not currently reserved
    InvalidFree { message: String },

    /// A string scan advanced past the scan limit without meeting a
    /// zero sentinel
    UnterminatedString { address: usize, scanned: usize },

    /// `putc` of a word that is not a valid character
    InvalidCharCode { value: usize },

    /// Guest call nesting exceeded the host limit
    CallDepthExceeded { limit: usize },

    /// Call of a function missing from the program table
    UndefinedFunction { name: String },

    /// Reference to a let binding missing from scope
    UndefinedBinding { name: String },

    /// Writing guest output failed
    OutputFailed { message: String },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::NoMainFunction => {
                write!(f, "No main function found")
            }
            RuntimeError::StackUnderflow { word, message } => {
                write!(f, "Stack underflow in '{}': {}", word, message)
            }
            RuntimeError::InvalidAddress { word, message } => {
                write!(f, "Invalid address in '{}': {}", word, message)
            }
            RuntimeError::OutOfMemory { message } => {
                write!(f, "Out of memory: {}", message)
            }
            RuntimeError::InvalidFree { message } => {
                write!(f, "Invalid free: {}", message)
            }
            RuntimeError::UnterminatedString { address, scanned } => {
                write!(
                    f,
                    "Unterminated string at address 0x{:x}: no sentinel within {} bytes",
                    address, scanned
                )
            }
            RuntimeError::InvalidCharCode { value } => {
                write!(f, "putc of {} which is not a valid character", value)
            }
            RuntimeError::CallDepthExceeded { limit } => {
                write!(f, "Call depth exceeded the limit of {}", limit)
            }
            RuntimeError::UndefinedFunction { name } => {
                write!(f, "Call of undefined function '{}'", name)
            }
            RuntimeError::UndefinedBinding { name } => {
                write!(f, "Reference to undefined binding '{}'", name)
            }
            RuntimeError::OutputFailed { message } => {
                write!(f, "Writing output failed: {}", message)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
