//! Memory model for the stack machine
//!
//! This module provides the two storage areas a guest program sees:
//! - [`flat`]: the flat byte-addressable memory space, with first-fit
//!   allocation over a free list and explicit release
//! - [`stack`]: the operand stack of `usize` words
//!
//! # Addresses
//!
//! An [`flat::Address`] is a plain `usize` index into the flat space.
//! String literals and `alloc` produce addresses; `<-`, `->`, `puts`, and
//! `free` consume them. No alignment or tagging is applied - the guest
//! machine is byte-granular throughout.

pub mod flat;
pub mod stack;

pub use flat::{Address, Memory};
pub use stack::OperandStack;
