// Executable op definitions for the stack machine

use rustc_hash::FxHashMap;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Arithmetic words. All operate on the top two stack words and push the
/// result; arithmetic is unsigned with wrap-around on overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add, // +
    Sub, // -
    Mul, // *
}

/// Comparison words. Pop two words, push 1 or 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Less,    // <
    Greater, // >
    Equal,   // =
}

/// Stack shuffle words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOp {
    Dup,
    Swap,
    Over,
    Rot,
    Drop,
}

/// A single executable op.
///
/// Blocks (`If`, `Loop`, `While`, `Let`) own their body ops directly, so a
/// parsed function is a tree of ops executed depth-first.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Push an integer literal.
    Push(usize),
    /// Copy a byte sequence into flat memory and push its address.
    /// The bytes already include the trailing zero sentinel.
    PushStr(Vec<u8>),

    Math(MathOp),
    Cmp(CmpOp),
    Stack(StackOp),

    /// `<-` - pop an address, push the byte stored there.
    Load,
    /// `->` - pop a value, pop an address, store the low byte there.
    Store,
    /// `alloc` - pop a length, reserve that many zeroed bytes, push the address.
    Alloc,
    /// `free` - pop a length, pop an address, release the span.
    Free,

    /// `putc` - pop a word, write it as a single character.
    Putc,
    /// `putu` - pop a word, write it in unsigned decimal.
    Putu,
    /// `puts` - pop an address, scan-and-print the sentinel-terminated
    /// string there, push the number of bytes consumed (sentinel included).
    Puts,
    /// `???` - dump the operand stack and memory state to the output.
    Dump,

    /// Call a previously defined function.
    Call(String),
    /// Push the value of a let binding in scope.
    Local(String),

    /// Pop the condition word; run the first block if nonzero, else the second.
    If(Vec<Op>, Vec<Op>),
    /// Run the block until `break`.
    Loop(Vec<Op>),
    /// Run the condition block, pop a word, exit when it is zero,
    /// otherwise run the body and repeat.
    While(Vec<Op>, Vec<Op>),
    /// Pop one word per name (first name takes the top of the stack) and
    /// run the block with those bindings in scope.
    Let(Vec<String>, Vec<Op>),

    Break,
    Continue,
}

/// A parsed program: function name to body.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub functions: FxHashMap<String, Vec<Op>>,
}

impl Program {
    pub fn new() -> Self {
        Program {
            functions: FxHashMap::default(),
        }
    }
}
