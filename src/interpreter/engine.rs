// Execution engine for the stax interpreter

use crate::interpreter::constants::{MAX_CALL_DEPTH, MAX_STRING_SCAN, MEMORY_CAPACITY};
use crate::interpreter::errors::RuntimeError;
use crate::memory::{Address, Memory, OperandStack};
use crate::parser::ast::{CmpOp, MathOp, Op, Program, StackOp};
use rustc_hash::FxHashMap;
use std::io::Write;

/// Control-flow status threaded out of nested blocks.
///
/// `Break` and `Continue` propagate upward until the innermost enclosing
/// loop absorbs them; everything between (if blocks, let blocks, function
/// bodies) stops executing and passes the status along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Normal,
    Break,
    Continue,
}

/// Let bindings visible to the currently executing block.
type Bindings = FxHashMap<String, usize>;

/// The main interpreter that executes a stax program.
///
/// Guest output is written to the `out` sink: stdout in the binary, a
/// `Vec<u8>` in tests. Output ordering follows execution order exactly;
/// whether the sink buffers is up to the caller ([`Interpreter::run`]
/// flushes once at the end).
pub struct Interpreter<W: Write> {
    /// Parsed program (function table)
    program: Program,

    /// Operand stack
    stack: OperandStack,

    /// Flat byte memory
    memory: Memory,

    /// Guest output sink
    out: W,

    /// Current guest call nesting
    depth: usize,
}

impl<W: Write> Interpreter<W> {
    /// Create a new interpreter with the parsed program, writing guest
    /// output to `out`.
    pub fn new(program: Program, out: W) -> Self {
        Interpreter {
            program,
            stack: OperandStack::new(),
            memory: Memory::new(MEMORY_CAPACITY),
            out,
            depth: 0,
        }
    }

    /// Execute the program's `main` function to completion.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let main = self
            .program
            .functions
            .get("main")
            .cloned()
            .ok_or(RuntimeError::NoMainFunction)?;
        self.exec_block(&main, &Bindings::default())?;
        self.out.flush().map_err(Self::map_output_error)?;
        Ok(())
    }

    /// The operand stack (for inspection after a run).
    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    /// The flat memory (for inspection after a run).
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Consume the interpreter and return the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Execute a block of ops against the machine state.
    fn exec_block(&mut self, ops: &[Op], locals: &Bindings) -> Result<Flow, RuntimeError> {
        for op in ops {
            match op {
                Op::Push(value) => self.stack.push(*value),
                Op::PushStr(data) => {
                    let address = self
                        .memory
                        .extend(data)
                        .map_err(|e| Self::map_alloc_error("string literal", e))?;
                    self.stack.push(address);
                }

                Op::Math(operator) => {
                    let b = self.pop(operator.word())?;
                    let a = self.pop(operator.word())?;
                    // Unsigned wrap-around on overflow, never an error.
                    let result = match operator {
                        MathOp::Add => a.wrapping_add(b),
                        MathOp::Sub => a.wrapping_sub(b),
                        MathOp::Mul => a.wrapping_mul(b),
                    };
                    self.stack.push(result);
                }
                Op::Cmp(operator) => {
                    let b = self.pop(operator.word())?;
                    let a = self.pop(operator.word())?;
                    let result = match operator {
                        CmpOp::Less => a < b,
                        CmpOp::Greater => a > b,
                        CmpOp::Equal => a == b,
                    };
                    self.stack.push(result as usize);
                }
                Op::Stack(operator) => {
                    let result = match operator {
                        StackOp::Dup => self.stack.dup(),
                        StackOp::Swap => self.stack.swap(),
                        StackOp::Over => self.stack.over(),
                        StackOp::Rot => self.stack.rot(),
                        StackOp::Drop => self.stack.drop_top(),
                    };
                    result.map_err(|message| RuntimeError::StackUnderflow {
                        word: operator.word().to_string(),
                        message,
                    })?;
                }

                Op::Load => {
                    let address = self.pop("<-")?;
                    let value =
                        self.memory
                            .load(address)
                            .map_err(|message| RuntimeError::InvalidAddress {
                                word: "<-".to_string(),
                                message,
                            })?;
                    self.stack.push(value as usize);
                }
                Op::Store => {
                    let value = self.pop("->")?;
                    let address = self.pop("->")?;
                    self.memory
                        .store(address, value as u8)
                        .map_err(|message| RuntimeError::InvalidAddress {
                            word: "->".to_string(),
                            message,
                        })?;
                }
                Op::Alloc => {
                    let len = self.pop("alloc")?;
                    let address = self
                        .memory
                        .alloc(len)
                        .map_err(|e| Self::map_alloc_error("alloc", e))?;
                    self.stack.push(address);
                }
                Op::Free => {
                    let len = self.pop("free")?;
                    let address = self.pop("free")?;
                    self.memory
                        .free(address, len)
                        .map_err(|message| RuntimeError::InvalidFree { message })?;
                }

                Op::Putc => self.builtin_putc()?,
                Op::Putu => self.builtin_putu()?,
                Op::Puts => self.builtin_puts()?,
                Op::Dump => self.builtin_dump()?,

                Op::Call(name) => {
                    if self.depth >= MAX_CALL_DEPTH {
                        return Err(RuntimeError::CallDepthExceeded {
                            limit: MAX_CALL_DEPTH,
                        });
                    }
                    let body = self
                        .program
                        .functions
                        .get(name)
                        .cloned()
                        .ok_or_else(|| RuntimeError::UndefinedFunction { name: name.clone() })?;
                    self.depth += 1;
                    // Functions start with no bindings; lets do not cross calls.
                    let flow = self.exec_block(&body, &Bindings::default());
                    self.depth -= 1;
                    match flow? {
                        Flow::Normal => {}
                        status => return Ok(status),
                    }
                }
                Op::Local(name) => {
                    let value = locals.get(name).copied().ok_or_else(|| {
                        RuntimeError::UndefinedBinding { name: name.clone() }
                    })?;
                    self.stack.push(value);
                }

                Op::If(true_block, false_block) => {
                    let block = if self.pop("if")? != 0 {
                        true_block
                    } else {
                        false_block
                    };
                    match self.exec_block(block, locals)? {
                        Flow::Normal => {}
                        status => return Ok(status),
                    }
                }
                Op::Loop(body) => loop {
                    match self.exec_block(body, locals)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                    }
                },
                Op::While(condition, body) => loop {
                    match self.exec_block(condition, locals)? {
                        Flow::Normal => {}
                        Flow::Break => break,
                        Flow::Continue => continue,
                    }
                    if self.pop("while")? == 0 {
                        break;
                    }
                    match self.exec_block(body, locals)? {
                        Flow::Break => break,
                        Flow::Normal | Flow::Continue => {}
                    }
                },
                Op::Let(names, body) => {
                    let mut scope = locals.clone();
                    for name in names {
                        let value = self.pop("let")?;
                        scope.insert(name.clone(), value);
                    }
                    match self.exec_block(body, &scope)? {
                        Flow::Normal => {}
                        status => return Ok(status),
                    }
                }

                Op::Break => return Ok(Flow::Break),
                Op::Continue => return Ok(Flow::Continue),
            }
        }
        Ok(Flow::Normal)
    }

    fn pop(&mut self, word: &str) -> Result<usize, RuntimeError> {
        self.stack
            .pop()
            .map_err(|message| RuntimeError::StackUnderflow {
                word: word.to_string(),
                message,
            })
    }

    /// Allocation failures are out-of-memory; anything else from the
    /// memory layer is an address problem.
    fn map_alloc_error(word: &str, message: String) -> RuntimeError {
        if message.contains("out of memory") {
            RuntimeError::OutOfMemory { message }
        } else {
            RuntimeError::InvalidAddress {
                word: word.to_string(),
                message,
            }
        }
    }

    fn map_output_error(err: std::io::Error) -> RuntimeError {
        RuntimeError::OutputFailed {
            message: err.to_string(),
        }
    }
}

/// Output words. These are implemented directly on the engine rather than
/// as guest code, matching the original machine's native I/O primitives.
impl<W: Write> Interpreter<W> {
    /// `putc`: pop a word and write it as a single character.
    fn builtin_putc(&mut self) -> Result<(), RuntimeError> {
        let value = self.pop("putc")?;
        let ch = u32::try_from(value)
            .ok()
            .and_then(char::from_u32)
            .ok_or(RuntimeError::InvalidCharCode { value })?;
        write!(self.out, "{}", ch).map_err(Self::map_output_error)
    }

    /// `putu`: pop a word and write it in unsigned decimal.
    fn builtin_putu(&mut self) -> Result<(), RuntimeError> {
        let value = self.pop("putu")?;
        write!(self.out, "{}", value).map_err(Self::map_output_error)
    }

    /// `puts`: pop an address, write the sentinel-terminated string there,
    /// and push the number of bytes consumed.
    ///
    /// The scan starts at offset 0 and emits bytes while they are nonzero;
    /// the zero sentinel stops it. The pushed count is `final_offset + 1` -
    /// the sentinel is counted - which is exactly the length the caller
    /// passes to `free` to release the string's backing storage.
    ///
    /// A scan that leaves reserved memory or runs [`MAX_STRING_SCAN`] bytes
    /// without meeting a sentinel is an error: a missing terminator is a
    /// reported failure here, not an unbounded read.
    fn builtin_puts(&mut self) -> Result<(), RuntimeError> {
        let address: Address = self.pop("puts")?;
        let mut offset = 0;
        loop {
            if offset >= MAX_STRING_SCAN {
                return Err(RuntimeError::UnterminatedString {
                    address,
                    scanned: offset,
                });
            }
            let cell = address.checked_add(offset).ok_or_else(|| {
                RuntimeError::InvalidAddress {
                    word: "puts".to_string(),
                    message: format!("scan from 0x{:x} overflows the address space", address),
                }
            })?;
            let byte = self
                .memory
                .load(cell)
                .map_err(|message| RuntimeError::InvalidAddress {
                    word: "puts".to_string(),
                    message,
                })?;
            if byte == 0 {
                break;
            }
            self.out.write_all(&[byte]).map_err(Self::map_output_error)?;
            offset += 1;
        }
        self.stack.push(offset + 1);
        Ok(())
    }

    /// `???`: dump the operand stack and memory state to the output.
    fn builtin_dump(&mut self) -> Result<(), RuntimeError> {
        writeln!(self.out, "{:?} {:?}", self.stack, self.memory).map_err(Self::map_output_error)
    }
}

impl MathOp {
    fn word(self) -> &'static str {
        match self {
            MathOp::Add => "+",
            MathOp::Sub => "-",
            MathOp::Mul => "*",
        }
    }
}

impl CmpOp {
    fn word(self) -> &'static str {
        match self {
            CmpOp::Less => "<",
            CmpOp::Greater => ">",
            CmpOp::Equal => "=",
        }
    }
}

impl StackOp {
    fn word(self) -> &'static str {
        match self {
            StackOp::Dup => "dup",
            StackOp::Swap => "swap",
            StackOp::Over => "over",
            StackOp::Rot => "rot",
            StackOp::Drop => "drop",
        }
    }
}
