//! Flat byte-addressable memory
//!
//! This module provides the guest program's memory space:
//! - A single growable byte array addressed from 0
//! - A free list of `(address, length)` spans with first-fit allocation
//! - Explicit release via [`Memory::free`], with coalescing of adjacent spans
//!
//! Reserved memory is zero-filled, and freed spans are re-zeroed before
//! returning to the free list. String scanning relies on this: a scan can
//! never run into stale nonzero bytes from a previous allocation.
//!
//! # Error Handling
//!
//! Methods return `Result<_, String>` for errors. While a custom error type
//! would be more idiomatic, this is an internal API and the string errors are
//! converted to `RuntimeError` at the interpreter boundary.

/// An address into the flat memory space.
///
/// Addresses are plain indices; guest code treats them as opaque handles
/// produced by allocation and string literals.
pub type Address = usize;

/// The flat memory space: backing bytes plus a free list.
///
/// The free list is kept sorted by address and fully coalesced, and always
/// accounts for every byte of capacity not currently reserved.
#[derive(Debug, Clone)]
pub struct Memory {
    cells: Vec<u8>,
    free: Vec<(Address, usize)>,
    capacity: usize,
}

impl Memory {
    /// Create a memory space with the given capacity in bytes.
    pub fn new(capacity: usize) -> Self {
        Memory {
            cells: Vec::new(),
            free: vec![(0, capacity)],
            capacity,
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The high-water mark: one past the highest address ever reserved.
    ///
    /// Loads at or beyond this point have never been part of any
    /// allocation and are rejected.
    pub fn high_water(&self) -> usize {
        self.cells.len()
    }

    /// Reserve `len` zeroed bytes and return the starting address.
    pub fn alloc(&mut self, len: usize) -> Result<Address, String> {
        self.take_span(len)
    }

    /// Copy `data` into freshly reserved memory and return the starting
    /// address. Each call is an independent allocation.
    pub fn extend(&mut self, data: &[u8]) -> Result<Address, String> {
        let address = self.take_span(data.len())?;
        self.cells[address..address + data.len()].copy_from_slice(data);
        Ok(address)
    }

    /// Read the byte at `address`.
    pub fn load(&self, address: Address) -> Result<u8, String> {
        self.cells
            .get(address)
            .copied()
            .ok_or_else(|| format!("address 0x{:x} was never reserved", address))
    }

    /// Write the byte at `address`.
    pub fn store(&mut self, address: Address, value: u8) -> Result<(), String> {
        match self.cells.get_mut(address) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(format!("address 0x{:x} was never reserved", address)),
        }
    }

    /// Release `len` bytes starting at `address`.
    ///
    /// The span is re-zeroed and returned to the free list, coalescing
    /// with any adjacent free spans. Releasing memory that is already
    /// free, or was never reserved, is an error.
    pub fn free(&mut self, address: Address, len: usize) -> Result<(), String> {
        if len == 0 {
            return Err("cannot free a zero-length span".to_string());
        }
        let end = address
            .checked_add(len)
            .ok_or_else(|| format!("free of 0x{:x}+{} overflows the address space", address, len))?;
        if end > self.cells.len() {
            return Err(format!(
                "free of 0x{:x}..0x{:x} is beyond reserved memory",
                address, end
            ));
        }
        for &(start, span_len) in &self.free {
            if address < start + span_len && start < end {
                return Err(format!(
                    "double free: 0x{:x}..0x{:x} overlaps free span at 0x{:x}",
                    address, end, start
                ));
            }
        }

        for cell in &mut self.cells[address..end] {
            *cell = 0;
        }
        self.free.push((address, len));
        self.coalesce();
        Ok(())
    }

    /// Find the first free span of at least `len` bytes, carve `len` bytes
    /// off its front, and grow the backing array to cover them.
    fn take_span(&mut self, len: usize) -> Result<Address, String> {
        let index = self
            .free
            .iter()
            .position(|&(_, span_len)| span_len >= len)
            .ok_or_else(|| {
                format!(
                    "out of memory: requested {} bytes, capacity is {}",
                    len, self.capacity
                )
            })?;
        let (address, remaining) = self.free.get_mut(index).expect("span index just found");
        let start = *address;
        *address += len;
        *remaining -= len;
        if *remaining == 0 {
            self.free.remove(index);
        }
        self.cells.resize(self.cells.len().max(start + len), 0);
        Ok(start)
    }

    /// Sort the free list and merge spans that touch.
    fn coalesce(&mut self) {
        self.free.sort_unstable();
        let mut merged: Vec<(Address, usize)> = Vec::with_capacity(self.free.len());
        for &(address, len) in &self.free {
            match merged.last_mut() {
                Some((last_address, last_len)) if *last_address + *last_len == address => {
                    *last_len += len;
                }
                _ => merged.push((address, len)),
            }
        }
        self.free = merged;
    }
}
