// Licensed under the Apache-2.0 license

use ftpm_helper_error::{HelperError, HelperResult};

/// Number of parameter slots passed with every command.
pub const NUM_PARAMS: usize = 4;

/// GlobalPlatform parameter type of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    None,
    ValueInput,
    ValueOutput,
    ValueInout,
    MemrefInput,
    MemrefOutput,
    MemrefInout,
}

impl ParamType {
    /// Encoding used in the packed `param_types` word.
    pub fn raw(self) -> u32 {
        match self {
            ParamType::None => 0,
            ParamType::ValueInput => 1,
            ParamType::ValueOutput => 2,
            ParamType::ValueInout => 3,
            ParamType::MemrefInput => 5,
            ParamType::MemrefOutput => 6,
            ParamType::MemrefInout => 7,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Value {
    pub a: u32,
    pub b: u32,
}

/// A caller supplied output buffer.
///
/// `size` starts as the usable capacity and is updated to the number of bytes
/// written on success.
#[derive(Debug)]
pub struct Memref<'a> {
    pub buffer: &'a mut [u8],
    pub size: usize,
}

impl<'a> Memref<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        let size = buffer.len();
        Self { buffer, size }
    }

    fn capacity(&self) -> usize {
        self.size.min(self.buffer.len())
    }

    /// Bytes currently described by the memref.
    pub fn data(&self) -> &[u8] {
        &self.buffer[..self.capacity()]
    }

    /// Copy `data` into the buffer.
    ///
    /// Nothing is written, including `size`, when the buffer is too small.
    pub fn write(&mut self, data: &[u8]) -> HelperResult<()> {
        if data.len() > self.capacity() {
            return Err(HelperError::BUFFER_TOO_SMALL);
        }
        self.buffer[..data.len()].copy_from_slice(data);
        self.size = data.len();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub enum Param<'a> {
    #[default]
    None,
    ValueInput(Value),
    ValueOutput(Value),
    ValueInout(Value),
    MemrefInput(&'a [u8]),
    MemrefOutput(Memref<'a>),
    MemrefInout(Memref<'a>),
}

impl Param<'_> {
    pub fn param_type(&self) -> ParamType {
        match self {
            Param::None => ParamType::None,
            Param::ValueInput(_) => ParamType::ValueInput,
            Param::ValueOutput(_) => ParamType::ValueOutput,
            Param::ValueInout(_) => ParamType::ValueInout,
            Param::MemrefInput(_) => ParamType::MemrefInput,
            Param::MemrefOutput(_) => ParamType::MemrefOutput,
            Param::MemrefInout(_) => ParamType::MemrefInout,
        }
    }
}

/// The four parameter slots of one invocation.
#[derive(Debug, Default)]
pub struct HelperParams<'a> {
    params: [Param<'a>; NUM_PARAMS],
}

impl<'a> HelperParams<'a> {
    pub fn new(params: [Param<'a>; NUM_PARAMS]) -> Self {
        Self { params }
    }

    pub fn types(&self) -> [ParamType; NUM_PARAMS] {
        [
            self.params[0].param_type(),
            self.params[1].param_type(),
            self.params[2].param_type(),
            self.params[3].param_type(),
        ]
    }

    /// Packed representation, one nibble per slot.
    pub fn param_types(&self) -> u32 {
        self.types()
            .iter()
            .enumerate()
            .fold(0, |acc, (i, t)| acc | (t.raw() << (i * 4)))
    }

    pub fn expect_types(&self, expected: [ParamType; NUM_PARAMS]) -> HelperResult<()> {
        if self.types() != expected {
            return Err(HelperError::INVALID_PARAMETERS);
        }
        Ok(())
    }

    fn slot(&self, idx: usize) -> HelperResult<&Param<'a>> {
        self.params.get(idx).ok_or(HelperError::INVALID_PARAMETERS)
    }

    fn slot_mut(&mut self, idx: usize) -> HelperResult<&mut Param<'a>> {
        self.params
            .get_mut(idx)
            .ok_or(HelperError::INVALID_PARAMETERS)
    }

    pub fn value(&self, idx: usize) -> HelperResult<Value> {
        match self.slot(idx)? {
            Param::ValueInput(v) | Param::ValueOutput(v) | Param::ValueInout(v) => Ok(*v),
            _ => Err(HelperError::INVALID_PARAMETERS),
        }
    }

    pub fn value_out(&mut self, idx: usize) -> HelperResult<&mut Value> {
        match self.slot_mut(idx)? {
            Param::ValueOutput(v) | Param::ValueInout(v) => Ok(v),
            _ => Err(HelperError::INVALID_PARAMETERS),
        }
    }

    pub fn memref_in(&self, idx: usize) -> HelperResult<&[u8]> {
        match self.slot(idx)? {
            Param::MemrefInput(data) => Ok(*data),
            Param::MemrefInout(m) => Ok(m.data()),
            _ => Err(HelperError::INVALID_PARAMETERS),
        }
    }

    pub fn memref_out(&mut self, idx: usize) -> HelperResult<&mut Memref<'a>> {
        match self.slot_mut(idx)? {
            Param::MemrefOutput(m) | Param::MemrefInout(m) => Ok(m),
            _ => Err(HelperError::INVALID_PARAMETERS),
        }
    }

    /// Size reported back for an output memref, if the slot is one.
    pub fn output_size(&self, idx: usize) -> Option<usize> {
        match self.params.get(idx)? {
            Param::MemrefOutput(m) | Param::MemrefInout(m) => Some(m.size),
            _ => None,
        }
    }
}
