//! Binds caller memory to a compiled [`Bytecode`] and runs methods over
//! batch windows, per `spec.md` §4.7 "Batch windowing" and §6.3 "API
//! contract".

use crate::ast::Type;
use crate::bytecode::{Bytecode, Slot};
use crate::error::Error;
use crate::instruction::Instruction;
use crate::opcode::{self, OpKind};
use crate::sampler::Sampler;
use crate::vm::dispatch;

/// A value bound to a `uniform` slot. The variant must match the uniform's
/// declared type or [`ExecutionContext::set_uniform`] returns
/// `InvalidParameter`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Scalar(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

impl UniformValue {
    fn component_count(self) -> u8 {
        match self {
            UniformValue::Scalar(_) => 1,
            UniformValue::Vec2(_) => 2,
            UniformValue::Vec3(_) => 3,
            UniformValue::Vec4(_) => 4,
        }
    }

    fn to_padded(self) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        match self {
            UniformValue::Scalar(v) => out[0] = v,
            UniformValue::Vec2(v) => out[..2].copy_from_slice(&v),
            UniformValue::Vec3(v) => out[..3].copy_from_slice(&v),
            UniformValue::Vec4(v) => out = v,
        }
        out
    }
}

/// One register's resolved location and addressing mode, returned by
/// [`ExecutionContext::register_location`]. `elem_stride` is in `f32`
/// units (1 for a scalar I/O stream, 4 for every vector I/O stream and
/// every temporary, regardless of its declared type — `spec.md` §4.7's
/// "uniform 16-byte stride" for temporaries, §6.3's type-dependent stride
/// for streams). `accumulate` marks an `out accumulate` stream, whose
/// backing buffer holds exactly one element regardless of the batch's
/// element count — every read and write against it must address that
/// single cell, never `o + e`.
#[derive(Debug, Clone, Copy)]
pub(super) struct RegisterLocation {
    pub ptr: *mut f32,
    pub elem_stride: usize,
    pub is_io: bool,
    pub accumulate: bool,
}

/// Holds one run's bindings: register pointers, uniform values, sampler
/// callbacks, and the scratch slice carved into temporary registers plus
/// the per-batch flag buffer.
pub struct ExecutionContext<'a> {
    artifact: &'a Bytecode,
    dispatch_table: Vec<Option<OpKind>>,
    streams: Vec<Option<*mut f32>>,
    stream_elem_stride: Vec<usize>,
    stream_accumulate: Vec<bool>,
    uniforms: Vec<Option<[f32; 4]>>,
    samplers: Vec<Option<Box<dyn Sampler>>>,
    scratch: &'a mut [u8],
    n_io: u32,
    n_temps: u32,
    register_count: u32,
    batch_limit: usize,
    temp_stride_bytes: usize,
}

impl<'a> ExecutionContext<'a> {
    /// Builds a context bound to `artifact`, carving `scratch` into
    /// temporary-register storage plus the flag buffer per the batch
    /// windowing formula in `spec.md` §4.7. Fails with
    /// `Error::InsufficientMemory` if `scratch` cannot fit even one
    /// element's worth of temporaries and flag byte.
    pub fn new(artifact: &'a Bytecode, scratch: &'a mut [u8]) -> Result<Self, Error> {
        let n_io = artifact.streams().len() as u32;
        let register_count = artifact.register_count();
        let n_temps = register_count - n_io;

        let batch_limit = scratch.len() / (16 * n_temps as usize + 1);
        if batch_limit == 0 {
            return Err(Error::InsufficientMemory);
        }

        let stream_elem_stride = artifact
            .streams()
            .iter()
            .map(|s| if s.ty == Type::Scalar { 1 } else { 4 })
            .collect();
        let stream_accumulate = artifact.streams().iter().map(|s| s.accumulate).collect();
        let dispatch_table = (0..opcode::OPCODE_COUNT).map(opcode::decode).collect();
        let samplers = (0..artifact.sampler_count()).map(|_| None).collect();

        Ok(Self {
            artifact,
            dispatch_table,
            streams: vec![None; n_io as usize],
            stream_elem_stride,
            stream_accumulate,
            uniforms: vec![None; artifact.uniform_count()],
            samplers,
            scratch,
            n_io,
            n_temps,
            register_count,
            batch_limit,
            temp_stride_bytes: batch_limit * 16,
        })
    }

    /// Binds a stream's element-major backing array. `pointer` must stay
    /// valid for the lifetime of every subsequent `execute` call.
    pub fn bind_stream(&mut self, slot: Slot, pointer: *mut u8) -> Result<(), Error> {
        self.artifact.stream(slot).ok_or(Error::InvalidIndex)?;
        if pointer.is_null() {
            return Err(Error::InvalidParameter("stream pointer must not be null"));
        }
        self.streams[slot.index() as usize] = Some(pointer as *mut f32);
        Ok(())
    }

    /// Sets a uniform's value. `value`'s variant must match the uniform's
    /// declared type.
    pub fn set_uniform(&mut self, slot: Slot, value: UniformValue) -> Result<(), Error> {
        let info = self.artifact.uniform(slot).ok_or(Error::InvalidIndex)?;
        if value.component_count() != info.ty.component_count() {
            return Err(Error::InvalidParameter("uniform value type does not match declaration"));
        }
        self.uniforms[slot.index() as usize] = Some(value.to_padded());
        Ok(())
    }

    /// Binds a sampler callback to a `sampler` slot.
    pub fn set_sampler(&mut self, slot: Slot, sampler: Box<dyn Sampler>) -> Result<(), Error> {
        self.artifact.sampler(slot).ok_or(Error::InvalidIndex)?;
        self.samplers[slot.index() as usize] = Some(sampler);
        Ok(())
    }

    /// Runs `methodIndex` over elements `[0, elementCount)`, in windows of
    /// at most `batchLimit` elements each.
    pub fn execute(&mut self, method_index: usize, element_count: usize) -> Result<(), Error> {
        let artifact = self.artifact;
        let method = artifact.method(method_index).ok_or(Error::InvalidIndex)?;
        let words = &method.words;

        let mut offset = 0usize;
        while offset < element_count {
            let batch = (element_count - offset).min(self.batch_limit);
            self.execute_window(words, offset, batch)?;
            offset += batch;
        }
        Ok(())
    }

    fn execute_window(&mut self, words: &[u32], o: usize, b: usize) -> Result<(), Error> {
        let mut pc = 0usize;
        while pc < words.len() {
            let instr = Instruction::unpack(words[pc]);
            let kind = self
                .dispatch_table
                .get(instr.opcode as usize)
                .copied()
                .flatten()
                .ok_or(Error::InvalidBytecode)?;
            pc += 1;
            pc = dispatch::execute_instruction(self, kind, instr, words, pc, o, b)?;
        }
        Ok(())
    }

    // --- accessors used by `dispatch` -------------------------------------

    pub(super) fn register_location(&self, index: u32) -> Result<RegisterLocation, Error> {
        if index >= self.register_count {
            return Err(Error::InvalidRegister);
        }
        if index < self.n_io {
            let ptr = self.streams[index as usize].ok_or(Error::UnassignedRegisterPointer)?;
            let accumulate = self.stream_accumulate[index as usize];
            Ok(RegisterLocation { ptr, elem_stride: self.stream_elem_stride[index as usize], is_io: true, accumulate })
        } else {
            let temp_index = (index - self.n_io) as usize;
            let start = temp_index * self.temp_stride_bytes;
            // SAFETY: `start` is within `scratch` by construction of
            // `temp_stride_bytes` and `n_temps` in `new`; the pointer is
            // only ever dereferenced through `Side`, which respects the
            // per-window element bound `b <= batch_limit`.
            let ptr = unsafe { self.scratch.as_ptr().add(start) as *mut f32 };
            Ok(RegisterLocation { ptr, elem_stride: 4, is_io: false, accumulate: false })
        }
    }

    pub(super) fn uniform_value(&self, index: u32) -> Result<[f32; 4], Error> {
        self.uniforms.get(index as usize).copied().flatten().ok_or(Error::UnassignedRegisterPointer)
    }

    pub(super) fn sampler_count(&self) -> usize {
        self.samplers.len()
    }

    pub(super) fn sampler_mut(&mut self, index: u32) -> Result<&mut dyn Sampler, Error> {
        self.samplers
            .get_mut(index as usize)
            .and_then(|s| s.as_deref_mut())
            .ok_or(Error::UnassignedRegisterPointer)
    }

    pub(super) fn flags_ptr(&self) -> *mut u8 {
        let start = self.n_temps as usize * self.temp_stride_bytes;
        // SAFETY: the flag buffer's `batch_limit` bytes immediately follow
        // the last temp register's storage, per the layout `new` computed.
        unsafe { self.scratch.as_ptr().add(start) as *mut u8 }
    }
}
