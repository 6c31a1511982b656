//! The compiled artifact: methods, register count, and the name→slot
//! tables the API binds memory and values against, per `spec.md` §4.6
//! "Bytecode artifact".
//!
//! A [`Bytecode`] is built once, by [`crate::compile`], and is read-only
//! afterward — it may be shared across many [`crate::vm::ExecutionContext`]s
//! at once (`spec.md` §5).

use std::collections::HashMap;

use crate::ast::Type;
use crate::codegen::CodegenOutput;
use crate::parser::ParsedProgram;

/// A slot index into one of the artifact's three name-spaces (stream,
/// uniform, or sampler). Which table it addresses is implied by which
/// lookup produced it — a `Slot` from [`Bytecode::stream_slot`] is only
/// meaningful to [`crate::vm::ExecutionContext::bind_stream`], and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot(pub u32);

impl Slot {
    pub fn index(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamInfo {
    pub name: String,
    pub slot: Slot,
    pub ty: Type,
    pub accumulate: bool,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniformInfo {
    pub name: String,
    pub slot: Slot,
    pub ty: Type,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplerInfo {
    pub name: String,
    pub slot: Slot,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MethodInfo {
    pub name: String,
    pub words: Vec<u32>,
}

/// The immutable compiled artifact `compile()` produces.
///
/// Each of `streams`/`uniforms`/`samplers` is stored in declaration order,
/// and a global's `Slot` is exactly its index into the matching vector —
/// the same invariant the parser's `next_*_slot` counters already enforce,
/// so lookup by slot never needs a secondary index.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bytecode {
    register_count: u32,
    streams: Vec<StreamInfo>,
    stream_names: HashMap<String, u32>,
    uniforms: Vec<UniformInfo>,
    uniform_names: HashMap<String, u32>,
    samplers: Vec<SamplerInfo>,
    sampler_names: HashMap<String, u32>,
    methods: Vec<MethodInfo>,
    method_names: HashMap<String, usize>,
}

impl Bytecode {
    pub(crate) fn from_compiled(parsed: ParsedProgram, generated: CodegenOutput) -> Bytecode {
        let ParsedProgram { program: _, symbols, env, streams, uniforms, samplers } = parsed;

        let mut stream_infos = Vec::with_capacity(streams.len());
        let mut stream_names = HashMap::with_capacity(streams.len());
        for global in &streams {
            let name = symbols.resolve(global.symbol).to_string();
            let accumulate = env.lookup(global.symbol).is_some_and(|(var, _)| var.accumulate);
            stream_names.insert(name.clone(), global.slot);
            stream_infos.push(StreamInfo { name, slot: Slot(global.slot), ty: global.ty, accumulate });
        }

        let mut uniform_infos = Vec::with_capacity(uniforms.len());
        let mut uniform_names = HashMap::with_capacity(uniforms.len());
        for global in &uniforms {
            let name = symbols.resolve(global.symbol).to_string();
            uniform_names.insert(name.clone(), global.slot);
            uniform_infos.push(UniformInfo { name, slot: Slot(global.slot), ty: global.ty });
        }

        let mut sampler_infos = Vec::with_capacity(samplers.len());
        let mut sampler_names = HashMap::with_capacity(samplers.len());
        for global in &samplers {
            let name = symbols.resolve(global.symbol).to_string();
            sampler_names.insert(name.clone(), global.slot);
            sampler_infos.push(SamplerInfo { name, slot: Slot(global.slot) });
        }

        let mut method_names = HashMap::with_capacity(generated.methods.len());
        let methods = generated
            .methods
            .into_iter()
            .enumerate()
            .map(|(index, method)| {
                let name = symbols.resolve(method.name).to_string();
                method_names.insert(name.clone(), index);
                MethodInfo { name, words: method.words }
            })
            .collect();

        Bytecode {
            register_count: generated.register_count,
            streams: stream_infos,
            stream_names,
            uniforms: uniform_infos,
            uniform_names,
            samplers: sampler_infos,
            sampler_names,
            methods,
            method_names,
        }
    }

    pub fn stream_slot(&self, name: &str) -> Option<Slot> {
        self.stream_names.get(name).copied().map(Slot)
    }

    pub fn uniform_slot(&self, name: &str) -> Option<Slot> {
        self.uniform_names.get(name).copied().map(Slot)
    }

    pub fn sampler_slot(&self, name: &str) -> Option<Slot> {
        self.sampler_names.get(name).copied().map(Slot)
    }

    pub fn method_index(&self, name: &str) -> Option<usize> {
        self.method_names.get(name).copied()
    }

    pub fn register_count(&self) -> u32 {
        self.register_count
    }

    pub(crate) fn stream(&self, slot: Slot) -> Option<&StreamInfo> {
        self.streams.get(slot.0 as usize)
    }

    pub(crate) fn uniform(&self, slot: Slot) -> Option<&UniformInfo> {
        self.uniforms.get(slot.0 as usize)
    }

    pub(crate) fn sampler(&self, slot: Slot) -> Option<&SamplerInfo> {
        self.samplers.get(slot.0 as usize)
    }

    pub(crate) fn streams(&self) -> &[StreamInfo] {
        &self.streams
    }

    pub(crate) fn uniform_count(&self) -> usize {
        self.uniforms.len()
    }

    pub(crate) fn sampler_count(&self) -> usize {
        self.samplers.len()
    }

    pub(crate) fn method(&self, index: usize) -> Option<&MethodInfo> {
        self.methods.get(index)
    }
}
