//! The register-based bytecode virtual machine, per `spec.md` §4.7
//! "Virtual machine" and §4.7 "Batch windowing".
//!
//! [`ExecutionContext`] owns one run's register pointers, uniform storage,
//! sampler table, and scratch-derived temporary registers; [`context`]
//! binds memory and drives the outer batch-window loop, [`dispatch`]
//! decodes one instruction at a time and applies its kernel, and
//! [`kernels`] holds the per-operator element math the dispatcher calls
//! into.

mod context;
mod dispatch;
mod kernels;

pub use context::{ExecutionContext, UniformValue};
