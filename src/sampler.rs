//! The external sampler callback interface, per `spec.md` §4.8 "Sampler
//! interface".
//!
//! A sampler is a host-provided lookup table invoked synchronously from
//! inside [`crate::vm::ExecutionContext::execute`] — the VM drives the
//! per-element loop and the sampler fills in one batch of results per
//! call, the same callback shape [`crate::visitor::BitStreamVisitor`] uses
//! for bitstream records.

use crate::error::Error;

/// Host-provided lookup table invoked by `sample1D`/`sample2D`/`sample3D`.
///
/// Implementors own any backing texture data; the VM never inspects it,
/// only calls through this trait. A sampler must not re-enter the VM
/// (`spec.md` §5 "Suspension points") and must outlive any execution
/// context it is bound to via
/// [`ExecutionContext::set_sampler`](crate::vm::ExecutionContext::set_sampler).
pub trait Sampler {
    /// Looks up one batch of 1-D coordinates, writing one `vec4` per
    /// element into `dst`. `coords` and `dst` always have the same length.
    fn sample1d(&mut self, coords: &[f32], dst: &mut [[f32; 4]]) -> Result<(), Error>;
    /// Looks up one batch of 2-D coordinates.
    fn sample2d(&mut self, coords: &[[f32; 2]], dst: &mut [[f32; 4]]) -> Result<(), Error>;
    /// Looks up one batch of 3-D coordinates.
    fn sample3d(&mut self, coords: &[[f32; 3]], dst: &mut [[f32; 4]]) -> Result<(), Error>;
}

/// A sampler that always returns the same color, regardless of coordinate.
/// Useful for tests and as a minimal example implementation.
pub struct ConstantSampler(pub [f32; 4]);

impl Sampler for ConstantSampler {
    fn sample1d(&mut self, coords: &[f32], dst: &mut [[f32; 4]]) -> Result<(), Error> {
        dst[..coords.len()].fill(self.0);
        Ok(())
    }

    fn sample2d(&mut self, coords: &[[f32; 2]], dst: &mut [[f32; 4]]) -> Result<(), Error> {
        dst[..coords.len()].fill(self.0);
        Ok(())
    }

    fn sample3d(&mut self, coords: &[[f32; 3]], dst: &mut [[f32; 4]]) -> Result<(), Error> {
        dst[..coords.len()].fill(self.0);
        Ok(())
    }
}

/// A sampler that always fails, for exercising the `SamplingFailed` path.
pub struct FailingSampler;

impl Sampler for FailingSampler {
    fn sample1d(&mut self, _coords: &[f32], _dst: &mut [[f32; 4]]) -> Result<(), Error> {
        Err(Error::SamplingFailed)
    }

    fn sample2d(&mut self, _coords: &[[f32; 2]], _dst: &mut [[f32; 4]]) -> Result<(), Error> {
        Err(Error::SamplingFailed)
    }

    fn sample3d(&mut self, _coords: &[[f32; 3]], _dst: &mut [[f32; 4]]) -> Result<(), Error> {
        Err(Error::SamplingFailed)
    }
}
