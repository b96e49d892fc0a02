//! Synthetic volumes defined by a scalar function of voxel coordinates
//!
//! Used to build known-answer inputs and the CLI's sphere volume.

use crate::dims::VolumeDims;
use crate::error::{Result, Role};
use crate::scalar::lerp;

/// Evaluate `value(x, y, z)` at every grid point of `dims` into `data`.
pub fn fill<F>(data: &mut [f32], dims: VolumeDims, value: F) -> Result<()>
where
    F: Fn(usize, usize, usize) -> f32,
{
    dims.check_buffer(Role::Output, data.len())?;
    evaluate(data, dims, value);
    Ok(())
}

/// Allocate a volume of `dims` and [`fill`] it.
pub fn generate<F>(dims: VolumeDims, value: F) -> Vec<f32>
where
    F: Fn(usize, usize, usize) -> f32,
{
    let mut data = vec![0.0f32; dims.len()];
    evaluate(&mut data, dims, value);
    data
}

fn evaluate<F>(data: &mut [f32], dims: VolumeDims, value: F)
where
    F: Fn(usize, usize, usize) -> f32,
{
    for z in 0..dims.z {
        for y in 0..dims.y {
            for x in 0..dims.x {
                data[dims.linear(x, y, z)] = value(x, y, z);
            }
        }
    }
}

#[inline]
pub fn x_ramp(x: usize, _y: usize, _z: usize) -> f32 {
    x as f32
}

#[inline]
pub fn y_ramp(_x: usize, y: usize, _z: usize) -> f32 {
    y as f32
}

#[inline]
pub fn z_ramp(_x: usize, _y: usize, z: usize) -> f32 {
    z as f32
}

/// A ball whose value ramps from 0 at the center to `peak` at the rim and
/// is 0 everywhere outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center in voxel coordinates, `[x, y, z]`
    pub center: [f32; 3],
    pub radius: f32,
    pub peak: f32,
}

impl Sphere {
    pub const DEFAULT_PEAK: f32 = 10.0;

    pub fn new(center: [f32; 3], radius: f32, peak: f32) -> Self {
        Self {
            center,
            radius,
            peak,
        }
    }

    /// Centered in `dims` with a radius of one eighth of the smallest extent.
    pub fn centered(dims: VolumeDims) -> Self {
        let smallest = dims.x.min(dims.y).min(dims.z);
        Self {
            center: [
                dims.x as f32 / 2.0,
                dims.y as f32 / 2.0,
                dims.z as f32 / 2.0,
            ],
            radius: smallest as f32 / 8.0,
            peak: Self::DEFAULT_PEAK,
        }
    }

    /// Euclidean distance from the center, in voxels.
    #[inline]
    pub fn distance(&self, x: f32, y: f32, z: f32) -> f32 {
        let dx = x - self.center[0];
        let dy = y - self.center[1];
        let dz = z - self.center[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    #[inline]
    pub fn value(&self, x: usize, y: usize, z: usize) -> f32 {
        let d = self.distance(x as f32, y as f32, z as f32);
        if d < self.radius {
            lerp(0.0, self.peak, d / self.radius)
        } else {
            0.0
        }
    }

    pub fn generate(&self, dims: VolumeDims) -> Vec<f32> {
        generate(dims, |x, y, z| self.value(x, y, z))
    }
}
