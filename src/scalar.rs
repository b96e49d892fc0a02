//! Scalar building blocks shared by both resamplers
//!
//! Coordinate mapping, the 8-corner stencil gather and the lerp kernel. The
//! serial and plane-parallel engines both go through [`interpolate`], so
//! their floating-point operation order is the same and so are their results.

use crate::dims::VolumeDims;
use crate::error::contract_violation;

/// The 8 samples around a fractional position.
///
/// Order: (x0,y0,z0) (x1,y0,z0) (x0,y1,z0) (x1,y1,z0), then the same four
/// with z1. [`trilinear`] depends on this arrangement.
pub type Stencil = [f32; 8];

/// Where one output index lands along one input axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSample {
    pub lower: usize,
    /// `lower + 1`, clamped to the last valid input index
    pub upper: usize,
    /// Fractional weight of `upper`, in [0, 1)
    pub t: f32,
}

/// Per-axis `input / output` scale factors as `[x, y, z]`.
#[inline]
pub fn ratio(input: VolumeDims, output: VolumeDims) -> [f32; 3] {
    [
        input.x as f32 / output.x as f32,
        input.y as f32 / output.y as f32,
        input.z as f32 / output.z as f32,
    ]
}

/// Map an output index to its position along an input axis.
///
/// A `lower` index at or past `input_extent` is a contract violation: on
/// X or Y it would alias into the next row instead of failing the gather.
#[inline]
pub fn map_axis(index: usize, ratio: f32, input_extent: usize) -> AxisSample {
    let mid = index as f32 * ratio;
    let floor = mid.floor();
    let lower = floor as usize;
    if lower >= input_extent {
        contract_violation(format_args!(
            "output index {index} maps to input {lower}, axis has {input_extent} samples"
        ));
    }
    // Clamp +1 index to handle boundary
    let upper = (lower + 1).min(input_extent - 1);
    AxisSample {
        lower,
        upper,
        t: mid - floor,
    }
}

/// Precompute [`map_axis`] for every index of one output axis.
pub fn axis_table(output_extent: usize, ratio: f32, input_extent: usize) -> Vec<AxisSample> {
    (0..output_extent)
        .map(|i| map_axis(i, ratio, input_extent))
        .collect()
}

/// Corner coordinates `[x, y, z]` of the cell spanned by `lower` and `upper`.
#[inline]
pub fn cell_corners(lower: [usize; 3], upper: [usize; 3]) -> [[usize; 3]; 8] {
    let [x0, y0, z0] = lower;
    let [x1, y1, z1] = upper;
    [
        [x0, y0, z0],
        [x1, y0, z0],
        [x0, y1, z0],
        [x1, y1, z0],
        [x0, y0, z1],
        [x1, y0, z1],
        [x0, y1, z1],
        [x1, y1, z1],
    ]
}

/// Copy the 8 corner samples out of `data`.
///
/// `dims` supplies the X/Y strides; `data` may be a whole volume or a
/// window of consecutive planes. Any index past the end of `data` is a
/// contract violation and panics.
#[inline]
pub fn gather(data: &[f32], dims: VolumeDims, corners: &[[usize; 3]; 8]) -> Stencil {
    let mut stencil = [0.0f32; 8];
    for (value, &[x, y, z]) in stencil.iter_mut().zip(corners.iter()) {
        let linear = dims.linear(x, y, z);
        if linear >= data.len() {
            contract_violation(format_args!(
                "stencil index {linear} in {}-sample buffer (voxel {{{x},{y},{z}}} in {dims})",
                data.len()
            ));
        }
        *value = data[linear];
    }
    stencil
}

/// Linear interpolation, kept in the `(1 - t) * a + t * b` form.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + t * b
}

/// Blend a stencil along X, then Y, then Z.
#[inline]
pub fn trilinear(v: &Stencil, t: [f32; 3]) -> f32 {
    let [tx, ty, tz] = t;
    // front plane
    let low_x = lerp(v[0], v[1], tx);
    let high_x = lerp(v[2], v[3], tx);
    // back plane
    let back_low_x = lerp(v[4], v[5], tx);
    let back_high_x = lerp(v[6], v[7], tx);

    let front = lerp(low_x, high_x, ty);
    let back = lerp(back_low_x, back_high_x, ty);
    lerp(front, back, tz)
}

/// Interpolate one output voxel from `data`.
#[inline]
pub fn interpolate(
    data: &[f32],
    dims: VolumeDims,
    x: AxisSample,
    y: AxisSample,
    z: AxisSample,
) -> f32 {
    let corners = cell_corners([x.lower, y.lower, z.lower], [x.upper, y.upper, z.upper]);
    let stencil = gather(data, dims, &corners);
    trilinear(&stencil, [x.t, y.t, z.t])
}
