//! Single-threaded reference resampler

use crate::dims::{check_resample, VolumeDims};
use crate::error::Result;
use crate::scalar::{axis_table, interpolate, ratio};

/// Resample `input` into `output` with trilinear interpolation.
///
/// Walks the output volume Z-outer, Y-middle, X-inner and writes every
/// voxel in place. Only the first `output_dims.len()` samples of `output`
/// are written.
///
/// # Errors
///
/// [`ResampleError::InvalidDimensions`](crate::ResampleError::InvalidDimensions)
/// if any extent is ≤ 1 and
/// [`ResampleError::BufferTooSmall`](crate::ResampleError::BufferTooSmall)
/// if either buffer is shorter than its extents require. Nothing is written
/// in either case.
pub fn resample(
    input: &[f32],
    input_dims: VolumeDims,
    output: &mut [f32],
    output_dims: VolumeDims,
) -> Result<()> {
    check_resample(input.len(), input_dims, output.len(), output_dims)?;

    let r = ratio(input_dims, output_dims);
    tracing::debug!(
        input = %input_dims,
        output = %output_dims,
        ratio = ?r,
        "serial resample"
    );

    let xs = axis_table(output_dims.x, r[0], input_dims.x);
    let ys = axis_table(output_dims.y, r[1], input_dims.y);
    let zs = axis_table(output_dims.z, r[2], input_dims.z);

    let plane_len = output_dims.plane_len();
    let row_len = output_dims.x;
    for (oz, plane) in output[..output_dims.len()]
        .chunks_exact_mut(plane_len)
        .enumerate()
    {
        let z = zs[oz];
        for (oy, row) in plane.chunks_exact_mut(row_len).enumerate() {
            let y = ys[oy];
            for (value, &x) in row.iter_mut().zip(xs.iter()) {
                *value = interpolate(input, input_dims, x, y, z);
            }
        }
    }
    Ok(())
}
