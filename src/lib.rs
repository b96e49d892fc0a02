//! Trilinear resampling of dense 3D volumes
//!
//! This crate resamples a regular grid of `f32` samples from one resolution
//! to another. Output voxel `(x, y, z)` reads the input at
//! `(x, y, z) * input_extent / output_extent`, blending the 8 surrounding
//! samples along X, then Y, then Z.
//!
//! # Features
//!
//! - **Serial engine**: [`resample`], the single-threaded reference
//! - **Plane-parallel engine**: [`resample_parallel`], one task per output
//!   Z-plane, bit-identical to the serial engine
//! - **ndarray integration**: [`resample_3d_f32`] works on `(z, y, x)` arrays
//! - **Raw volumes**: headerless little-endian f32 files in [`io`]
//!
//! # Example
//!
//! ```rust
//! use volresample::{resample_parallel, VolumeDims};
//!
//! let input_dims = VolumeDims::cube(8);
//! let output_dims = VolumeDims::cube(16);
//! let input = vec![1.0f32; input_dims.len()];
//! let mut output = vec![0.0f32; output_dims.len()];
//!
//! resample_parallel(&input, input_dims, &mut output, output_dims).unwrap();
//! assert!(output.iter().all(|&v| v == 1.0));
//! ```

pub mod analytic;
pub mod dims;
pub mod error;
pub mod io;
pub mod plane;
pub mod scalar;
pub mod serial;

use ndarray::{Array3, ArrayView3, ArrayViewMut3};

pub use dims::VolumeDims;
pub use error::{ResampleError, Result, Role};
pub use plane::{resample_parallel, resample_parallel_with, PlaneConfig};
pub use serial::resample;

/// Resample a `(z, y, x)` array to `shape` with the plane-parallel engine.
///
/// # Errors
///
/// Fails if either shape has an extent ≤ 1 or `input` is not in standard
/// layout.
pub fn resample_3d_f32(
    input: &ArrayView3<f32>,
    shape: (usize, usize, usize),
) -> Result<Array3<f32>> {
    let mut output = Array3::<f32>::zeros(shape);
    resample_3d_f32_into(input, &mut output.view_mut())?;
    Ok(output)
}

/// Resample a `(z, y, x)` array into a preallocated output array.
pub fn resample_3d_f32_into(
    input: &ArrayView3<f32>,
    output: &mut ArrayViewMut3<f32>,
) -> Result<()> {
    let input_dims = VolumeDims::from_shape(input.dim());
    let output_dims = VolumeDims::from_shape(output.dim());

    let input_slice = input
        .as_slice()
        .ok_or(ResampleError::NonContiguous { role: Role::Input })?;
    let output_slice = output
        .as_slice_mut()
        .ok_or(ResampleError::NonContiguous { role: Role::Output })?;

    resample_parallel(input_slice, input_dims, output_slice, output_dims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{s, Array3};

    #[test]
    fn test_identity_array() {
        let input = Array3::from_shape_fn((6, 5, 4), |(z, y, x)| (z * 100 + y * 10 + x) as f32);
        let output = resample_3d_f32(&input.view(), (6, 5, 4)).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_upsample_linear_ramp() {
        // A ramp along x survives interpolation exactly away from the clamped edge.
        let input = Array3::from_shape_fn((4, 4, 8), |(_, _, x)| x as f32);
        let output = resample_3d_f32(&input.view(), (4, 4, 16)).unwrap();
        for x in 0..15 {
            assert_relative_eq!(output[[1, 2, x]], x as f32 * 0.5, epsilon = 1e-6);
        }
        // Past the last input sample the edge value is held.
        assert_eq!(output[[1, 2, 15]], 7.0);
    }

    #[test]
    fn test_into_matches_slice_api() {
        let input = Array3::from_shape_fn((7, 7, 7), |(z, y, x)| ((z * 31 + y * 7 + x) % 13) as f32);
        let mut output = Array3::<f32>::zeros((17, 17, 17));
        resample_3d_f32_into(&input.view(), &mut output.view_mut()).unwrap();

        let mut expected = vec![0.0f32; 17 * 17 * 17];
        resample(
            input.as_slice().unwrap(),
            VolumeDims::cube(7),
            &mut expected,
            VolumeDims::cube(17),
        )
        .unwrap();
        assert_eq!(output.as_slice().unwrap(), &expected[..]);
    }

    #[test]
    fn test_non_contiguous_input_rejected() {
        let input = Array3::<f32>::zeros((8, 8, 8));
        let strided = input.slice(s![.., .., ..;2]);
        let err = resample_3d_f32(&strided, (4, 4, 4)).unwrap_err();
        assert!(matches!(err, ResampleError::NonContiguous { role: Role::Input }));
    }

    #[test]
    fn test_degenerate_shape_rejected() {
        let input = Array3::<f32>::zeros((4, 4, 4));
        let err = resample_3d_f32(&input.view(), (1, 4, 4)).unwrap_err();
        assert!(matches!(
            err,
            ResampleError::InvalidDimensions { role: Role::Output, .. }
        ));
    }
}
