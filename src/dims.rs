//! Volume extents and the shared precondition checks
//!
//! Volumes are flat row-major buffers addressed as
//! `linear = z * (y_extent * x_extent) + y * x_extent + x`.

use std::fmt;

use crate::error::{ResampleError, Result, Role};

/// Extents of a dense 3D volume along X, Y and Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VolumeDims {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl VolumeDims {
    #[inline]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Same extent on every axis
    #[inline]
    pub const fn cube(n: usize) -> Self {
        Self { x: n, y: n, z: n }
    }

    /// Build from an ndarray shape, which is ordered (z, y, x).
    #[inline]
    pub const fn from_shape(shape: (usize, usize, usize)) -> Self {
        Self {
            x: shape.2,
            y: shape.1,
            z: shape.0,
        }
    }

    /// The ndarray shape (z, y, x) of a volume with these extents.
    #[inline]
    pub const fn shape(&self) -> (usize, usize, usize) {
        (self.z, self.y, self.x)
    }

    /// Number of samples in one Z-plane.
    #[inline]
    pub const fn plane_len(&self) -> usize {
        self.x * self.y
    }

    /// Number of samples in the whole volume.
    ///
    /// Assumes the product fits in `usize`; see [`checked_len`](Self::checked_len)
    /// for extents that have not been through [`check_buffer`](Self::check_buffer).
    #[inline]
    pub const fn len(&self) -> usize {
        self.x * self.y * self.z
    }

    /// [`len`](Self::len), or `None` if the product overflows.
    #[inline]
    pub fn checked_len(&self) -> Option<usize> {
        self.x.checked_mul(self.y)?.checked_mul(self.z)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x == 0 || self.y == 0 || self.z == 0
    }

    #[inline]
    pub const fn linear(&self, x: usize, y: usize, z: usize) -> usize {
        z * self.y * self.x + y * self.x + x
    }

    /// Reject extents for which trilinear interpolation is ill-defined.
    pub fn validate(&self, role: Role) -> Result<()> {
        if self.x <= 1 || self.y <= 1 || self.z <= 1 {
            return Err(ResampleError::InvalidDimensions { role, dims: *self });
        }
        Ok(())
    }

    /// Check that a buffer of `len` samples holds the whole volume.
    ///
    /// Once this passes, [`len`](Self::len) and every [`linear`](Self::linear)
    /// index inside the volume fit in `usize`.
    pub fn check_buffer(&self, role: Role, len: usize) -> Result<()> {
        let required = self
            .checked_len()
            .ok_or(ResampleError::VolumeTooLarge { role, dims: *self })?;
        if len < required {
            return Err(ResampleError::BufferTooSmall {
                role,
                len,
                required,
            });
        }
        Ok(())
    }
}

impl fmt::Display for VolumeDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{},{}}}", self.x, self.y, self.z)
    }
}

impl From<[usize; 3]> for VolumeDims {
    fn from(d: [usize; 3]) -> Self {
        Self::new(d[0], d[1], d[2])
    }
}

/// Every precondition shared by the serial and plane-parallel resamplers.
///
/// Runs before any sample is computed, so a rejected call leaves `output`
/// untouched.
pub fn check_resample(
    input_len: usize,
    input_dims: VolumeDims,
    output_len: usize,
    output_dims: VolumeDims,
) -> Result<()> {
    input_dims.validate(Role::Input)?;
    output_dims.validate(Role::Output)?;
    input_dims.check_buffer(Role::Input, input_len)?;
    output_dims.check_buffer(Role::Output, output_len)?;
    Ok(())
}
