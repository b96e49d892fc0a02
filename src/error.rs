//! Error types for resampling and raw volume I/O.
//!
//! Recoverable failures (bad dimensions, undersized buffers, I/O) are
//! reported through [`ResampleError`]. Inconsistent internal bookkeeping is
//! not recoverable and goes through [`contract_violation`] instead.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::dims::VolumeDims;

/// Which side of a resample a buffer or dimension triple belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Input,
    Output,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Input => f.write_str("input"),
            Role::Output => f.write_str("output"),
        }
    }
}

/// Main error type for resampling operations.
#[derive(Error, Debug)]
pub enum ResampleError {
    /// Some extent is 0 or 1, so interpolation along that axis is ill-defined.
    #[error("ill-defined {role} dimensions {dims}: every extent must be greater than 1")]
    InvalidDimensions { role: Role, dims: VolumeDims },

    /// The product of the extents does not fit in `usize`.
    #[error("{role} dimensions {dims} hold more samples than can be addressed")]
    VolumeTooLarge { role: Role, dims: VolumeDims },

    /// A buffer is shorter than the product of its declared extents.
    #[error("{role} buffer too small: {len} samples, {required} required")]
    BufferTooSmall {
        role: Role,
        len: usize,
        required: usize,
    },

    /// An ndarray view is not in standard (C-contiguous) layout.
    #[error("{role} array must be C-contiguous")]
    NonContiguous { role: Role },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file ended before the declared volume was read completely.
    #[error("{} holds {len} bytes, {required} required", .path.display())]
    TruncatedVolume {
        path: PathBuf,
        len: usize,
        required: usize,
    },
}

/// Result type for resampling operations.
pub type Result<T> = std::result::Result<T, ResampleError>;

impl ResampleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Abort the current operation on broken internal bookkeeping.
///
/// Reached only when dimension or ratio arithmetic is inconsistent with the
/// buffers it indexes. The event is logged before panicking so the offending
/// index and bounds survive even when the panic is caught further up.
#[cold]
#[track_caller]
pub(crate) fn contract_violation(args: fmt::Arguments<'_>) -> ! {
    tracing::error!("contract violation: {}", args);
    panic!("contract violation: {}", args);
}
