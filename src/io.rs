//! Headerless raw volumes: `x * y * z` little-endian f32 samples

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::dims::VolumeDims;
use crate::error::{ResampleError, Result, Role};

const SAMPLE_BYTES: usize = std::mem::size_of::<f32>();

/// Serialize samples as little-endian bytes.
pub fn encode_f32_le(data: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(data.len() * SAMPLE_BYTES);
    for value in data {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode little-endian samples. A trailing partial sample is ignored.
pub fn decode_f32_le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(SAMPLE_BYTES)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Read a volume of `dims` from a raw file.
///
/// Bytes past the declared volume are left unread. The buffer grows with
/// what the file actually holds, so a short file never costs the full
/// declared size.
pub fn read_raw_f32(path: impl AsRef<Path>, dims: VolumeDims) -> Result<Vec<f32>> {
    let path = path.as_ref();
    let required = dims
        .checked_len()
        .and_then(|n| n.checked_mul(SAMPLE_BYTES))
        .ok_or(ResampleError::VolumeTooLarge {
            role: Role::Input,
            dims,
        })?;

    let file = File::open(path).map_err(|e| ResampleError::io(path, e))?;
    let available = file
        .metadata()
        .map(|m| usize::try_from(m.len()).unwrap_or(usize::MAX))
        .unwrap_or(0);
    let mut bytes = Vec::with_capacity(required.min(available));
    file.take(required as u64)
        .read_to_end(&mut bytes)
        .map_err(|e| ResampleError::io(path, e))?;

    if bytes.len() < required {
        return Err(ResampleError::TruncatedVolume {
            path: path.to_path_buf(),
            len: bytes.len(),
            required,
        });
    }
    tracing::debug!(path = %path.display(), dims = %dims, "read raw volume");
    Ok(decode_f32_le(&bytes))
}

/// Write the first `dims.len()` samples of `data` to a raw file.
///
/// The file is created or truncated. If writing fails part way the file is
/// removed, so a failed call never leaves a truncated volume behind.
pub fn write_raw_f32(path: impl AsRef<Path>, data: &[f32], dims: VolumeDims) -> Result<()> {
    let path = path.as_ref();
    dims.check_buffer(Role::Input, data.len())?;

    let file = File::create(path).map_err(|e| ResampleError::io(path, e))?;
    write_or_remove(path, BufWriter::new(file), &data[..dims.len()], |writer| {
        writer.get_ref().sync_all()
    })?;
    tracing::debug!(path = %path.display(), dims = %dims, "wrote raw volume");
    Ok(())
}

/// Encode `samples` into `writer`, then hand it to `finish`.
///
/// On any failure `writer` is dropped and `path`, the file behind it, is
/// removed.
fn write_or_remove<W, F>(path: &Path, mut writer: W, samples: &[f32], finish: F) -> Result<()>
where
    W: Write,
    F: FnOnce(W) -> std::io::Result<()>,
{
    let written = writer
        .write_all(&encode_f32_le(samples))
        .and_then(|()| writer.flush())
        .and_then(|()| finish(writer));

    if let Err(e) = written {
        if let Err(remove) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %remove, "could not remove partial volume");
        }
        return Err(ResampleError::io(path, e));
    }
    Ok(())
}
