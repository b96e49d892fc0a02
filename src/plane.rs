//! Plane-parallel resampler
//!
//! Every output Z-plane depends on exactly two input Z-slices, so each plane
//! is computed by its own task reading a two-slice window of the input.
//! Tasks never touch the output buffer. They hand finished rows
//! ([`Scanline`]s) to a single merge thread over a bounded channel, and
//! the merge thread copies each row to its absolute position.
//!
//! With the `parallel` feature the plane tasks run on the rayon pool;
//! without it each plane gets a scoped OS thread. The merge thread is
//! always a dedicated scoped thread, so producers blocked on a full channel
//! can never starve it.

use std::borrow::Cow;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::dims::{check_resample, VolumeDims};
use crate::error::{contract_violation, Result};
use crate::scalar::{axis_table, interpolate, map_axis, ratio, AxisSample};

/// Default number of scanlines that may wait in the hand-off channel.
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

/// Tuning for [`resample_parallel_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneConfig {
    /// Capacity of the scanline channel. Producers block once this many rows
    /// are waiting; 0 makes every hand-off a rendezvous.
    pub queue_depth: usize,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl PlaneConfig {
    #[inline]
    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth;
        self
    }
}

/// One finished output row.
#[derive(Debug)]
struct Scanline {
    /// Absolute row number in the output, `z * y_extent + y`
    row: usize,
    data: Vec<f32>,
}

/// Read-only state shared by all plane tasks of one call.
struct PlaneTask<'a> {
    input: &'a [f32],
    input_dims: VolumeDims,
    output_dims: VolumeDims,
    ratio_z: f32,
    xs: &'a [AxisSample],
    ys: &'a [AxisSample],
}

impl PlaneTask<'_> {
    /// Compute output plane `oz` and send it row by row.
    fn run(&self, oz: usize, sender: &SyncSender<Scanline>) {
        let z = map_axis(oz, self.ratio_z, self.input_dims.z);
        tracing::trace!(plane = oz, lower = z.lower, upper = z.upper, "plane task");

        let window = plane_window(self.input, self.input_dims, z.lower);
        // z is always 0 or 1: the window holds only the two slices we need
        let local_z = AxisSample {
            lower: 0,
            upper: 1,
            t: z.t,
        };

        for (oy, &y) in self.ys.iter().enumerate() {
            let line = Scanline {
                row: oz * self.output_dims.y + oy,
                data: self
                    .xs
                    .iter()
                    .map(|&x| interpolate(&window, self.input_dims, x, y, local_z))
                    .collect(),
            };
            // The receiver only disappears if the merge thread died; its
            // panic is reported by the caller.
            if sender.send(line).is_err() {
                return;
            }
        }
    }
}

/// Input slices `lower` and `lower + 1`, back to back.
///
/// When `lower` is the last slice there is no real upper neighbour, so the
/// last slice is duplicated into both halves. Both sides of the Z blend are
/// then identical and the Z weight cancels out.
fn plane_window(input: &[f32], dims: VolumeDims, lower: usize) -> Cow<'_, [f32]> {
    let plane = dims.plane_len();
    if lower >= dims.z {
        contract_violation(format_args!(
            "plane window at input slice {lower}, volume {dims} has {} slices",
            dims.z
        ));
    }

    let start = lower * plane;
    if lower == dims.z - 1 {
        let last = &input[start..start + plane];
        let mut both = Vec::with_capacity(2 * plane);
        both.extend_from_slice(last);
        both.extend_from_slice(last);
        Cow::Owned(both)
    } else {
        Cow::Borrowed(&input[start..start + 2 * plane])
    }
}

/// Drain scanlines into `output` in arrival order; returns the row count.
fn merge(receiver: Receiver<Scanline>, output: &mut [f32], row_len: usize) -> usize {
    let capacity = output.len();
    let mut rows = 0;
    for line in receiver {
        if line.data.len() != row_len {
            contract_violation(format_args!(
                "scanline {} has {} samples, expected {row_len}",
                line.row,
                line.data.len()
            ));
        }
        let start = line.row * row_len;
        let Some(dst) = output.get_mut(start..start + row_len) else {
            contract_violation(format_args!(
                "scanline {} ends at {}, output holds {capacity}",
                line.row,
                start + row_len
            ));
        };
        dst.copy_from_slice(&line.data);
        rows += 1;
    }
    tracing::debug!(rows, "scanline merge drained");
    rows
}

/// Resample with one concurrent task per output Z-plane.
///
/// Same contract and bit-for-bit the same result as
/// [`resample`](crate::resample). Blocks until every plane has been
/// computed and merged. Uses [`PlaneConfig::default`].
pub fn resample_parallel(
    input: &[f32],
    input_dims: VolumeDims,
    output: &mut [f32],
    output_dims: VolumeDims,
) -> Result<()> {
    resample_parallel_with(input, input_dims, output, output_dims, &PlaneConfig::default())
}

/// [`resample_parallel`] with an explicit [`PlaneConfig`].
pub fn resample_parallel_with(
    input: &[f32],
    input_dims: VolumeDims,
    output: &mut [f32],
    output_dims: VolumeDims,
    config: &PlaneConfig,
) -> Result<()> {
    check_resample(input.len(), input_dims, output.len(), output_dims)?;

    let r = ratio(input_dims, output_dims);
    tracing::debug!(
        input = %input_dims,
        output = %output_dims,
        ratio = ?r,
        planes = output_dims.z,
        queue_depth = config.queue_depth,
        "plane-parallel resample"
    );

    let xs = axis_table(output_dims.x, r[0], input_dims.x);
    let ys = axis_table(output_dims.y, r[1], input_dims.y);
    let task = PlaneTask {
        input,
        input_dims,
        output_dims,
        ratio_z: r[2],
        xs: &xs,
        ys: &ys,
    };

    let row_len = output_dims.x;
    let expected_rows = output_dims.y * output_dims.z;
    let target = &mut output[..output_dims.len()];

    let merged = thread::scope(|s| {
        let (sender, receiver) = mpsc::sync_channel::<Scanline>(config.queue_depth);
        let merger = s.spawn(move || merge(receiver, target, row_len));

        #[cfg(feature = "parallel")]
        {
            (0..output_dims.z)
                .into_par_iter()
                .for_each_with(sender, |sender, oz| task.run(oz, sender));
        }

        #[cfg(not(feature = "parallel"))]
        {
            let task = &task;
            for oz in 0..output_dims.z {
                let sender = sender.clone();
                s.spawn(move || task.run(oz, &sender));
            }
            drop(sender);
        }

        match merger.join() {
            Ok(rows) => rows,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    });

    if merged != expected_rows {
        contract_violation(format_args!(
            "merged {merged} scanlines, output has {expected_rows} rows"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::resample;

    fn ramp(dims: VolumeDims) -> Vec<f32> {
        (0..dims.len()).map(|i| (i % 97) as f32 * 0.37).collect()
    }

    #[test]
    fn test_window_borrows_adjacent_slices() {
        let dims = VolumeDims::new(3, 2, 4);
        let input = ramp(dims);
        let window = plane_window(&input, dims, 1);
        assert!(matches!(window, Cow::Borrowed(_)));
        assert_eq!(&*window, &input[6..18]);
    }

    #[test]
    fn test_window_duplicates_last_slice() {
        let dims = VolumeDims::new(3, 2, 4);
        let input = ramp(dims);
        let window = plane_window(&input, dims, 3);
        assert!(matches!(window, Cow::Owned(_)));
        assert_eq!(window.len(), 12);
        assert_eq!(&window[..6], &input[18..24]);
        assert_eq!(&window[6..], &input[18..24]);
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn test_window_past_last_slice_panics() {
        let dims = VolumeDims::new(3, 2, 4);
        let input = ramp(dims);
        plane_window(&input, dims, 4);
    }

    #[test]
    fn test_merge_places_rows_by_index() {
        let (sender, receiver) = mpsc::sync_channel(4);
        sender
            .send(Scanline {
                row: 2,
                data: vec![5.0, 6.0],
            })
            .unwrap();
        sender
            .send(Scanline {
                row: 0,
                data: vec![1.0, 2.0],
            })
            .unwrap();
        drop(sender);

        let mut output = vec![0.0f32; 6];
        assert_eq!(merge(receiver, &mut output, 2), 2);
        assert_eq!(output, vec![1.0, 2.0, 0.0, 0.0, 5.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn test_merge_rejects_short_scanline() {
        let (sender, receiver) = mpsc::sync_channel(1);
        sender
            .send(Scanline {
                row: 0,
                data: vec![1.0],
            })
            .unwrap();
        drop(sender);
        let mut output = vec![0.0f32; 4];
        merge(receiver, &mut output, 2);
    }

    #[test]
    fn test_matches_serial_for_every_queue_depth() {
        let input_dims = VolumeDims::new(5, 6, 7);
        let output_dims = VolumeDims::new(9, 4, 11);
        let input = ramp(input_dims);

        let mut expected = vec![0.0f32; output_dims.len()];
        resample(&input, input_dims, &mut expected, output_dims).unwrap();

        for depth in [0, 1, DEFAULT_QUEUE_DEPTH] {
            let mut output = vec![f32::NAN; output_dims.len()];
            let config = PlaneConfig::default().with_queue_depth(depth);
            resample_parallel_with(&input, input_dims, &mut output, output_dims, &config)
                .unwrap();
            let same = expected
                .iter()
                .zip(output.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits());
            assert!(same, "queue depth {depth} diverged from serial output");
        }
    }

    #[test]
    fn test_rejected_call_spawns_nothing() {
        let input = vec![1.0f32; 8];
        let mut output = vec![-1.0f32; 8];
        let err = resample_parallel(&input, VolumeDims::cube(2), &mut output, VolumeDims::new(8, 1, 1));
        assert!(err.is_err());
        assert!(output.iter().all(|&v| v == -1.0));
    }
}
