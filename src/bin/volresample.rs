use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use volresample::analytic::Sphere;
use volresample::io::{read_raw_f32, write_raw_f32};
use volresample::{resample, resample_parallel, VolumeDims};

#[derive(Parser, Debug)]
#[command(name = "volresample")]
#[command(version, about = "Trilinear resampling of raw f32 volumes", long_about = None)]
struct Cli {
    /// File to read from
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// File to create
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input extent along X
    #[arg(long, default_value_t = 0)]
    ix: usize,

    /// Input extent along Y
    #[arg(long, default_value_t = 0)]
    iy: usize,

    /// Input extent along Z
    #[arg(long, default_value_t = 0)]
    iz: usize,

    /// Output extent along X
    #[arg(long, default_value_t = 0)]
    ox: usize,

    /// Output extent along Y
    #[arg(long, default_value_t = 0)]
    oy: usize,

    /// Output extent along Z
    #[arg(long, default_value_t = 0)]
    oz: usize,

    /// Write a synthetic sphere volume of the output size instead of resampling
    #[arg(long)]
    sphere: bool,

    /// Use the single-threaded engine
    #[arg(long)]
    serial: bool,
}

impl Cli {
    fn input_dims(&self) -> VolumeDims {
        VolumeDims::new(self.ix, self.iy, self.iz)
    }

    fn output_dims(&self) -> VolumeDims {
        VolumeDims::new(self.ox, self.oy, self.oz)
    }

    fn validate(&self) -> Result<()> {
        if self.output_dims().is_empty() {
            bail!("output volume size is 0");
        }
        if self.output.is_none() {
            bail!("output filename not given");
        }
        if !self.sphere && self.input_dims().is_empty() {
            bail!("input volume size is 0");
        }
        if !self.sphere && self.input.is_none() {
            bail!("input filename not given");
        }
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    cli.validate()?;
    let output_dims = cli.output_dims();
    let output_len = output_dims
        .checked_len()
        .with_context(|| format!("output volume {output_dims} is too large"))?;
    let output_path = cli.output.as_deref().context("output filename not given")?;

    if cli.sphere {
        let sphere = Sphere::centered(output_dims);
        info!(dims = %output_dims, radius = sphere.radius, "generating sphere volume");
        let data = sphere.generate(output_dims);
        write_raw_f32(output_path, &data, output_dims).context("writing sphere volume")?;
        return Ok(());
    }

    let input_dims = cli.input_dims();
    let input_path = cli.input.as_deref().context("input filename not given")?;

    info!(path = %input_path.display(), dims = %input_dims, "reading input");
    let input = read_raw_f32(input_path, input_dims).context("reading data")?;

    let mut output = vec![0.0f32; output_len];
    info!(from = %input_dims, to = %output_dims, serial = cli.serial, "resampling");
    let resampled = if cli.serial {
        resample(&input, input_dims, &mut output, output_dims)
    } else {
        resample_parallel(&input, input_dims, &mut output, output_dims)
    };
    resampled.context("resampling")?;

    info!(path = %output_path.display(), "writing output");
    write_raw_f32(output_path, &output, output_dims).context("writing data")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("volresample").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_requires_output_size() {
        let cli = parse(&["-i", "a.raw", "-o", "b.raw", "--ix", "4", "--iy", "4", "--iz", "4"]);
        assert_eq!(cli.validate().unwrap_err().to_string(), "output volume size is 0");
    }

    #[test]
    fn test_requires_output_name() {
        let cli = parse(&["--ox", "4", "--oy", "4", "--oz", "4", "--sphere"]);
        assert_eq!(cli.validate().unwrap_err().to_string(), "output filename not given");
    }

    #[test]
    fn test_sphere_needs_no_input() {
        let cli = parse(&["-o", "b.raw", "--ox", "4", "--oy", "4", "--oz", "4", "--sphere"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_requires_input_without_sphere() {
        let cli = parse(&["-o", "b.raw", "--ox", "4", "--oy", "4", "--oz", "4"]);
        assert_eq!(cli.validate().unwrap_err().to_string(), "input volume size is 0");

        let cli = parse(&[
            "-o", "b.raw", "--ox", "4", "--oy", "4", "--oz", "4", "--ix", "2", "--iy", "2", "--iz",
            "2",
        ]);
        assert_eq!(cli.validate().unwrap_err().to_string(), "input filename not given");
    }

    #[test]
    fn test_sphere_written_at_output_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sphere.raw");
        let cli = parse(&[
            "-o",
            path.to_str().unwrap(),
            "--ox",
            "5",
            "--oy",
            "6",
            "--oz",
            "7",
            "--sphere",
        ]);

        run(&cli).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 5 * 6 * 7 * 4);
        let written = read_raw_f32(&path, cli.output_dims()).unwrap();
        assert_eq!(written, Sphere::centered(cli.output_dims()).generate(cli.output_dims()));
    }

    /// Run the 7x8x9 -> 13x5x17 pipeline from `input` into `output`.
    fn resample_into(input: &Path, output: &Path, extra: &[&str]) {
        let mut args = vec![
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--ix",
            "7",
            "--iy",
            "8",
            "--iz",
            "9",
            "--ox",
            "13",
            "--oy",
            "5",
            "--oz",
            "17",
        ];
        args.extend_from_slice(extra);
        run(&parse(&args)).unwrap();
    }

    #[test]
    fn test_serial_and_parallel_pipelines_write_same_bytes() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.raw");
        let serial = dir.path().join("serial.raw");
        let parallel = dir.path().join("parallel.raw");

        let input_dims = VolumeDims::new(7, 8, 9);
        let data = Sphere::centered(input_dims).generate(input_dims);
        write_raw_f32(&input, &data, input_dims).unwrap();

        resample_into(&input, &serial, &["--serial"]);
        resample_into(&input, &parallel, &[]);

        let serial_bytes = fs::read(&serial).unwrap();
        assert_eq!(serial_bytes.len(), 13 * 5 * 17 * 4);
        assert_eq!(serial_bytes, fs::read(&parallel).unwrap());
    }

    #[test]
    fn test_missing_input_file_reported() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.raw");
        let cli = parse(&[
            "-i",
            dir.path().join("absent.raw").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--ix",
            "4",
            "--iy",
            "4",
            "--iz",
            "4",
            "--ox",
            "8",
            "--oy",
            "8",
            "--oz",
            "8",
        ]);

        let err = run(&cli).unwrap_err();
        assert!(format!("{err:#}").starts_with("reading data"), "{err:#}");
        assert!(!output.exists());
    }
}
