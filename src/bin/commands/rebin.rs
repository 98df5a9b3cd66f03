// bin/commands/rebin.rs

use crate::commands::{PolicyArgs, ReadArgs};
use clap::Args;
use flate2::Compression;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use sasrebin::error::RebinError;
use sasrebin::io::{read_measurement, write_measurement, OutputStream};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

#[derive(Args)]
pub struct RebinArgs {
    /// Input data files (q, I, dI columns). Glob patterns are expanded
    #[arg(value_name = "FILE", required = true)]
    pub inputs: Vec<String>,

    /// Output path, for a single input only ("-" for stdout). If not specified, the suffix is
    /// appended to each input's file stem
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Suffix for default output paths
    #[arg(long, default_value = "_rebin")]
    pub suffix: String,

    /// Force overwrite of output files if they exist
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Do not write the "# q I dI" header line
    #[arg(long)]
    pub no_header: bool,

    /// Gzip level (0-9) for .gz outputs
    #[arg(long, default_value = "6", value_parser = clap::value_parser!(u32).range(0..=9))]
    pub compression_level: u32,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub read: ReadArgs,
}

pub fn run(args: RebinArgs) -> Result<(), RebinError> {
    let start = Instant::now();

    // Validate everything before touching any file
    let policy = args.policy.to_policy()?;
    let options = args.read.to_options()?;
    let inputs = expand_inputs(&args.inputs)?;
    if args.output.is_some() && inputs.len() > 1 {
        return Err("--output can only be used with a single input file.".into());
    }

    let pb = if inputs.len() > 1 {
        ProgressBar::new(inputs.len() as u64).with_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue}⟩ \
                     {pos}/{len} files ({percent}%) [{eta_precise}]",
                )?
                .progress_chars("=> "),
        )
    } else {
        ProgressBar::hidden()
    };

    for input in &inputs {
        let output_path = args
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(input, &args.suffix));
        let to_stdout = output_path == Path::new("-");

        // Check if output exists and handle --force
        if !to_stdout && output_path.exists() && !args.force {
            return Err(format!(
                "Output file {} exists. Use --force to overwrite.",
                output_path.display()
            )
            .into());
        }

        let measurement = read_measurement(input, &options)?;
        let rebinned = measurement.rebin(&policy)?;

        let output = OutputStream::builder()
            .filepath(if to_stdout { None } else { Some(&output_path) })
            .compression_level(Compression::new(args.compression_level))
            .build();
        write_measurement(output.writer()?, &rebinned, !args.no_header)?.finish()?;
        debug!(
            input = %input.display(),
            output = %output_path.display(),
            "wrote rebinned data"
        );
        pb.inc(1);
    }

    pb.finish_and_clear();

    let duration = start.elapsed();
    eprintln!("Rebinned {} file(s) in {:?}", inputs.len(), duration);

    Ok(())
}

/// Expand glob patterns into the list of matching files, keeping the given order.
fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>, RebinError> {
    let mut inputs = Vec::new();
    for pattern in patterns {
        let matches = glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
        if matches.is_empty() {
            return Err(format!("No input file matches {}.", pattern).into());
        }
        inputs.extend(matches);
    }
    Ok(inputs)
}

/// `data/run1.dat` -> `data/run1<suffix>.dat`; a trailing `.gz` is kept last.
fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (name, gzipped) = match name.strip_suffix(".gz") {
        Some(stripped) => (stripped.to_string(), true),
        None => (name, false),
    };

    let mut output = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}{}.{}", stem, suffix, ext),
        _ => format!("{}{}", name, suffix),
    };
    if gzipped {
        output.push_str(".gz");
    }
    input.with_file_name(output)
}
