// bin/commands/random.rs

use clap::Args;
use rand::{Rng, SeedableRng};
use sasrebin::error::RebinError;
use sasrebin::io::{write_measurement, OutputStream};
use sasrebin::Measurement;
use std::path::PathBuf;

#[derive(Args)]
pub struct RandomArgs {
    /// Output file path (.dat or .dat.gz)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of points to generate
    #[arg(short = 'n', long, default_value = "10000")]
    pub num_points: usize,

    /// Optional seed for random number generation
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Sphere radius, in inverse units of q
    #[arg(long, default_value = "50.0")]
    pub radius: f64,

    /// First q of the grid
    #[arg(long, default_value = "0.001")]
    pub q_min: f64,

    /// Last q of the grid
    #[arg(long, default_value = "0.5")]
    pub q_max: f64,
}

pub fn run(args: RandomArgs) -> Result<(), RebinError> {
    if args.num_points == 0 || args.q_min <= 0.0 || args.q_max <= args.q_min {
        return Err("Need at least one point and 0 < q-min < q-max.".into());
    }

    eprintln!(
        "Generating {} points to {}",
        args.num_points,
        args.output
            .as_ref()
            .map_or("<stdout>".to_string(), |v| v.to_string_lossy().to_string())
    );

    let measurement = generate_sphere_curve(&args);
    let output = OutputStream::new(args.output);
    write_measurement(output.writer()?, &measurement, true)?.finish()?;

    eprintln!("Done!");
    Ok(())
}

/// Scattering of dilute monodisperse spheres on a linear q grid, with counting noise.
fn generate_sphere_curve(args: &RandomArgs) -> Measurement {
    const SCALE: f64 = 1.0e4;
    const BACKGROUND: f64 = 0.1;

    let mut rng = match args.seed {
        Some(s) => rand::rngs::StdRng::seed_from_u64(s),
        None => rand::rngs::StdRng::from_entropy(),
    };

    let n = args.num_points;
    let step = if n > 1 {
        (args.q_max - args.q_min) / (n - 1) as f64
    } else {
        0.0
    };

    let mut measurement = Measurement::with_capacity(n);
    for k in 0..n {
        let q = args.q_min + step * k as f64;
        let intensity = SCALE * sphere_form_factor(q * args.radius) + BACKGROUND;
        // Poisson-like error, at least 1% of the intensity
        let error = intensity.sqrt().max(0.01 * intensity);
        let noise = error * rng.gen_range(-1.0..1.0);
        measurement.push(q, intensity + noise, error);
    }
    measurement
}

/// Normalized form factor of a sphere, P(x) with x = qR.
fn sphere_form_factor(x: f64) -> f64 {
    if x.abs() < 1e-6 {
        return 1.0;
    }
    let amplitude = 3.0 * (x.sin() - x * x.cos()) / x.powi(3);
    amplitude * amplitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use sasrebin::io::{read_measurement, ReadOptions};

    fn args(output: Option<PathBuf>) -> RandomArgs {
        RandomArgs {
            output,
            num_points: 100,
            seed: Some(42),
            radius: 50.0,
            q_min: 0.001,
            q_max: 0.5,
        }
    }

    #[test]
    fn test_reproducible_generation() {
        let curve1 = generate_sphere_curve(&args(None));
        let curve2 = generate_sphere_curve(&args(None));
        assert_eq!(curve1, curve2);
        assert_eq!(curve1.len(), 100);
        assert_eq!(curve1.q[0], 0.001);
        assert!((curve1.q[99] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_form_factor() {
        assert_eq!(sphere_form_factor(0.0), 1.0);
        assert!((sphere_form_factor(1e-3) - 1.0).abs() < 1e-6);
        // First minimum near qR = 4.493
        assert!(sphere_form_factor(4.4934) < 1e-8);
    }

    #[test]
    fn test_output_file_creation() -> Result<(), RebinError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sphere.dat");
        run(args(Some(path.clone())))?;

        let curve = read_measurement(&path, &ReadOptions::default())?;
        assert_eq!(curve.len(), 100);
        assert!(curve.error.iter().all(|&e| e > 0.0));
        Ok(())
    }
}
