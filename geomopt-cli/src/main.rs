//! `geomopt` command line tool
//!
//! Reads an OBJ mesh, removes short edges and writes the result:
//!
//! ```text
//! geomopt in.obj out.obj --sample-ratio 0.5 --max-feature 0.05
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use geomopt_io::{load_config, read_mesh, write_mesh};
use geomopt_simplification::{ShortEdgeConfig, ShortEdgeOp};

/// Short edge mesh decimation.
#[derive(Parser, Debug)]
#[command(name = "geomopt")]
#[command(about = "Remove short edges from a triangle mesh", long_about = None)]
#[command(version)]
struct Cli {
    /// Input mesh file
    input: PathBuf,

    /// Output mesh file
    output: PathBuf,

    /// Fraction of the original primitives to keep
    #[arg(long)]
    sample_ratio: Option<f32>,

    /// Stop once the next edge is longer than this
    #[arg(long)]
    max_error: Option<f32>,

    /// Longest removable edge, relative to the smallest bounding box dimension
    #[arg(long)]
    max_feature: Option<f32>,

    #[arg(long)]
    max_steps: Option<usize>,

    /// Never reduce below this many primitives
    #[arg(long)]
    min_primitives: Option<usize>,

    /// Allow collapsing edges on open boundaries
    #[arg(long)]
    ignore_boundaries: bool,

    #[arg(long)]
    no_smoothing: bool,

    #[arg(long)]
    no_tri_strip: bool,

    /// JSON settings file; flags given on the command line win
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> Result<ShortEdgeConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ShortEdgeConfig::default(),
        };

        if let Some(v) = self.sample_ratio {
            config.sample_ratio = v;
        }
        if let Some(v) = self.max_error {
            config.maximum_error = v;
        }
        if let Some(v) = self.max_feature {
            config.max_feature = v;
        }
        if let Some(v) = self.max_steps {
            config.max_steps = v;
        }
        if let Some(v) = self.min_primitives {
            config.min_primitives = v;
        }
        if self.ignore_boundaries {
            config.ignore_boundaries = true;
        }
        if self.no_smoothing {
            config.smoothing = false;
        }
        if self.no_tri_strip {
            config.tri_strip = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = cli.settings()?;
    let op = ShortEdgeOp::from_config(&config);

    let mut mesh = read_mesh(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    info!(
        path = %cli.input.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Loaded mesh"
    );

    let stats = op
        .decimate(&mut mesh)
        .with_context(|| format!("decimation of {} failed", cli.input.display()))?;

    write_mesh(&mesh, &cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    println!("{}", stats);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::try_parse_from(["geomopt", "in.obj", "out.obj"]).unwrap();
        assert_eq!(cli.settings().unwrap(), ShortEdgeConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "geomopt",
            "in.obj",
            "out.obj",
            "--sample-ratio",
            "0.3",
            "--max-steps",
            "50",
            "--ignore-boundaries",
            "--no-tri-strip",
        ])
        .unwrap();
        let config = cli.settings().unwrap();
        assert_eq!(config.sample_ratio, 0.3);
        assert_eq!(config.max_steps, 50);
        assert!(config.ignore_boundaries);
        assert!(!config.tri_strip);
        assert!(config.smoothing);
    }

    #[test]
    fn test_flags_override_config_file() {
        let path = std::env::temp_dir().join(format!("geomopt_cli_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "sample_ratio": 0.8, "min_primitives": 20 }"#).unwrap();

        let config_arg = path.to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "geomopt",
            "in.obj",
            "out.obj",
            "--config",
            config_arg.as_str(),
            "--sample-ratio",
            "0.4",
        ])
        .unwrap();
        let config = cli.settings().unwrap();
        assert_eq!(config.sample_ratio, 0.4);
        assert_eq!(config.min_primitives, 20);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli::try_parse_from([
            "geomopt",
            "in.obj",
            "out.obj",
            "--config",
            "/nonexistent/geomopt.json",
        ])
        .unwrap();
        assert!(cli.settings().is_err());
    }
}
