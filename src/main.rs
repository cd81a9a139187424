//! labelmask command line: batch dataset export from annotation files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use labelmask::config::{AppConfig, ExportSettings};
use labelmask::format::{AnnotationFile, FormatError};
use labelmask::raster::{MaskMode, json_to_datasets};

/// Export vector annotations as label mask datasets
#[derive(Parser, Debug)]
#[command(name = "labelmask")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// More log output; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a <name>_dataset/ directory next to each annotation file
    Export(ExportArgs),
    /// Print shape counts per label
    Info {
        /// Annotation file
        #[arg(value_name = "JSON")]
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Annotation files
    #[arg(value_name = "JSON", required = true)]
    files: Vec<PathBuf>,

    /// Instance masks, grouping labels by the prefix before the separator
    #[arg(long)]
    instance: bool,

    /// Label color opacity in the visualization
    #[arg(long, value_name = "A")]
    alpha: Option<f32>,

    /// Skip the numpy label arrays
    #[arg(long)]
    no_npy: bool,
}

impl ExportArgs {
    /// Command line flags override the config file.
    fn apply(&self, settings: &mut ExportSettings) {
        if self.instance {
            settings.mode = MaskMode::Instance;
        }
        if let Some(alpha) = self.alpha {
            settings.alpha = alpha.clamp(0.0, 1.0);
        }
        if self.no_npy {
            settings.write_npy = false;
        }
    }
}

fn load_config(path: Option<&Path>) -> AppConfig {
    match path {
        Some(path) => AppConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Ignoring config {}: {}", path.display(), e);
            AppConfig::default()
        }),
        None => AppConfig::load_or_default(),
    }
}

fn print_info(file: &Path) -> Result<(), FormatError> {
    let annotation = AnnotationFile::load(file)?;
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for shape in &annotation.shapes {
        *counts.entry(shape.label.as_str()).or_default() += 1;
    }
    println!(
        "{} ({}x{}, {} shapes)",
        annotation.image_path,
        annotation.image_width,
        annotation.image_height,
        annotation.shapes.len()
    );
    for (label, count) in counts {
        println!("  {:<24} {}", label, count);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref());

    let level = config.log_level.more_verbose(cli.verbose);
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();

    match cli.command {
        Command::Export(args) => {
            args.apply(&mut config.export);
            let (success, fail) = json_to_datasets(&args.files, &config.export);
            println!("Exported {} datasets, {} failed", success, fail);
            if fail == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Info { file } => match print_info(&file) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}: {}", file.display(), e);
                ExitCode::FAILURE
            }
        },
    }
}
