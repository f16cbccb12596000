use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use engine::Strategy;
use voxpack_tools::{
    compress, inspect, is_input_error, validate, CompressConfig, InspectReport,
};

#[derive(Parser)]
#[command(
    name = "voxpack",
    version,
    about = "Streaming voxel model compressor and tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a voxel model into CSV cuboid records.
    Compress {
        /// Model file; stdin when omitted.
        input: Option<PathBuf>,
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Grouping strategy.
        #[arg(long, value_enum, default_value_t = StrategyArg::StreamRlexy)]
        strategy: StrategyArg,
        /// Parallel candidates for the smart ensemble (0 = one thread
        /// per candidate, 1 = sequential).
        #[arg(long, default_value_t = 0)]
        pool: usize,
        /// Emit CRLF line endings.
        #[arg(long)]
        crlf: bool,
        /// Output buffer high-water mark in bytes.
        #[arg(long, default_value_t = emit::DEFAULT_FLUSH_THRESHOLD)]
        flush_threshold: usize,
        /// Print run statistics as JSON to stderr.
        #[arg(long)]
        stats: bool,
    },
    /// Check a cuboid stream against its model: coverage, labels,
    /// parent containment.
    Validate {
        /// Model file.
        model: PathBuf,
        /// Cuboid CSV file.
        cuboids: PathBuf,
        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Summarize a cuboid stream without its model.
    Inspect {
        /// Cuboid CSV file; stdin when omitted.
        cuboids: Option<PathBuf>,
        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Default,
    Greedy,
    Maxrect,
    Rlexy,
    Smart,
    StreamRlexy,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Default => Self::Default,
            StrategyArg::Greedy => Self::Greedy,
            StrategyArg::Maxrect => Self::MaxRect,
            StrategyArg::Rlexy => Self::RleXy,
            StrategyArg::Smart => Self::Smart,
            StrategyArg::StreamRlexy => Self::StreamRleXy,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if is_input_error(&err) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Compress {
            input,
            output,
            strategy,
            pool,
            crlf,
            flush_threshold,
            stats,
        } => {
            let config = CompressConfig {
                strategy: strategy.into(),
                pool_size: pool,
                crlf,
                flush_threshold,
            };
            let reader = open_input(input.as_deref())?;
            let run_stats = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("create {}", path.display()))?;
                    compress(reader, file, &config)?
                }
                None => compress(reader, io::stdout().lock(), &config)?,
            };
            if stats {
                let json =
                    serde_json::to_string_pretty(&run_stats).context("serialize stats")?;
                eprintln!("{json}");
            }
        }
        Command::Validate {
            model,
            cuboids,
            json,
        } => {
            let model_reader = BufReader::new(
                File::open(&model).with_context(|| format!("open {}", model.display()))?,
            );
            let cuboid_reader = BufReader::new(
                File::open(&cuboids).with_context(|| format!("open {}", cuboids.display()))?,
            );
            let report = validate(model_reader, cuboid_reader)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("serialize report")?
                );
            } else {
                println!(
                    "ok: {} cuboids cover {} cells across {} slices",
                    report.cuboids, report.cells, report.slices
                );
            }
        }
        Command::Inspect { cuboids, json } => {
            let reader = open_input(cuboids.as_deref())?;
            let report = inspect(reader)?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("serialize report")?
                );
            } else {
                print_inspect_report(&report);
            }
        }
    }
    Ok(())
}

fn open_input(path: Option<&std::path::Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn print_inspect_report(report: &InspectReport) {
    println!(
        "records: {} total volume: {} largest: {}",
        report.records, report.total_volume, report.largest_volume
    );
    println!("labels:");
    let mut stdout = io::stdout().lock();
    for label in &report.per_label {
        let _ = writeln!(
            stdout,
            "  {}: {} records, volume {}",
            label.name, label.records, label.volume
        );
    }
}
