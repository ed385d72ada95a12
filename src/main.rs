use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use linesplit::{HashConfig, SplitConfig, Splitter};

/// Split a line-delimited file into line-aligned pieces.
#[derive(Parser, Debug)]
#[command(name = "linesplit", version, about)]
struct Cli {
    /// File to split
    input: PathBuf,

    /// Number of pieces to produce
    #[arg(short = 'n', long = "chunks", default_value_t = 4)]
    chunks: usize,

    /// Directory for the pieces (created if missing)
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Writer threads (defaults to the number of CPUs)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Chunks allowed to wait for a writer; 0 means unbounded
    #[arg(long)]
    queue_depth: Option<usize>,

    /// Prefix for output file names
    #[arg(long, default_value = "tmp_")]
    prefix: String,

    /// Extension for output file names
    #[arg(long, default_value = "csv")]
    extension: String,

    /// Minimum digits in the chunk number
    #[arg(long, default_value_t = 2)]
    width: usize,

    /// Skip computing a BLAKE3 digest of each piece
    #[arg(long)]
    no_hash: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn split_config(&self) -> Result<SplitConfig> {
        let mut config = SplitConfig::new(self.chunks)?
            .with_prefix(self.prefix.as_str())
            .with_extension(self.extension.as_str())
            .with_ordinal_width(self.width)
            .with_hash_config(HashConfig::new(!self.no_hash));

        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(depth) = self.queue_depth {
            config = config.with_queue_depth((depth > 0).then_some(depth));
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.split_config().context("invalid options")?;

    fs::create_dir_all(&cli.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            cli.output_dir.display()
        )
    })?;

    let report = Splitter::new(config)
        .split(&cli.input, &cli.output_dir)
        .with_context(|| format!("failed to split {}", cli.input.display()))?;

    for chunk in &report.chunks {
        println!("{}", chunk);
    }
    println!(
        "Split {} bytes into {} file(s) (target {} bytes each)",
        report.source_len,
        report.len(),
        report.target_size
    );

    Ok(())
}
