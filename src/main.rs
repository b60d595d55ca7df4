// Tue Jan 13 2026 - Alex

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use pdb_layout_dumper::{
    dump,
    utils::{format_duration, LoggingUtils},
    Config, DumpError, DumpSummary,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Dumps structure layouts and function offsets from a PDB", long_about = None)]
struct Args {
    #[arg(long)]
    pdb: PathBuf,

    /// Allow-list of structure and function names [default: config.json next to the PDB]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// [default: dump.json next to the PDB]
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    indent: usize,

    #[arg(long, default_value_t = 5)]
    max_depth: u32,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long)]
    no_progress: bool,

    #[arg(long)]
    no_color: bool,
}

impl Args {
    fn into_config(self) -> Config {
        let mut config = Config::new(&self.pdb)
            .with_indent(self.indent)
            .with_max_depth(self.max_depth)
            .with_progress(!self.no_progress);
        if let Some(path) = self.config {
            config = config.with_config_path(path);
        }
        if let Some(path) = self.output {
            config = config.with_output_path(path);
        }
        config
    }
}

fn main() {
    let args = Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }
    LoggingUtils::init(args.verbose as usize, !args.no_color);

    let verbose = args.verbose > 0;
    let config = args.into_config();
    let start_time = Instant::now();

    println!("{} Loading symbols: {}", "[*]".blue(), config.pdb_path.display());
    println!("{} Allow-list: {}", "[*]".blue(), config.config_path.display());

    let summary = match run(&config) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{} {:#}", "[!]".red(), e);
            let code = e.downcast_ref::<DumpError>().map_or(1, DumpError::exit_code);
            std::process::exit(code);
        }
    };

    print_summary(&summary, verbose);
    println!(
        "{} Layout written to {} in {}",
        "[+]".green(),
        config.output_path.display(),
        format_duration(start_time.elapsed())
    );
}

fn run(config: &Config) -> anyhow::Result<DumpSummary> {
    dump(config).with_context(|| format!("Failed to dump {}", config.pdb_path.display()))
}

fn print_summary(summary: &DumpSummary, verbose: bool) {
    println!(
        "{} Structures: {}  Functions: {}  Records: {}",
        "[+]".green(),
        summary.structures_matched.to_string().green(),
        summary.functions_matched.to_string().green(),
        summary.records.to_string().green()
    );

    if verbose {
        let walk = &summary.walk;
        println!(
            "{} Walked {} symbols: {} emitted, {} skipped, {} below depth limit",
            "[*]".blue(),
            walk.visited,
            walk.emitted,
            walk.skipped,
            walk.cut_off
        );
    }

    for name in &summary.missing_structures {
        println!("{} Structure not found: {}", "[!]".yellow(), name);
    }
    for name in &summary.missing_functions {
        println!("{} Function not found: {}", "[!]".yellow(), name);
    }
}
