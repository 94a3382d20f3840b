use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use repomap::engine::{Engine, GitDiff};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "repomap", version, about = "Repository dependency graph and review-context ranking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the repository and build the dependency graph
    Build {
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Ignore glob, repeatable
        #[arg(long)]
        ignore: Vec<String>,
    },
    /// Re-parse changed files and rebuild the graph
    Update {
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Git diff range, e.g. `main...HEAD`
        #[arg(long)]
        range: Option<String>,
        #[arg(long)]
        ignore: Vec<String>,
    },
    /// Rank files by relevance to the given seed files
    Rank {
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Seed files (repo-relative paths), e.g. the PR diff
        #[arg(value_name = "SEED")]
        seeds: Vec<String>,
        #[arg(long, short, default_value = "25")]
        top: usize,
        /// Emit context buckets as JSON instead of the flat ranking
        #[arg(long)]
        buckets: bool,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {err:#}", "error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    match Cli::parse().command {
        Commands::Build { root, ignore } => {
            let report = Engine::new(root).with_ignore_globs(ignore).build()?;
            print_report(&report);
        }
        Commands::Update {
            root,
            range,
            ignore,
        } => {
            let report = Engine::new(root)
                .with_ignore_globs(ignore)
                .update(&GitDiff, range.as_deref())?;
            print_report(&report);
        }
        Commands::Rank {
            root,
            seeds,
            top,
            buckets,
        } => {
            let engine = Engine::new(root);
            if buckets {
                let selection = engine.buckets(&seeds, top)?;
                println!("{}", serde_json::to_string_pretty(&selection)?);
            } else {
                for (position, file) in engine.rank(&seeds, top)?.iter().enumerate() {
                    println!(
                        "{:>3}. {:.4}  {}  {}",
                        position + 1,
                        file.score,
                        file.path.bold(),
                        file.reasons.join(", ").dimmed()
                    );
                }
            }
        }
    }
    Ok(())
}

fn print_report(report: &repomap::engine::BuildReport) {
    println!(
        "{} {} files indexed ({} parsed, {} reused, {} dropped), {} nodes, {} edges",
        "ok:".green().bold(),
        report.state.files.len(),
        report.parsed,
        report.reused,
        report.dropped,
        report.graph.node_count(),
        report.graph.edge_count(),
    );
}
