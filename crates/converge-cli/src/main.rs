//! `converge` — apply declarative desired-state plans against remote
//! management planes (Guacamole, AWX, vCenter tagging, legacy web UI).
//!
//! Plans are YAML task lists; each task is reconciled in order with its own
//! authenticated session. `--check` computes what would change without
//! issuing any mutating call.

mod plan;
mod run;

use clap::{Parser, Subcommand};
use plan::Plan;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "converge")]
#[command(author, version, about = "Apply desired-state plans to remote management planes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a plan file task by task
    Apply {
        /// Path to the YAML plan file
        #[arg(short, long)]
        file: PathBuf,

        /// Compute and report changes without mutating anything
        #[arg(long)]
        check: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Apply { file, check } => apply(&file, check).await,
    }
}

async fn apply(file: &PathBuf, check: bool) -> ExitCode {
    let text = match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: cannot read {}: {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let plan: Plan = match serde_yaml::from_str(&text) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("error: invalid plan: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if check {
        println!("check mode: no changes will be made");
    }

    let mut changed = 0usize;
    let mut failed = 0usize;

    for (index, task) in plan.tasks.iter().enumerate() {
        let label = task.label(index);
        match run::run_task(&task.op, check).await {
            Ok(true) => {
                changed += 1;
                println!("changed: {}", label);
            }
            Ok(false) => println!("ok: {}", label),
            Err(message) => {
                failed += 1;
                eprintln!("failed: {}: {}", label, message);
            }
        }
    }

    println!(
        "{} tasks, {} changed, {} failed",
        plan.tasks.len(),
        changed,
        failed
    );

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
