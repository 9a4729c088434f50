use std::path::PathBuf;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use lambda_deploy_core::archive::package_source;
use lambda_deploy_core::config::{default_archive_path, DEFAULT_SOURCE_FILE};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the function deployment workspace",
    long_about = "A unified CLI for packaging function code, running the deployment\n\
                  pipeline against AWS, and running CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Zip a function source file without touching AWS
    Package {
        /// Source file to package
        #[arg(long, default_value = DEFAULT_SOURCE_FILE)]
        source: PathBuf,
        /// Output archive path (defaults to the temp directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run the deployment pipeline against AWS
    Deploy {
        /// Arguments forwarded to `deploy_function`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Tests only
    Test,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package(source: PathBuf, output: Option<PathBuf>) {
    let output = output.unwrap_or_else(default_archive_path);
    step("Package function source");
    match package_source(&source, &output) {
        Ok(archive) => eprintln!(
            "\nPackaged artifact:\n- {} ({} bytes, entry `{}`, sha256 {})",
            archive.staged_path.display(),
            archive.len(),
            archive.entry_name,
            archive.sha256_hex
        ),
        Err(error) => {
            eprintln!("error: {error}");
            exit(1);
        }
    }
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    ci_test();
}

fn ci_test() {
    step("Test lambda_deploy_core");
    run_cargo(&["test", "-p", "lambda_deploy_core"]);

    step("Test lambda_deploy_aws");
    run_cargo(&["test", "-p", "lambda_deploy_aws"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Package { source, output } => package(source, output),
        Commands::Deploy { args } => {
            let mut cargo_args = vec![
                "run",
                "-p",
                "lambda_deploy_aws",
                "--bin",
                "deploy_function",
                "--",
            ];
            cargo_args.extend(args.iter().map(String::as_str));
            run_cargo(&cargo_args);
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Test => ci_test(),
            }
            eprintln!("\nCI job passed.");
        }
    }
}
