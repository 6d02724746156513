use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::env;
use std::process::exit;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::context::RunContext;
use crate::application::services::decision::{Decider, PolicyDecider};
use crate::application::services::outcome::RunSummary;
use crate::application::use_cases::{
    DownloadConfig, DownloadUseCase, FreezeConfig, FreezeReport, FreezeUseCase, StatusCheckConfig,
    StatusCheckUseCase, UploadConfig, UploadUseCase,
};
use crate::common::error::FATAL_EXIT_CODE;
use crate::infrastructure::scm::ScmFactory;
use crate::presentation::ui::{TerminalDecider, TerminalReporter};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CMG_GIT_HASH"),
    " ",
    env!("CMG_BUILD_DATE"),
    " ",
    env!("CMG_BUILD_TARGET"),
    ")"
);

/// cmg - keep a container of Git, Subversion and plain-copy components in sync
#[derive(Parser)]
#[command(name = "cmg")]
#[command(about = "Keep a container of Git, Subversion and plain-copy components in sync")]
#[command(version = VERSION)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (overrides cmg.verbose)
    #[arg(short, long, global = true, env = "CMG_VERBOSE")]
    pub verbose: bool,

    /// Never fetch or push (overrides cmg.online)
    #[arg(long, global = true, env = "CMG_OFFLINE")]
    pub offline: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Working directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bring the container and every component to a point
    Download {
        /// Branch, remote branch or tag (defaults to the current branch)
        point: Option<String>,
    },

    /// Report how the workspace differs from a point
    Status {
        /// Branch, remote branch or tag (defaults to the current branch)
        point: Option<String>,
    },

    /// Push every component, then the container
    Upload {
        /// Local branch the container must be on
        point: Option<String>,
    },

    /// Record the current state of every component in a baseline tag
    Freeze {
        /// Name of the baseline tag to create
        tag: String,

        /// Earlier baseline to take component settings from
        old_tag: Option<String>,
    },
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    pub async fn run(self) -> Result<()> {
        colored::control::set_override(!self.cli.no_color && atty::is(atty::Stream::Stdout));

        match self.handle_command().await {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                exit(FATAL_EXIT_CODE);
            }
        }
    }

    async fn handle_command(&self) -> Result<()> {
        if let Some(ref dir) = self.cli.directory {
            env::set_current_dir(dir)?;
        }
        let ctx = self.open_context().await?;

        match &self.cli.command {
            Commands::Download { point } => {
                let config = DownloadConfig::new(point.clone().unwrap_or_default());
                let summary = DownloadUseCase::new(ctx, config).execute().await?;
                print_summary("download", &summary);
            }
            Commands::Status { point } => {
                let config = StatusCheckConfig::new(point.clone().unwrap_or_default());
                let summary = StatusCheckUseCase::new(ctx, config).execute().await?;
                print_summary("status", &summary);
            }
            Commands::Upload { point } => {
                let config = UploadConfig::new(point.clone());
                let summary = UploadUseCase::new(ctx, config).execute().await?;
                print_summary("upload", &summary);
            }
            Commands::Freeze { tag, old_tag } => {
                let config = FreezeConfig::new(tag.clone(), old_tag.clone());
                let report = FreezeUseCase::new(ctx, config).execute().await?;
                print_freeze_report(&report);
            }
        }
        Ok(())
    }

    async fn open_context(&self) -> Result<RunContext> {
        let decider: Arc<dyn Decider> = if atty::is(atty::Stream::Stdin) {
            Arc::new(TerminalDecider::new())
        } else {
            Arc::new(PolicyDecider::aborting())
        };
        let ctx = RunContext::open(
            &env::current_dir()?,
            Arc::new(ScmFactory::default()),
            decider,
            Arc::new(TerminalReporter::new()),
        )
        .await?;

        let settings = ctx
            .settings
            .with_verbose(self.cli.verbose)
            .with_offline(self.cli.offline);
        init_logging(settings.verbose);
        Ok(ctx.with_settings(settings))
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

/// `RUST_LOG` wins; otherwise debug when verbose, warn otherwise
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "cmg=debug" } else { "warn" })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn print_summary(verb: &str, summary: &RunSummary) {
    println!(
        "{} {} finished: {} components, {} changed, {} unchanged",
        "✓".green().bold(),
        verb,
        summary.components,
        summary.changed,
        summary.unchanged
    );
    if summary.has_conflicts() {
        println!("{} needing attention:", "⚠".yellow().bold());
        for (component, detail) in &summary.conflicts {
            println!("  {}", component.yellow());
            for line in detail.lines() {
                println!("    {}", line);
            }
        }
    }
}

fn print_freeze_report(report: &FreezeReport) {
    print_summary("freeze", &report.summary);
    if report.tag_created {
        println!("{} baseline tag '{}' created", "✓".green().bold(), report.tag);
    } else {
        println!(
            "{} baseline not tagged; staged in {}",
            "::".blue().bold(),
            report.staging_file.display()
        );
    }
}
