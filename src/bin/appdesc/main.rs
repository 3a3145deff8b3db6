//! appdesc CLI - Validate and normalize Android application descriptors

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use appdesc::util::shell::{ColorChoice, Shell};
use appdesc::GlobalContext;
use cli::{Cli, Commands, MessageFormat};

fn main() {
    // Parse CLI
    let cli = Cli::parse();

    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let shell = Shell::from_flags(
        cli.quiet,
        cli.verbose,
        color,
        cli.message_format == MessageFormat::Json,
    );

    if let Err(e) = run(cli, &shell) {
        shell.error(format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    // Set up logging
    let filter = if shell.is_verbose() {
        EnvFilter::new("appdesc=debug")
    } else if shell.is_quiet() || shell.is_json() {
        EnvFilter::new("appdesc=error")
    } else {
        EnvFilter::new("appdesc=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(shell.use_color())
        .with_target(false)
        .without_time()
        .init();

    let ctx = GlobalContext::new()?;

    // Execute command
    match cli.command {
        Commands::Check(args) => commands::check::execute(args, &ctx, shell),
        Commands::Normalize(args) => commands::normalize::execute(args, &ctx, shell),
        Commands::Show(args) => commands::show::execute(args, &ctx, shell),
        Commands::Deps(args) => commands::deps::execute(args, &ctx, shell),
        Commands::Init(args) => commands::init::execute(args, &ctx, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
