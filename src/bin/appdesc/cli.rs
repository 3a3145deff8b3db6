//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// appdesc - Validate and normalize Android application descriptors
#[derive(Parser)]
#[command(name = "appdesc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

/// Descriptor serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Toml,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the descriptor and report every violation
    Check(CheckArgs),

    /// Print the descriptor in canonical form
    Normalize(NormalizeArgs),

    /// Summarize the loaded descriptor
    Show(ShowArgs),

    /// List dependency bindings with their effective versions
    Deps(DepsArgs),

    /// Create a starter descriptor
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that loads a descriptor.
#[derive(Args, Debug, Clone, Default)]
pub struct DescriptorArgs {
    /// Path to App.toml or App.json (searched upward from cwd by default)
    #[arg(long, value_name = "PATH")]
    pub manifest_path: Option<PathBuf>,

    /// Signing store declaring the known identities
    #[arg(long, value_name = "PATH", env = "APPDESC_SIGNING_STORE")]
    pub signing_store: Option<PathBuf>,

    /// Treat a signing identity as known (repeatable)
    #[arg(long = "identity", value_name = "NAME")]
    pub identities: Vec<String>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub descriptor: DescriptorArgs,
}

#[derive(Args)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub descriptor: DescriptorArgs,

    /// Output format (defaults to the descriptor's own)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Rewrite the descriptor in place
    #[arg(long, conflicts_with = "format")]
    pub write: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub descriptor: DescriptorArgs,

    /// Show the values one build variant resolves to
    #[arg(long, value_name = "NAME")]
    pub variant: Option<String>,
}

#[derive(Args)]
pub struct DepsArgs {
    #[command(flatten)]
    pub descriptor: DescriptorArgs,

    /// Only list bindings in this configuration
    #[arg(long, value_name = "NAME")]
    pub configuration: Option<String>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to create the descriptor in
    pub path: Option<PathBuf>,

    /// Application id (defaults to com.example.<directory>)
    #[arg(long, value_name = "ID")]
    pub application_id: Option<String>,

    /// UI framework to wire in
    #[arg(long, value_name = "NAME")]
    pub framework: Option<String>,

    /// Write App.json instead of App.toml
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
