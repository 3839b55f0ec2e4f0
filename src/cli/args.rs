//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Discover page assets and serve them as HTTP/2 preload headers
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: preload.toml, if present)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Scan HTML files and write a preload manifest
    #[command(visible_alias = "g")]
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Print the assets of a single HTML document as JSON
    #[command(visible_alias = "x")]
    Extract {
        #[command(flatten)]
        args: ExtractArgs,
    },

    /// Serve static files with preload headers from a manifest
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        args: ServeArgs,
    },
}

/// Generate command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// HTML files or directories to scan. If omitted, scans the current directory.
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,

    /// Index file name mapped to its directory
    #[arg(short, long)]
    pub index: Option<String>,

    /// Strip file extensions from manifest keys
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub noext: Option<bool>,

    /// Prefix stripped from source paths
    #[arg(short, long)]
    pub strip: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Number of files scanned concurrently (0: available CPUs)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Keep absolute (http/https) URLs in the manifest
    #[arg(short = 'a', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub keep_absolute: Option<bool>,

    /// Keep one entry per distinct URL within a page
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub dedup: Option<bool>,
}

/// Extract command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ExtractArgs {
    /// HTML file to scan. If omitted or `-`, reads from stdin.
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Keep absolute (http/https) URLs
    #[arg(short = 'a', long)]
    pub keep_absolute: bool,

    /// Keep one entry per distinct URL
    #[arg(short, long)]
    pub dedup: bool,

    /// Print compact JSON on a single line
    #[arg(short, long)]
    pub compact: bool,
}

/// Serve command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Directory of static files to serve
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Manifest file consulted for preload headers
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub manifest: Option<PathBuf>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ExtractArgs {
    /// Input file, or `None` for stdin.
    pub fn input(&self) -> Option<&PathBuf> {
        self.file.as_ref().filter(|path| path.as_os_str() != "-")
    }
}
