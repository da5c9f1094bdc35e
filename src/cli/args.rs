//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate Markdown documentation from Python source files
#[derive(Parser, Debug)]
#[command(name = "codexplain")]
#[command(about = "Generate Markdown documentation from Python source files")]
#[command(version)]
pub struct Args {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Document one or more Python files
    Analyze {
        /// Python files to document (each is processed independently)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file, or directory when several files are given
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (markdown, json, html)
        #[arg(long)]
        format: Option<String>,

        /// Max syntax-tree depth to walk
        #[arg(long)]
        depth: Option<usize>,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Omit line numbers from items
        #[arg(long)]
        no_line_numbers: bool,
    },

    /// Render a JSON entry export as Markdown
    Render {
        /// JSON file produced by `analyze --format json`
        path: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Omit line numbers from items
        #[arg(long)]
        no_line_numbers: bool,
    },

    /// Serve the upload page locally
    Serve {
        /// Port to serve on
        #[arg(short, long)]
        port: Option<u16>,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}
