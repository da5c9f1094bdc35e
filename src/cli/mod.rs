//! CLI module for Codexplain

mod args;
pub mod serve;

pub use args::{Args, Command};

use crate::config::{Config, OutputFormat, DEFAULT_CONFIG_FILE};
use crate::documenter::Documenter;
use crate::error::{Error, Result};
use crate::extract::Entry;
use crate::output::{HtmlRenderer, MarkdownRenderer};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();
    init_logging(args.verbose);

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr log subscriber; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Analyze {
            files,
            output,
            config,
            format,
            depth,
            title,
            no_line_numbers,
        } => {
            let format = format.map(|f| f.parse::<OutputFormat>()).transpose()?;
            let mut cfg = load_config(config.as_deref())?;
            cfg.merge_cli(format, depth, title, no_line_numbers);
            cfg.validate()?;

            tracing::debug!(
                files = files.len(),
                format = ?cfg.output.format,
                max_depth = cfg.extract.max_depth,
                "Documenting"
            );

            analyze(&files, output.as_deref(), &cfg)
        }

        Command::Render {
            path,
            output,
            config,
            title,
            no_line_numbers,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            cfg.merge_cli(None, None, title, no_line_numbers);
            cfg.validate()?;

            if !path.exists() {
                return Err(Error::PathNotFound(path));
            }

            let contents = std::fs::read_to_string(&path)?;
            let entries: Vec<Entry> = serde_json::from_str(&contents)?;
            let markdown = MarkdownRenderer::new(&cfg.output).render(&entries);

            write_or_print(output.as_deref(), &markdown)
        }

        Command::Serve { port, config } => {
            let cfg = load_config(config.as_deref())?;
            cfg.validate()?;
            let port = port.unwrap_or(cfg.server.port);

            tracing::info!("Serving on http://localhost:{}", port);
            println!("Press Ctrl+C to stop");

            serve::serve(cfg, port)
        }

        Command::Version => {
            println!("codexplain {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Explicit config paths must load; the default one is optional
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE))),
    }
}

/// Per-thread pipeline state for batch runs
struct Worker {
    documenter: Documenter,
    html: Option<HtmlRenderer>,
}

impl Worker {
    fn new(config: &Config) -> Result<Self> {
        let html = match config.output.format {
            OutputFormat::Html => Some(HtmlRenderer::new(&config.output)?),
            _ => None,
        };

        Ok(Self {
            documenter: Documenter::new(config)?,
            html,
        })
    }

    fn document_file(&mut self, path: &Path, format: OutputFormat) -> Result<String> {
        let source = std::fs::read_to_string(path)?;
        let entries = self.documenter.extract(&source)?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "Extracted");

        match (format, &self.html) {
            (OutputFormat::Json, _) => Ok(serde_json::to_string_pretty(&entries)? + "\n"),
            (OutputFormat::Html, Some(html)) => {
                let markdown = self.documenter.render(&entries);
                let filename = path.file_name().and_then(|n| n.to_str());
                html.render_report(filename, &source, &entries, &markdown)
            }
            _ => Ok(self.documenter.render(&entries)),
        }
    }
}

/// Document every file in parallel and write the results in argument order
fn analyze(files: &[PathBuf], output: Option<&Path>, cfg: &Config) -> Result<()> {
    if let Some(missing) = files.iter().find(|p| !p.exists()) {
        return Err(Error::PathNotFound(missing.clone()));
    }

    let format = cfg.output.format;
    let results: Vec<Result<String>> = files
        .par_iter()
        .map_init(
            || Worker::new(cfg),
            |worker, path| match worker {
                Ok(worker) => worker.document_file(path, format),
                Err(e) => Err(Error::other(format!("Failed to start worker: {}", e))),
            },
        )
        .collect();

    let mut failures = Vec::new();
    let mut documents = Vec::new();
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(doc) => documents.push((path, doc)),
            Err(e) => {
                if e.is_input_error() {
                    tracing::warn!(path = %path.display(), error = %e, "Could not document file");
                } else {
                    tracing::error!(path = %path.display(), error = %e, "Could not document file");
                }
                failures.push((path, e));
            }
        }
    }

    write_documents(&documents, output, format)?;

    match failures.len() {
        0 => Ok(()),
        1 if files.len() == 1 => Err(failures.remove(0).1),
        n => {
            for (path, e) in &failures {
                eprintln!("{}: {}", path.display(), e);
            }
            Err(Error::other(format!("{} of {} files failed", n, files.len())))
        }
    }
}

fn write_documents(documents: &[(&PathBuf, String)], output: Option<&Path>, format: OutputFormat) -> Result<()> {
    match output {
        None => {
            let joined: Vec<&str> = documents.iter().map(|(_, doc)| doc.as_str()).collect();
            print!("{}", joined.join("\n"));
            Ok(())
        }
        Some(out) if documents.len() == 1 && !out.is_dir() => write_or_print(Some(out), &documents[0].1),
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            for (path, doc) in documents {
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
                let target = dir.join(format!("{}.{}", stem, format.extension()));
                write_or_print(Some(&target), doc)?;
            }
            Ok(())
        }
    }
}

fn write_or_print(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, contents)?;
            tracing::info!("Written to: {}", path.display());
        }
        None => print!("{}", contents),
    }
    Ok(())
}
