//! CLI tool for publishing code-only notebooks for every book chapter.

use anyhow::{Context, Result};
use clap::Parser;
use lecture_notebook::{chapters_from_config, HeaderConfig, NotebookPublisher};
use std::path::PathBuf;

/// Convert book chapters with Python code into stripped notebooks.
#[derive(Parser, Debug)]
#[command(name = "publish-notebooks")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Quarto book configuration listing the chapters
    #[arg(short, long, default_value = "_quarto.yml")]
    config: PathBuf,

    /// Directory receiving the published notebooks
    #[arg(short, long, default_value = "../book-published-code")]
    out: PathBuf,

    /// JSON file overriding the header cell (book_title, book_url, authors, colab_base)
    #[arg(long)]
    header: Option<PathBuf>,

    /// Base URL of the published notebooks used by the Colab badge
    #[arg(long)]
    repo_url: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = std::fs::read_to_string(&args.config)
        .with_context(|| format!("Failed to read {}", args.config.display()))?;
    let chapters = chapters_from_config(&config);

    let header = header_config(&args)?;

    let book_dir = args
        .config
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    let publisher = NotebookPublisher::new(&args.out).with_header(header);
    let plan = publisher.plan(&book_dir, &chapters);

    println!("Found {} chapters in {}", chapters.len(), args.config.display());
    println!("Processing {} chapters with Python code", plan.len());

    for (chapter, name) in &plan {
        println!("Converting {}...", chapter.display());
        let path = publisher
            .publish(chapter, name)
            .with_context(|| format!("Failed to publish {}", chapter.display()))?;
        log::info!("Published {}", path.display());
    }

    println!("Done!");
    Ok(())
}

/// Header cell settings from `--header`, with `--repo-url` taking precedence.
fn header_config(args: &Args) -> Result<HeaderConfig> {
    let mut header = match &args.header {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            HeaderConfig::from_json(&text)?
        }
        None => HeaderConfig::default(),
    };
    if let Some(url) = &args.repo_url {
        header.colab_base = url.clone();
    }
    Ok(header)
}
