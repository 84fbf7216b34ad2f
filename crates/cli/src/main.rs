//! CLI tool for converting a lecture chapter into a slide deck.

use anyhow::{bail, Context, Result};
use clap::Parser;
use lecture_core::{
    extract_equations, Document, OutputPaths, RenderOrchestrator, SlideLayoutPlanner,
    StructureExtractor,
};
use lecture_latex::LatexRenderer;
use lecture_pptx::{PptxWriter, Template};
use std::path::PathBuf;

/// Convert a Quarto chapter into a PowerPoint presentation.
#[derive(Parser, Debug)]
#[command(name = "chapter-to-slides")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chapter file (.qmd)
    input: PathBuf,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// PowerPoint file whose theme is used as the style base
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Print the planned slides as JSON
    #[arg(long)]
    plan: bool,

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

    if !args.input.exists() {
        bail!("File not found: {}", args.input.display());
    }

    let renderer = LatexRenderer::new();
    renderer
        .probe()
        .context("LaTeX rendering requires `latex` and `dvipng` on PATH")?;

    let result = convert(&args, &renderer);
    renderer.cleanup();
    let paths = result?;

    println!("\nCreated: {}", paths.presentation.display());
    println!("Equations: {}", paths.equations_dir.display());

    Ok(())
}

/// Parse, render, plan and write one chapter.
fn convert(args: &Args, renderer: &LatexRenderer) -> Result<OutputPaths> {
    let paths = OutputPaths::for_input(&args.input, args.output_dir.as_deref());
    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    println!("Parsing {}...", args.input.display());
    let document = Document::load(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let extractor = StructureExtractor::new(document.text());
    let title = extractor.title();
    let sections = extractor.sections();
    let equations = extract_equations(document.text());

    println!("  Title: {}", title);
    println!("  Sections: {}", sections.len());
    println!("  Equations: {}", equations.len());
    log::debug!(
        "Not laid out: {} subsections, {} callouts, {} figures, {} embeds",
        sections.iter().map(|s| s.subsections.len()).sum::<usize>(),
        extractor.callouts().len(),
        extractor.figures().len(),
        extractor.embeds().len()
    );
    log::debug!("Figures directory: {}", paths.figures_dir.display());

    println!("Rendering equations...");
    let report = RenderOrchestrator::new(renderer, &paths.equations_dir)
        .with_preamble(document.preamble())
        .render_all(&equations)
        .with_context(|| {
            format!(
                "Failed to prepare equation directory {}",
                paths.equations_dir.display()
            )
        })?;
    println!("  Rendered {}/{} equations", report.succeeded(), report.total());

    println!("Building presentation...");
    let slides = SlideLayoutPlanner::new().plan(&title, &sections, &equations, &report);

    if args.plan {
        println!("{}", serde_json::to_string_pretty(&slides)?);
    }

    let template = match &args.template {
        Some(path) => Template::load(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?,
        None => Template::default(),
    };

    PptxWriter::new()
        .with_template(template)
        .save(&slides, &paths.presentation)
        .with_context(|| format!("Failed to write {}", paths.presentation.display()))?;

    Ok(paths)
}
