use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use casegraph::case::{filter_cases, load_cases, sample_cases};
use casegraph::selection::NoCards;
use casegraph::{CaseRecord, GraphConfig, GraphView, logging, svg};

/// Lay out, render and summarise related legal cases.
#[derive(Parser)]
#[command(name = "casegraph")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// JSON array of case records; the bundled sample is used when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Keep only cases whose name, description or id contains this text
    #[arg(short, long)]
    query: Option<String>,
}

/// Canvas options for commands that run the layout
#[derive(Args, Debug, Clone)]
struct LayoutArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Canvas width in pixels
    #[arg(long, default_value = "800")]
    width: f32,

    /// Canvas height in pixels
    #[arg(long, default_value = "600")]
    height: f32,

    /// Upper bound on simulation ticks
    #[arg(long, default_value = "1000")]
    max_iterations: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Print settled node positions as JSON
    Layout {
        #[command(flatten)]
        args: LayoutArgs,
    },
    /// Write the settled layout as an SVG image
    Render {
        #[command(flatten)]
        args: LayoutArgs,

        /// Output SVG file
        #[arg(short, long, default_value = "graph.svg")]
        output: PathBuf,
    },
    /// Print the summary panel
    Stats {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GraphConfig> {
    match path {
        Some(path) => GraphConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(GraphConfig::default()),
    }
}

fn read_cases(args: &InputArgs) -> anyhow::Result<Vec<CaseRecord>> {
    let cases = match &args.input {
        Some(path) => load_cases(path)
            .with_context(|| format!("failed to read cases from {}", path.display()))?,
        None => sample_cases(),
    };
    Ok(match &args.query {
        Some(query) => filter_cases(&cases, query),
        None => cases,
    })
}

/// Build a view and run its layout to rest
fn settled_view(config: GraphConfig, args: &LayoutArgs) -> anyhow::Result<GraphView<NoCards>> {
    let cases = read_cases(&args.input)?;
    let mut view = GraphView::new(config)?;
    view.resize(args.width, args.height);
    view.set_cases(&cases);
    anyhow::ensure!(
        view.size().is_measured(),
        "canvas size {}x{} is empty",
        args.width,
        args.height
    );
    let iterations = view.settle(args.max_iterations);
    tracing::info!(
        nodes = view.graph().len(),
        edges = view.graph().edges.len(),
        iterations,
        "layout finished"
    );
    Ok(view)
}

fn layout(config: GraphConfig, args: &LayoutArgs) -> anyhow::Result<()> {
    let view = settled_view(config, args)?;
    let snapshot = view.snapshot().context("layout produced no snapshot")?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn render(config: GraphConfig, args: &LayoutArgs, output: &Path) -> anyhow::Result<()> {
    let view = settled_view(config, args)?;
    let frame = view.frame().context("layout produced no frame")?;
    svg::write_svg(&frame, view.size(), output)?;
    println!(
        "Rendered {} cases to {}",
        frame.nodes.len(),
        output.display()
    );
    Ok(())
}

fn stats(config: GraphConfig, args: &InputArgs) -> anyhow::Result<()> {
    let cases = read_cases(args)?;
    let mut view: GraphView<NoCards> = GraphView::new(config)?;
    view.set_cases(&cases);
    println!("{}", view.stats());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Layout { args } => layout(config, &args),
        Commands::Render { args, output } => render(config, &args, &output),
        Commands::Stats { input } => stats(config, &input),
    }
}
