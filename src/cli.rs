use crate::checklist::build_checklist;
use crate::config::{LayoutConfig, load_config};
use crate::layout::compute_layout;
use crate::ir::Graph;
use crate::layout_dump::{svg_paths, to_json_string, write_render_model};
use crate::normalize::GraphInput;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "flowmap",
    version,
    about = "Layered left-to-right layout for node/edge graphs"
)]
pub struct Args {
    /// Input graph (JSON or JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "layout")]
    pub output_format: OutputFormat,

    /// Layout config file (camelCase overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport height layers are centered in
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Pretty-print JSON output; with `order`, print a plain-text checklist
    #[arg(long = "pretty")]
    pub pretty: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Render model JSON
    Layout,
    /// Dependency checklist
    Order,
    /// One `id<TAB>path` line per routed edge
    SvgPaths,
}

pub fn run() -> Result<()> {
    init_tracing();
    execute(Args::parse())
}

fn execute(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(height) = args.height {
        config.viewport_height = height;
    }

    let input = read_input(args.input.as_deref())?;
    match (args.output_format, args.output.as_deref()) {
        (OutputFormat::Layout, Some(path)) => {
            let model = compute_layout(&load_graph(&input)?, &config);
            write_render_model(path, &model, args.pretty)
                .with_context(|| format!("failed to write {}", path.display()))
        }
        (format, path) => {
            let output = render(&input, &config, format, args.pretty)?;
            write_output(&output, path)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Fails only when a subscriber is already installed.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .ok();
}

fn load_graph(input: &str) -> Result<Graph> {
    let graph = GraphInput::from_json_str(input)?.normalize();
    tracing::info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "loaded graph"
    );
    Ok(graph)
}

/// Turns one graph document into the requested output text.
pub fn render(
    input: &str,
    config: &LayoutConfig,
    format: OutputFormat,
    pretty: bool,
) -> Result<String> {
    let graph = load_graph(input)?;
    match format {
        OutputFormat::Layout => to_json_string(&compute_layout(&graph, config), pretty),
        OutputFormat::Order => {
            let checklist = build_checklist(&graph);
            if pretty {
                Ok(checklist.to_text())
            } else {
                to_json_string(&checklist, false)
            }
        }
        OutputFormat::SvgPaths => Ok(svg_paths(&compute_layout(&graph, config))),
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(contents: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    const CYCLIC: &str = r#"{
        "nodes": [{"id": "a"}, {"id": "b"}],
        "edges": [
            {"source": "a", "target": "b", "label": "x"},
            {"source": "b", "target": "a", "label": "y"}
        ]
    }"#;

    #[test]
    fn parses_flags() {
        let args = Args::parse_from([
            "flowmap", "-i", "graph.json", "-e", "svg-paths", "-H", "600", "--pretty",
        ]);
        assert_eq!(args.input, Some(PathBuf::from("graph.json")));
        assert_eq!(args.output_format, OutputFormat::SvgPaths);
        assert_eq!(args.height, Some(600.0));
        assert!(args.pretty);
    }

    #[test]
    fn layout_output_is_stable_json() {
        let config = LayoutConfig::default();
        let first = render(CYCLIC, &config, OutputFormat::Layout, false).expect("layout");
        let second = render(CYCLIC, &config, OutputFormat::Layout, false).expect("layout");
        assert_eq!(first, second);
        let value: serde_json::Value = serde_json::from_str(&first).expect("json");
        assert_eq!(value["removedEdges"][0]["source"], "b");
    }

    #[test]
    fn order_output_reports_cycles_without_failing() {
        let config = LayoutConfig::default();
        let json = render(CYCLIC, &config, OutputFormat::Order, false).expect("order");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["ordered"], false);
        let text = render(CYCLIC, &config, OutputFormat::Order, true).expect("order");
        assert!(text.starts_with("# unordered"));
    }

    #[test]
    fn layout_to_a_file_matches_stdout_form() {
        let dir = std::env::temp_dir();
        let stem = format!("flowmap-cli-{}", std::process::id());
        let input = dir.join(format!("{stem}.json"));
        let output = dir.join(format!("{stem}.out.json"));
        std::fs::write(&input, CYCLIC).expect("write input");

        let args = Args::parse_from([
            OsStr::new("flowmap"),
            OsStr::new("-i"),
            input.as_os_str(),
            OsStr::new("-o"),
            output.as_os_str(),
            OsStr::new("--pretty"),
        ]);
        execute(args).expect("execute");
        let written = std::fs::read_to_string(&output).expect("read output");
        let _ = std::fs::remove_file(&input);
        let _ = std::fs::remove_file(&output);

        let expected =
            render(CYCLIC, &LayoutConfig::default(), OutputFormat::Layout, true).expect("layout");
        assert_eq!(written, expected);
    }

    #[test]
    fn tracing_init_tolerates_repeat_calls() {
        init_tracing();
        init_tracing();
    }

    #[test]
    fn malformed_input_is_an_error() {
        let config = LayoutConfig::default();
        assert!(render("not a graph", &config, OutputFormat::Layout, false).is_err());
    }
}
