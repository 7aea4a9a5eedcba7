mod generators;

use std::alloc::System;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use graph_race_core::{
    is_installed, run_benchmark, AdjacencyMatrix, BenchmarkConfig, BenchmarkReport, SamplingMode,
    Timeline, TrackingAllocator, VertexId,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use generators::{Generator, GeneratorKind, Point};

#[global_allocator]
static ALLOCATOR: TrackingAllocator<System> = TrackingAllocator::system();

/// Timeline checkpoints printed after each table, as fractions of the pass.
const CHECKPOINTS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

#[derive(Parser)]
#[command(name = "graph-race-bench")]
#[command(version, about = "Race seven shortest-path algorithms over synthetic planar graphs")]
struct Cli {
    /// Graph generator to benchmark
    #[arg(short, long, value_enum, default_value_t = GeneratorKind::All)]
    generator: GeneratorKind,

    /// Vertices per generated graph (the matrix holds vertices² cells)
    #[arg(short = 'n', long, default_value_t = 400)]
    vertices: usize,

    /// Route start vertex
    #[arg(short, long, default_value_t = 0)]
    source: VertexId,

    /// Route end vertex (default: last vertex)
    #[arg(short, long)]
    destination: Option<VertexId>,

    /// TOML benchmark config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable allocation tracking for every algorithm
    #[arg(long)]
    no_memory: bool,

    /// Sample interval in milliseconds
    #[arg(long)]
    interval_ms: Option<f64>,

    /// Sample from a background thread instead of the allocation hook
    #[arg(long)]
    background_sampling: bool,

    /// Print the full reports as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<BenchmarkConfig> {
    let Some(path) = path else {
        return Ok(BenchmarkConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn parse_config(text: &str) -> Result<BenchmarkConfig> {
    Ok(toml::from_str(text)?)
}

/// CLI flags win over the config file.
fn apply_overrides(config: &mut BenchmarkConfig, cli: &Cli) {
    if cli.no_memory {
        config.track_memory = false;
    }
    if let Some(interval) = cli.interval_ms {
        config.sample_interval_ms = interval;
    }
    if cli.background_sampling {
        config.sampling = SamplingMode::Background;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    // Validate before generating anything.
    if config.track_memory {
        config.sampling_config()?;
    }

    let mut reports = Vec::new();
    for (name, generator) in cli.generator.generators() {
        let (graph, report) = bench_generator(name, generator, &cli, &config)?;
        if cli.json {
            reports.push(serde_json::json!({ "generator": name, "report": report }));
        } else {
            print_report(name, &graph, &report);
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if config.track_memory && !is_installed() {
        warn!("tracking allocator not active; memory columns read zero");
    }
    Ok(())
}

fn bench_generator(
    name: &str,
    generator: Generator,
    cli: &Cli,
    config: &BenchmarkConfig,
) -> Result<(AdjacencyMatrix, BenchmarkReport)> {
    let t = Instant::now();
    let source = generator(cli.vertices);
    let graph = AdjacencyMatrix::build(&source, Point::distance)
        .with_context(|| format!("{name}: generated graph is invalid"))?;
    info!(
        generator = name,
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        elapsed_ms = t.elapsed().as_secs_f64() * 1000.0,
        "graph generated"
    );

    let destination = cli
        .destination
        .unwrap_or_else(|| graph.vertex_count().saturating_sub(1) as VertexId);
    let report = run_benchmark(&graph, cli.source, destination, config)
        .with_context(|| format!("{name}: benchmark failed"))?;
    Ok((graph, report))
}

fn print_report(name: &str, graph: &AdjacencyMatrix, report: &BenchmarkReport) {
    println!("--- {} ---", name);
    println!(
        "{} vertices, {} edges, ~{:.1}MB matrix",
        graph.vertex_count(),
        graph.edge_count(),
        graph.memory_usage() as f64 / 1_048_576.0
    );
    println!("Route {} -> {}", report.source, report.destination);
    println!();

    println!(
        "{:<16} {:>10} {:>10} {:>6} {:>9} {:>12} {:>8}",
        "algorithm", "time", "distance", "hops", "coverage", "peak alloc", "samples"
    );
    println!(
        "{:-<16} {:->10} {:->10} {:->6} {:->9} {:->12} {:->8}",
        "", "", "", "", "", "", ""
    );
    for run in report.valid_runs() {
        let meta = &run.metadata;
        let distance = if meta.found_path {
            format!("{:.3}", meta.total_distance)
        } else {
            "no path".to_string()
        };
        println!(
            "{:<16} {:>8.3}ms {:>10} {:>6} {:>8.1}% {:>10.1}KB {:>8}",
            run.kind.name(),
            meta.duration().as_secs_f64() * 1000.0,
            distance,
            run.hop_count(),
            meta.graph_traversal_percentage * 100.0,
            meta.peak_memory_usage as f64 / 1024.0,
            meta.memory_tracking_data.len()
        );
    }
    if let Some(fastest) = report.fastest() {
        println!("Fastest: {}", fastest.kind);
    }

    // Edges seen (completed) per algorithm at points along the shared timeline.
    let timeline = Timeline::new(report);
    println!();
    print!("{:<16}", "timeline");
    for fraction in CHECKPOINTS {
        print!(" {:>12}", format!("{:.0}%", fraction * 100.0));
    }
    println!();
    for run in report.valid_runs() {
        print!("{:<16}", run.kind.name());
        for fraction in CHECKPOINTS {
            let t = timeline.duration() * fraction;
            let cell = timeline
                .progress(run.kind, t)
                .map(|p| format!("{} ({})", p.traversed, p.completed))
                .unwrap_or_default();
            print!(" {:>12}", cell);
        }
        println!();
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_race_core::AlgorithmKind;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("graph-race-bench").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_config_sections() {
        let config = parse_config(
            r#"
            sample_interval_ms = 0.5
            sampling = "background"

            [algorithms.floyd_warshall]
            enabled = false

            [algorithms.dfs]
            track_memory = false
            "#,
        )
        .unwrap();
        assert_eq!(config.sample_interval_ms, 0.5);
        assert_eq!(config.sampling, SamplingMode::Background);
        assert!(!config.algorithms.get(AlgorithmKind::FloydWarshall).enabled);
        assert!(config.algorithms.get(AlgorithmKind::Dfs).enabled);
        assert!(!config.tracks(AlgorithmKind::Dfs));
        assert!(config.track_memory);
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), BenchmarkConfig::default());
    }

    #[test]
    fn test_unknown_sampling_mode_rejected() {
        assert!(parse_config(r#"sampling = "sometimes""#).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = parse_config("sample_interval_ms = 2.0").unwrap();
        apply_overrides(
            &mut config,
            &cli(&["--no-memory", "--interval-ms", "0.25", "--background-sampling"]),
        );
        assert!(!config.track_memory);
        assert_eq!(config.sample_interval_ms, 0.25);
        assert_eq!(config.sampling, SamplingMode::Background);
    }

    #[test]
    fn test_cli_defaults_keep_config() {
        let mut config = parse_config("sample_interval_ms = 2.0").unwrap();
        apply_overrides(&mut config, &cli(&[]));
        assert!(config.track_memory);
        assert_eq!(config.sample_interval_ms, 2.0);
        assert_eq!(config.sampling, SamplingMode::Inline);
    }

    #[test]
    fn test_bench_generator_default_route() {
        let args = cli(&["-g", "grid", "-n", "36", "--no-memory"]);
        let mut config = BenchmarkConfig::default();
        apply_overrides(&mut config, &args);
        let (graph, report) =
            bench_generator("grid", generators::gen_grid, &args, &config).unwrap();
        assert_eq!(report.destination, 35);
        assert_eq!(report.runs.len(), AlgorithmKind::COUNT);
        assert!(report.runs.iter().all(|r| r.metadata.found_path));
        assert_eq!(report.edge_count, graph.edge_count());
    }

    #[test]
    fn test_bench_generator_disabled_algorithm_reported_invalid() {
        let args = cli(&["-g", "ring", "-n", "20", "--no-memory"]);
        let mut config = parse_config("[algorithms.bellman_ford]\nenabled = false").unwrap();
        apply_overrides(&mut config, &args);
        let (_, report) = bench_generator("ring", generators::gen_ring, &args, &config).unwrap();
        assert_eq!(report.runs.len(), AlgorithmKind::COUNT);
        assert!(!report.run(AlgorithmKind::BellmanFord).unwrap().metadata.valid);
        assert_eq!(report.valid_runs().count(), AlgorithmKind::COUNT - 1);
    }

    #[test]
    fn test_bench_generator_bad_destination() {
        let args = cli(&["-n", "10", "-d", "10", "--no-memory"]);
        let config = BenchmarkConfig {
            track_memory: false,
            ..BenchmarkConfig::default()
        };
        assert!(bench_generator("ring", generators::gen_ring, &args, &config).is_err());
    }
}
