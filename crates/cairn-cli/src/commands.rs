use std::sync::Arc;

use anyhow::Context;
use cairn_session::{Repository, SecurityContext, Session, SessionError};
use cairn_store::InMemoryContentStore;
use cairn_subgraph::{
    create_subgraph, expected_count, traverse_subgraph, NameGenerator, RunConfig, RunReport,
    Shape, Stopwatch,
};
use cairn_types::{NodeId, NodePath, NodeType};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Run(args) => cmd_run(args, format),
        Command::Suite(args) => cmd_suite(args, format),
        Command::Expect(args) => cmd_expect(args, format),
    }
}

/// Create and traverse reports of one scenario.
#[derive(Debug, Serialize)]
struct ScenarioOutcome {
    created: RunReport,
    traversed: RunReport,
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<RunConfig> {
    match path {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(RunConfig::default()),
    }
}

fn cmd_run(args: RunArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(path) = args.path {
        config.path = path;
    }
    let shape = config.check_shape(Shape::new(args.branching, args.depth, args.properties)?)?;
    let outcome = run_scenario(&config, shape, args.label.as_deref())?;
    print_outcomes(&[outcome], format)
}

fn cmd_suite(args: SuiteArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let outcomes = config
        .shapes()?
        .into_iter()
        .zip(&config.scenarios)
        .map(|(shape, scenario)| run_scenario(&config, shape, scenario.label.as_deref()))
        .collect::<anyhow::Result<Vec<_>>>()?;
    print_outcomes(&outcomes, format)
}

fn cmd_expect(args: ExpectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let count = expected_count(args.branching, args.depth, args.include_root)?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "branching": args.branching,
                "depth": args.depth,
                "include_root": args.include_root,
                "nodes": count,
            })
        ),
        OutputFormat::Text => println!(
            "{}x{} tree: {} nodes{}",
            args.branching,
            args.depth,
            count.to_string().bold(),
            if args.include_root { " (root included)" } else { "" }
        ),
    }
    Ok(())
}

/// Build, commit and traverse `shape` in a fresh repository.
fn run_scenario(
    config: &RunConfig,
    shape: Shape,
    label: Option<&str>,
) -> anyhow::Result<ScenarioOutcome> {
    let store = InMemoryContentStore::with_workspace(config.workspace.clone());
    let repo = Repository::new(Arc::new(store));
    let mut session = repo.login(SecurityContext::read_write(config.user.clone()));
    let path = NodePath::parse(&config.path)
        .with_context(|| format!("invalid starting path {:?}", config.path))?;
    ensure_path(&mut session, &path)?;

    let mut names = NameGenerator::with_lengths(config.seed, config.names);
    let mut stopwatch = Stopwatch::new();
    let created = create_subgraph(
        &mut session,
        &config.path,
        shape,
        &mut names,
        Some(&mut stopwatch),
        label,
    )?;

    // Fresh laps for the traversal so its timing excludes the build.
    stopwatch.reset();
    let traversed =
        traverse_subgraph(&mut session, &config.path, shape, Some(&mut stopwatch), label)?;
    session.logout();
    Ok(ScenarioOutcome { created, traversed })
}

/// Create and save every missing node along `path`.
fn ensure_path(session: &mut Session, path: &NodePath) -> anyhow::Result<NodeId> {
    let mut current = session.root_node()?;
    let mut walked = NodePath::root();
    for segment in path.segments() {
        walked = walked.join(segment)?;
        current = match session.node_at_path(&walked) {
            Ok(id) => id,
            Err(SessionError::NotFound(_)) => {
                debug!(path = %walked, "creating starting node");
                session.add_node(current, segment, NodeType::unstructured())?
            }
            Err(e) => return Err(e.into()),
        };
    }
    if session.has_pending_changes() {
        session.save().context("saving starting path")?;
    }
    Ok(current)
}

fn print_outcomes(outcomes: &[ScenarioOutcome], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcomes)?),
        OutputFormat::Text => {
            for outcome in outcomes {
                print_report("created", &outcome.created);
                print_report("traversed", &outcome.traversed);
            }
        }
    }
    Ok(())
}

fn print_report(verb: &str, report: &RunReport) {
    println!(
        "{} {} {}",
        "✓".green().bold(),
        verb.cyan(),
        report.description().bold()
    );
    println!("  path: {}", report.path.to_string().yellow());
    if let Some(timing) = report.timing() {
        println!("  {timing}");
    }
    if report.receipt.nodes_created > 0 {
        println!(
            "  committed revision {} ({} nodes, {} properties)",
            report.receipt.revision, report.receipt.nodes_created, report.receipt.properties_written
        );
    }
}
