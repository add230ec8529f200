use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dagcore::ExecutionEvent;
use dagruntime::{Graph, GraphDocument, GraphRuntime, RuntimeConfig, Schedule};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dag")]
#[command(about = "Dataflow graph engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a graph description file
    Run {
        /// Path to graph JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Upper bound on nodes computing at once
        #[arg(short = 'j', long, default_value_t = RuntimeConfig::default().max_parallel_nodes)]
        parallel: usize,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check a graph file without running it
    Validate {
        /// Path to graph JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Print the signature and parameters of a node type as JSON
    Describe {
        /// Registered type name, e.g. ToString
        node_type: String,
    },

    /// Create a new example graph
    Init {
        /// Output file path
        #[arg(short, long, default_value = "graph.json")]
        output: PathBuf,
    },
}

/// `RUST_LOG` wins when set; otherwise info, or debug with `--verbose`
fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            parallel,
            verbose,
        } => {
            init_logging(verbose);
            run_graph(&file, parallel).await?;
        }

        Commands::Validate { file } => {
            init_logging(false);
            validate_graph(&file)?;
        }

        Commands::Nodes => {
            list_nodes();
        }

        Commands::Describe { node_type } => {
            describe_node(&node_type)?;
        }

        Commands::Init { output } => {
            create_example_graph(&output)?;
        }
    }

    Ok(())
}

fn load_document(file: &Path) -> Result<GraphDocument> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let document: GraphDocument = serde_json::from_str(&json)
        .with_context(|| format!("parsing {}", file.display()))?;
    Ok(document)
}

async fn run_graph(file: &Path, parallel: usize) -> Result<()> {
    println!("Loading graph from: {}", file.display());
    let document = load_document(file)?;
    tracing::debug!("Loaded graph document '{}'", document.name);

    println!("Graph: {}", document.name);
    println!("   Nodes: {}", document.nodes.len());
    println!("   Connections: {}", document.connections.len());
    println!();

    let runtime = GraphRuntime::with_config(
        dagnodes::standard_registry(),
        RuntimeConfig {
            max_parallel_nodes: parallel,
            ..RuntimeConfig::default()
        },
    );
    let mut graph = document.build(runtime.registry().clone())?;

    let mut events = runtime.subscribe_events();
    let result = runtime.run(&mut graph).await;

    for event in drain_events(&mut events) {
        print_event(&event);
    }

    let report = result?;
    println!();
    println!("Execution Summary:");
    println!("   Execution ID: {}", report.execution_id);
    println!(
        "   Completed: {}/{} nodes ({} skipped)",
        report.completed, report.total, report.skipped
    );

    print_outputs(&graph);
    Ok(())
}

/// Everything buffered on the receiver. When the bus overflowed, the oldest
/// events are gone and draining resumes at the oldest one still held.
fn drain_events(events: &mut broadcast::Receiver<ExecutionEvent>) -> Vec<ExecutionEvent> {
    let mut drained = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => drained.push(event),
            Err(TryRecvError::Lagged(missed)) => {
                tracing::warn!("Event buffer overflowed, {} events not shown", missed);
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    drained
}

fn print_event(event: &ExecutionEvent) {
    match event {
        ExecutionEvent::RunStarted { node_count, .. } => {
            println!("Run started ({} nodes)", node_count);
        }
        ExecutionEvent::NodeCompleted {
            node_id, node_type, ..
        } => {
            println!("  ok    node {} ({})", node_id, node_type);
        }
        ExecutionEvent::NodeSkipped {
            node_id, node_type, ..
        } => {
            println!("  skip  node {} ({})", node_id, node_type);
        }
        ExecutionEvent::NodeFailed { node_id, error, .. } => {
            println!("  FAIL  node {}: {}", node_id, error);
        }
        ExecutionEvent::RunCompleted {
            success,
            duration_ms,
            ..
        } => {
            if *success {
                println!("Run completed successfully in {}ms", duration_ms);
            } else {
                println!("Run failed after {}ms", duration_ms);
            }
        }
    }
}

fn print_outputs(graph: &Graph) {
    if graph.output_count() == 0 {
        return;
    }
    println!();
    println!("Outputs:");
    for (index, pin) in graph.outputs().iter().enumerate() {
        match graph.output_value(index) {
            Ok(value) => println!(
                "   [{}] node {} output {}: {} ({})",
                index,
                pin.node,
                pin.output,
                value,
                value.value_type()
            ),
            Err(e) => println!("   [{}] node {} output {}: {}", index, pin.node, pin.output, e),
        }
    }
}

fn validate_graph(file: &Path) -> Result<()> {
    println!("Validating graph: {}", file.display());

    let document = load_document(file)?;
    let graph = document.build(dagnodes::standard_registry())?;
    let schedule = Schedule::build(&graph)?;

    println!("Graph is valid:");
    println!("   Name: {}", document.name);
    println!("   Nodes: {}", graph.node_count());
    println!("   Connections: {}", graph.edges().len());
    println!("   Outputs: {}", graph.output_count());
    println!("   Gated nodes: {}", schedule.gates.len());
    println!("   Order: {:?}", schedule.order);

    Ok(())
}

fn list_nodes() {
    println!("Available Node Types:");
    println!();

    let registry = dagnodes::standard_registry();
    for node_type in registry.list_node_types() {
        if let Some(metadata) = registry.get_metadata(&node_type) {
            if metadata.name == node_type {
                println!("  * {} ({})", node_type, metadata.category);
            } else {
                println!("  * {} ({}, alias of {})", node_type, metadata.category, metadata.name);
            }
            println!("    {}", metadata.description);
        } else {
            println!("  * {}", node_type);
        }
    }
}

fn describe_node(node_type: &str) -> Result<()> {
    let registry = dagnodes::standard_registry();
    let json = registry.type_spec_json(node_type)?;
    let pretty: serde_json::Value = serde_json::from_str(&json)?;
    println!("{}", serde_json::to_string_pretty(&pretty)?);
    Ok(())
}

fn create_example_graph(output: &Path) -> Result<()> {
    let mut document = GraphDocument::new("Example Branch Graph");

    document.add_node(1, "Bool", "Condition").with_param("value", true);
    document.add_node(2, "If", "Branch");
    document.add_node(3, "Number", "Left").with_param("value", 3.0);
    document.add_node(4, "Number", "Right").with_param("value", 4.0);
    document.add_node(5, "AddNumber", "Sum");
    document.add_node(6, "ToString", "Format").with_param("format", "fixed");
    document.add_node(7, "OutputBool", "Then taken");
    document.add_node(8, "OutputBool", "Else taken");

    document.connect(1, 0, 2, 0);
    document.connect(3, 0, 5, 0);
    document.connect(4, 0, 5, 1);
    document.connect(5, 0, 6, 0);
    document.connect(2, 0, 7, 0);
    document.connect(2, 1, 8, 0);

    document.add_output(5, 0);
    document.add_output(6, 0);
    document.add_output(7, 0);
    document.add_output(8, 0);

    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(output, json)?;

    println!("Created example graph: {}", output.display());
    println!();
    println!("Run it with:");
    println!("  dag run --file {}", output.display());

    Ok(())
}
