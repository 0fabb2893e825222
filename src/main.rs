use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use labelprop::algorithms::analysis::{CommunitySummary, GraphStatistics};
use labelprop::algorithms::label_propagation::LabelPropagationController;
use labelprop::config::BspConfig;
use labelprop::export::{export, RowWriter, SnapshotWriter, TextWriter, VertexWriter};
use labelprop::generator::{
    PlantedPartition, DEFAULT_COMMUNITIES, DEFAULT_COMMUNITY_SIZE, DEFAULT_P_IN, DEFAULT_P_OUT, DEFAULT_SEED,
};
use labelprop::LpError;


#[derive(Parser, Debug, Serialize)]
#[command(author, version, about)]
struct Args {

    /// Number of planted communities in the generated graph.
    #[arg(short, long, default_value_t = DEFAULT_COMMUNITIES)]
    communities: usize,

    /// Vertices per planted community.
    #[arg(short = 's', long, default_value_t = DEFAULT_COMMUNITY_SIZE)]
    community_size: usize,

    /// Edge probability inside a community.
    #[arg(long, default_value_t = DEFAULT_P_IN)]
    p_in: f64,

    /// Edge probability across communities.
    #[arg(long, default_value_t = DEFAULT_P_OUT)]
    p_out: f64,

    /// Random seed of the generator.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// YAML job configuration. Flags below override it.
    #[arg(long)]
    config: Option<String>,

    /// Worker thread count.
    #[arg(short, long)]
    num_threads: Option<usize>,

    /// Abort the job after this many supersteps.
    #[arg(short, long)]
    max_supersteps: Option<u64>,

    /// Show a progress spinner while supersteps run.
    #[arg(long, default_value_t = false)]
    progress: bool,

    /// Output file for the final labels.
    #[arg(short, long)]
    output: Option<String>,

    /// Output format: text, rows or snapshot.
    #[arg(short, long, default_value_t = String::from("text"))]
    format: String,
}

fn job_config(args: &Args) -> Result<BspConfig, LpError> {
    let mut config = match &args.config {
        Some(path) => BspConfig::from_yaml_file(path)?,
        None => BspConfig::default(),
    };
    if let Some(thread_num) = args.num_threads {
        config.thread_num = thread_num;
    }
    if let Some(max_supersteps) = args.max_supersteps {
        config.max_supersteps = Some(max_supersteps);
    }
    config.show_progress |= args.progress;
    config.validate()?;
    Ok(config)
}

fn writer_for(format: &str, path: &str, supersteps: u64) -> Result<Box<dyn VertexWriter>, LpError> {
    match format {
        "text" => Ok(Box::new(TextWriter::create(path)?)),
        "rows" => Ok(Box::new(RowWriter::create(path)?)),
        "snapshot" => Ok(Box::new(SnapshotWriter::new(path, supersteps))),
        other => Err(LpError::InvalidConfig {
            reason: format!("unknown output format {:?}, expected text, rows or snapshot", other),
        }),
    }
}

fn run(args: Args) -> Result<(), LpError> {
    // Step 1. Assemble the job: configuration and graph.
    let config = job_config(&args)?;
    let generator = PlantedPartition::new(
        args.communities, args.community_size, args.p_in, args.p_out, args.seed
    );
    let graph = generator.build()?;

    let statistics = GraphStatistics::of(&graph);
    info!(
        vertices = statistics.vertex_count,
        edges = statistics.edge_count,
        density = statistics.density,
        average_degree = statistics.average_degree,
        "graph generated"
    );

    // Step 2. Run label propagation to its fixed point. Graphs on which the
    // rule oscillates end with `SuperstepLimit` once `max_supersteps` is hit.
    let controller = LabelPropagationController::new(Arc::new(graph));
    let result = controller.run(config)?;

    let summary = CommunitySummary::of(&result.values);
    info!(
        communities = summary.community_count,
        planted = args.communities,
        largest = ?summary.largest,
        singletons = summary.singleton_count,
        "label propagation finished"
    );
    println!("Label Propagation: {}", result.report());

    // Step 3. Export the final labels.
    if let Some(path) = &args.output {
        let mut writer = writer_for(&args.format, path, result.supersteps)?;
        let rows = export(&result, writer.as_mut())?;
        info!(rows, path = path.as_str(), format = args.format.as_str(), "labels written");
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "job failed");
            ExitCode::FAILURE
        }
    }
}
