use std::path::PathBuf;

/// Sketch overlap reports
#[derive(clap::Parser, Debug)]
#[command(name = "mpa-report", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Compute a metric group's report for a sketch (JSON on stdout)
    Run(RunArgs),

    /// Depth statistics for a sketch from a rasterStats group (JSON on stdout)
    Depth(DepthArgs),
}

/// Where the project and its datasources live.
#[derive(clap::Args, Debug)]
pub struct ProjectArgs {
    /// Project directory with basic.json, datasources.json, metrics.json, ...
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub project: PathBuf,

    /// Sketch or sketch collection GeoJSON
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub sketch: PathBuf,

    /// Datasource directory, defaults to the project directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub data: Option<PathBuf>,

    /// Base URL for relative datasource URLs, fetched over HTTP instead of --data
    #[arg(long, conflicts_with = "data")]
    pub base_url: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Metric group id, e.g. "boundaryAreaOverlap"
    #[arg(short, long)]
    pub group: String,

    /// Geography for percent totals, defaults to the default boundary
    #[arg(long)]
    pub geography: Option<String>,

    /// Also emit percent-of-total metrics
    #[arg(long)]
    pub percent: bool,

    /// Also evaluate the group's objectives (implies --percent)
    #[arg(long)]
    pub objectives: bool,

    /// Also emit one row per child sketch with every class
    #[arg(long)]
    pub children: bool,

    /// Skip per-child metrics for collections
    #[arg(long)]
    pub no_child_metrics: bool,
}

#[derive(clap::Args, Debug)]
pub struct DepthArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// rasterStats metric group id
    #[arg(short, long, default_value = "depth")]
    pub group: String,
}
