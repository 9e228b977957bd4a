pub mod interactive;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::AccessMetrics;

pub use interactive::InteractiveForm;

/// Estimate future water use from water access metrics
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Model artifact to load instead of the configured one
    #[arg(short, long, global = true, env = "WATER_USE_MODEL")]
    pub model: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fill in the form interactively (default)
    Form,
    /// Run a single prediction from flags
    Predict(PredictArgs),
    /// Serve the form over HTTP
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show information about the loaded model
    Inspect,
}

#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    /// Basic Rural Water Access (%)
    #[arg(long, default_value_t = 50.0)]
    pub rural_basic: f64,

    /// Basic Urban Water Access (%)
    #[arg(long, default_value_t = 70.0)]
    pub urban_basic: f64,

    /// Limited National Water Access (%)
    #[arg(long, default_value_t = 5.0)]
    pub national_limited: f64,

    /// Unimproved National Water Access (%)
    #[arg(long, default_value_t = 10.0)]
    pub national_unimproved: f64,

    /// Unimproved Rural Water Access (%)
    #[arg(long, default_value_t = 20.0)]
    pub rural_unimproved: f64,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl From<&PredictArgs> for AccessMetrics {
    fn from(args: &PredictArgs) -> Self {
        Self {
            rural_basic: args.rural_basic,
            urban_basic: args.urban_basic,
            national_limited: args.national_limited,
            national_unimproved: args.national_unimproved,
            rural_unimproved: args.rural_unimproved,
        }
    }
}
