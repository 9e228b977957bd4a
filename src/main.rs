use std::time::Duration;
use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use water_use_estimator::api::PredictionResponse;
use water_use_estimator::cli::{Cli, Commands};
use water_use_estimator::core::{AccessMetrics, EstimatorResult, Settings};
use water_use_estimator::monitoring::{self, TelemetryManager};
use water_use_estimator::report::{load_error_message, prediction_error_message, Report};
use water_use_estimator::App;

fn load_with_spinner(settings: Settings, telemetry: TelemetryManager) -> EstimatorResult<App> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(format!("Loading model from {}", settings.model_path.display()));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = App::bootstrap(settings, telemetry);
    spinner.finish_and_clear();
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv().ok();

    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())
        .context("Failed to load settings")?
        .with_model_path(cli.model.clone());

    let command = cli.command.unwrap_or(Commands::Form);
    if let Commands::Serve { host, port } = &command {
        if let Some(host) = host {
            settings.server.host = host.clone();
        }
        if let Some(port) = port {
            settings.server.port = *port;
        }
    }

    let telemetry = monitoring::init_telemetry(&settings.log_level);
    info!("Water use estimator starting up...");

    // The form is never shown without a model
    let app = match load_with_spinner(settings, telemetry) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{}", style(load_error_message(&e)).red().bold());
            std::process::exit(1);
        }
    };

    match command {
        Commands::Form => {
            water_use_estimator::track_performance!("interactive_form");
            app.form().run()?;
        }
        Commands::Predict(args) => {
            let metrics = AccessMetrics::from(&args);
            match app.estimate(&metrics) {
                Ok(estimate) if args.json => {
                    let response = PredictionResponse::from(&estimate);
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                Ok(estimate) => println!("{}", Report::new(&estimate).render_terminal()),
                Err(e) => {
                    eprintln!("{}", style(prediction_error_message(&e)).red());
                    std::process::exit(1);
                }
            }
        }
        Commands::Serve { .. } => {
            app.serve().await.context("Web form server failed")?;
        }
        Commands::Inspect => {
            let model = app.model();
            println!("Model:    {}", model.metadata.name);
            println!("Path:     {}", model.path.display());
            println!("Kind:     {}", model.metadata.kind);
            println!("Trees:    {}", model.metadata.n_trees);
            println!("Features: {}", model.metadata.n_features);
        }
    }

    Ok(())
}
