use anyhow::Result;
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::core::{AccessMetrics, FormField};
use crate::ml::{run_inference, Regressor};
use crate::monitoring::TelemetryManager;
use crate::report::{prediction_error_message, Report, ABOUT, PREDICT_ACTION, SUBTITLE, TITLE};

const EDIT_ACTION: &str = "✏️  Edit inputs";
const QUIT_ACTION: &str = "🚪 Quit";

/// Interactive terminal version of the estimator form
pub struct InteractiveForm<'a> {
    model: &'a dyn Regressor,
    telemetry: &'a TelemetryManager,
    theme: ColorfulTheme,
}

impl<'a> InteractiveForm<'a> {
    pub fn new(model: &'a dyn Regressor, telemetry: &'a TelemetryManager) -> Self {
        Self {
            model,
            telemetry,
            theme: ColorfulTheme::default(),
        }
    }

    /// Loop until the user quits. Prediction errors are shown and the loop continues.
    pub fn run(&self) -> Result<()> {
        let term = Term::stdout();
        term.write_line(&style(TITLE).green().bold().to_string())?;
        term.write_line(SUBTITLE)?;
        term.write_line("")?;

        let mut metrics = self.prompt_metrics(&AccessMetrics::default())?;
        let actions = [PREDICT_ACTION, EDIT_ACTION, QUIT_ACTION];

        loop {
            let choice = Select::with_theme(&self.theme)
                .with_prompt("What next?")
                .items(&actions)
                .default(0)
                .interact_on(&term)?;

            match choice {
                0 => {
                    term.write_line("")?;
                    term.write_line(&self.submit(&metrics))?;
                }
                1 => metrics = self.prompt_metrics(&metrics)?,
                _ => break,
            }
        }

        term.write_line(&format!("\n{}", style(ABOUT).dim()))?;
        Ok(())
    }

    /// Ask for each field in on-screen order, defaulting to the previous value.
    fn prompt_metrics(&self, previous: &AccessMetrics) -> Result<AccessMetrics> {
        let mut metrics = *previous;

        for field in FormField::ALL {
            let value: f64 = Input::with_theme(&self.theme)
                .with_prompt(field.to_string())
                .default(previous.get(field))
                .validate_with(move |input: &f64| -> Result<(), String> {
                    field.check(*input).map(|_| ()).map_err(|e| e.to_string())
                })
                .interact_text()?;
            metrics.set(field, value);
        }

        Ok(metrics)
    }

    /// Run the pipeline once and render either the report or the error.
    pub fn submit(&self, metrics: &AccessMetrics) -> String {
        match run_inference(self.model, metrics) {
            Ok(estimate) => {
                self.telemetry.log_prediction("terminal", &estimate);
                Report::new(&estimate).render_terminal()
            }
            Err(e) => {
                self.telemetry.log_error(&e, "terminal form prediction");
                style(prediction_error_message(&e)).red().to_string()
            }
        }
    }
}
