//! Text shown to the user after each prediction, shared by the terminal form
//! and the HTML page.

use console::style;

use crate::core::{AdvisoryBand, Estimate, EstimatorError};

pub const TITLE: &str = "🌟 Future Water Use Estimator by Hannah and Samuel 🌟";
pub const SUBTITLE: &str = "💦 Empowering smarter water management 💦";
pub const PREDICT_ACTION: &str = "🔮 Predict Future Water Use";
pub const ABOUT: &str = "This app predicts the estimated future water usage based on provided \
water access metrics, helping communities and policymakers plan for sustainable water management.";

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub headline: String,
    pub explanation: String,
    pub advisory: Option<(AdvisoryBand, &'static str)>,
}

impl Report {
    pub fn new(estimate: &Estimate) -> Self {
        let value = estimate.prediction.formatted();
        let band = estimate.prediction.band;

        Self {
            headline: format!("🌟 🌟 Predicted Future Water Use: {} units", value),
            explanation: explanation(&value),
            advisory: band.message().map(|message| (band, message)),
        }
    }

    pub fn to_plain_text(&self) -> String {
        let mut text = format!("{}\n\n{}", self.headline, self.explanation);
        if let Some((_, message)) = self.advisory {
            text.push('\n');
            text.push_str(message);
        }
        text
    }

    /// Styled for a terminal; colors are dropped automatically when stdout is not a tty.
    pub fn render_terminal(&self) -> String {
        let mut text = format!("{}\n\n", style(&self.headline).green().bold());
        for line in self.explanation.lines() {
            match heading(line) {
                Some((_, title)) => text.push_str(&style(title).bold().underlined().to_string()),
                None => text.push_str(line),
            }
            text.push('\n');
        }
        if let Some((band, message)) = self.advisory {
            let banner = match band {
                AdvisoryBand::High => style(message).yellow().bold(),
                _ => style(message).cyan(),
            };
            text.push('\n');
            text.push_str(&banner.to_string());
        }
        text
    }
}

fn explanation(value: &str) -> String {
    format!(
        "### What Does This Mean?
The Future Water Use refers to the estimated amount of water resources (in specific units)
that will be required by the population in the future, based on the provided access metrics.

#### Explanation:
- Predicted Value: {value} units represent the expected water demand or usage.
  This value helps identify water needs for basic rural and urban water access, limited access,
  and unimproved access across national and rural areas.
- For example, if the predicted value is 68.03 units, it indicates that approximately 68 units
  of water resources will be needed to meet population demands, considering the current access
  metrics you have entered.

#### Why Is This Important?
Understanding future water use is crucial for:
- Planning: Helps policymakers allocate resources for sustainable water management.
- Sustainability: Supports identifying areas needing immediate intervention.
- Research: Provides data for future projections and water infrastructure development.
",
        value = value
    )
}

/// Splits a `#`-prefixed heading line of the explanation into its level and title.
pub fn heading(line: &str) -> Option<(usize, &str)> {
    let title = line.trim_start_matches('#');
    let level = line.len() - title.len();
    if level == 0 {
        return None;
    }
    title.strip_prefix(' ').map(|title| (level, title))
}

pub fn prediction_error_message(error: &EstimatorError) -> String {
    format!("Error during prediction: {}", error)
}

pub fn load_error_message(error: &EstimatorError) -> String {
    format!("Error loading model: {}", error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AccessMetrics, FeatureVector, Prediction};
    use test_case::test_case;

    fn estimate(value: f64) -> Estimate {
        Estimate {
            features: FeatureVector::from(&AccessMetrics::default()),
            prediction: Prediction::new(value),
        }
    }

    #[test]
    fn test_value_rendered_with_two_decimals() {
        let report = Report::new(&estimate(42.4567));
        let text = report.to_plain_text();

        assert!(text.contains("Predicted Future Water Use: 42.46 units"));
        assert!(text.contains("Predicted Value: 42.46 units"));
        assert!(!text.contains("42.4567"));
    }

    #[test_case(150.0 => Some(AdvisoryBand::High) ; "high")]
    #[test_case(12.0 => Some(AdvisoryBand::Low) ; "low")]
    #[test_case(30.0 => None ; "lower bound is normal")]
    #[test_case(100.0 => None ; "upper bound is normal")]
    fn test_advisory_banner(value: f64) -> Option<AdvisoryBand> {
        let report = Report::new(&estimate(value));
        let text = report.to_plain_text();

        let scarcity = text.contains("potential water scarcity");
        let efficient = text.contains("suggesting efficient water management");
        match report.advisory {
            Some((AdvisoryBand::High, _)) => assert!(scarcity && !efficient),
            Some((AdvisoryBand::Low, _)) => assert!(efficient && !scarcity),
            _ => assert!(!scarcity && !efficient),
        }
        report.advisory.map(|(band, _)| band)
    }

    #[test]
    fn test_terminal_render_keeps_content() {
        let report = Report::new(&estimate(120.0));
        let rendered = console::strip_ansi_codes(&report.render_terminal()).to_string();
        let expected: String = report
            .to_plain_text()
            .lines()
            .map(|line| heading(line).map_or(line, |(_, title)| title))
            .collect::<Vec<_>>()
            .join("\n");

        assert_eq!(rendered, expected);
        assert!(rendered.contains("\nWhat Does This Mean?\n"));
        assert!(!rendered.contains('#'));
    }

    #[test_case("### What Does This Mean?" => Some((3, "What Does This Mean?")))]
    #[test_case("#### Explanation:" => Some((4, "Explanation:")))]
    #[test_case("- Planning: Helps policymakers" => None)]
    #[test_case("#hashtag" => None ; "no space after hashes")]
    fn test_heading(line: &str) -> Option<(usize, &str)> {
        heading(line)
    }

    #[test]
    fn test_error_messages_are_verbatim() {
        let err = EstimatorError::Prediction("X has 3 features".to_string());
        assert_eq!(prediction_error_message(&err), "Error during prediction: X has 3 features");

        let err = EstimatorError::model_load("best_rf_model.json", "model artifact not found");
        assert_eq!(
            load_error_message(&err),
            "Error loading model: cannot load model from best_rf_model.json: model artifact not found"
        );
    }
}
