use std::collections::HashMap;
use std::fmt::Write;

use crate::core::{AccessMetrics, AdvisoryBand, FormField};
use crate::report::{heading, Report, ABOUT, PREDICT_ACTION, SUBTITLE, TITLE};

/// What to show under the form after a submission.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Report(Report),
    Error(String),
}

/// What the inputs show after a submission. Rejected entries keep the text
/// that was typed rather than falling back to a default.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    metrics: AccessMetrics,
    rejected: HashMap<FormField, String>,
}

impl FormValues {
    pub fn metrics(&self) -> &AccessMetrics {
        &self.metrics
    }

    pub fn set(&mut self, field: FormField, value: f64) {
        self.rejected.remove(&field);
        self.metrics.set(field, value);
    }

    pub fn reject(&mut self, field: FormField, raw: &str) {
        self.rejected.insert(field, raw.to_string());
    }

    fn display(&self, field: FormField) -> String {
        match self.rejected.get(&field) {
            Some(raw) => raw.clone(),
            None => self.metrics.get(field).to_string(),
        }
    }
}

const STYLE: &str = "body{background:#faf3e0;font-family:Verdana,sans-serif;color:#4a4a4a;max-width:760px;margin:auto;padding:1em}\
h1,h2,h3{text-align:center;font-family:Georgia,serif;color:#2c5f2d}\
.columns{display:grid;grid-template-columns:1fr 1fr;gap:1em}\
label{display:block;margin:.5em 0}input{width:100%}\
button{background:#a2d5c6;border:none;color:#fff;border-radius:10px;font-size:16px;padding:10px 15px}\
.success{background:#e3f4e1;padding:.75em}.warning{background:#fff4cc;padding:.75em}\
.info{background:#e0f0fb;padding:.75em}.error{background:#fde2e1;padding:.75em}\
.explanation{white-space:pre-wrap}.explanation h3,.explanation h4{text-align:left;margin:.5em 0}\
.footer{background:#2c5f2d;color:#fff;text-align:center;padding:10px;border-radius:5px;margin-top:20px}\
.footer a{color:#a2d5c6}";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn input(html: &mut String, field: FormField, values: &FormValues) {
    let _ = write!(
        html,
        "<label>{label}<input type=\"number\" name=\"{key}\" min=\"{min:.1}\" max=\"{max:.1}\" step=\"{step}\" value=\"{value}\" required></label>",
        label = escape_html(&field.to_string()),
        key = field.key(),
        min = FormField::MIN,
        max = FormField::MAX,
        step = FormField::STEP,
        value = escape_html(&values.display(field)),
    );
}

fn explanation(html: &mut String, text: &str) {
    html.push_str("<div class=\"explanation\">");
    for line in text.lines() {
        match heading(line) {
            Some((level, title)) => {
                let level = level.clamp(3, 4);
                let _ = write!(html, "<h{level}>{}</h{level}>", escape_html(title), level = level);
            }
            None => {
                html.push_str(&escape_html(line));
                html.push('\n');
            }
        }
    }
    html.push_str("</div>");
}

/// Renders the whole page. Inputs keep the submitted values.
pub fn render(values: &FormValues, outcome: Option<&PageOutcome>) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Future Water Use Estimator</title><style>{}</style></head><body>",
        STYLE
    );
    let _ = write!(html, "<h1>{}</h1><h3>{}</h3><hr><h3>Input Features</h3>", TITLE, SUBTITLE);

    html.push_str("<form method=\"post\" action=\"/predict\"><div class=\"columns\"><div>");
    let fields = FormField::ALL;
    let (left, right) = fields.split_at(3);
    for field in left {
        input(&mut html, *field, values);
    }
    html.push_str("</div><div>");
    for field in right {
        input(&mut html, *field, values);
    }
    let _ = write!(html, "</div></div><hr><button type=\"submit\">{}</button></form>", PREDICT_ACTION);

    match outcome {
        Some(PageOutcome::Report(report)) => {
            let _ = write!(html, "<div class=\"success\">{}</div>", escape_html(&report.headline));
            explanation(&mut html, &report.explanation);
            if let Some((band, message)) = report.advisory {
                let class = match band {
                    AdvisoryBand::High => "warning",
                    _ => "info",
                };
                let _ = write!(html, "<div class=\"{}\">{}</div>", class, escape_html(message));
            }
        }
        Some(PageOutcome::Error(message)) => {
            let _ = write!(html, "<div class=\"error\">{}</div>", escape_html(message));
        }
        None => {}
    }

    let _ = write!(
        html,
        "<div class=\"footer\"><p><strong>About This App</strong></p><p>{}</p>\
<p>Learn more about global water management initiatives on <a href=\"https://www.unwater.org\" target=\"_blank\">UN Water</a>.</p></div></body></html>",
        ABOUT
    );
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Estimate, FeatureVector, Prediction};

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_form_lists_fields_in_screen_order() {
        let html = render(&FormValues::default(), None);
        let positions: Vec<usize> = FormField::ALL
            .iter()
            .map(|f| html.find(&format!("name=\"{}\"", f.key())).unwrap())
            .collect();

        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert!(html.contains("name=\"urban_basic\" min=\"0.0\" max=\"100.0\" step=\"0.1\" value=\"70\""));
        assert!(!html.contains("class=\"success\""));
        assert!(html.contains("Future Water Use Estimator by Hannah and Samuel"));
    }

    #[test]
    fn test_report_and_advisory() {
        let estimate = Estimate {
            features: FeatureVector::from(&AccessMetrics::default()),
            prediction: Prediction::new(123.456),
        };
        let outcome = PageOutcome::Report(Report::new(&estimate));
        let html = render(&FormValues::default(), Some(&outcome));

        assert!(html.contains("Predicted Future Water Use: 123.46 units"));
        assert!(html.contains("class=\"warning\""));
        assert!(html.contains("potential water scarcity"));
        assert!(html.contains("<h3>What Does This Mean?</h3>"));
        assert!(html.contains("<h4>Explanation:</h4>"));
        assert!(!html.contains("###"));
    }

    #[test]
    fn test_rejected_input_is_echoed() {
        let mut values = FormValues::default();
        values.set(FormField::UrbanBasic, 81.5);
        values.reject(FormField::RuralBasic, "12\"abc");

        let html = render(&values, Some(&PageOutcome::Error("bad".to_string())));
        assert!(html.contains("name=\"rural_basic\" min=\"0.0\" max=\"100.0\" step=\"0.1\" value=\"12&quot;abc\""));
        assert!(html.contains("name=\"urban_basic\" min=\"0.0\" max=\"100.0\" step=\"0.1\" value=\"81.5\""));
        assert_eq!(values.metrics().rural_basic, 50.0);
    }

    #[test]
    fn test_error_is_escaped() {
        let outcome = PageOutcome::Error("Error during prediction: <bad>".to_string());
        let html = render(&FormValues::default(), Some(&outcome));

        assert!(html.contains("<div class=\"error\">Error during prediction: &lt;bad&gt;</div>"));
        assert!(html.contains("<form method=\"post\""));
    }
}
