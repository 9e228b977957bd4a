use ndarray::{arr2, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{EstimatorError, EstimatorResult};

/// Predictions above this are flagged as potential scarcity.
pub const HIGH_USE_THRESHOLD: f64 = 100.0;
/// Predictions below this are flagged as efficient use.
pub const LOW_USE_THRESHOLD: f64 = 30.0;

/// Feature names in the order the regression model was trained on.
pub const FEATURE_NAMES: [&str; 5] = [
    "wat_bas_r",
    "wat_unimp_n",
    "wat_bas_u",
    "wat_lim_n",
    "wat_unimp_r",
];

/// One of the five input fields, listed in on-screen order by [`FormField::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    RuralBasic,
    UrbanBasic,
    NationalLimited,
    NationalUnimproved,
    RuralUnimproved,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::RuralBasic,
        FormField::UrbanBasic,
        FormField::NationalLimited,
        FormField::NationalUnimproved,
        FormField::RuralUnimproved,
    ];

    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;
    pub const STEP: f64 = 0.1;

    pub fn label(self) -> &'static str {
        match self {
            FormField::RuralBasic => "Basic Rural Water Access (%)",
            FormField::UrbanBasic => "Basic Urban Water Access (%)",
            FormField::NationalLimited => "Limited National Water Access (%)",
            FormField::NationalUnimproved => "Unimproved National Water Access (%)",
            FormField::RuralUnimproved => "Unimproved Rural Water Access (%)",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            FormField::RuralBasic => "🌱",
            FormField::UrbanBasic => "🏠",
            FormField::NationalLimited => "🚿",
            FormField::NationalUnimproved => "🪠",
            FormField::RuralUnimproved => "🌾",
        }
    }

    /// Name used for form keys, JSON fields and CLI flags.
    pub fn key(self) -> &'static str {
        match self {
            FormField::RuralBasic => "rural_basic",
            FormField::UrbanBasic => "urban_basic",
            FormField::NationalLimited => "national_limited",
            FormField::NationalUnimproved => "national_unimproved",
            FormField::RuralUnimproved => "rural_unimproved",
        }
    }

    pub fn default_value(self) -> f64 {
        match self {
            FormField::RuralBasic => 50.0,
            FormField::UrbanBasic => 70.0,
            FormField::NationalLimited => 5.0,
            FormField::NationalUnimproved => 10.0,
            FormField::RuralUnimproved => 20.0,
        }
    }

    pub fn check(self, value: f64) -> EstimatorResult<f64> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Ok(value)
        } else {
            Err(EstimatorError::InvalidInput { field: self.label(), value: value.to_string() })
        }
    }

    /// Parses raw text from a form submission and range-checks it.
    pub fn parse(self, raw: &str) -> EstimatorResult<f64> {
        let value = raw.trim().parse::<f64>().map_err(|_| EstimatorError::InvalidInput {
            field: self.label(),
            value: raw.to_string(),
        })?;
        self.check(value)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.label())
    }
}

/// The five user inputs, as laid out on the form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessMetrics {
    pub rural_basic: f64,
    pub urban_basic: f64,
    pub national_limited: f64,
    pub national_unimproved: f64,
    pub rural_unimproved: f64,
}

impl Default for AccessMetrics {
    fn default() -> Self {
        Self {
            rural_basic: FormField::RuralBasic.default_value(),
            urban_basic: FormField::UrbanBasic.default_value(),
            national_limited: FormField::NationalLimited.default_value(),
            national_unimproved: FormField::NationalUnimproved.default_value(),
            rural_unimproved: FormField::RuralUnimproved.default_value(),
        }
    }
}

impl AccessMetrics {
    pub fn get(&self, field: FormField) -> f64 {
        match field {
            FormField::RuralBasic => self.rural_basic,
            FormField::UrbanBasic => self.urban_basic,
            FormField::NationalLimited => self.national_limited,
            FormField::NationalUnimproved => self.national_unimproved,
            FormField::RuralUnimproved => self.rural_unimproved,
        }
    }

    pub fn set(&mut self, field: FormField, value: f64) {
        let slot = match field {
            FormField::RuralBasic => &mut self.rural_basic,
            FormField::UrbanBasic => &mut self.urban_basic,
            FormField::NationalLimited => &mut self.national_limited,
            FormField::NationalUnimproved => &mut self.national_unimproved,
            FormField::RuralUnimproved => &mut self.rural_unimproved,
        };
        *slot = value;
    }

    /// Checks every field against the form bounds, reporting the first offender.
    pub fn validate(&self) -> EstimatorResult<()> {
        for field in FormField::ALL {
            field.check(self.get(field))?;
        }
        Ok(())
    }
}

/// Model input in training order. Differs from the on-screen order:
/// urban-basic is the third slot, national-unimproved the second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; 5]);

impl FeatureVector {
    pub const SLOTS: [FormField; 5] = [
        FormField::RuralBasic,
        FormField::NationalUnimproved,
        FormField::UrbanBasic,
        FormField::NationalLimited,
        FormField::RuralUnimproved,
    ];

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// A single-row matrix of shape (1, 5).
    pub fn to_row(&self) -> Array2<f64> {
        arr2(&[self.0])
    }
}

impl From<&AccessMetrics> for FeatureVector {
    fn from(metrics: &AccessMetrics) -> Self {
        Self(Self::SLOTS.map(|field| metrics.get(field)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryBand {
    High,
    Low,
    Normal,
}

impl AdvisoryBand {
    pub fn classify(value: f64) -> Self {
        if value > HIGH_USE_THRESHOLD {
            AdvisoryBand::High
        } else if value < LOW_USE_THRESHOLD {
            AdvisoryBand::Low
        } else {
            AdvisoryBand::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdvisoryBand::High => "high",
            AdvisoryBand::Low => "low",
            AdvisoryBand::Normal => "normal",
        }
    }

    pub fn message(self) -> Option<&'static str> {
        match self {
            AdvisoryBand::High => {
                Some("⚠️ The predicted value is quite high, indicating potential water scarcity.")
            }
            AdvisoryBand::Low => {
                Some("💧 The predicted water use is low, suggesting efficient water management.")
            }
            AdvisoryBand::Normal => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub value: f64,
    pub band: AdvisoryBand,
}

impl Prediction {
    pub fn new(value: f64) -> Self {
        Self { value, band: AdvisoryBand::classify(value) }
    }

    pub fn formatted(&self) -> String {
        format!("{:.2}", self.value)
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub features: FeatureVector,
    pub prediction: Prediction,
}
