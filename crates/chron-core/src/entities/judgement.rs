use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Scope;
use crate::errors::CoreError;

/// Structured series judgement returned by the language model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesJudgement {
    pub series_title: String,
    pub umbrella_title: String,
    pub year_primary: Option<i32>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub scope: Scope,
    pub confidence: f64,
}

impl SeriesJudgement {
    /// Check the constraints a JSON Schema shape check does not cover.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] when the confidence is outside
    /// `[0, 1]` or either title is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(CoreError::Validation(format!(
                "confidence {} is outside [0, 1]",
                self.confidence
            )));
        }
        if self.series_title.trim().is_empty() {
            return Err(CoreError::Validation("seriesTitle is empty".into()));
        }
        if self.umbrella_title.trim().is_empty() {
            return Err(CoreError::Validation("umbrellaTitle is empty".into()));
        }
        Ok(())
    }

    /// Trim surrounding whitespace from both titles.
    #[must_use]
    pub fn trimmed(mut self) -> Self {
        self.series_title = self.series_title.trim().to_string();
        self.umbrella_title = self.umbrella_title.trim().to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn judgement(confidence: f64) -> SeriesJudgement {
        SeriesJudgement {
            series_title: "Columbus".into(),
            umbrella_title: "Age of Exploration".into(),
            year_primary: Some(1492),
            year_from: Some(1492),
            year_to: Some(1504),
            scope: Scope::Range,
            confidence,
        }
    }

    #[test]
    fn accepts_confidence_bounds() {
        assert!(judgement(0.0).validate().is_ok());
        assert!(judgement(1.0).validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        assert!(judgement(1.2).validate().is_err());
        assert!(judgement(-0.1).validate().is_err());
        assert!(judgement(f64::NAN).validate().is_err());
    }

    #[test]
    fn rejects_blank_titles() {
        let mut j = judgement(0.8);
        j.umbrella_title = "  ".into();
        assert!(matches!(j.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn trimmed_strips_titles() {
        let mut j = judgement(0.8);
        j.series_title = "  Columbus \n".into();
        assert_eq!(j.trimmed().series_title, "Columbus");
    }
}
