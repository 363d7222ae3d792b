use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DigitEyeError, Result};
use crate::grid::PixelGrid;

/// Number of classes the classifier distinguishes (digits 0-9).
pub const NUM_CLASSES: usize = 10;

/// Classifier response for one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_digit: u8,
    pub confidence: f32,
    pub probabilities: Vec<f32>,
}

impl PredictionResult {
    /// Check the response shape: digit in range, one probability per class.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if usize::from(self.predicted_digit) >= NUM_CLASSES {
            return Err(format!("predicted_digit {} is not 0-9", self.predicted_digit));
        }
        if self.probabilities.len() != NUM_CLASSES {
            return Err(format!(
                "expected {NUM_CLASSES} probabilities, got {}",
                self.probabilities.len()
            ));
        }
        if !self.confidence.is_finite() || self.probabilities.iter().any(|p| !p.is_finite()) {
            return Err("non-finite confidence or probability".into());
        }
        Ok(())
    }

    /// Index of the largest probability (first one on ties).
    pub fn argmax(&self) -> Option<u8> {
        self.probabilities
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, p)| match best {
                Some((_, bp)) if bp >= *p => best,
                _ => Some((i, *p)),
            })
            .map(|(i, _)| i as u8)
    }

    pub fn probability_sum(&self) -> f32 {
        self.probabilities.iter().sum()
    }

    /// Classes sorted by descending probability.
    pub fn ranked(&self) -> Vec<(u8, f32)> {
        let mut ranked: Vec<(u8, f32)> = self
            .probabilities
            .iter()
            .enumerate()
            .map(|(i, p)| (i as u8, *p))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// A stored drawing as listed by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingRecord {
    pub id: i64,
    pub predicted_digit: u8,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// A labelled sample to upload.
#[derive(Debug, Clone, Serialize)]
pub struct NewDrawing {
    pub pixels: PixelGrid,
    #[serde(rename = "resultat")]
    pub label: u8,
}

impl NewDrawing {
    pub fn new(pixels: PixelGrid, label: u8) -> Result<Self> {
        if usize::from(label) >= NUM_CLASSES {
            return Err(DigitEyeError::InvalidLabel(label));
        }
        Ok(Self { pixels, label })
    }
}

/// Pagination bounds for listing drawings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 20;

    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// The page following this one.
    pub fn next(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, 0)
    }
}

/// Acknowledgement body returned by mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Accept RFC 3339 timestamps, and offset-less ones as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(digit: u8, probabilities: Vec<f32>) -> PredictionResult {
        PredictionResult {
            predicted_digit: digit,
            confidence: probabilities.get(digit as usize).copied().unwrap_or(0.0),
            probabilities,
        }
    }

    #[test]
    fn test_prediction_validate() {
        let mut probs = vec![0.0; 10];
        probs[7] = 1.0;
        assert!(result(7, probs.clone()).validate().is_ok());
        assert!(result(12, probs).validate().is_err());
        assert!(result(1, vec![0.5, 0.5]).validate().is_err());
    }

    #[test]
    fn test_argmax_and_ranked() {
        let probs = vec![0.01, 0.02, 0.05, 0.8, 0.02, 0.02, 0.02, 0.02, 0.02, 0.02];
        let r = result(3, probs);
        assert_eq!(r.argmax(), Some(3));
        assert!((r.probability_sum() - 1.0).abs() < 0.01);
        let ranked = r.ranked();
        assert_eq!(ranked[0].0, 3);
        assert_eq!(ranked[1].0, 2);
    }

    #[test]
    fn test_drawing_record_timestamps() {
        let with_offset: DrawingRecord = serde_json::from_str(
            r#"{"id": 4, "predicted_digit": 2, "confidence": 0.9, "created_at": "2025-03-01T10:00:00.123456+00:00"}"#,
        )
        .unwrap();
        assert_eq!(with_offset.id, 4);

        let naive: DrawingRecord = serde_json::from_str(
            r#"{"id": 5, "predicted_digit": 8, "confidence": null, "created_at": "2025-03-01T10:00:00"}"#,
        )
        .unwrap();
        assert!(naive.confidence.is_none());
        assert_eq!(naive.created_at.to_rfc3339(), "2025-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_new_drawing_wire_format() {
        let drawing = NewDrawing::new(PixelGrid::blank(), 6).unwrap();
        let json = serde_json::to_value(&drawing).unwrap();
        assert_eq!(json["resultat"], 6);
        assert_eq!(json["pixels"].as_array().unwrap().len(), 784);

        assert!(NewDrawing::new(PixelGrid::blank(), 10).is_err());
    }

    #[test]
    fn test_page_next() {
        let page = Page::default();
        assert_eq!(page.limit, 20);
        assert_eq!(page.next(), Page::new(20, 20));
    }
}
