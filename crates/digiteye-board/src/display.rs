//! What the user sees after pressing classify.

use std::fmt::Write;

use digiteye_client::ClientError;
use digiteye_core::PredictionResult;

/// Shown for every transport or server failure.
pub const PREDICTION_FAILED: &str = "Prediction failed. Check that the server is running.";

/// Result or error from the last classify, never both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Display {
    pub result: Option<PredictionResult>,
    pub error: Option<String>,
}

impl Display {
    pub fn clear(&mut self) {
        self.result = None;
        self.error = None;
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_none() && self.error.is_none()
    }

    pub fn show_result(&mut self, result: PredictionResult) {
        self.error = None;
        self.result = Some(result);
    }

    pub fn show_error(&mut self, message: String) {
        self.result = None;
        self.error = Some(message);
    }

    /// Multi-line text rendering of the current state.
    pub fn render(&self) -> String {
        match (&self.result, &self.error) {
            (Some(result), _) => format!(
                "{}\n{}\n{}",
                result.predicted_digit,
                format_confidence(result.confidence),
                format_distribution(result)
            ),
            (None, Some(error)) => error.clone(),
            (None, None) => String::new(),
        }
    }
}

/// User-facing text for a failed prediction, keeping the server's detail.
pub fn failure_message(err: &ClientError) -> String {
    match err.detail() {
        Some(detail) => format!("{PREDICTION_FAILED} ({detail})"),
        None => PREDICTION_FAILED.to_string(),
    }
}

pub fn format_confidence(confidence: f32) -> String {
    format!("Confidence: {:.1}%", confidence * 100.0)
}

/// One chip per class, the predicted class in brackets: `0: 1%  [3: 97%]  ...`.
pub fn format_distribution(result: &PredictionResult) -> String {
    let mut out = String::new();
    for (digit, p) in result.probabilities.iter().enumerate() {
        if !out.is_empty() {
            out.push_str("  ");
        }
        let pct = (p * 100.0).round();
        if digit == usize::from(result.predicted_digit) {
            let _ = write!(out, "[{digit}: {pct:.0}%]");
        } else {
            let _ = write!(out, "{digit}: {pct:.0}%");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PredictionResult {
        let mut probabilities = vec![0.002; 10];
        probabilities[3] = 0.973;
        probabilities[8] = 0.009;
        PredictionResult {
            predicted_digit: 3,
            confidence: 0.973,
            probabilities,
        }
    }

    #[test]
    fn test_confidence_one_decimal() {
        assert_eq!(format_confidence(0.973), "Confidence: 97.3%");
        assert_eq!(format_confidence(1.0), "Confidence: 100.0%");
    }

    #[test]
    fn test_distribution_marks_prediction() {
        let text = format_distribution(&sample());
        assert!(text.starts_with("0: 0%  1: 0%  2: 0%  [3: 97%]"));
        assert!(text.contains("8: 1%"));
        assert_eq!(text.matches('%').count(), 10);
    }

    #[test]
    fn test_failure_message_keeps_detail() {
        let err = ClientError::from_status(503, r#"{"detail": "Model not loaded"}"#);
        assert_eq!(
            failure_message(&err),
            "Prediction failed. Check that the server is running. (Model not loaded)"
        );

        let err = ClientError::from_status(500, "");
        assert_eq!(failure_message(&err), PREDICTION_FAILED);
    }

    #[test]
    fn test_result_and_error_are_exclusive() {
        let mut display = Display::default();
        assert!(display.is_empty());

        display.show_error("boom".into());
        display.show_result(sample());
        assert!(display.error.is_none());
        assert!(display.render().starts_with("3\nConfidence: 97.3%"));

        display.show_error("boom".into());
        assert!(display.result.is_none());
        assert_eq!(display.render(), "boom");

        display.clear();
        assert!(display.is_empty());
        assert_eq!(display.render(), "");
    }
}
