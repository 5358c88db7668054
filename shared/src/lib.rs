use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Machine-readable error codes carried by every API error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ConfigError,
    NoImage,
    ApiError,
    InvalidResponse,
    UnknownError,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub is_hot_dog: bool,
    pub confidence: f64,
    pub debug: DebugInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    /// First three predictions in the order the classifier ranked them,
    /// formatted as `"label: pp.p%"`.
    pub top3_predictions: Vec<String>,
    /// Byte length of the normalized payload that was classified.
    pub image_size: u64,
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    /// User-facing message, safe to display verbatim.
    pub error: String,
    pub code: ErrorCode,
    pub details: String,
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WakeResponse {
    pub status: String,
    pub response: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_serialize_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::ConfigError).unwrap(),
            "\"CONFIG_ERROR\""
        );
        assert_eq!(ErrorCode::InvalidResponse.to_string(), "INVALID_RESPONSE");
    }

    #[test]
    fn analyze_response_uses_original_field_names() {
        let response = AnalyzeResponse {
            is_hot_dog: true,
            confidence: 0.92,
            debug: DebugInfo {
                top3_predictions: vec!["hotdog: 92.0%".into()],
                image_size: 2048,
                timestamp: "2024-01-01T00:00:00.000Z".into(),
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("isHotDog").is_some());
        assert!(json["debug"].get("top3Predictions").is_some());
        assert!(json["debug"].get("imageSize").is_some());
    }
}
