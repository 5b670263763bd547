use serde::{Deserialize, Serialize};

/// Query string of `GET /video`
///
/// Built from the raw key/value pairs so a repeated `id` never fails
/// extraction; the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoQueryDto {
    pub id: Option<String>,
}

impl VideoQueryDto {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let id = pairs
            .into_iter()
            .find_map(|(name, value)| (name == "id").then_some(value));
        Self { id }
    }
}

/// Error payload returned in a response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
}

impl ErrorResponseDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn missing_video_id() -> Self {
        Self::new("An 'id' term must be provided.")
    }
}
