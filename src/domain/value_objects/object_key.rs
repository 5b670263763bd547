use crate::domain::errors::ValidationError;

/// Caller-supplied key of a stored video
///
/// Keys are opaque: the only rule is that they are not empty. Format and
/// length checks are left to the storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        Ok(Self(value))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_object_key() {
        assert!(ObjectKey::new("video.mp4").is_ok());
        assert!(ObjectKey::new("folder/video.mp4").is_ok());
        // Keys are opaque, so shapes a stricter store might reject still pass
        assert!(ObjectKey::new("/leading//slashes").is_ok());
        assert!(ObjectKey::new("x".repeat(4096)).is_ok());
    }

    #[test]
    fn test_empty_object_key() {
        assert_eq!(ObjectKey::new(""), Err(ValidationError::EmptyObjectKey));
    }

    #[test]
    fn test_display_matches_input() {
        let key = ObjectKey::new("clips/intro.mp4").unwrap();
        assert_eq!(key.to_string(), "clips/intro.mp4");
        assert_eq!(key.as_str(), "clips/intro.mp4");
    }
}
