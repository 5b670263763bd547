use serde::Deserialize;

/// S3 error document returned alongside non-2xx responses
///
/// ```xml
/// <Error>
///   <Code>NoSuchKey</Code>
///   <Message>The specified key does not exist.</Message>
/// </Error>
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorDocument {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
}

pub const NO_SUCH_KEY: &str = "NoSuchKey";

impl ErrorDocument {
    /// Parse an error body; bodies that are not S3 XML yield an empty document
    pub fn parse(body: &str) -> Self {
        quick_xml::de::from_str(body).unwrap_or_default()
    }

    pub fn is_no_such_key(&self) -> bool {
        self.code == NO_SUCH_KEY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_such_key() {
        let doc = ErrorDocument::parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>NoSuchKey</Code>
  <Message>The specified key does not exist.</Message>
  <Resource>/videos/missing.mp4</Resource>
  <RequestId>4442587FB7D0A2F9</RequestId>
</Error>"#,
        );

        assert!(doc.is_no_such_key());
        assert_eq!(
            doc.message.as_deref(),
            Some("The specified key does not exist.")
        );
    }

    #[test]
    fn test_parse_other_code() {
        let doc = ErrorDocument::parse(
            "<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>",
        );
        assert_eq!(doc.code, "AccessDenied");
        assert!(!doc.is_no_such_key());
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(ErrorDocument::parse("upstream timed out"), ErrorDocument::default());
        assert_eq!(ErrorDocument::parse(""), ErrorDocument::default());
    }
}
