//! Wire format of processing jobs.

use serde::{Deserialize, Serialize};

/// The single unit of work: process the upload stored at `s3_key`.
///
/// Everything else the worker needs is derivable from the key or fetched
/// from the repository. Unknown fields in the body are ignored so the
/// format can grow without breaking older consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessVideoMessage {
    pub s3_key: String,
}

impl ProcessVideoMessage {
    pub fn new(s3_key: impl Into<String>) -> Self {
        Self {
            s3_key: s3_key.into(),
        }
    }
}

/// A message handed to a consumer, with the handle needed to acknowledge it.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    /// Backend message id.
    pub message_id: String,
    /// Handle passed to `delete` after successful processing.
    pub receipt_handle: String,
    /// Raw UTF-8 JSON body.
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let msg = ProcessVideoMessage::new("original/7.mp4");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"s3_key":"original/7.mp4"}"#);

        let parsed: ProcessVideoMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let parsed: ProcessVideoMessage =
            serde_json::from_str(r#"{"s3_key":"original/7.mp4","attempt":3,"trace_id":"x"}"#)
                .unwrap();
        assert_eq!(parsed.s3_key, "original/7.mp4");
    }

    #[test]
    fn test_missing_key_is_error() {
        assert!(serde_json::from_str::<ProcessVideoMessage>(r#"{"other":"field"}"#).is_err());
        assert!(serde_json::from_str::<ProcessVideoMessage>("not json").is_err());
    }
}
