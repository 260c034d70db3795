use serde::{Deserialize, Serialize};

/// Answer to a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Receipt {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            user_tag: None,
            timestamp: None,
        }
    }

    pub fn by(mut self, user_tag: Option<String>) -> Self {
        self.user_tag = user_tag;
        self
    }

    pub fn at(mut self, timestamp: Option<i64>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_omits_missing_fields() {
        let receipt = Receipt::new("abc");
        assert_eq!(serde_json::to_string(&receipt).unwrap(), r#"{"tag":"abc"}"#);

        let receipt = Receipt::new("abc").by(Some("u".into())).at(Some(7));
        assert_eq!(
            serde_json::to_string(&receipt).unwrap(),
            r#"{"tag":"abc","userTag":"u","timestamp":7}"#
        );
    }
}
