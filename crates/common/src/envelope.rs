//! JSON noun bodies.
//!
//! A noun body is a JSON object whose fields are either *identity data* (what
//! the noun is) or *non-identity data* (who wrote it and when). Only identity
//! data contributes to a content tag, so the same content submitted by two
//! authors lands on the same tag. Everything is serialized canonically: object
//! keys sorted, no insignificant whitespace.

use serde_json::{Map, Value};

use crate::identity::IdentityProvider;

pub const USER_TAG_FIELD: &str = "userTag";
pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const RESTRICTION_FIELD: &str = "restriction";

const IDENTITY_DATA: &str = "identityData";
const NON_IDENTITY_DATA: &str = "nonIdentityData";

/// Fields that never contribute to a noun's identity.
pub const NON_IDENTITY_FIELDS: [&str; 2] = [USER_TAG_FIELD, TIMESTAMP_FIELD];

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("noun body must be a JSON object")]
    NotAnObject,
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    identity: Map<String, Value>,
    non_identity: Map<String, Value>,
}

impl Envelope {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Accepts either a flat object (split by field name) or the explicit
    /// `{"identityData": {..}, "nonIdentityData": {..}}` form.
    pub fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        let Value::Object(object) = value else {
            return Err(EnvelopeError::NotAnObject);
        };

        let envelope = if is_explicit_form(&object) {
            let mut object = object;
            let identity = take_object(&mut object, IDENTITY_DATA)?;
            let non_identity = take_object(&mut object, NON_IDENTITY_DATA)?;
            Self {
                identity,
                non_identity,
            }
        } else {
            let (non_identity, identity) = object
                .into_iter()
                .partition(|(key, _)| NON_IDENTITY_FIELDS.contains(&key.as_str()));
            Self {
                identity,
                non_identity,
            }
        };

        envelope.validate()?;
        Ok(envelope)
    }

    fn validate(&self) -> Result<(), EnvelopeError> {
        match self.non_identity.get(USER_TAG_FIELD) {
            None | Some(Value::String(_)) => {}
            Some(other) => {
                return Err(EnvelopeError::InvalidField {
                    field: USER_TAG_FIELD,
                    reason: format!("expected a string, got {}", other),
                })
            }
        }
        match self.non_identity.get(TIMESTAMP_FIELD) {
            None => {}
            Some(value) if value.as_i64().is_some() => {}
            Some(other) => {
                return Err(EnvelopeError::InvalidField {
                    field: TIMESTAMP_FIELD,
                    reason: format!("expected integer milliseconds, got {}", other),
                })
            }
        }
        self.restriction().map(|_| ())
    }

    pub fn identity(&self) -> &Map<String, Value> {
        &self.identity
    }

    /// The claimed author.
    pub fn user_tag(&self) -> Option<&str> {
        self.non_identity.get(USER_TAG_FIELD).and_then(Value::as_str)
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.non_identity.get(TIMESTAMP_FIELD).and_then(Value::as_i64)
    }

    /// Records `now` as the timestamp unless the writer supplied one, and
    /// answers whichever is in effect.
    pub fn stamp_if_missing(&mut self, now: i64) -> i64 {
        match self.timestamp() {
            Some(existing) => existing,
            None => {
                self.non_identity
                    .insert(TIMESTAMP_FIELD.to_string(), Value::from(now));
                now
            }
        }
    }

    /// Usertags named by the `restriction` field. Empty when unrestricted.
    pub fn restriction(&self) -> Result<Vec<String>, EnvelopeError> {
        let invalid = |reason: String| EnvelopeError::InvalidField {
            field: RESTRICTION_FIELD,
            reason,
        };
        match self.identity.get(RESTRICTION_FIELD) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(tag)) if tag.is_empty() => Ok(Vec::new()),
            Some(Value::String(tag)) => Ok(vec![tag.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| invalid(format!("expected usertag strings, got {}", item)))
                })
                .collect(),
            Some(other) => Err(invalid(format!(
                "expected a usertag or a list of usertags, got {}",
                other
            ))),
        }
    }

    /// Canonical bytes of the identity data alone.
    pub fn identity_bytes(&self) -> Vec<u8> {
        canonical_bytes(&Value::Object(self.identity.clone()))
    }

    /// The content tag of this noun under `provider`.
    pub fn identity_tag(&self, provider: &dyn IdentityProvider) -> String {
        provider.digest(&self.identity_bytes())
    }

    /// Identity and non-identity data merged into one object.
    pub fn combined(&self) -> Value {
        let mut combined = self.identity.clone();
        for (key, value) in &self.non_identity {
            combined.insert(key.clone(), value.clone());
        }
        Value::Object(combined)
    }

    /// Canonical bytes of the combined record, as stored.
    pub fn combined_bytes(&self) -> Vec<u8> {
        canonical_bytes(&self.combined())
    }
}

fn is_explicit_form(object: &Map<String, Value>) -> bool {
    !object.is_empty()
        && object
            .keys()
            .all(|key| key == IDENTITY_DATA || key == NON_IDENTITY_DATA)
}

fn take_object(
    object: &mut Map<String, Value>,
    field: &'static str,
) -> Result<Map<String, Value>, EnvelopeError> {
    match object.remove(field) {
        None => Ok(Map::new()),
        Some(Value::Object(inner)) => Ok(inner),
        Some(other) => Err(EnvelopeError::InvalidField {
            field,
            reason: format!("expected an object, got {}", other),
        }),
    }
}

/// Rebuilds every object with its keys in sorted order. This keeps the output
/// canonical even when `serde_json` is compiled with `preserve_order`.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut keys: Vec<&String> = object.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&object[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    // Serializing a `Value` cannot fail: keys are strings and numbers are finite.
    serde_json::to_vec(&canonicalize(value)).unwrap_or_default()
}
