use std::fmt;

use serde_json::{Map, Value};
use tracing::debug;

use crate::model::{ActiveSubscription, PLACEHOLDER, Scalar, UserModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLayer {
    Outer,
    Inner,
}

impl fmt::Display for RecordLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outer => f.write_str("outer"),
            Self::Inner => f.write_str("inner"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed {layer} record: {message}")]
    MalformedRecord { layer: RecordLayer, message: String },
    #[error("user record is missing `{missing}`")]
    Incomplete { missing: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Unchanged,
    /// `None` means no user: any shown panel must be cleared.
    Changed(Option<UserModel>),
}

/// Exact string comparison; empty or missing values never count as new.
#[must_use]
pub fn is_new_record(previous: Option<&str>, current: Option<&str>) -> bool {
    match current {
        Some(current) if !current.is_empty() => previous != Some(current),
        _ => false,
    }
}

pub fn decode(previous: Option<&str>, current: Option<&str>) -> Result<Decoded, DecodeError> {
    let Some(current) = current.filter(|_| is_new_record(previous, current)) else {
        return Ok(Decoded::Unchanged);
    };

    match parse_user_record(current) {
        Ok(model) => Ok(Decoded::Changed(model)),
        Err(DecodeError::Incomplete { missing }) => {
            debug!(missing, "user record incomplete, hiding panel");
            Ok(Decoded::Changed(None))
        }
        Err(error) => Err(error),
    }
}

/// Decodes the double-encoded record. `Ok(None)` means the record holds no
/// user.
pub fn parse_user_record(raw: &str) -> Result<Option<UserModel>, DecodeError> {
    let outer: Value = serde_json::from_str(raw).map_err(|error| DecodeError::MalformedRecord {
        layer: RecordLayer::Outer,
        message: error.to_string(),
    })?;

    let Some(user) = outer.get("user") else {
        return Ok(None);
    };
    if !Scalar::from_json(user).is_truthy() || user.as_str() == Some("null") {
        return Ok(None);
    }
    let Some(encoded) = user.as_str() else {
        // A bare scalar or list never carries user fields. An object cannot
        // be re-read as text at all.
        if user.is_object() {
            return Err(DecodeError::MalformedRecord {
                layer: RecordLayer::Inner,
                message: "user field is an object, not a JSON string".to_string(),
            });
        }
        return Err(DecodeError::Incomplete { missing: "id" });
    };

    let inner: Value =
        serde_json::from_str(encoded).map_err(|error| DecodeError::MalformedRecord {
            layer: RecordLayer::Inner,
            message: error.to_string(),
        })?;
    let Some(fields) = inner.as_object() else {
        return Err(DecodeError::Incomplete { missing: "id" });
    };

    build_model(fields).map(Some)
}

fn build_model(fields: &Map<String, Value>) -> Result<UserModel, DecodeError> {
    let id = fields
        .get("id")
        .filter(|value| !value.is_object() && !value.is_array())
        .and_then(truthy_text)
        .ok_or(DecodeError::Incomplete { missing: "id" })?;

    let is_t_user = match fields.get("isTUser").map(Scalar::from_json) {
        None | Some(Scalar::Null) => return Err(DecodeError::Incomplete { missing: "isTUser" }),
        Some(flag) => flag,
    };

    Ok(UserModel {
        id,
        is_t_user,
        email: text_or_placeholder(fields.get("email")),
        utm_source: text_or_placeholder(fields.get("utmSource")),
        url: text_or_placeholder(fields.get("url")),
        user_features: fields.get("userFeatures").and_then(feature_entries),
        n_enabled: fields.get("nEnabled").map(Scalar::from_json),
        active_subscription: fields
            .get("activeSubscription")
            .and_then(Value::as_object)
            .map(|subscription| ActiveSubscription {
                product_id: text_or_placeholder(subscription.get("productId")),
                start_date: text_or_placeholder(subscription.get("startDate")),
                end_date: text_or_placeholder(subscription.get("endDate")),
                status: text_or_placeholder(subscription.get("status")),
            }),
    })
}

fn truthy_text(value: &Value) -> Option<String> {
    let scalar = Scalar::from_json(value);
    scalar.is_truthy().then(|| scalar.to_string())
}

fn text_or_placeholder(value: Option<&Value>) -> String {
    value
        .and_then(truthy_text)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn feature_entries(value: &Value) -> Option<Vec<(String, Scalar)>> {
    match value {
        Value::Object(entries) => Some(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), Scalar::from_json(value)))
                .collect(),
        ),
        Value::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), Scalar::from_json(value)))
                .collect(),
        ),
        _ => None,
    }
}
