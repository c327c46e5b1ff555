use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text shown for any field the record leaves empty.
pub const PLACEHOLDER: &str = "-";

/// A leaf value taken from the untrusted inner record.
///
/// Objects and arrays are kept as their compact JSON text so they can still be
/// displayed.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(number) => Self::Number(number.clone()),
            Value::String(text) => Self::Text(text.clone()),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }

    /// Truthiness as the host page's scripts see it.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(flag) => *flag,
            Self::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
            Self::Text(text) => !text.is_empty(),
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSubscription {
    pub product_id: String,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
}

/// Display model decoded from the persisted user record.
#[derive(Debug, Clone, PartialEq)]
pub struct UserModel {
    pub id: String,
    /// Never [`Scalar::Null`]; a null flag makes the record incomplete.
    pub is_t_user: Scalar,
    pub email: String,
    pub utm_source: String,
    pub url: String,
    /// Entries in the order the record lists them.
    pub user_features: Option<Vec<(String, Scalar)>>,
    /// `None` when the key is absent, which differs from `Some(Bool(false))`.
    pub n_enabled: Option<Scalar>,
    pub active_subscription: Option<ActiveSubscription>,
}

impl UserModel {
    #[must_use]
    pub fn has_active_subscription(&self) -> bool {
        self.active_subscription.is_some()
    }
}

/// Viewport pixel offsets of a dragged panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelPosition {
    pub left: f64,
    pub top: f64,
}

impl PanelPosition {
    #[must_use]
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.left.is_finite() && self.top.is_finite()
    }
}
