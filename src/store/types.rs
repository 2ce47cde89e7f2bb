use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

/// A Firestore typed value, reduced to the shapes review text uses.
///
/// The store wraps every value in a single-key tag object
/// (`{"stringValue": ..}`, `{"arrayValue": {"values": [..]}}`). Any
/// other tag, or a tag carrying an unexpected payload, is kept as raw
/// JSON in `Unrecognized` instead of failing the whole document.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Array(Vec<TypedValue>),
    Unrecognized(Value),
}

impl TypedValue {
    /// Decode one tagged value. Never fails.
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::Unrecognized(value.clone());
        };

        if let Some(tagged) = obj.get("stringValue") {
            // A mistyped scalar payload is still the author's text.
            return match tagged {
                Value::String(s) => Self::String(s.clone()),
                Value::Number(_) | Value::Bool(_) => Self::String(tagged.to_string()),
                _ => Self::Unrecognized(value.clone()),
            };
        }

        if let Some(tagged) = obj.get("arrayValue") {
            // Firestore omits `values` entirely for an empty array.
            return match tagged.get("values") {
                None if tagged.is_object() => Self::Array(Vec::new()),
                Some(Value::Array(items)) => {
                    Self::Array(items.iter().map(Self::from_json).collect())
                }
                _ => Self::Unrecognized(value.clone()),
            };
        }

        Self::Unrecognized(value.clone())
    }

    /// Re-encode in the store's tagged form.
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => json!({ "stringValue": s }),
            Self::Array(items) => {
                let values: Vec<Value> = items.iter().map(Self::to_json).collect();
                json!({ "arrayValue": { "values": values } })
            }
            Self::Unrecognized(raw) => raw.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable rendering: scalar strings verbatim, everything else
    /// as its raw tagged JSON.
    pub fn display_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            other => other.to_json().to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for TypedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&raw))
    }
}

/// One review as read from the store. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDocument {
    /// Last path segment of the fully qualified resource name.
    id: String,
    fields: BTreeMap<String, TypedValue>,
}

impl ReviewDocument {
    pub fn new(name: &str, fields: BTreeMap<String, TypedValue>) -> Self {
        let id = name.rsplit('/').next().unwrap_or_default().to_string();
        Self { id, fields }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn field(&self, field_name: &str) -> Option<&TypedValue> {
        self.fields.get(field_name)
    }

    pub fn fields(&self) -> &BTreeMap<String, TypedValue> {
        &self.fields
    }
}

impl From<RawDocument> for ReviewDocument {
    fn from(raw: RawDocument) -> Self {
        Self::new(&raw.name, raw.fields.unwrap_or_default())
    }
}

/// Wire shape of a single document in a list response.
#[derive(Debug, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Option<BTreeMap<String, TypedValue>>,
}

/// Wire shape of `GET .../documents/<collection>`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Option<Vec<RawDocument>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}
