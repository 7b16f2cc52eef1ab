//! Raw rule objects as written in the configuration file
//!
//! These types mirror the external configuration format exactly; they carry no
//! compiled state. The rule compiler turns them into a `RuleSet`.

use crate::types::FoldKind;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// One rule object from the configuration
///
/// Every field is optional; which fields are present decides the rule kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRule {
    /// Label used in diagnostics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Literal begin delimiter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<String>,

    /// Literal end delimiter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_regex: Option<String>,

    /// End pattern that pairs with the nearest open entry of the same rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fold_end_regex: Option<String>,

    /// Single pattern with named groups `begin` and `end`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_end_regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consecutive: Option<bool>,

    #[serde(default, alias = "indentation", skip_serializing_if = "Option::is_none")]
    pub off_side: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fold_last_line: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FoldKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<NestedValue>,

    /// Deprecated, superseded by `nested`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descendants: Option<bool>,
}

/// One entry of a rule list
///
/// Entries are converted one at a time, so a rule with a badly typed field
/// is kept as `Malformed` and dropped by the compiler instead of failing the
/// whole file.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleEntry {
    Valid(RawRule),
    /// The entry as written, and why it does not form a rule
    Malformed {
        value: serde_json::Value,
        reason: String,
    },
}

impl RuleEntry {
    /// The parsed rule, or why it could not be parsed
    pub fn rule(&self) -> Result<&RawRule, &str> {
        match self {
            RuleEntry::Valid(rule) => Ok(rule),
            RuleEntry::Malformed { reason, .. } => Err(reason.as_str()),
        }
    }

    /// The `name` field, when it is a string
    pub fn name(&self) -> Option<&str> {
        match self {
            RuleEntry::Valid(rule) => rule.name.as_deref(),
            RuleEntry::Malformed { value, .. } => value.get("name").and_then(|v| v.as_str()),
        }
    }

    fn from_value<E: de::Error>(value: serde_json::Value) -> Result<Self, E> {
        if !value.is_object() {
            return Err(E::custom(format!("expected a rule object, found {}", value)));
        }
        match serde_json::from_value::<RawRule>(value.clone()) {
            Ok(rule) => Ok(RuleEntry::Valid(rule)),
            Err(e) => Ok(RuleEntry::Malformed {
                value,
                reason: e.to_string(),
            }),
        }
    }
}

impl From<RawRule> for RuleEntry {
    fn from(rule: RawRule) -> Self {
        RuleEntry::Valid(rule)
    }
}

impl Serialize for RuleEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RuleEntry::Valid(rule) => rule.serialize(serializer),
            RuleEntry::Malformed { value, .. } => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RuleEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_value(value)
    }
}

/// A single rule object or a list of them
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleList {
    Many(Vec<RuleEntry>),
    One(Box<RuleEntry>),
}

impl RuleList {
    /// Returns the entries in declaration order
    pub fn as_slice(&self) -> &[RuleEntry] {
        match self {
            RuleList::Many(rules) => rules,
            RuleList::One(rule) => std::slice::from_ref(rule.as_ref()),
        }
    }
}

impl From<Vec<RawRule>> for RuleList {
    fn from(rules: Vec<RawRule>) -> Self {
        RuleList::Many(rules.into_iter().map(RuleEntry::from).collect())
    }
}

impl<'de> Deserialize<'de> for RuleList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Array(values) => values
                .into_iter()
                .map(RuleEntry::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(RuleList::Many),
            value @ serde_json::Value::Object(_) => {
                RuleEntry::from_value(value).map(|entry| RuleList::One(Box::new(entry)))
            }
            other => Err(de::Error::custom(format!(
                "expected a rule object or an array of rule objects, found {}",
                other
            ))),
        }
    }
}

/// Value of the `nested` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NestedValue {
    /// `true` inherits the enclosing scope, `false` makes the region opaque
    Flag(bool),
    /// Child rules tried first inside the region
    Rules(RuleList),
}
