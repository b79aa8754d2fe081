//! Answer values and the key-addressed answer store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A value collected by one interview step.
///
/// Choice and free-text steps produce `Text`, number and scale steps
/// produce `Number`, multi-choice steps produce `List` in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl AnswerValue {
    /// Creates a text answer.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creates a list answer from selected labels.
    pub fn list<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(labels.into_iter().map(Into::into).collect())
    }

    /// Returns the text if this is a text answer.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the answer.
    ///
    /// Text is parsed leniently so values restored from loosely typed
    /// storage still classify; lists never convert.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Returns the labels if this is a list answer.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns true if `label` equals the text answer or is one of the
    /// selected labels of a list answer.
    pub fn is(&self, label: &str) -> bool {
        match self {
            Self::Text(s) => s == label,
            Self::List(items) => items.iter().any(|item| item == label),
            Self::Number(_) => false,
        }
    }

    /// Iterates over the textual labels carried by the answer.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        let items: &[String] = match self {
            Self::Text(s) => std::slice::from_ref(s),
            Self::List(items) => items,
            Self::Number(_) => &[],
        };
        items.iter().map(String::as_str)
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
            Self::List(items) if items.is_empty() => write!(f, "none selected"),
            Self::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Answers keyed by storage key.
///
/// Last write wins; keys are never removed once recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<String, AnswerValue>);

impl Answers {
    /// Creates an empty answer store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value, replacing any earlier value for the same key.
    pub fn record(&mut self, key: impl Into<String>, value: AnswerValue) {
        self.0.insert(key.into(), value);
    }

    /// Builder-style `record`, mostly for tests and fixtures.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.record(key, value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.0.get(key)
    }

    /// Text value for `key`, if recorded as text.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AnswerValue::as_text)
    }

    /// Numeric value for `key`, converted at the boundary.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(AnswerValue::as_number)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
