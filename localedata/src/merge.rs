//! Merge policies for combining fragment values.
//!
//! Values always arrive in generic-to-specific order. More specific data
//! overrides or extends less specific data, never the reverse.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LocaleDataError;

/// How fragment values are combined into one result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Deep-merge every fragment, most specific last.
    #[default]
    MergeAll,
    /// Only the least specific fragment that has data.
    ReturnOne,
    /// Only the most specific fragment that has data.
    MostSpecific,
}

/// How arrays present in two fragments are combined under [`MergePolicy::MergeAll`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrayMode {
    /// Generic elements followed by specific elements.
    #[default]
    Concatenate,
    /// The more specific array replaces the generic one.
    Replace,
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergePolicy::MergeAll => write!(f, "merge-all"),
            MergePolicy::ReturnOne => write!(f, "return-one"),
            MergePolicy::MostSpecific => write!(f, "most-specific"),
        }
    }
}

impl FromStr for MergePolicy {
    type Err = LocaleDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "merge-all" | "mergeall" => Ok(MergePolicy::MergeAll),
            "return-one" | "returnone" => Ok(MergePolicy::ReturnOne),
            "most-specific" | "mostspecific" => Ok(MergePolicy::MostSpecific),
            other => Err(LocaleDataError::Config(format!(
                "unknown merge policy '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ArrayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayMode::Concatenate => write!(f, "concatenate"),
            ArrayMode::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for ArrayMode {
    type Err = LocaleDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concatenate" | "concat" => Ok(ArrayMode::Concatenate),
            "replace" => Ok(ArrayMode::Replace),
            other => Err(LocaleDataError::Config(format!(
                "unknown array mode '{}'",
                other
            ))),
        }
    }
}

/// Deep-merge `source` into `target`.
///
/// Objects merge key by key, arrays follow `mode`, anything else in `source`
/// replaces what is in `target`.
pub fn deep_merge(target: &mut Value, source: &Value, mode: ArrayMode) {
    match (target, source) {
        (Value::Object(into), Value::Object(from)) => {
            for (key, value) in from {
                match into.get_mut(key) {
                    Some(existing) => deep_merge(existing, value, mode),
                    None => {
                        into.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Array(into), Value::Array(from)) if mode == ArrayMode::Concatenate => {
            into.extend(from.iter().cloned());
        }
        (target, source) => *target = source.clone(),
    }
}

/// Combine fragment values, given generic to specific, per `policy`.
///
/// Returns an empty object when no value is present.
pub fn merge_values<'a, I>(values: I, policy: MergePolicy, mode: ArrayMode) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut values = values.into_iter();
    let picked = match policy {
        MergePolicy::MergeAll => {
            let mut merged = Value::Object(Map::new());
            for value in values {
                deep_merge(&mut merged, value, mode);
            }
            return merged;
        }
        MergePolicy::ReturnOne => values.next(),
        MergePolicy::MostSpecific => values.last(),
    };
    picked
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}
