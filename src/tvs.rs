use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    ops::Not,
};

/// A term-value-set condition: one vocabulary term and the set of accepted
/// values or numeric ranges, with an optional negation flag.
///
/// The `term` payload belongs to the vocabulary service. The tree algorithms
/// copy it verbatim and never inspect it beyond a best-effort label for
/// display purposes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tvs {
    pub term: serde_json::Value,
    #[serde(default, skip_serializing_if = "is_false")]
    pub isnot: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<TermValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<NumericRange>,
}

impl Tvs {
    /// Create a condition over a discrete value set.
    pub fn with_values(term: serde_json::Value, values: Vec<TermValue>) -> Self {
        Self {
            term,
            isnot: false,
            values,
            ranges: vec![],
        }
    }

    /// Create a condition over a set of numeric ranges.
    pub fn with_ranges(term: serde_json::Value, ranges: Vec<NumericRange>) -> Self {
        Self {
            term,
            isnot: false,
            values: vec![],
            ranges,
        }
    }

    fn term_label(&self) -> &str {
        self.term
            .get("name")
            .or_else(|| self.term.get("id"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("?")
    }
}

impl Not for Tvs {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self {
            isnot: !self.isnot,
            ..self
        }
    }
}

impl Display for Tvs {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        let operator = if self.isnot { "not in" } else { "in" };
        if self.ranges.is_empty() {
            write!(
                formatter,
                "{} {operator} [{}]",
                self.term_label(),
                self.values.iter().join(", ")
            )
        } else {
            write!(
                formatter,
                "{} {operator} {}",
                self.term_label(),
                self.ranges.iter().join(" or ")
            )
        }
    }
}

/// One accepted category of a discrete term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermValue {
    pub key: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TermValue {
    pub fn new(key: serde_json::Value) -> Self {
        Self { key, label: None }
    }

    pub fn labeled(key: serde_json::Value, label: &str) -> Self {
        Self {
            key,
            label: Some(label.to_owned()),
        }
    }
}

impl Display for TermValue {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match &self.label {
            Some(label) => write!(formatter, "{label}"),
            None => write!(formatter, "{}", self.key),
        }
    }
}

/// A numeric interval with independently inclusive or unbounded endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Decimal>,
    #[serde(default)]
    pub startinclusive: bool,
    #[serde(default)]
    pub stopinclusive: bool,
    #[serde(default)]
    pub startunbounded: bool,
    #[serde(default)]
    pub stopunbounded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl NumericRange {
    /// The interval `start <= x < stop`.
    pub fn between(start: Decimal, stop: Decimal) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            startinclusive: true,
            ..Self::default()
        }
    }

    /// The interval `x >= start`.
    pub fn at_least(start: Decimal) -> Self {
        Self {
            start: Some(start),
            startinclusive: true,
            stopunbounded: true,
            ..Self::default()
        }
    }

    /// The interval `x <= stop`.
    pub fn at_most(stop: Decimal) -> Self {
        Self {
            stop: Some(stop),
            stopinclusive: true,
            startunbounded: true,
            ..Self::default()
        }
    }
}

impl Display for NumericRange {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        if let Some(label) = &self.label {
            return write!(formatter, "{label}");
        }
        let (open, start) = match &self.start {
            Some(start) if !self.startunbounded => {
                (if self.startinclusive { '[' } else { '(' }, start.to_string())
            }
            _ => ('(', "-inf".to_owned()),
        };
        let (stop, close) = match &self.stop {
            Some(stop) if !self.stopunbounded => {
                (stop.to_string(), if self.stopinclusive { ']' } else { ')' })
            }
            _ => ("inf".to_owned(), ')'),
        };
        write!(formatter, "{open}{start}, {stop}{close}")
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
