//! This module defines [Value] and [TruthValue].

use std::fmt;

use once_cell::sync::Lazy;

use crate::{
    atom::{quote_name, Atom, Handle},
    types::Type,
};

/// Weight converting between counts and confidences
pub const CONFIDENCE_WEIGHT: f64 = 800.0;

/// Key under which truth values are stored
static TRUTH_KEY: Lazy<Handle> = Lazy::new(|| {
    Atom::node(Type::PredicateNode, "*-TruthValueKey-*").expect("PredicateNode is a node type")
});

/// Return the key under which truth values are stored.
pub fn truth_key() -> Handle {
    TRUTH_KEY.clone()
}

/// Convert a count into a confidence.
pub fn count_to_confidence(count: f64) -> f64 {
    count / (count + CONFIDENCE_WEIGHT)
}

/// Convert a confidence into a count.
pub fn confidence_to_count(confidence: f64) -> f64 {
    // Clamp to keep full confidence finite
    let confidence = confidence.min(0.999_999_99);
    CONFIDENCE_WEIGHT * confidence / (1.0 - confidence)
}

/// Strength and confidence of an atom
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TruthValue {
    /// Mean and confidence
    Simple {
        /// Probability or strength
        mean: f64,
        /// How much evidence backs the mean, in `[0, 1]`
        confidence: f64,
    },
    /// Mean and confidence, together with the count of observations
    Count {
        /// Probability or strength
        mean: f64,
        /// How much evidence backs the mean, in `[0, 1]`
        confidence: f64,
        /// Number of observations
        count: f64,
    },
}

impl Default for TruthValue {
    fn default() -> Self {
        Self::Simple {
            mean: 1.0,
            confidence: 0.0,
        }
    }
}

impl TruthValue {
    /// Certainly true
    pub const TRUE: TruthValue = TruthValue::Simple {
        mean: 1.0,
        confidence: 1.0,
    };

    /// Certainly false
    pub const FALSE: TruthValue = TruthValue::Simple {
        mean: 0.0,
        confidence: 1.0,
    };

    /// Create a [TruthValue::Simple].
    pub fn simple(mean: f64, confidence: f64) -> Self {
        Self::Simple { mean, confidence }
    }

    /// Create a [TruthValue::Count].
    pub fn count(mean: f64, confidence: f64, count: f64) -> Self {
        Self::Count {
            mean,
            confidence,
            count,
        }
    }

    /// Return the mean.
    pub fn mean(&self) -> f64 {
        match self {
            Self::Simple { mean, .. } | Self::Count { mean, .. } => *mean,
        }
    }

    /// Return the confidence.
    pub fn confidence(&self) -> f64 {
        match self {
            Self::Simple { confidence, .. } | Self::Count { confidence, .. } => *confidence,
        }
    }

    /// Return the number of observations, derived from the confidence
    /// for simple truth values.
    pub fn get_count(&self) -> f64 {
        match self {
            Self::Simple { confidence, .. } => confidence_to_count(*confidence),
            Self::Count { count, .. } => *count,
        }
    }

    /// Whether this is the default truth value.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Return the [Type] of this truth value.
    pub fn value_type(&self) -> Type {
        match self {
            Self::Simple { .. } => Type::SimpleTruthValue,
            Self::Count { .. } => Type::CountTruthValue,
        }
    }

    /// Add `by` observations, turning this into a [TruthValue::Count].
    pub fn increment_count(&self, by: f64) -> Self {
        let count = match self {
            Self::Simple { .. } => 0.0,
            Self::Count { count, .. } => *count,
        } + by;

        Self::Count {
            mean: self.mean(),
            confidence: count_to_confidence(count),
            count,
        }
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple { mean, confidence } => {
                write!(f, "({} {mean} {confidence})", self.value_type())
            }
            Self::Count {
                mean,
                confidence,
                count,
            } => write!(f, "({} {mean} {confidence} {count})", self.value_type()),
        }
    }
}

/// Anything that can be attached to an atom under a key
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Vector of floats
    Float(Vec<f64>),
    /// Vector of strings
    String(Vec<String>),
    /// Vector of values
    Link(Vec<Value>),
    /// An atom
    Atom(Handle),
    /// A truth value
    Truth(TruthValue),
}

impl Value {
    /// Return the [Type] of this value.
    pub fn value_type(&self) -> Type {
        match self {
            Value::Float(_) => Type::FloatValue,
            Value::String(_) => Type::StringValue,
            Value::Link(_) => Type::LinkValue,
            Value::Atom(atom) => atom.atom_type(),
            Value::Truth(tv) => tv.value_type(),
        }
    }

    /// Return the truth value, if this is one.
    pub fn as_truth_value(&self) -> Option<TruthValue> {
        match self {
            Value::Truth(tv) => Some(*tv),
            _ => None,
        }
    }

    /// Return the floats, if this is a [Value::Float].
    pub fn as_floats(&self) -> Option<&[f64]> {
        match self {
            Value::Float(floats) => Some(floats),
            _ => None,
        }
    }
}

impl From<TruthValue> for Value {
    fn from(value: TruthValue) -> Self {
        Value::Truth(value)
    }
}

impl From<Handle> for Value {
    fn from(value: Handle) -> Self {
        Value::Atom(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(floats) => {
                write!(f, "({}", Type::FloatValue)?;
                for float in floats {
                    write!(f, " {float}")?;
                }
                write!(f, ")")
            }
            Value::String(strings) => {
                write!(f, "({}", Type::StringValue)?;
                for string in strings {
                    write!(f, " {}", quote_name(string))?;
                }
                write!(f, ")")
            }
            Value::Link(values) => {
                write!(f, "({}", Type::LinkValue)?;
                for value in values {
                    write!(f, " {value}")?;
                }
                write!(f, ")")
            }
            Value::Atom(atom) => f.write_str(&atom.to_short_string()),
            Value::Truth(tv) => tv.fmt(f),
        }
    }
}
