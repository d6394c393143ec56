use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{SearchError, SearchResult};

/// Comparison applied by a single range bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeComparator {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl RangeComparator {
    pub const ALL: [RangeComparator; 4] = [
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
    ];

    /// Wire name of the comparator (`gt`, `gte`, `lt`, `lte`).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GreaterThan => "gt",
            Self::GreaterThanOrEqual => "gte",
            Self::LessThan => "lt",
            Self::LessThanOrEqual => "lte",
        }
    }
}

impl fmt::Display for RangeComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RangeComparator {
    type Err = SearchError;

    fn from_str(s: &str) -> SearchResult<Self> {
        Self::ALL
            .into_iter()
            .find(|comparator| comparator.name() == s)
            .ok_or_else(|| {
                SearchError::invalid_argument(
                    "comparator",
                    format!("unknown range comparator '{}', expected gt, gte, lt or lte", s),
                )
            })
    }
}

/// One bound of a range criterion, e.g. `gte 10`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpecification {
    comparator: RangeComparator,
    value: Value,
}

impl RangeSpecification {
    /// Create a bound. The value must not be JSON `null`.
    pub fn new(comparator: RangeComparator, value: impl Into<Value>) -> SearchResult<Self> {
        let value = value.into();
        if value.is_null() {
            return Err(SearchError::invalid_argument(
                "value",
                format!("range bound '{}' requires a non-null value", comparator),
            ));
        }

        Ok(Self { comparator, value })
    }

    pub fn comparator(&self) -> RangeComparator {
        self.comparator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparator_names_round_trip() {
        for comparator in RangeComparator::ALL {
            assert_eq!(comparator.name().parse::<RangeComparator>().unwrap(), comparator);
        }
        assert!("between".parse::<RangeComparator>().is_err());
    }

    #[test]
    fn test_specification_rejects_null() {
        assert!(RangeSpecification::new(RangeComparator::GreaterThan, Value::Null).is_err());

        let spec = RangeSpecification::new(RangeComparator::LessThanOrEqual, 42).unwrap();
        assert_eq!(spec.comparator(), RangeComparator::LessThanOrEqual);
        assert_eq!(spec.value(), &Value::from(42));
    }
}
