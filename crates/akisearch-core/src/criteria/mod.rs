//! Criteria tree describing document-matching conditions.
//!
//! A [`Criteria`] is an immutable boolean predicate built bottom-up. Leaf
//! variants match a single field (or a raw query string); compound variants
//! combine children. Every payload keeps its fields private so the node-level
//! invariants below hold for any tree that reaches a formatter:
//!
//! - field names are never blank
//! - `Term` carries a non-empty set of unique, non-null values
//! - `Range` carries at least one bound, every bound non-null
//! - `Not(Not(x))` never exists; it collapses to `x`
//!
//! Compound nodes are only produced through the combinators in
//! [`combine`](self::combine), which apply local simplifications as the tree is
//! assembled.

mod combine;
mod range;

pub use range::{RangeComparator, RangeSpecification};

use serde_json::Value;

use crate::error::{require_non_blank, SearchError, SearchResult};

/// A node in the boolean predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    /// Matches every document.
    MatchAll,
    /// Field equals one of a set of values.
    Term(TermCriteria),
    /// Field falls within one or more bounds.
    Range(RangeCriteria),
    /// Field is present.
    Exists(FieldCriteria),
    /// Field is absent.
    Missing(FieldCriteria),
    /// Field starts with a prefix.
    Prefix(PatternCriteria),
    /// Field matches a regular expression.
    Regexp(PatternCriteria),
    /// Raw query-string syntax passed through untouched.
    QueryString(QueryStringCriteria),
    /// Inversion of a child criterion.
    Not(NotCriteria),
    /// All children must match.
    And(CompoundCriteria),
    /// At least one child must match.
    Or(CompoundCriteria),
}

/// Discriminant of a [`Criteria`] node without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriteriaKind {
    MatchAll,
    Term,
    Range,
    Exists,
    Missing,
    Prefix,
    Regexp,
    QueryString,
    Not,
    And,
    Or,
}

impl CriteriaKind {
    pub const ALL: [CriteriaKind; 11] = [
        Self::MatchAll,
        Self::Term,
        Self::Range,
        Self::Exists,
        Self::Missing,
        Self::Prefix,
        Self::Regexp,
        Self::QueryString,
        Self::Not,
        Self::And,
        Self::Or,
    ];
}

impl Criteria {
    /// Term on a single value.
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> SearchResult<Self> {
        Self::terms(field, [value.into()])
    }

    /// Term on a set of values. Duplicates are removed, keeping first occurrences.
    pub fn terms<I, V>(field: impl Into<String>, values: I) -> SearchResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        TermCriteria::new(field, values).map(Self::Term)
    }

    /// Range on a field with one or more bounds.
    pub fn range<I>(field: impl Into<String>, specifications: I) -> SearchResult<Self>
    where
        I: IntoIterator<Item = RangeSpecification>,
    {
        RangeCriteria::new(field, specifications).map(Self::Range)
    }

    pub fn exists(field: impl Into<String>) -> SearchResult<Self> {
        FieldCriteria::new(field).map(Self::Exists)
    }

    pub fn missing(field: impl Into<String>) -> SearchResult<Self> {
        FieldCriteria::new(field).map(Self::Missing)
    }

    pub fn prefix(field: impl Into<String>, prefix: impl Into<String>) -> SearchResult<Self> {
        PatternCriteria::new(field, prefix).map(Self::Prefix)
    }

    pub fn regexp(field: impl Into<String>, pattern: impl Into<String>) -> SearchResult<Self> {
        PatternCriteria::new(field, pattern).map(Self::Regexp)
    }

    /// Raw query-string criterion. The text is never reformatted or lower-cased.
    pub fn query_string(value: impl Into<String>) -> SearchResult<Self> {
        let value = value.into();
        require_non_blank("query", &value)?;
        Ok(Self::QueryString(QueryStringCriteria { value }))
    }

    pub fn match_all() -> Self {
        Self::MatchAll
    }

    /// Wire name of this node (`"term"` vs `"terms"` depends on cardinality).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MatchAll => "match_all",
            Self::Term(term) => term.name(),
            Self::Range(_) => "range",
            Self::Exists(_) => "exists",
            Self::Missing(_) => "missing",
            Self::Prefix(_) => "prefix",
            Self::Regexp(_) => "regexp",
            Self::QueryString(_) => "query_string",
            Self::Not(_) => "not",
            Self::And(_) => "and",
            Self::Or(_) => "or",
        }
    }

    #[must_use]
    pub fn kind(&self) -> CriteriaKind {
        match self {
            Self::MatchAll => CriteriaKind::MatchAll,
            Self::Term(_) => CriteriaKind::Term,
            Self::Range(_) => CriteriaKind::Range,
            Self::Exists(_) => CriteriaKind::Exists,
            Self::Missing(_) => CriteriaKind::Missing,
            Self::Prefix(_) => CriteriaKind::Prefix,
            Self::Regexp(_) => CriteriaKind::Regexp,
            Self::QueryString(_) => CriteriaKind::QueryString,
            Self::Not(_) => CriteriaKind::Not,
            Self::And(_) => CriteriaKind::And,
            Self::Or(_) => CriteriaKind::Or,
        }
    }
}

/// Payload of [`Criteria::Term`].
#[derive(Debug, Clone, PartialEq)]
pub struct TermCriteria {
    field: String,
    values: Vec<Value>,
}

impl TermCriteria {
    fn new<I, V>(field: impl Into<String>, values: I) -> SearchResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let field = field.into();
        require_non_blank("field", &field)?;

        let mut unique: Vec<Value> = Vec::new();
        for value in values {
            let value = value.into();
            if value.is_null() {
                return Err(SearchError::invalid_argument(
                    "values",
                    format!("term on '{}' contains a null value", field),
                ));
            }
            if !unique.contains(&value) {
                unique.push(value);
            }
        }

        if unique.is_empty() {
            return Err(SearchError::invalid_argument(
                "values",
                format!("term on '{}' requires at least one value", field),
            ));
        }

        Ok(Self {
            field,
            values: unique,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Unique values in first-occurrence order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `"term"` for a single value, `"terms"` otherwise.
    #[must_use]
    pub fn name(&self) -> &'static str {
        if self.values.len() == 1 {
            "term"
        } else {
            "terms"
        }
    }

    /// The lone value when the term is singular.
    pub fn single_value(&self) -> Option<&Value> {
        match self.values.as_slice() {
            [value] => Some(value),
            _ => None,
        }
    }
}

/// Payload of [`Criteria::Range`].
#[derive(Debug, Clone, PartialEq)]
pub struct RangeCriteria {
    field: String,
    specifications: Vec<RangeSpecification>,
}

impl RangeCriteria {
    fn new<I>(field: impl Into<String>, specifications: I) -> SearchResult<Self>
    where
        I: IntoIterator<Item = RangeSpecification>,
    {
        let field = field.into();
        require_non_blank("field", &field)?;

        let specifications: Vec<_> = specifications.into_iter().collect();
        if specifications.is_empty() {
            return Err(SearchError::invalid_argument(
                "specifications",
                format!("range on '{}' requires at least one bound", field),
            ));
        }

        Ok(Self {
            field,
            specifications,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn specifications(&self) -> &[RangeSpecification] {
        &self.specifications
    }
}

/// Payload of [`Criteria::Exists`] and [`Criteria::Missing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCriteria {
    field: String,
}

impl FieldCriteria {
    fn new(field: impl Into<String>) -> SearchResult<Self> {
        let field = field.into();
        require_non_blank("field", &field)?;
        Ok(Self { field })
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

/// Payload of [`Criteria::Prefix`] and [`Criteria::Regexp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternCriteria {
    field: String,
    pattern: String,
}

impl PatternCriteria {
    fn new(field: impl Into<String>, pattern: impl Into<String>) -> SearchResult<Self> {
        let field = field.into();
        require_non_blank("field", &field)?;
        Ok(Self {
            field,
            pattern: pattern.into(),
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Payload of [`Criteria::QueryString`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStringCriteria {
    value: String,
}

impl QueryStringCriteria {
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Payload of [`Criteria::Not`].
#[derive(Debug, Clone, PartialEq)]
pub struct NotCriteria {
    child: Box<Criteria>,
}

impl NotCriteria {
    pub fn child(&self) -> &Criteria {
        &self.child
    }
}

/// Payload of [`Criteria::And`] and [`Criteria::Or`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundCriteria {
    children: Vec<Criteria>,
}

impl CompoundCriteria {
    pub fn children(&self) -> &[Criteria] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_term_name_follows_cardinality() {
        let single = Criteria::term("salutation", "Mr").unwrap();
        assert_eq!(single.name(), "term");

        let many = Criteria::terms("salutation", ["Mr", "Mrs"]).unwrap();
        assert_eq!(many.name(), "terms");
    }

    #[test]
    fn test_term_deduplicates_values() {
        let criteria = Criteria::terms("salutation", ["Mr", "Mrs", "Mr", "Ms", "Mrs"]).unwrap();
        let Criteria::Term(term) = criteria else {
            panic!("expected term");
        };

        assert_eq!(term.values().len(), 3);
        assert_eq!(term.values(), &[json!("Mr"), json!("Mrs"), json!("Ms")]);
    }

    #[test]
    fn test_term_collapsing_to_one_value_is_singular() {
        let criteria = Criteria::terms("age", [30, 30, 30]).unwrap();
        assert_eq!(criteria.name(), "term");
    }

    #[test]
    fn test_term_rejects_blank_field_empty_and_null_values() {
        assert!(matches!(
            Criteria::term("  ", "x"),
            Err(SearchError::InvalidArgument { name: "field", .. })
        ));
        assert!(Criteria::terms("field", Vec::<Value>::new()).is_err());
        assert!(Criteria::terms("field", [json!("a"), Value::Null]).is_err());
    }

    #[test]
    fn test_range_requires_a_bound() {
        let err = Criteria::range("price", Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            SearchError::InvalidArgument {
                name: "specifications",
                ..
            }
        ));

        let gt = RangeSpecification::new(RangeComparator::GreaterThan, 10).unwrap();
        let criteria = Criteria::range("price", [gt]).unwrap();
        assert_eq!(criteria.name(), "range");
    }

    #[test]
    fn test_leaf_constructors_reject_blank_fields() {
        assert!(Criteria::exists("").is_err());
        assert!(Criteria::missing(" ").is_err());
        assert!(Criteria::prefix("", "ab").is_err());
        assert!(Criteria::regexp("\t", "a.*").is_err());
        assert!(Criteria::query_string("").is_err());
    }

    #[test]
    fn test_query_string_is_not_reformatted() {
        let Criteria::QueryString(query) = Criteria::query_string("Name:Smith AND Age:[1 TO 5]").unwrap()
        else {
            panic!("expected query string");
        };
        assert_eq!(query.value(), "Name:Smith AND Age:[1 TO 5]");
    }

    #[test]
    fn test_kind_matches_name() {
        let criteria = [
            Criteria::match_all(),
            Criteria::exists("a").unwrap(),
            Criteria::missing("a").unwrap(),
            Criteria::prefix("a", "b").unwrap(),
            Criteria::regexp("a", "b").unwrap(),
            Criteria::query_string("a").unwrap(),
        ];
        let kinds: Vec<_> = criteria.iter().map(Criteria::kind).collect();
        assert_eq!(
            kinds,
            vec![
                CriteriaKind::MatchAll,
                CriteriaKind::Exists,
                CriteriaKind::Missing,
                CriteriaKind::Prefix,
                CriteriaKind::Regexp,
                CriteriaKind::QueryString,
            ]
        );
        assert_eq!(criteria[5].name(), "query_string");
    }
}
