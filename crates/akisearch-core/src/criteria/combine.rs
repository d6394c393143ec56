//! Combinators that assemble compound criteria in minimal form.
//!
//! - [`Criteria::and`] merges `Range` criteria on the same field into one range
//!   carrying every bound. Bounds are concatenated as-is: two `gt` bounds on one
//!   field, or contradictory bounds, are kept without being reconciled.
//! - [`Criteria::or`] collapses `Term` criteria that all target one field into a
//!   single term over the union of their values.
//! - [`Criteria::not`] cancels double negation and swaps `Exists`/`Missing`.
//!
//! Inputs are consumed and never mutated in place; a single surviving input is
//! returned as-is instead of being wrapped.

use std::ops;

use serde_json::Value;

use super::{CompoundCriteria, Criteria, NotCriteria, TermCriteria};
use crate::error::{SearchError, SearchResult};

impl Criteria {
    /// Combine criteria that must all match.
    ///
    /// Fails when no criteria are supplied.
    pub fn and<I>(criteria: I) -> SearchResult<Criteria>
    where
        I: IntoIterator<Item = Criteria>,
    {
        let criteria: Vec<Criteria> = criteria.into_iter().collect();
        if criteria.is_empty() {
            return Err(SearchError::invalid_argument(
                "criteria",
                "and requires at least one criterion",
            ));
        }

        let mut children = merge_ranges(criteria);

        if children.len() == 1 {
            return Ok(children.remove(0));
        }

        Ok(Criteria::And(CompoundCriteria { children }))
    }

    /// Combine criteria of which at least one must match.
    ///
    /// An empty input yields an empty `Or`.
    pub fn or<I>(criteria: I) -> Criteria
    where
        I: IntoIterator<Item = Criteria>,
    {
        let mut criteria: Vec<Criteria> = criteria.into_iter().collect();

        if let Some(term) = collapse_terms(&criteria) {
            return Criteria::Term(term);
        }

        if criteria.len() == 1 {
            return criteria.remove(0);
        }

        Criteria::Or(CompoundCriteria { children: criteria })
    }

    /// Invert a criterion.
    pub fn not(criteria: Criteria) -> Criteria {
        match criteria {
            Criteria::Not(not) => *not.child,
            Criteria::Exists(field) => Criteria::Missing(field),
            Criteria::Missing(field) => Criteria::Exists(field),
            other => Criteria::Not(NotCriteria {
                child: Box::new(other),
            }),
        }
    }
}

impl ops::Not for Criteria {
    type Output = Criteria;

    fn not(self) -> Criteria {
        Criteria::not(self)
    }
}

/// Replace every group of two or more ranges on one field with a single range
/// holding all their bounds, positioned where the group's first range was.
fn merge_ranges(criteria: Vec<Criteria>) -> Vec<Criteria> {
    let mut merged: Vec<Criteria> = Vec::with_capacity(criteria.len());

    for criterion in criteria {
        let range = match criterion {
            Criteria::Range(range) => range,
            other => {
                merged.push(other);
                continue;
            }
        };

        let existing = merged.iter_mut().find_map(|candidate| match candidate {
            Criteria::Range(candidate) if candidate.field == range.field => Some(candidate),
            _ => None,
        });

        match existing {
            Some(target) => target.specifications.extend(range.specifications),
            None => merged.push(Criteria::Range(range)),
        }
    }

    merged
}

/// Union of the values when every criterion is a term on the same field.
fn collapse_terms(criteria: &[Criteria]) -> Option<TermCriteria> {
    let mut terms = criteria.iter().map(|criterion| match criterion {
        Criteria::Term(term) => Some(term),
        _ => None,
    });

    let first = terms.next()??;
    let mut values: Vec<Value> = first.values.clone();

    for term in terms {
        let term = term?;
        if term.field != first.field {
            return None;
        }
        for value in &term.values {
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
    }

    Some(TermCriteria {
        field: first.field.clone(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{RangeComparator, RangeSpecification};
    use serde_json::json;

    fn range(field: &str, comparator: RangeComparator, value: &str) -> Criteria {
        Criteria::range(field, [RangeSpecification::new(comparator, value).unwrap()]).unwrap()
    }

    #[test]
    fn test_or_of_terms_on_same_field_collapses() {
        let combined = Criteria::or([
            Criteria::terms("salutation", ["Mr", "Mrs"]).unwrap(),
            Criteria::terms("salutation", ["Mrs", "Miss"]).unwrap(),
            Criteria::term("salutation", "Mr").unwrap(),
        ]);

        let Criteria::Term(term) = combined else {
            panic!("expected a single term");
        };
        assert_eq!(term.field(), "salutation");
        assert_eq!(term.values().len(), 3);
        for value in ["Mr", "Mrs", "Miss"] {
            assert!(term.values().contains(&json!(value)));
        }
    }

    #[test]
    fn test_or_of_terms_on_different_fields_keeps_children() {
        let combined = Criteria::or([
            Criteria::term("salutation", "Mr").unwrap(),
            Criteria::term("surname", "Smith").unwrap(),
            Criteria::exists("email").unwrap(),
        ]);

        let Criteria::Or(or) = combined else {
            panic!("expected or");
        };
        assert_eq!(or.children().len(), 3);
    }

    #[test]
    fn test_or_with_non_term_does_not_collapse() {
        let combined = Criteria::or([
            Criteria::term("salutation", "Mr").unwrap(),
            Criteria::prefix("salutation", "M").unwrap(),
        ]);
        assert_eq!(combined.kind(), crate::criteria::CriteriaKind::Or);
    }

    #[test]
    fn test_or_of_one_returns_it_unwrapped() {
        let exists = Criteria::exists("email").unwrap();
        assert_eq!(Criteria::or([exists.clone()]), exists);
    }

    #[test]
    fn test_or_of_nothing_is_empty_or() {
        let Criteria::Or(or) = Criteria::or(Vec::new()) else {
            panic!("expected empty or");
        };
        assert!(or.children().is_empty());
    }

    #[test]
    fn test_and_merges_ranges_on_same_field() {
        let combined = Criteria::and([
            range("first", RangeComparator::GreaterThan, "lower"),
            range("first", RangeComparator::LessThanOrEqual, "upper"),
        ])
        .unwrap();

        let Criteria::Range(merged) = combined else {
            panic!("expected a single range");
        };
        assert_eq!(merged.field(), "first");
        assert_eq!(merged.specifications().len(), 2);
    }

    #[test]
    fn test_and_keeps_ranges_on_other_fields_separate() {
        let combined = Criteria::and([
            range("first", RangeComparator::GreaterThan, "lower"),
            range("first", RangeComparator::LessThanOrEqual, "upper"),
            range("second", RangeComparator::GreaterThanOrEqual, "x"),
        ])
        .unwrap();

        let Criteria::And(and) = combined else {
            panic!("expected and");
        };
        assert_eq!(and.children().len(), 2);

        let merged = and
            .children()
            .iter()
            .find_map(|child| match child {
                Criteria::Range(range) if range.field() == "first" => Some(range),
                _ => None,
            })
            .unwrap();
        assert_eq!(merged.specifications().len(), 2);
    }

    #[test]
    fn test_and_keeps_contradictory_bounds_unreconciled() {
        let combined = Criteria::and([
            range("age", RangeComparator::GreaterThan, "10"),
            range("age", RangeComparator::GreaterThan, "20"),
            range("age", RangeComparator::LessThan, "5"),
        ])
        .unwrap();

        let Criteria::Range(merged) = combined else {
            panic!("expected range");
        };
        // gt 10, gt 20 and lt 5 survive together: no overlap or conflict detection
        assert_eq!(merged.specifications().len(), 3);
    }

    #[test]
    fn test_and_of_one_returns_it_unwrapped() {
        let term = Criteria::term("a", 1).unwrap();
        assert_eq!(Criteria::and([term.clone()]).unwrap(), term);
    }

    #[test]
    fn test_and_of_nothing_fails() {
        assert!(matches!(
            Criteria::and(Vec::new()),
            Err(SearchError::InvalidArgument { name: "criteria", .. })
        ));
    }

    #[test]
    fn test_not_of_not_cancels() {
        let term = Criteria::term("a", 1).unwrap();
        let negated = Criteria::not(term.clone());
        assert_eq!(negated.kind(), crate::criteria::CriteriaKind::Not);
        assert_eq!(Criteria::not(negated), term);
    }

    #[test]
    fn test_not_swaps_exists_and_missing() {
        let exists = Criteria::exists("email").unwrap();
        let missing = Criteria::missing("email").unwrap();

        assert_eq!(!exists.clone(), missing);
        assert_eq!(!missing, exists);
    }
}
