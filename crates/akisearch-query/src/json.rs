//! JSON shapes of criteria, facets and sort options in request bodies.
//!
//! Criteria serialization is an exhaustive match over [`Criteria`]; adding a
//! variant without a wire shape fails to compile.

use serde_json::{json, Map, Value};

use akisearch_core::{Criteria, Facet, FacetKind, SortOption};

/// Serialize a criteria tree.
pub fn criteria(criteria: &Criteria) -> Value {
    match criteria {
        Criteria::MatchAll => json!({ "match_all": {} }),
        Criteria::Term(term) => {
            let value = match term.single_value() {
                Some(value) => value.clone(),
                None => Value::Array(term.values().to_vec()),
            };
            keyed(term.name(), keyed(term.field(), value))
        }
        Criteria::Range(range) => {
            // Repeated comparators on one field collapse here; the last bound wins.
            let mut bounds = Map::new();
            for specification in range.specifications() {
                bounds.insert(
                    specification.comparator().name().to_string(),
                    specification.value().clone(),
                );
            }
            keyed(
                criteria.name(),
                keyed(range.field(), Value::Object(bounds)),
            )
        }
        Criteria::Exists(field) | Criteria::Missing(field) => {
            keyed(criteria.name(), json!({ "field": field.field() }))
        }
        Criteria::Prefix(pattern) | Criteria::Regexp(pattern) => keyed(
            criteria.name(),
            keyed(pattern.field(), Value::from(pattern.pattern())),
        ),
        Criteria::QueryString(query) => {
            keyed(criteria.name(), json!({ "query": query.value() }))
        }
        Criteria::Not(not) => keyed(criteria.name(), self::criteria(not.child())),
        Criteria::And(compound) | Criteria::Or(compound) => match compound.children() {
            [only] => self::criteria(only),
            children => keyed(
                criteria.name(),
                Value::Array(children.iter().map(self::criteria).collect()),
            ),
        },
    }
}

/// Serialize a sort option.
///
/// Ascending sorts are a bare field name; descending sorts map the field to
/// `"desc"`; `ignore_unmapped` switches to the object form.
pub fn sort_option(sort: &SortOption) -> Value {
    if sort.ignore_unmapped() {
        let mut options = Map::new();
        options.insert("ignore_unmapped".to_string(), Value::Bool(true));
        if !sort.is_ascending() {
            options.insert("order".to_string(), Value::from("desc"));
        }
        return keyed(sort.name(), Value::Object(options));
    }

    if sort.is_ascending() {
        Value::from(sort.name())
    } else {
        keyed(sort.name(), Value::from("desc"))
    }
}

/// Serialize a facet body (the value stored under the facet's name).
pub fn facet(facet: &Facet) -> Value {
    let kind = facet.kind();

    let mut body = Map::new();
    match kind {
        FacetKind::Filter => {
            let filter = facet
                .filter_criteria()
                .map_or_else(|| criteria(&Criteria::MatchAll), criteria);
            return keyed(kind.type_name(), filter);
        }
        FacetKind::Statistical { fields } => {
            body.insert("fields".to_string(), json!(fields));
        }
        FacetKind::Terms { fields, size } => {
            body.insert("fields".to_string(), json!(fields));
            if let Some(size) = size {
                body.insert("size".to_string(), Value::from(*size));
            }
        }
        FacetKind::TermsStats { key, value, size } => {
            body.insert("key_field".to_string(), Value::from(key.as_str()));
            body.insert("value_field".to_string(), Value::from(value.as_str()));
            if let Some(size) = size {
                body.insert("size".to_string(), Value::from(*size));
            }
        }
    }

    let mut wrapper = Map::new();
    wrapper.insert(kind.type_name().to_string(), Value::Object(body));
    if let Some(filter) = facet.filter_criteria() {
        wrapper.insert("facet_filter".to_string(), criteria(filter));
    }
    Value::Object(wrapper)
}

fn keyed(key: &str, value: Value) -> Value {
    let mut object = Map::new();
    object.insert(key.to_string(), value);
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use akisearch_core::{CriteriaKind, RangeComparator, RangeSpecification};

    fn sample(kind: CriteriaKind) -> Criteria {
        match kind {
            CriteriaKind::MatchAll => Criteria::match_all(),
            CriteriaKind::Term => Criteria::term("f", "v").unwrap(),
            CriteriaKind::Range => Criteria::range(
                "f",
                [RangeSpecification::new(RangeComparator::GreaterThan, 1).unwrap()],
            )
            .unwrap(),
            CriteriaKind::Exists => Criteria::exists("f").unwrap(),
            CriteriaKind::Missing => Criteria::missing("f").unwrap(),
            CriteriaKind::Prefix => Criteria::prefix("f", "p").unwrap(),
            CriteriaKind::Regexp => Criteria::regexp("f", "p.*").unwrap(),
            CriteriaKind::QueryString => Criteria::query_string("f:v").unwrap(),
            CriteriaKind::Not => Criteria::not(Criteria::term("f", "v").unwrap()),
            CriteriaKind::And => Criteria::and([
                Criteria::term("f", "v").unwrap(),
                Criteria::exists("g").unwrap(),
            ])
            .unwrap(),
            CriteriaKind::Or => Criteria::or([
                Criteria::term("f", "v").unwrap(),
                Criteria::exists("g").unwrap(),
            ]),
        }
    }

    #[test]
    fn test_every_kind_serializes_under_its_name() {
        for kind in CriteriaKind::ALL {
            let criteria = sample(kind);
            assert_eq!(criteria.kind(), kind);

            let json = super::criteria(&criteria);
            let object = json.as_object().unwrap();
            assert_eq!(object.len(), 1, "{:?} should have one key", kind);
            assert!(
                object.contains_key(criteria.name()),
                "{:?} should serialize under '{}'",
                kind,
                criteria.name()
            );
        }
    }

    #[test]
    fn test_term_shapes() {
        let single = Criteria::term("term1", "singlecriteria").unwrap();
        assert_eq!(
            criteria(&single),
            json!({ "term": { "term1": "singlecriteria" } })
        );

        let many = Criteria::terms("term1", ["criteria1", "criteria2"]).unwrap();
        let json = criteria(&many);
        let values = json["terms"]["term1"].as_array().unwrap();
        assert_eq!(values.len(), 2);
        assert!(values.contains(&json!("criteria1")));
        assert!(values.contains(&json!("criteria2")));
    }

    #[test]
    fn test_range_shape() {
        let range = Criteria::range(
            "age",
            [
                RangeSpecification::new(RangeComparator::GreaterThanOrEqual, 18).unwrap(),
                RangeSpecification::new(RangeComparator::LessThan, 65).unwrap(),
            ],
        )
        .unwrap();

        assert_eq!(
            criteria(&range),
            json!({ "range": { "age": { "gte": 18, "lt": 65 } } })
        );
    }

    #[test]
    fn test_leaf_shapes() {
        assert_eq!(
            criteria(&Criteria::exists("email").unwrap()),
            json!({ "exists": { "field": "email" } })
        );
        assert_eq!(
            criteria(&Criteria::missing("email").unwrap()),
            json!({ "missing": { "field": "email" } })
        );
        assert_eq!(
            criteria(&Criteria::prefix("name", "Sm").unwrap()),
            json!({ "prefix": { "name": "Sm" } })
        );
        assert_eq!(
            criteria(&Criteria::regexp("name", "Sm.*h").unwrap()),
            json!({ "regexp": { "name": "Sm.*h" } })
        );
        assert_eq!(
            criteria(&Criteria::query_string("Name:SMITH").unwrap()),
            json!({ "query_string": { "query": "Name:SMITH" } })
        );
        assert_eq!(criteria(&Criteria::match_all()), json!({ "match_all": {} }));
    }

    #[test]
    fn test_not_wraps_child() {
        let not = Criteria::not(Criteria::prefix("name", "Sm").unwrap());
        assert_eq!(
            criteria(&not),
            json!({ "not": { "prefix": { "name": "Sm" } } })
        );
    }

    #[test]
    fn test_compound_lists_children() {
        let or = Criteria::or([
            Criteria::term("a", 1).unwrap(),
            Criteria::term("b", 2).unwrap(),
        ]);
        assert_eq!(
            criteria(&or),
            json!({ "or": [ { "term": { "a": 1 } }, { "term": { "b": 2 } } ] })
        );

        assert_eq!(criteria(&Criteria::or(Vec::new())), json!({ "or": [] }));
    }

    #[test]
    fn test_sort_shapes() {
        let ascending = SortOption::ascending("name").unwrap();
        assert_eq!(sort_option(&ascending), json!("name"));

        let descending = SortOption::descending("name").unwrap();
        assert_eq!(sort_option(&descending), json!({ "name": "desc" }));

        let ignoring = SortOption::ascending("name").unwrap().ignoring_unmapped();
        assert_eq!(
            sort_option(&ignoring),
            json!({ "name": { "ignore_unmapped": true } })
        );

        let ignoring_desc = SortOption::descending("name").unwrap().ignoring_unmapped();
        assert_eq!(
            sort_option(&ignoring_desc),
            json!({ "name": { "ignore_unmapped": true, "order": "desc" } })
        );
    }

    #[test]
    fn test_facet_shapes() {
        let filter = Facet::filter("all", None).unwrap();
        assert_eq!(facet(&filter), json!({ "filter": { "match_all": {} } }));

        let stats = Facet::statistical("price_stats", None, ["price"]).unwrap();
        assert_eq!(facet(&stats), json!({ "statistical": { "fields": ["price"] } }));

        let terms = Facet::terms(
            "tags",
            Some(Criteria::exists("tag").unwrap()),
            Some(5),
            ["tag"],
        )
        .unwrap();
        assert_eq!(
            facet(&terms),
            json!({
                "terms": { "fields": ["tag"], "size": 5 },
                "facet_filter": { "exists": { "field": "tag" } }
            })
        );

        let terms_stats = Facet::terms_stats("sales", None, "region", "amount", None).unwrap();
        assert_eq!(
            facet(&terms_stats),
            json!({ "terms_stats": { "key_field": "region", "value_field": "amount" } })
        );
    }
}
