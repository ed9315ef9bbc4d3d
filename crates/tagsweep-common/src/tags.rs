//! Tag filters and tag matching
//!
//! Input documents have the shape
//! `{"TagFilters": [{"Key": "env", "Values": ["staging"]}]}`.
//!
//! A resource matches a filter when it carries the filter's key and either
//! the filter lists no values or the resource's value is one of them.
//! A resource matches a document when it matches every filter in it.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// One key plus the acceptable values for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    #[serde(rename = "Key")]
    pub key: String,
    /// Empty means "any value"; `null` reads as empty
    #[serde(rename = "Values", default, deserialize_with = "null_as_empty")]
    pub values: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl TagFilter {
    pub fn new(key: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Filter matching any value of `key`
    pub fn any_value(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: Vec::new(),
        }
    }

    /// Check a single tag value against this filter's value list
    pub fn accepts_value(&self, value: &str) -> bool {
        self.values.is_empty() || self.values.iter().any(|v| v == value)
    }

    /// Check a resource's full tag set against this filter
    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        tags.get(&self.key)
            .is_some_and(|value| self.accepts_value(value))
    }
}

/// One discovery unit: a list of filters that must all match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilterDocument {
    #[serde(rename = "TagFilters", default)]
    pub tag_filters: Vec<TagFilter>,
}

impl TagFilterDocument {
    pub fn new(tag_filters: Vec<TagFilter>) -> Self {
        Self { tag_filters }
    }

    pub fn is_empty(&self) -> bool {
        self.tag_filters.is_empty()
    }

    /// A resource matches when every filter matches its tags.
    ///
    /// An empty document matches nothing; discovery never treats "no
    /// filters" as "everything".
    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        !self.tag_filters.is_empty() && self.tag_filters.iter().all(|f| f.matches(tags))
    }
}

/// Collect key/value pairs from any SDK tag type into a map.
///
/// Different AWS SDKs use different tag types but they all carry a key and
/// a value; entries missing either are dropped.
pub fn collect_tags<T>(
    tags: &[T],
    key: impl Fn(&T) -> Option<&str>,
    value: impl Fn(&T) -> Option<&str>,
) -> HashMap<String, String> {
    tags.iter()
        .filter_map(|t| match (key(t), value(t)) {
            (Some(k), Some(v)) => Some((k.to_string(), v.to_string())),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_values_match_any_value() {
        let filter = TagFilter::any_value("env");
        assert!(filter.matches(&tags(&[("env", "prod")])));
        assert!(filter.matches(&tags(&[("env", "")])));
        assert!(!filter.matches(&tags(&[("team", "prod")])));
    }

    #[test]
    fn values_require_membership() {
        let filter = TagFilter::new("env", ["staging", "dev"]);
        assert!(filter.matches(&tags(&[("env", "staging")])));
        assert!(filter.matches(&tags(&[("env", "dev")])));
        assert!(!filter.matches(&tags(&[("env", "prod")])));
        assert!(!filter.matches(&tags(&[])));
    }

    #[test]
    fn document_requires_every_filter() {
        let doc = TagFilterDocument::new(vec![
            TagFilter::new("env", ["staging"]),
            TagFilter::any_value("owner"),
        ]);
        assert!(doc.matches(&tags(&[("env", "staging"), ("owner", "ops")])));
        assert!(!doc.matches(&tags(&[("env", "staging")])));
        assert!(!doc.matches(&tags(&[("owner", "ops")])));
        assert!(!TagFilterDocument::default().matches(&tags(&[("env", "staging")])));
    }

    #[test]
    fn deserializes_wire_shape() {
        let doc: TagFilterDocument =
            serde_json::from_str(r#"{"TagFilters":[{"Key":"env","Values":["staging"]},{"Key":"team"}]}"#)
                .unwrap();
        assert_eq!(
            doc,
            TagFilterDocument::new(vec![
                TagFilter::new("env", ["staging"]),
                TagFilter::any_value("team"),
            ])
        );
    }

    #[test]
    fn null_values_mean_any_value() {
        let doc: TagFilterDocument =
            serde_json::from_str(r#"{"TagFilters":[{"Key":"env","Values":null}]}"#).unwrap();
        assert_eq!(doc, TagFilterDocument::new(vec![TagFilter::any_value("env")]));
        assert!(doc.matches(&tags(&[("env", "anything")])));
    }

    #[test]
    fn collect_tags_drops_incomplete_pairs() {
        let raw = vec![(Some("a"), Some("1")), (None, Some("2")), (Some("c"), None)];
        let map = collect_tags(&raw, |t| t.0, |t| t.1);
        assert_eq!(map, tags(&[("a", "1")]));
    }

    proptest! {
        /// A filter without values accepts whatever value the key carries
        #[test]
        fn any_value_filter_accepts_all(key in "[a-z]{1,8}", value in ".*") {
            let filter = TagFilter::any_value(key.clone());
            let mut t = HashMap::new();
            t.insert(key, value);
            prop_assert!(filter.matches(&t));
        }

        /// A filter with values accepts exactly the listed values
        #[test]
        fn listed_values_are_exact(
            values in prop::collection::vec("[a-z]{1,4}", 1..5),
            candidate in "[a-z]{1,4}",
        ) {
            let filter = TagFilter::new("k", values.clone());
            let mut t = HashMap::new();
            t.insert("k".to_string(), candidate.clone());
            prop_assert_eq!(filter.matches(&t), values.contains(&candidate));
        }
    }
}
