//! Grouping discovered ARNs into per-type buckets

use std::collections::{BTreeMap, HashSet};
use tagsweep_common::{ResourceArn, ResourceName, ResourceType};
use tracing::debug;

/// Resource names grouped by type.
///
/// A name is held at most once across all buckets; the first type it was
/// inserted under wins. Buckets iterate in [`ResourceType`] declaration
/// order and names keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBuckets {
    buckets: BTreeMap<ResourceType, Vec<ResourceName>>,
    seen: HashSet<ResourceName>,
}

impl ResourceBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name under a type. Returns false for empty or already-held names.
    pub fn insert(&mut self, resource_type: ResourceType, name: ResourceName) -> bool {
        if name.is_empty() || self.seen.contains(&name) {
            return false;
        }
        self.seen.insert(name.clone());
        self.buckets.entry(resource_type).or_default().push(name);
        true
    }

    pub fn get(&self, resource_type: ResourceType) -> Option<&[ResourceName]> {
        self.buckets.get(&resource_type).map(Vec::as_slice)
    }

    /// Number of non-empty buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total names across all buckets
    pub fn resource_count(&self) -> usize {
        self.seen.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, &[ResourceName])> {
        self.buckets.iter().map(|(t, names)| (*t, names.as_slice()))
    }

    /// Every (type, name) pair, bucket by bucket
    pub fn resources(&self) -> impl Iterator<Item = (ResourceType, &ResourceName)> {
        self.buckets
            .iter()
            .flat_map(|(t, names)| names.iter().map(move |n| (*t, n)))
    }

    pub fn into_inner(self) -> BTreeMap<ResourceType, Vec<ResourceName>> {
        self.buckets
    }
}

/// Decompose ARNs and bucket them by type.
///
/// ARNs that do not parse, or that carry an empty or already-seen name,
/// are dropped. Returns the buckets and the accepted ARNs in input order.
pub fn bucket_arns(arns: &[ResourceArn]) -> (ResourceBuckets, Vec<ResourceArn>) {
    let mut buckets = ResourceBuckets::new();
    let mut accepted = Vec::new();

    for arn in arns {
        match arn.parse() {
            Ok(parts) => {
                if buckets.insert(parts.resource_type, parts.name) {
                    accepted.push(arn.clone());
                }
            }
            Err(e) => debug!(arn = %arn, error = %e, "Skipping undeletable ARN"),
        }
    }

    (buckets, accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arn(s: &str) -> ResourceArn {
        ResourceArn::from(s)
    }

    #[test]
    fn test_groups_by_type() {
        let (buckets, accepted) = bucket_arns(&[
            arn("arn:aws:ec2:us-east-1:123:subnet/subnet-1"),
            arn("arn:aws:ec2:us-east-1:123:vpc/vpc-1"),
            arn("arn:aws:ec2:us-east-1:123:subnet/subnet-2"),
        ]);

        assert_eq!(buckets.len(), 2);
        assert_eq!(
            buckets.get(ResourceType::Ec2Subnet).unwrap(),
            [ResourceName::from("subnet-1"), ResourceName::from("subnet-2")]
        );
        assert_eq!(buckets.get(ResourceType::Ec2Vpc).unwrap(), [ResourceName::from("vpc-1")]);
        assert_eq!(accepted.len(), 3);
    }

    #[test]
    fn test_drops_duplicates_and_unparseable() {
        let (buckets, accepted) = bucket_arns(&[
            arn("arn:aws:ec2:us-east-1:123:vpc/vpc-1"),
            arn("arn:aws:ec2:us-east-1:123:vpc/vpc-1"),
            arn("arn:aws:ec2:us-east-1:123:vpc/"),
            arn("arn:aws:lambda:us-east-1:123:function:f"),
            arn("garbage"),
        ]);

        assert_eq!(buckets.resource_count(), 1);
        assert_eq!(accepted, [arn("arn:aws:ec2:us-east-1:123:vpc/vpc-1")]);
    }

    #[test]
    fn test_name_held_once_across_types() {
        let mut buckets = ResourceBuckets::new();
        assert!(buckets.insert(ResourceType::Ec2Vpc, "shared".into()));
        assert!(!buckets.insert(ResourceType::Ec2Subnet, "shared".into()));
        assert!(buckets.get(ResourceType::Ec2Subnet).is_none());
    }

    #[test]
    fn test_empty_input() {
        let (buckets, accepted) = bucket_arns(&[]);
        assert!(buckets.is_empty());
        assert!(accepted.is_empty());
    }

    proptest! {
        /// Every name appears in exactly one bucket, however often it is discovered
        #[test]
        fn names_are_unique_across_buckets(
            ids in prop::collection::vec((0usize..3, "[a-c]{1,2}"), 0..40),
        ) {
            let tokens = ["vpc", "subnet", "instance"];
            let arns: Vec<ResourceArn> = ids
                .iter()
                .map(|(t, id)| arn(&format!("arn:aws:ec2:us-east-1:123:{}/{}", tokens[*t], id)))
                .collect();

            let (buckets, accepted) = bucket_arns(&arns);

            let all: Vec<&ResourceName> = buckets.resources().map(|(_, n)| n).collect();
            let unique: HashSet<&ResourceName> = all.iter().copied().collect();
            prop_assert_eq!(all.len(), unique.len());
            prop_assert_eq!(all.len(), accepted.len());

            let distinct_ids: HashSet<&String> = ids.iter().map(|(_, id)| id).collect();
            prop_assert_eq!(unique.len(), distinct_ids.len());
        }
    }
}
