//! Dependency expansion for `--all-deps`
//!
//! Starting from the discovered buckets, repeatedly ask a
//! [`DependencySource`] which resources must be deleted before each one
//! and add them, until no new resource appears.

use crate::aws::{AwsError, CallContext};
use crate::bucket::ResourceBuckets;
use std::collections::VecDeque;
use tagsweep_common::{ResourceName, ResourceType};
use tracing::{debug, info, warn};

/// Widen a set of buckets with dependent resources.
#[allow(async_fn_in_trait)]
pub trait DependencyExpander {
    async fn expand(&self, buckets: ResourceBuckets) -> ResourceBuckets;
}

/// Leaves buckets as discovered
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExpansion;

impl DependencyExpander for NoExpansion {
    async fn expand(&self, buckets: ResourceBuckets) -> ResourceBuckets {
        buckets
    }
}

/// Edges of the dependency graph: resources that block deleting a resource.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait DependencySource: Send + Sync {
    async fn dependents(
        &self,
        call: &CallContext,
        resource_type: ResourceType,
        name: &ResourceName,
    ) -> Result<Vec<(ResourceType, ResourceName)>, AwsError>;
}

/// Breadth-first expansion to a fixpoint over a [`DependencySource`].
///
/// A lookup failure leaves that resource's dependents out and is logged;
/// expansion continues with the rest.
pub struct GraphExpander<S> {
    source: S,
    call: CallContext,
}

impl<S: DependencySource> GraphExpander<S> {
    pub fn new(source: S, call: CallContext) -> Self {
        Self { source, call }
    }
}

impl<S: DependencySource> DependencyExpander for GraphExpander<S> {
    async fn expand(&self, mut buckets: ResourceBuckets) -> ResourceBuckets {
        let mut queue: VecDeque<(ResourceType, ResourceName)> = buckets
            .resources()
            .map(|(t, n)| (t, n.clone()))
            .collect();
        let before = buckets.resource_count();

        while let Some((resource_type, name)) = queue.pop_front() {
            if self.call.is_cancelled() {
                warn!("Dependency expansion cancelled");
                break;
            }
            match self.source.dependents(&self.call, resource_type, &name).await {
                Ok(dependents) => {
                    for (dep_type, dep_name) in dependents {
                        if buckets.insert(dep_type, dep_name.clone()) {
                            debug!(
                                parent_type = %resource_type,
                                parent = %name,
                                resource_type = %dep_type,
                                name = %dep_name,
                                "Added dependent resource"
                            );
                            queue.push_back((dep_type, dep_name));
                        }
                    }
                }
                Err(e) => warn!(
                    resource_type = %resource_type,
                    name = %name,
                    error = %e,
                    "Failed to look up dependents"
                ),
            }
        }

        info!(
            added = buckets.resource_count() - before,
            total = buckets.resource_count(),
            "Dependency expansion complete"
        );
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::*;

    fn name(s: &str) -> ResourceName {
        ResourceName::from(s)
    }

    fn vpc_graph() -> MockDependencySource {
        let mut source = MockDependencySource::new();
        source
            .expect_dependents()
            .returning(|_, resource_type, resource_name| {
                Ok(match (resource_type, resource_name.as_str()) {
                    (ResourceType::Ec2Vpc, "vpc-1") => vec![
                        (ResourceType::Ec2Subnet, name("subnet-1")),
                        (ResourceType::Ec2InternetGateway, name("igw-1")),
                    ],
                    (ResourceType::Ec2Subnet, "subnet-1") => vec![
                        (ResourceType::Ec2Instance, name("i-1")),
                        (ResourceType::Ec2NetworkInterface, name("eni-1")),
                    ],
                    _ => vec![],
                })
            });
        source
    }

    fn seed() -> ResourceBuckets {
        let mut buckets = ResourceBuckets::new();
        buckets.insert(ResourceType::Ec2Vpc, name("vpc-1"));
        buckets
    }

    #[tokio::test]
    async fn test_expands_transitively() {
        let expander = GraphExpander::new(vpc_graph(), CallContext::default());
        let expanded = expander.expand(seed()).await;

        assert_eq!(expanded.resource_count(), 5);
        assert_eq!(expanded.get(ResourceType::Ec2Instance).unwrap(), [name("i-1")]);
        assert_eq!(expanded.get(ResourceType::Ec2Subnet).unwrap(), [name("subnet-1")]);
    }

    #[tokio::test]
    async fn test_expansion_is_idempotent() {
        let expander = GraphExpander::new(vpc_graph(), CallContext::default());
        let once = expander.expand(seed()).await;
        let twice = expander.expand(once.clone()).await;
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_fatal() {
        let mut source = MockDependencySource::new();
        source
            .expect_dependents()
            .with(always(), eq(ResourceType::Ec2Vpc), always())
            .times(1)
            .returning(|_, _, _| {
                Err(AwsError::Sdk {
                    code: Some("UnauthorizedOperation".into()),
                    message: "denied".into(),
                })
            });

        let expander = GraphExpander::new(source, CallContext::default());
        let expanded = expander.expand(seed()).await;
        assert_eq!(expanded, seed());
    }

    #[tokio::test]
    async fn test_cycles_terminate() {
        let mut source = MockDependencySource::new();
        source.expect_dependents().returning(|_, resource_type, _| {
            Ok(match resource_type {
                ResourceType::Ec2Vpc => vec![(ResourceType::Ec2Subnet, name("subnet-1"))],
                _ => vec![(ResourceType::Ec2Vpc, name("vpc-1"))],
            })
        });

        let expander = GraphExpander::new(source, CallContext::default());
        let expanded = expander.expand(seed()).await;
        assert_eq!(expanded.resource_count(), 2);
    }

    #[tokio::test]
    async fn test_no_expansion() {
        assert_eq!(NoExpansion.expand(seed()).await, seed());
    }
}
