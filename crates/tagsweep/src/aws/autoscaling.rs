//! Auto Scaling discovery and deletion
//!
//! The tagging API does not return Auto Scaling groups, so discovery goes
//! through `DescribeTags` to find group names and then resolves names to
//! ARNs with `DescribeAutoScalingGroups`.

use super::call::CallContext;
use super::context::{AwsContext, FromAwsContext};
use super::error::{AwsError, DeleteFailure};
use aws_sdk_autoscaling::{Client, types::Filter};
use tagsweep_common::{ResourceArn, TagFilter};
use tracing::{debug, info};

/// `DescribeAutoScalingGroups` accepts at most this many names per call
const NAMES_PER_DESCRIBE: usize = 50;

/// A `DescribeTags` filter, named `key` or `value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsgTagPredicate {
    pub name: &'static str,
    pub values: Vec<String>,
}

/// Group names from one `DescribeTags` page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupNamePage {
    pub names: Vec<String>,
    pub next_token: Option<String>,
}

/// Translate tag filters into `DescribeTags` predicates.
///
/// Every filter contributes a `key` predicate; filters with values add a
/// `value` predicate as well.
pub fn tag_predicates(filters: &[TagFilter]) -> Vec<AsgTagPredicate> {
    let mut predicates = Vec::with_capacity(filters.len() * 2);
    for filter in filters {
        predicates.push(AsgTagPredicate {
            name: "key",
            values: vec![filter.key.clone()],
        });
        if !filter.values.is_empty() {
            predicates.push(AsgTagPredicate {
                name: "value",
                values: filter.values.clone(),
            });
        }
    }
    predicates
}

/// Tag-based Auto Scaling group lookups.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait AutoScalingSource: Send + Sync {
    /// One page of group names whose tags satisfy `predicates`.
    async fn describe_tags(
        &self,
        call: &CallContext,
        predicates: &[AsgTagPredicate],
        next_token: Option<String>,
        max_records: i32,
    ) -> Result<GroupNamePage, AwsError>;

    /// Resolve group names to ARNs; unknown names are omitted.
    async fn group_arns(
        &self,
        call: &CallContext,
        names: &[String],
    ) -> Result<Vec<ResourceArn>, AwsError>;
}

/// Auto Scaling client for discovery and group teardown
pub struct AutoScalingClient {
    client: Client,
}

impl FromAwsContext for AutoScalingClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.autoscaling_client(),
        }
    }
}

impl AutoScalingClient {
    /// Force-delete a group, terminating its instances
    pub async fn delete_group(&self, call: &CallContext, name: &str) -> Result<(), DeleteFailure> {
        info!(group = %name, "Deleting Auto Scaling group");
        call.run(
            self.client
                .delete_auto_scaling_group()
                .auto_scaling_group_name(name)
                .force_delete(true)
                .send(),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_launch_configuration(
        &self,
        call: &CallContext,
        name: &str,
    ) -> Result<(), DeleteFailure> {
        info!(launch_configuration = %name, "Deleting launch configuration");
        call.run(
            self.client
                .delete_launch_configuration()
                .launch_configuration_name(name)
                .send(),
        )
        .await?;
        Ok(())
    }
}

impl AutoScalingSource for AutoScalingClient {
    async fn describe_tags(
        &self,
        call: &CallContext,
        predicates: &[AsgTagPredicate],
        next_token: Option<String>,
        max_records: i32,
    ) -> Result<GroupNamePage, AwsError> {
        let filters = predicates
            .iter()
            .map(|p| Filter::builder().name(p.name).set_values(Some(p.values.clone())).build())
            .collect();

        let response = call
            .run(
                self.client
                    .describe_tags()
                    .set_filters(Some(filters))
                    .max_records(max_records)
                    .set_next_token(next_token)
                    .send(),
            )
            .await?;

        let mut names: Vec<String> = Vec::new();
        for tag in response.tags() {
            if tag.resource_type() != Some("auto-scaling-group") {
                continue;
            }
            if let Some(id) = tag.resource_id().filter(|id| !id.is_empty()) {
                if !names.iter().any(|n| n == id) {
                    names.push(id.to_string());
                }
            }
        }
        let next_token = response
            .next_token()
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        debug!(count = names.len(), "Fetched Auto Scaling tag page");
        Ok(GroupNamePage { names, next_token })
    }

    async fn group_arns(
        &self,
        call: &CallContext,
        names: &[String],
    ) -> Result<Vec<ResourceArn>, AwsError> {
        let mut arns = Vec::new();
        for chunk in names.chunks(NAMES_PER_DESCRIBE) {
            let mut next_token: Option<String> = None;
            loop {
                let response = call
                    .run(
                        self.client
                            .describe_auto_scaling_groups()
                            .set_auto_scaling_group_names(Some(chunk.to_vec()))
                            .set_next_token(next_token.take())
                            .send(),
                    )
                    .await?;

                arns.extend(
                    response
                        .auto_scaling_groups()
                        .iter()
                        .filter_map(|g| g.auto_scaling_group_arn())
                        .map(ResourceArn::from),
                );

                match response.next_token().filter(|t| !t.is_empty()) {
                    Some(token) => next_token = Some(token.to_string()),
                    None => break,
                }
            }
        }
        Ok(arns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates_for_key_only_filter() {
        let predicates = tag_predicates(&[TagFilter::any_value("env")]);
        assert_eq!(
            predicates,
            vec![AsgTagPredicate {
                name: "key",
                values: vec!["env".to_string()],
            }]
        );
    }

    #[test]
    fn test_predicates_with_values() {
        let predicates = tag_predicates(&[
            TagFilter::new("env", ["staging", "dev"]),
            TagFilter::any_value("team"),
        ]);
        let names: Vec<_> = predicates.iter().map(|p| p.name).collect();
        assert_eq!(names, ["key", "value", "key"]);
        assert_eq!(predicates[1].values, ["staging", "dev"]);
        assert_eq!(predicates[2].values, ["team"]);
    }

    #[test]
    fn test_no_filters_no_predicates() {
        assert!(tag_predicates(&[]).is_empty());
    }
}
