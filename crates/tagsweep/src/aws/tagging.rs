//! Resource Groups Tagging API discovery

use super::call::CallContext;
use super::context::{AwsContext, FromAwsContext};
use super::error::AwsError;
use aws_sdk_resourcegroupstagging::Client;
use tagsweep_common::{ResourceArn, TagFilter};
use tracing::debug;

/// One page of tagging API results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQueryPage {
    pub arns: Vec<ResourceArn>,
    /// Absent or empty upstream both mean "last page"
    pub next_token: Option<String>,
}

/// Paged tag queries against the tagging API.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait TagQuerySource: Send + Sync {
    /// Fetch one page of resources matching all `filters`, restricted to
    /// `resource_types` (service namespaces) when non-empty.
    async fn get_resources(
        &self,
        call: &CallContext,
        filters: &[TagFilter],
        resource_types: &[String],
        page_token: Option<String>,
        page_size: i32,
    ) -> Result<TagQueryPage, AwsError>;
}

/// Tagging API client
pub struct TaggingClient {
    client: Client,
}

impl FromAwsContext for TaggingClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.tagging_client(),
        }
    }
}

fn to_sdk_filter(filter: &TagFilter) -> aws_sdk_resourcegroupstagging::types::TagFilter {
    let values = (!filter.values.is_empty()).then(|| filter.values.clone());
    aws_sdk_resourcegroupstagging::types::TagFilter::builder()
        .key(&filter.key)
        .set_values(values)
        .build()
}

impl TagQuerySource for TaggingClient {
    async fn get_resources(
        &self,
        call: &CallContext,
        filters: &[TagFilter],
        resource_types: &[String],
        page_token: Option<String>,
        page_size: i32,
    ) -> Result<TagQueryPage, AwsError> {
        let mut request = self
            .client
            .get_resources()
            .set_tag_filters(Some(filters.iter().map(to_sdk_filter).collect()))
            .resources_per_page(page_size);

        if !resource_types.is_empty() {
            request = request.set_resource_type_filters(Some(resource_types.to_vec()));
        }
        if let Some(token) = page_token {
            request = request.pagination_token(token);
        }

        let response = call.run(request.send()).await?;

        let arns: Vec<ResourceArn> = response
            .resource_tag_mapping_list()
            .iter()
            .filter_map(|mapping| mapping.resource_arn())
            .filter(|arn| !arn.is_empty())
            .map(ResourceArn::from)
            .collect();
        let next_token = response
            .pagination_token()
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        debug!(count = arns.len(), more = next_token.is_some(), "Fetched tagging page");
        Ok(TagQueryPage { arns, next_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_filter_omits_empty_values() {
        let any = to_sdk_filter(&TagFilter::any_value("env"));
        assert_eq!(any.key(), Some("env"));
        assert!(any.values().is_empty());

        let exact = to_sdk_filter(&TagFilter::new("env", ["staging"]));
        assert_eq!(exact.values(), ["staging".to_string()]);
    }
}
