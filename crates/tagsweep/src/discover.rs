//! Tag-based resource discovery
//!
//! The primary path pages through the tagging API. Types the tagging API
//! cannot see are found through their own service APIs: Auto Scaling
//! groups via `DescribeTags`, hosted zones by listing every zone and
//! matching tags client side.
//!
//! Discovery failures never abort a run. Each failed call is reported on
//! the console and that sub-discovery returns what it had so far.

use crate::aws::autoscaling::tag_predicates;
use crate::aws::{AutoScalingSource, CallContext, HostedZoneSource, TagQuerySource};
use crate::console::Console;
use tagsweep_common::defaults::{AUTOSCALING_PAGE_SIZE, HOSTED_ZONE_TAG_BATCH, TAGGING_PAGE_SIZE};
use tagsweep_common::{ResourceArn, ResourceType, TagFilterDocument};
use tracing::{debug, info};

pub const NO_MATCHES: &str = "No resources match the specified tag filters";

/// Discovery settings
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Allow-list for the tagging API; empty means every type
    pub resource_types: Vec<ResourceType>,
    pub page_size: i32,
    pub asg_page_size: i32,
    pub zone_batch_size: usize,
    pub call: CallContext,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            resource_types: Vec::new(),
            page_size: TAGGING_PAGE_SIZE,
            asg_page_size: AUTOSCALING_PAGE_SIZE,
            zone_batch_size: HOSTED_ZONE_TAG_BATCH,
            call: CallContext::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Distinct namespaces of the allow-listed types the tagging API supports
    pub fn namespace_filters(&self) -> Vec<String> {
        let mut namespaces: Vec<String> = Vec::new();
        for resource_type in self.resource_types.iter().filter(|t| t.tagging_supported()) {
            let namespace = resource_type.namespace().as_str();
            if !namespaces.iter().any(|n| n == namespace) {
                namespaces.push(namespace.to_string());
            }
        }
        namespaces
    }
}

/// Runs discovery against the three sources
pub struct Discoverer<T, A, H> {
    tagging: T,
    autoscaling: A,
    zones: H,
    config: DiscoveryConfig,
    console: Console,
}

impl<T, A, H> Discoverer<T, A, H>
where
    T: TagQuerySource,
    A: AutoScalingSource,
    H: HostedZoneSource,
{
    pub fn new(tagging: T, autoscaling: A, zones: H, config: DiscoveryConfig, console: Console) -> Self {
        Self {
            tagging,
            autoscaling,
            zones,
            config,
            console,
        }
    }

    /// Every ARN matching a document: tagging API results first, then each
    /// fallback type in turn.
    pub async fn discover(&self, doc: &TagFilterDocument) -> Vec<ResourceArn> {
        if doc.is_empty() {
            self.console.error("Tag filter document has no filters, skipping");
            return Vec::new();
        }

        let mut arns = self.discover_tagged(doc).await;
        for resource_type in ResourceType::tagging_unsupported() {
            arns.extend(self.discover_untagged(resource_type, doc).await);
        }

        info!(count = arns.len(), "Discovery complete");
        arns
    }

    /// Page through the tagging API until the last page or an empty one.
    pub async fn discover_tagged(&self, doc: &TagFilterDocument) -> Vec<ResourceArn> {
        let namespaces = self.config.namespace_filters();
        let mut arns = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = match self
                .tagging
                .get_resources(
                    &self.config.call,
                    &doc.tag_filters,
                    &namespaces,
                    page_token.take(),
                    self.config.page_size,
                )
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    self.console.error(&e);
                    break;
                }
            };

            if page.arns.is_empty() {
                self.console.error(NO_MATCHES);
                break;
            }
            arns.extend(page.arns);

            match page.next_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = arns.len(), "Tagging API discovery finished");
        arns
    }

    /// Discovery for a type the tagging API does not cover
    pub async fn discover_untagged(&self, resource_type: ResourceType, doc: &TagFilterDocument) -> Vec<ResourceArn> {
        match resource_type {
            ResourceType::AutoScalingGroup => self.discover_auto_scaling_groups(doc).await,
            ResourceType::Route53HostedZone => self.discover_hosted_zones(doc).await,
            other => {
                debug!(resource_type = %other, "No tag-based discovery for type");
                Vec::new()
            }
        }
    }

    /// Find groups by tag, then resolve their names to ARNs.
    pub async fn discover_auto_scaling_groups(&self, doc: &TagFilterDocument) -> Vec<ResourceArn> {
        let predicates = tag_predicates(&doc.tag_filters);
        if predicates.is_empty() {
            return Vec::new();
        }

        let mut names: Vec<String> = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let page = match self
                .autoscaling
                .describe_tags(
                    &self.config.call,
                    &predicates,
                    next_token.take(),
                    self.config.asg_page_size,
                )
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    self.console.error(&e);
                    break;
                }
            };

            if page.names.is_empty() {
                break;
            }
            for name in page.names {
                if !names.contains(&name) {
                    names.push(name);
                }
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        if names.is_empty() {
            return Vec::new();
        }

        match self.autoscaling.group_arns(&self.config.call, &names).await {
            Ok(arns) => {
                debug!(count = arns.len(), "Auto Scaling discovery finished");
                arns
            }
            Err(e) => {
                self.console.error(&e);
                Vec::new()
            }
        }
    }

    /// List every zone, fetch tags in batches and keep matching zones.
    pub async fn discover_hosted_zones(&self, doc: &TagFilterDocument) -> Vec<ResourceArn> {
        let zone_ids = match self.zones.list_hosted_zone_ids(&self.config.call).await {
            Ok(ids) => ids,
            Err(e) => {
                self.console.error(&e);
                return Vec::new();
            }
        };

        let mut arns = Vec::new();
        for batch in zone_ids.chunks(self.config.zone_batch_size.max(1)) {
            let tag_sets = match self.zones.list_tags_for_zones(&self.config.call, batch).await {
                Ok(sets) => sets,
                Err(e) => {
                    self.console.error(&e);
                    break;
                }
            };

            arns.extend(
                tag_sets
                    .iter()
                    .filter(|set| doc.matches(&set.tags))
                    .map(|set| ResourceArn::hosted_zone(&set.zone_id)),
            );
        }

        debug!(zones = zone_ids.len(), matched = arns.len(), "Hosted zone discovery finished");
        arns
    }
}
