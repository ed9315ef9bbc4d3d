//! Route 53 hosted zone discovery and deletion
//!
//! Hosted zones are invisible to the tagging API. Discovery lists every
//! zone, fetches tags in batches and matches them client side.

use super::call::CallContext;
use super::context::{AwsContext, FromAwsContext};
use super::error::{AwsError, DeleteFailure};
use aws_sdk_route53::Client;
use aws_sdk_route53::types::{Change, ChangeAction, ChangeBatch, ResourceRecordSet, RrType, TagResourceType};
use std::collections::HashMap;
use tagsweep_common::collect_tags;
use tracing::{debug, info};

const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

/// Route 53 rejects change batches larger than this
const MAX_CHANGES_PER_BATCH: usize = 1000;

/// Strip the `/hostedzone/` prefix Route 53 puts on zone ids
pub fn short_zone_id(id: &str) -> &str {
    id.strip_prefix(HOSTED_ZONE_PREFIX).unwrap_or(id)
}

/// Tags attached to one hosted zone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneTagSet {
    pub zone_id: String,
    pub tags: HashMap<String, String>,
}

/// Hosted zone listing and tag lookups.
#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait HostedZoneSource: Send + Sync {
    /// Short ids of every hosted zone in the account
    async fn list_hosted_zone_ids(&self, call: &CallContext) -> Result<Vec<String>, AwsError>;

    /// Tag sets for up to one batch of zones
    async fn list_tags_for_zones(
        &self,
        call: &CallContext,
        zone_ids: &[String],
    ) -> Result<Vec<ZoneTagSet>, AwsError>;
}

/// Route 53 client
pub struct Route53Client {
    client: Client,
}

impl FromAwsContext for Route53Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.route53_client(),
        }
    }
}

impl HostedZoneSource for Route53Client {
    async fn list_hosted_zone_ids(&self, call: &CallContext) -> Result<Vec<String>, AwsError> {
        let mut ids = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = call
                .run(
                    self.client
                        .list_hosted_zones()
                        .set_marker(marker.take())
                        .send(),
                )
                .await?;

            ids.extend(
                response
                    .hosted_zones()
                    .iter()
                    .map(|zone| short_zone_id(zone.id()).to_string()),
            );

            match response.next_marker().filter(|m| !m.is_empty()) {
                Some(next) if response.is_truncated() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        debug!(count = ids.len(), "Listed hosted zones");
        Ok(ids)
    }

    async fn list_tags_for_zones(
        &self,
        call: &CallContext,
        zone_ids: &[String],
    ) -> Result<Vec<ZoneTagSet>, AwsError> {
        let response = call
            .run(
                self.client
                    .list_tags_for_resources()
                    .resource_type(TagResourceType::Hostedzone)
                    .set_resource_ids(Some(zone_ids.to_vec()))
                    .send(),
            )
            .await?;

        Ok(response
            .resource_tag_sets()
            .iter()
            .filter_map(|set| {
                let zone_id = set.resource_id()?;
                Some(ZoneTagSet {
                    zone_id: short_zone_id(zone_id).to_string(),
                    tags: collect_tags(set.tags(), |t| t.key(), |t| t.value()),
                })
            })
            .collect())
    }
}

impl Route53Client {
    /// Delete a hosted zone after removing every record set but the apex
    /// SOA and NS records, which Route 53 manages itself.
    pub async fn delete_hosted_zone(&self, call: &CallContext, zone_id: &str) -> Result<(), DeleteFailure> {
        info!(zone = %zone_id, "Deleting hosted zone and records");

        let mut start_name: Option<String> = None;
        let mut start_type: Option<RrType> = None;
        let mut records = Vec::new();

        loop {
            let response = call
                .run(
                    self.client
                        .list_resource_record_sets()
                        .hosted_zone_id(zone_id)
                        .set_start_record_name(start_name.take())
                        .set_start_record_type(start_type.take())
                        .send(),
                )
                .await?;

            records.extend(response.resource_record_sets().iter().cloned());

            if !response.is_truncated() {
                break;
            }
            start_name = response.next_record_name().map(str::to_string);
            start_type = response.next_record_type().cloned();
            if start_name.is_none() {
                break;
            }
        }

        for batch in purge_batches(records)? {
            debug!(zone = %zone_id, count = batch.changes().len(), "Deleting record sets");
            call.run(
                self.client
                    .change_resource_record_sets()
                    .hosted_zone_id(zone_id)
                    .change_batch(batch)
                    .send(),
            )
            .await?;
        }

        call.run(self.client.delete_hosted_zone().id(zone_id).send())
            .await?;
        Ok(())
    }
}

fn build_error(e: impl std::fmt::Display) -> AwsError {
    AwsError::Sdk {
        code: None,
        message: e.to_string(),
    }
}

/// Delete changes for every record a zone must lose before it can be
/// deleted, split into batches Route 53 accepts.
///
/// The SOA record and the NS set at the zone apex stay; Route 53 removes
/// them with the zone.
pub fn purge_batches(records: Vec<ResourceRecordSet>) -> Result<Vec<ChangeBatch>, AwsError> {
    let apex = records
        .iter()
        .find(|r| *r.r#type() == RrType::Soa)
        .map(|r| r.name().to_string());

    let changes = records
        .into_iter()
        .filter(|r| *r.r#type() != RrType::Soa)
        .filter(|r| !(*r.r#type() == RrType::Ns && Some(r.name()) == apex.as_deref()))
        .map(|record| {
            Change::builder()
                .action(ChangeAction::Delete)
                .resource_record_set(record)
                .build()
                .map_err(build_error)
        })
        .collect::<Result<Vec<_>, _>>()?;

    changes
        .chunks(MAX_CHANGES_PER_BATCH)
        .map(|chunk| {
            ChangeBatch::builder()
                .set_changes(Some(chunk.to_vec()))
                .build()
                .map_err(build_error)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_zone_id() {
        assert_eq!(short_zone_id("/hostedzone/Z123"), "Z123");
        assert_eq!(short_zone_id("Z123"), "Z123");
    }

    fn record(name: &str, rr_type: RrType) -> ResourceRecordSet {
        ResourceRecordSet::builder()
            .name(name)
            .r#type(rr_type)
            .ttl(300)
            .build()
            .unwrap()
    }

    fn deleted_names(batch: &ChangeBatch) -> Vec<(String, RrType)> {
        batch
            .changes()
            .iter()
            .map(|c| {
                assert_eq!(*c.action(), ChangeAction::Delete);
                let set = c.resource_record_set().unwrap();
                (set.name().to_string(), set.r#type().clone())
            })
            .collect()
    }

    #[test]
    fn test_purge_keeps_soa_and_apex_ns() {
        let batches = purge_batches(vec![
            record("example.com.", RrType::Soa),
            record("example.com.", RrType::Ns),
            record("example.com.", RrType::A),
            record("dev.example.com.", RrType::Ns),
            record("www.example.com.", RrType::Cname),
        ])
        .unwrap();

        assert_eq!(batches.len(), 1);
        assert_eq!(
            deleted_names(&batches[0]),
            [
                ("example.com.".to_string(), RrType::A),
                ("dev.example.com.".to_string(), RrType::Ns),
                ("www.example.com.".to_string(), RrType::Cname),
            ]
        );
    }

    #[test]
    fn test_purge_splits_large_zones() {
        let mut records = vec![record("example.com.", RrType::Soa)];
        records.extend((0..2500).map(|i| record(&format!("host{i}.example.com."), RrType::A)));

        let sizes: Vec<usize> = purge_batches(records)
            .unwrap()
            .iter()
            .map(|b| b.changes().len())
            .collect();
        assert_eq!(sizes, [1000, 1000, 500]);
    }

    #[test]
    fn test_purge_of_bare_zone_sends_nothing() {
        let batches = purge_batches(vec![
            record("example.com.", RrType::Soa),
            record("example.com.", RrType::Ns),
        ])
        .unwrap();
        assert!(batches.is_empty());
    }
}
