//! Ordered deletion of a [`DeletionPlan`]

use crate::aws::{AwsError, DeleteFailure};
use crate::console::Console;
use crate::order::DeletionPlan;
use crate::request_log::RequestLog;
use std::future::Future;
use tagsweep_common::{LogEntry, ResourceName, ResourceType};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Settings shared by every deleter during one execution
#[derive(Debug, Clone, Default)]
pub struct DeleteConfig {
    /// Keep going after a failed resource instead of aborting the bucket
    pub ignore_errors: bool,
    /// Log what would be deleted without calling the provider
    pub dry_run: bool,
    pub log: RequestLog,
}

/// A bucket that stopped before all of its resources were attempted
#[derive(Debug, Error)]
#[error("failed to delete {resource_type} {resource_name}: {source}")]
pub struct DeleteError {
    pub resource_type: ResourceType,
    pub resource_name: ResourceName,
    #[source]
    pub source: AwsError,
}

/// Deletes all resources of one type.
#[allow(async_fn_in_trait)]
pub trait ResourceDeleter {
    async fn delete_resources(
        &self,
        resource_type: ResourceType,
        names: &[ResourceName],
        config: &DeleteConfig,
    ) -> Result<(), DeleteError>;
}

impl<D: ResourceDeleter + ?Sized> ResourceDeleter for &D {
    async fn delete_resources(
        &self,
        resource_type: ResourceType,
        names: &[ResourceName],
        config: &DeleteConfig,
    ) -> Result<(), DeleteError> {
        (**self).delete_resources(resource_type, names, config).await
    }
}

/// Log record for one failed deletion
pub fn failure_entry(resource_type: ResourceType, name: &ResourceName, failure: &DeleteFailure) -> LogEntry {
    let mut entry = LogEntry::new(resource_type, name.clone());
    if let Some((parent_type, parent_name)) = &failure.parent {
        entry = entry.with_parent(*parent_type, parent_name.clone());
    }
    match failure.source.code() {
        Some(code) => entry.with_aws_error(code, failure.source.message()),
        None => entry.with_err_msg(failure.source.to_string()),
    }
}

/// Apply `delete` to each name under the shared deletion policy.
///
/// Dry runs never call `delete`. A not-found error counts as deleted.
/// Every other failure is written to the log; the bucket then continues
/// with `ignore_errors` or stops with the failure otherwise.
pub async fn delete_each<F, Fut>(
    resource_type: ResourceType,
    names: &[ResourceName],
    config: &DeleteConfig,
    mut delete: F,
) -> Result<(), DeleteError>
where
    F: FnMut(ResourceName) -> Fut,
    Fut: Future<Output = Result<(), DeleteFailure>>,
{
    for name in names {
        if config.dry_run {
            info!(resource_type = %resource_type, name = %name, "[DRY RUN] Would delete");
            continue;
        }

        match delete(name.clone()).await {
            Ok(()) => info!(resource_type = %resource_type, name = %name, "Deleted"),
            Err(failure) if failure.source.is_not_found() => {
                debug!(resource_type = %resource_type, name = %name, "Already deleted");
            }
            Err(failure) => {
                warn!(resource_type = %resource_type, name = %name, error = %failure, "Failed to delete");
                config.log.record(failure_entry(resource_type, name, &failure));
                if !config.ignore_errors {
                    return Err(DeleteError {
                        resource_type,
                        resource_name: name.clone(),
                        source: failure.source,
                    });
                }
            }
        }
    }
    Ok(())
}

/// What an execution touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Bucket types handed to the deleter, in execution order
    pub visited: Vec<ResourceType>,
    /// Bucket types whose deleter reported an error
    pub failed: Vec<ResourceType>,
}

/// Run every bucket of the plan through `deleter`.
///
/// A bucket error is reported on the console and never stops later
/// buckets; the remaining types are still attempted.
pub async fn execute_plan<D: ResourceDeleter>(
    plan: &DeletionPlan,
    deleter: &D,
    config: &DeleteConfig,
    console: &Console,
) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    for bucket in plan.execution_order() {
        info!(
            resource_type = %bucket.resource_type,
            count = bucket.names.len(),
            dry_run = config.dry_run,
            "Deleting bucket"
        );
        report.visited.push(bucket.resource_type);

        if let Err(e) = deleter
            .delete_resources(bucket.resource_type, &bucket.names, config)
            .await
        {
            console.error(&e);
            report.failed.push(bucket.resource_type);
        }
    }

    report
}
