//! The `delete` pipeline
//!
//! read filters → discover → bucket → expand (optional) → order → execute
//! → report → summary

use crate::aws::{AutoScalingSource, HostedZoneSource, TagQuerySource};
use crate::bucket::bucket_arns;
use crate::config::RunFlags;
use crate::console::Console;
use crate::discover::Discoverer;
use crate::execute::{DeleteConfig, ExecutionReport, ResourceDeleter, execute_plan};
use crate::expand::DependencyExpander;
use crate::order::DeletionPlan;
use crate::reader::TagFilterReader;
use crate::report::render_report;
use crate::request_log::{RequestLog, read_log_file};
use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use tagsweep_common::ResourceArn;
use tracing::info;

/// Result of one run
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// ARNs accepted for deletion, in discovery order
    pub deleted_arns: Vec<ResourceArn>,
    pub plan: DeletionPlan,
    pub execution: ExecutionReport,
    /// Failures recorded during this run
    pub log: RequestLog,
}

/// `{"DeletedARNs": [...]}`
pub fn deleted_arns_summary(arns: &[ResourceArn]) -> String {
    let list = Value::Array(arns.iter().map(|a| Value::String(a.to_string())).collect());
    let rendered = serde_json::to_string_pretty(&list).unwrap_or_else(|_| "[]".to_string());
    format!("{{\"DeletedARNs\": {rendered}}}")
}

/// One configured deletion run
pub struct DeleteRun<T, A, H, X, D> {
    discoverer: Discoverer<T, A, H>,
    expander: X,
    deleter: D,
    flags: RunFlags,
    /// Failure log file; in-memory only when absent
    log_path: Option<PathBuf>,
    console: Console,
}

impl<T, A, H, X, D> DeleteRun<T, A, H, X, D>
where
    T: TagQuerySource,
    A: AutoScalingSource,
    H: HostedZoneSource,
    X: DependencyExpander,
    D: ResourceDeleter,
{
    pub fn new(
        discoverer: Discoverer<T, A, H>,
        expander: X,
        deleter: D,
        flags: RunFlags,
        log_path: Option<PathBuf>,
        console: Console,
    ) -> Self {
        Self {
            discoverer,
            expander,
            deleter,
            flags,
            log_path,
            console,
        }
    }

    /// Delete everything matched by the tag filter documents in `input`.
    ///
    /// Only unreadable input (without `ignore_errors`) fails the run; every
    /// other problem is a diagnostic. A log file that cannot be opened
    /// leaves failures recorded in memory only.
    pub async fn run(&self, input: impl Read) -> Result<RunOutcome> {
        let mut discovered = Vec::new();
        let reader = TagFilterReader::new(input, self.flags.ignore_errors, self.console.clone());
        for document in reader {
            let document = document.context("Failed to read tag filters")?;
            discovered.extend(self.discoverer.discover(&document).await);
        }

        let (buckets, deleted_arns) = bucket_arns(&discovered);
        info!(
            discovered = discovered.len(),
            accepted = deleted_arns.len(),
            types = buckets.len(),
            "Bucketed discovered resources"
        );

        let mut outcome = RunOutcome {
            deleted_arns,
            ..Default::default()
        };

        if !buckets.is_empty() {
            let buckets = if self.flags.all_deps {
                self.expander.expand(buckets).await
            } else {
                buckets
            };
            outcome.plan = DeletionPlan::organize(buckets);

            outcome.log = match &self.log_path {
                Some(path) => RequestLog::open(path).unwrap_or_else(|e| {
                    self.console.error(format!("{e:#}"));
                    RequestLog::in_memory()
                }),
                None => RequestLog::in_memory(),
            };
            let config = DeleteConfig {
                ignore_errors: self.flags.ignore_errors,
                dry_run: self.flags.dry_run,
                log: outcome.log.clone(),
            };
            outcome.execution = execute_plan(&outcome.plan, &self.deleter, &config, &self.console).await;

            if self.flags.report {
                self.print_report(&outcome.log);
            }
        }

        if !self.flags.silent {
            self.console.line(&deleted_arns_summary(&outcome.deleted_arns));
        }

        Ok(outcome)
    }

    /// Print the failure report, read back from the log file when there is one.
    fn print_report(&self, log: &RequestLog) {
        let entries = match log.path() {
            Some(path) => match read_log_file(path) {
                Ok(entries) => entries,
                Err(e) => {
                    self.console.error(format!("{e:#}"));
                    return;
                }
            },
            None => log.entries(),
        };
        self.console.line(&render_report(&entries));
    }
}
