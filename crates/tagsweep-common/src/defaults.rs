//! Default values shared across tagsweep components

/// Region used when neither the CLI, the environment nor a config file names one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Page size for tagging API `GetResources` calls
pub const TAGGING_PAGE_SIZE: i32 = 100;

/// Page size for auto-scaling `DescribeTags` calls
pub const AUTOSCALING_PAGE_SIZE: i32 = 100;

/// Route 53 `ListTagsForResources` accepts at most this many zone ids per call
pub const HOSTED_ZONE_TAG_BATCH: usize = 10;

/// Prefix of the per-day failed-deletion log file
pub const LOG_FILE_PREFIX: &str = "delete-log-data";
