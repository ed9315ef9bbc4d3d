//! tagsweep: delete AWS resources selected by tag, in dependency order
//!
//! A run reads tag filter documents, discovers matching resources through
//! the tagging API and per-service fallbacks, groups them by type,
//! optionally widens the set with dependent resources, and deletes the
//! groups in an order that removes dependents before what they depend on.
//!
//! ## Modules
//!
//! - [`aws`]: AWS clients, error classification and the AWS deleter
//! - [`reader`]: streaming tag filter input
//! - [`discover`]: tag-based discovery
//! - [`bucket`]: grouping ARNs by resource type
//! - [`expand`]: dependency expansion
//! - [`order`]: deletion order
//! - [`execute`]: ordered execution and the shared deletion policy
//! - [`request_log`] and [`report`]: failure log and its report
//! - [`orchestrator`]: the end-to-end `delete` pipeline

pub mod aws;
pub mod bucket;
pub mod config;
pub mod console;
pub mod discover;
pub mod execute;
pub mod expand;
pub mod orchestrator;
pub mod order;
pub mod reader;
pub mod report;
pub mod request_log;
