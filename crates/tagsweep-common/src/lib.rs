//! tagsweep-common - Shared types for tag-driven resource deletion
//!
//! This crate holds the provider-agnostic vocabulary used by the
//! orchestrator, without any AWS SDK dependencies.
//!
//! ## Modules
//!
//! - [`arn`]: resource identifiers and their decomposition
//! - [`defaults`]: page sizes, batch limits and other constants
//! - [`log_entry`]: failed-deletion records
//! - [`resource_type`]: the closed set of resource types and their namespaces
//! - [`tags`]: tag filters and matching

pub mod arn;
pub mod defaults;
pub mod log_entry;
pub mod resource_type;
pub mod tags;

// Re-export commonly used types
pub use arn::{ArnError, ArnParts, ResourceArn, ResourceName};
pub use log_entry::LogEntry;
pub use resource_type::{Namespace, ResourceType, UnknownResourceType};
pub use tags::{TagFilter, TagFilterDocument};
