//! AWS client modules
//!
//! This module provides wrappers around AWS SDK clients for:
//! - Resource Groups Tagging API: primary tag-based discovery
//! - Auto Scaling and Route 53: discovery of types the tagging API misses
//! - EC2, S3, IAM, Elastic Load Balancing: resource deletion
//! - deleter: per-type dispatch of deletions behind `ResourceDeleter`
//! - dependencies: EC2 dependency edges for `--all-deps`

pub mod autoscaling;
pub mod call;
pub mod context;
pub mod deleter;
pub mod dependencies;
pub mod ec2;
pub mod elb;
pub mod error;
pub mod iam;
pub mod route53;
pub mod s3;
pub mod tagging;

// Core clients
pub use autoscaling::{AutoScalingClient, AutoScalingSource};
pub use context::{AwsContext, FromAwsContext};
pub use ec2::Ec2Client;
pub use elb::ElbClient;
pub use iam::IamClient;
pub use route53::{HostedZoneSource, Route53Client};
pub use s3::S3Client;
pub use tagging::{TagQuerySource, TaggingClient};

// Error handling and call control
pub use call::CallContext;
pub use error::{AwsError, DeleteFailure, classify_aws_error, ignore_not_found};

pub use deleter::AwsResourceDeleter;
pub use dependencies::Ec2DependencySource;
