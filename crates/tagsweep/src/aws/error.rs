//! AWS error classification and handling
//!
//! Provides typed errors for AWS SDK operations using the `.code()` method
//! instead of string matching on Debug format.

use aws_sdk_ec2::error::ProvideErrorMetadata;
use std::fmt;
use std::time::Duration;
use tagsweep_common::{ResourceName, ResourceType};
use thiserror::Error;

/// AWS error categories for discovery and deletion
#[derive(Debug, Clone, Error)]
pub enum AwsError {
    /// Resource was not found (already gone, counts as deleted)
    #[error("Resource not found ({code}): {message}")]
    NotFound { code: String, message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded ({code}): {message}")]
    Throttled { code: String, message: String },

    /// Resource has dependent objects (e.g., subnet with attached ENI)
    #[error("Resource has dependent objects: {message}")]
    DependencyViolation { message: String },

    /// The run was cancelled while the call was in flight
    #[error("Call cancelled")]
    Cancelled,

    #[error("Call timed out after {0:?}")]
    TimedOut(Duration),

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Provider error code, when the provider sent one
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::NotFound { code, .. } | AwsError::Throttled { code, .. } => Some(code),
            AwsError::DependencyViolation { .. } => Some("DependencyViolation"),
            AwsError::Sdk { code, .. } => code.as_deref(),
            AwsError::Cancelled | AwsError::TimedOut(_) => None,
        }
    }

    /// Provider error message, or a description for local failures
    pub fn message(&self) -> String {
        match self {
            AwsError::NotFound { message, .. }
            | AwsError::Throttled { message, .. }
            | AwsError::DependencyViolation { message }
            | AwsError::Sdk { message, .. } => message.clone(),
            AwsError::Cancelled | AwsError::TimedOut(_) => self.to_string(),
        }
    }

    /// Classify any SDK error through its error metadata.
    ///
    /// The metadata message is preferred; the Display output is the
    /// fallback for transport-level failures that carry no metadata.
    pub fn from_sdk<E>(err: &E) -> Self
    where
        E: ProvideErrorMetadata + fmt::Display,
    {
        let fallback = err.to_string();
        classify_aws_error(err.code(), err.message().or(Some(fallback.as_str())))
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "InvalidInstanceID.NotFound",
    "InvalidAllocationID.NotFound",
    "InvalidAssociationID.NotFound",
    "InvalidGroup.NotFound",
    "InvalidVpcID.NotFound",
    "InvalidSubnetID.NotFound",
    "InvalidRouteTableID.NotFound",
    "InvalidInternetGatewayID.NotFound",
    "InvalidNetworkInterfaceID.NotFound",
    "InvalidNetworkAclID.NotFound",
    "InvalidVolume.NotFound",
    "InvalidVpnGatewayID.NotFound",
    "InvalidVpnConnectionID.NotFound",
    "InvalidCustomerGatewayID.NotFound",
    "InvalidAMIID.NotFound",
    "InvalidSnapshot.NotFound",
    "InvalidKeyPair.NotFound",
    "NatGatewayNotFound",
    "LoadBalancerNotFound",
    "NoSuchBucket",
    "NoSuchEntity",
    "NoSuchHostedZone",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "PriorRequestNotComplete",
];

/// Known AWS error codes for dependency violations (resource still in use)
const DEPENDENCY_CODES: &[&str] = &["DependencyViolation", "ResourceInUse", "DeleteConflict"];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            code: c.to_string(),
            message,
        },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled {
            code: c.to_string(),
            message,
        },
        Some(c) if DEPENDENCY_CODES.contains(&c) => AwsError::DependencyViolation { message },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Treat "not found" as success with no value.
pub fn ignore_not_found<T>(result: Result<T, AwsError>) -> Result<Option<T>, AwsError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// A failed deletion step, optionally attributed to a parent resource
///
/// Detaching an internet gateway from its VPC fails on behalf of the
/// gateway, but the log records the VPC as the parent.
#[derive(Debug, Clone, Error)]
#[error("{source}")]
pub struct DeleteFailure {
    pub parent: Option<(ResourceType, ResourceName)>,
    #[source]
    pub source: AwsError,
}

impl DeleteFailure {
    pub fn with_parent(source: AwsError, parent_type: ResourceType, parent_name: impl Into<ResourceName>) -> Self {
        Self {
            parent: Some((parent_type, parent_name.into())),
            source,
        }
    }
}

impl From<AwsError> for DeleteFailure {
    fn from(source: AwsError) -> Self {
        Self { parent: None, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        let err = classify_aws_error(Some("InvalidVpcID.NotFound"), Some("The vpc ID does not exist"));
        assert!(err.is_not_found());
        assert_eq!(err.code(), Some("InvalidVpcID.NotFound"));
        assert_eq!(err.message(), "The vpc ID does not exist");
    }

    #[test]
    fn test_classify_throttled() {
        let err = classify_aws_error(Some("RequestLimitExceeded"), None);
        assert!(matches!(err, AwsError::Throttled { .. }));
        assert_eq!(err.message(), "Unknown error");
    }

    #[test]
    fn test_classify_dependency_violation() {
        let err = classify_aws_error(Some("DependencyViolation"), Some("has dependencies"));
        assert!(matches!(err, AwsError::DependencyViolation { .. }));
        assert_eq!(err.code(), Some("DependencyViolation"));
    }

    #[test]
    fn test_classify_unknown_is_sdk() {
        let err = classify_aws_error(Some("AccessDenied"), Some("nope"));
        assert!(!err.is_not_found());
        assert!(matches!(err, AwsError::Sdk { .. }));
        assert_eq!(err.code(), Some("AccessDenied"));
        assert_eq!(err.to_string(), "AWS error: nope");
    }

    #[test]
    fn test_local_failures_have_no_code() {
        assert_eq!(AwsError::Cancelled.code(), None);
        assert_eq!(AwsError::Cancelled.message(), "Call cancelled");
        assert!(AwsError::TimedOut(Duration::from_secs(3)).message().contains("timed out"));
    }

    #[test]
    fn test_ignore_not_found() {
        let gone: Result<(), _> = Err(classify_aws_error(Some("NoSuchBucket"), None));
        assert!(matches!(ignore_not_found(gone), Ok(None)));

        let denied: Result<(), _> = Err(classify_aws_error(Some("AccessDenied"), None));
        assert!(ignore_not_found(denied).is_err());

        assert!(matches!(ignore_not_found(Ok(5)), Ok(Some(5))));
    }

    #[test]
    fn test_delete_failure_keeps_parent() {
        let failure = DeleteFailure::with_parent(
            AwsError::Cancelled,
            ResourceType::Ec2Vpc,
            "vpc-1",
        );
        assert_eq!(failure.to_string(), "Call cancelled");
        let (parent_type, parent_name) = failure.parent.unwrap();
        assert_eq!(parent_type, ResourceType::Ec2Vpc);
        assert_eq!(parent_name.as_str(), "vpc-1");
    }
}
