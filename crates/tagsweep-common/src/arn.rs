//! Amazon Resource Names and their decomposition
//!
//! An ARN has the shape `arn:partition:service:region:account:resource`.
//! The resource part is service specific:
//!
//! | Service | Resource part |
//! |---------|---------------|
//! | `ec2`, `elasticloadbalancing`, `route53` | `token/name` |
//! | `iam` | `token/optional/path/name` |
//! | `autoscaling` | `token:uuid:tokenName/name` |
//! | `s3` | `bucket` |

use crate::resource_type::ResourceType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type-scoped resource name (instance id, bucket name, role name, ...)
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::Deref,
)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    pub fn new(name: impl Into<String>) -> Self {
        ResourceName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceName {
    fn from(s: &str) -> Self {
        ResourceName(s.to_string())
    }
}

impl From<String> for ResourceName {
    fn from(s: String) -> Self {
        ResourceName(s)
    }
}

/// Opaque resource identifier as returned by discovery
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_more::Deref,
)]
#[serde(transparent)]
pub struct ResourceArn(String);

/// Reasons an ARN cannot be decomposed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArnError {
    #[error("'{0}' is not an ARN")]
    NotAnArn(String),

    #[error("ARN '{0}' has no resource part")]
    MissingResource(String),

    #[error("ARN '{arn}' names an unknown resource type '{service}:{token}'")]
    UnknownResourceType {
        arn: String,
        service: String,
        token: String,
    },
}

/// Decomposed ARN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArnParts {
    pub resource_type: ResourceType,
    pub name: ResourceName,
    pub region: String,
    pub account: String,
}

impl ResourceArn {
    pub fn new(arn: impl Into<String>) -> Self {
        ResourceArn(arn.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical ARN of a Route 53 hosted zone from its short id
    pub fn hosted_zone(zone_id: &str) -> Self {
        ResourceArn(format!("arn:aws:route53:::hostedzone/{zone_id}"))
    }

    /// Split the ARN into type, name, region and account.
    pub fn parse(&self) -> Result<ArnParts, ArnError> {
        let arn = self.0.as_str();
        let mut fields = arn.splitn(6, ':');

        if fields.next() != Some("arn") {
            return Err(ArnError::NotAnArn(arn.to_string()));
        }
        let (Some(_partition), Some(service), Some(region), Some(account)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(ArnError::NotAnArn(arn.to_string()));
        };
        let resource = match fields.next() {
            Some(r) if !r.is_empty() => r,
            _ => return Err(ArnError::MissingResource(arn.to_string())),
        };

        let unknown = |token: &str| ArnError::UnknownResourceType {
            arn: arn.to_string(),
            service: service.to_string(),
            token: token.to_string(),
        };

        let (resource_type, name) = match service {
            // Object ARNs (bucket/key) are not deletable units
            "s3" if resource.contains('/') => return Err(unknown(resource)),
            "s3" => (ResourceType::S3Bucket, resource),
            "autoscaling" => {
                let token = resource.split(':').next().unwrap_or_default();
                let rt = ResourceType::from_arn_token(service, token).ok_or_else(|| unknown(token))?;
                let name = resource
                    .split_once("Name/")
                    .map(|(_, name)| name)
                    .unwrap_or_default();
                (rt, name)
            }
            _ => {
                let (token, rest) = resource
                    .split_once(['/', ':'])
                    .unwrap_or((resource, ""));
                let rt = ResourceType::from_arn_token(service, token).ok_or_else(|| unknown(token))?;
                let name = match rt {
                    // IAM names may be prefixed by a path
                    ResourceType::IamUser | ResourceType::IamRole | ResourceType::IamInstanceProfile => {
                        rest.rsplit('/').next().unwrap_or_default()
                    }
                    // Application/network load balancers are not classic ELBs
                    ResourceType::ElasticLoadBalancingLoadBalancer if rest.contains('/') => {
                        return Err(unknown(token));
                    }
                    _ => rest,
                };
                (rt, name)
            }
        };

        Ok(ArnParts {
            resource_type,
            name: ResourceName::new(name),
            region: region.to_string(),
            account: account.to_string(),
        })
    }
}

impl From<&str> for ResourceArn {
    fn from(s: &str) -> Self {
        ResourceArn(s.to_string())
    }
}

impl From<String> for ResourceArn {
    fn from(s: String) -> Self {
        ResourceArn(s)
    }
}
