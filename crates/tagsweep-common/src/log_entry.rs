//! Failed-deletion log records
//!
//! One [`LogEntry`] is written per failed deletion attempt. Entries are
//! persisted as JSON Lines and read back when a report is requested.

use crate::arn::ResourceName;
use crate::resource_type::ResourceType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured record of one failed deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "TimeStamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "ResourceType")]
    pub resource_type: ResourceType,
    #[serde(rename = "ResourceName")]
    pub resource_name: ResourceName,
    #[serde(rename = "ParentResourceType", default, skip_serializing_if = "Option::is_none")]
    pub parent_resource_type: Option<ResourceType>,
    #[serde(rename = "ParentResourceName", default, skip_serializing_if = "Option::is_none")]
    pub parent_resource_name: Option<ResourceName>,
    #[serde(rename = "AWSErrorCode", default, skip_serializing_if = "String::is_empty")]
    pub aws_error_code: String,
    #[serde(rename = "AWSErrorMsg", default, skip_serializing_if = "String::is_empty")]
    pub aws_error_msg: String,
    #[serde(rename = "ErrMsg", default, skip_serializing_if = "String::is_empty")]
    pub err_msg: String,
}

impl LogEntry {
    /// Start an entry for a resource; error details are added with the
    /// builder-style methods below.
    pub fn new(resource_type: ResourceType, resource_name: ResourceName) -> Self {
        Self {
            timestamp: Utc::now(),
            resource_type,
            resource_name,
            parent_resource_type: None,
            parent_resource_name: None,
            aws_error_code: String::new(),
            aws_error_msg: String::new(),
            err_msg: String::new(),
        }
    }

    pub fn with_parent(mut self, parent_type: ResourceType, parent_name: ResourceName) -> Self {
        self.parent_resource_type = Some(parent_type);
        self.parent_resource_name = Some(parent_name);
        self
    }

    pub fn with_aws_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.aws_error_code = code.into();
        self.aws_error_msg = message.into();
        self
    }

    pub fn with_err_msg(mut self, message: impl Into<String>) -> Self {
        self.err_msg = message.into();
        self
    }

    /// Whether both halves of a provider error are present
    pub fn has_aws_error(&self) -> bool {
        !self.aws_error_code.is_empty() && !self.aws_error_msg.is_empty()
    }

    /// Parent name, if a non-empty one was recorded
    pub fn parent(&self) -> Option<&ResourceName> {
        self.parent_resource_name.as_ref().filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_pascal_case_and_omits_empty() {
        let entry = LogEntry::new(ResourceType::Ec2Subnet, "subnet-1".into())
            .with_aws_error("DependencyViolation", "in use");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["ResourceType"], "AWS::EC2::Subnet");
        assert_eq!(json["ResourceName"], "subnet-1");
        assert_eq!(json["AWSErrorCode"], "DependencyViolation");
        assert_eq!(json["AWSErrorMsg"], "in use");
        assert!(json.get("ErrMsg").is_none());
        assert!(json.get("ParentResourceName").is_none());
    }

    #[test]
    fn parses_minimal_line() {
        let line = r#"{"TimeStamp":"2026-10-16T12:00:00Z","ResourceType":"AWS::EC2::VPC","ResourceName":"vpc-1","ErrMsg":"boom"}"#;
        let entry: LogEntry = serde_json::from_str(line).unwrap();
        assert_eq!(entry.resource_type, ResourceType::Ec2Vpc);
        assert_eq!(entry.err_msg, "boom");
        assert!(!entry.has_aws_error());
        assert!(entry.parent().is_none());
    }

    #[test]
    fn provider_error_needs_code_and_message() {
        let entry = LogEntry::new(ResourceType::Ec2Vpc, "vpc-1".into()).with_aws_error("Code", "");
        assert!(!entry.has_aws_error());
    }
}
