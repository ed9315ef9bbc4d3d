//! AWS resource types and the namespaces that own them
//!
//! Every resource tagsweep can discover or delete has exactly one
//! [`ResourceType`]. The type decides which discovery backend can enumerate
//! it and whether the generic tagging API knows about it at all.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Discovery/deletion backend family that owns a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Ec2,
    Iam,
    AutoScaling,
    ElasticLoadBalancing,
    Route53,
    S3,
}

impl Namespace {
    /// Service prefix as it appears in ARNs and tagging API type filters
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Ec2 => "ec2",
            Namespace::Iam => "iam",
            Namespace::AutoScaling => "autoscaling",
            Namespace::ElasticLoadBalancing => "elasticloadbalancing",
            Namespace::Route53 => "route53",
            Namespace::S3 => "s3",
        }
    }

    fn from_service(service: &str) -> Option<Self> {
        match service {
            "ec2" => Some(Namespace::Ec2),
            "iam" => Some(Namespace::Iam),
            "autoscaling" => Some(Namespace::AutoScaling),
            "elasticloadbalancing" => Some(Namespace::ElasticLoadBalancing),
            "route53" => Some(Namespace::Route53),
            "s3" => Some(Namespace::S3),
            _ => None,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Types of AWS resources tagsweep knows how to discover and delete
///
/// Declaration order doubles as the deterministic tie-break order for
/// types that have no explicit deletion rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResourceType {
    Ec2Vpc,
    Ec2VpnGateway,
    Ec2SecurityGroup,
    Ec2RouteTable,
    Ec2Subnet,
    Ec2Volume,
    Ec2CustomerGateway,
    Ec2VpnConnection,
    Ec2NetworkAcl,
    Ec2NetworkInterface,
    Ec2InternetGateway,
    IamUser,
    IamRole,
    IamInstanceProfile,
    AutoScalingLaunchConfiguration,
    Ec2Eip,
    Ec2EipAssociation,
    Ec2NatGateway,
    ElasticLoadBalancingLoadBalancer,
    AutoScalingGroup,
    Ec2Instance,
    Ec2RouteTableAssociation,
    Route53HostedZone,
    S3Bucket,
    Ec2Image,
    Ec2Snapshot,
    Ec2KeyPair,
}

impl ResourceType {
    /// Every known resource type, in declaration order
    pub const ALL: [ResourceType; 27] = [
        ResourceType::Ec2Vpc,
        ResourceType::Ec2VpnGateway,
        ResourceType::Ec2SecurityGroup,
        ResourceType::Ec2RouteTable,
        ResourceType::Ec2Subnet,
        ResourceType::Ec2Volume,
        ResourceType::Ec2CustomerGateway,
        ResourceType::Ec2VpnConnection,
        ResourceType::Ec2NetworkAcl,
        ResourceType::Ec2NetworkInterface,
        ResourceType::Ec2InternetGateway,
        ResourceType::IamUser,
        ResourceType::IamRole,
        ResourceType::IamInstanceProfile,
        ResourceType::AutoScalingLaunchConfiguration,
        ResourceType::Ec2Eip,
        ResourceType::Ec2EipAssociation,
        ResourceType::Ec2NatGateway,
        ResourceType::ElasticLoadBalancingLoadBalancer,
        ResourceType::AutoScalingGroup,
        ResourceType::Ec2Instance,
        ResourceType::Ec2RouteTableAssociation,
        ResourceType::Route53HostedZone,
        ResourceType::S3Bucket,
        ResourceType::Ec2Image,
        ResourceType::Ec2Snapshot,
        ResourceType::Ec2KeyPair,
    ];

    /// CloudFormation-style name, used in config files and log entries
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Ec2Vpc => "AWS::EC2::VPC",
            ResourceType::Ec2VpnGateway => "AWS::EC2::VPNGateway",
            ResourceType::Ec2SecurityGroup => "AWS::EC2::SecurityGroup",
            ResourceType::Ec2RouteTable => "AWS::EC2::RouteTable",
            ResourceType::Ec2Subnet => "AWS::EC2::Subnet",
            ResourceType::Ec2Volume => "AWS::EC2::Volume",
            ResourceType::Ec2CustomerGateway => "AWS::EC2::CustomerGateway",
            ResourceType::Ec2VpnConnection => "AWS::EC2::VPNConnection",
            ResourceType::Ec2NetworkAcl => "AWS::EC2::NetworkAcl",
            ResourceType::Ec2NetworkInterface => "AWS::EC2::NetworkInterface",
            ResourceType::Ec2InternetGateway => "AWS::EC2::InternetGateway",
            ResourceType::IamUser => "AWS::IAM::User",
            ResourceType::IamRole => "AWS::IAM::Role",
            ResourceType::IamInstanceProfile => "AWS::IAM::InstanceProfile",
            ResourceType::AutoScalingLaunchConfiguration => {
                "AWS::AutoScaling::LaunchConfiguration"
            }
            ResourceType::Ec2Eip => "AWS::EC2::EIP",
            ResourceType::Ec2EipAssociation => "AWS::EC2::EIPAssociation",
            ResourceType::Ec2NatGateway => "AWS::EC2::NatGateway",
            ResourceType::ElasticLoadBalancingLoadBalancer => {
                "AWS::ElasticLoadBalancing::LoadBalancer"
            }
            ResourceType::AutoScalingGroup => "AWS::AutoScaling::AutoScalingGroup",
            ResourceType::Ec2Instance => "AWS::EC2::Instance",
            ResourceType::Ec2RouteTableAssociation => "AWS::EC2::SubnetRouteTableAssociation",
            ResourceType::Route53HostedZone => "AWS::Route53::HostedZone",
            ResourceType::S3Bucket => "AWS::S3::Bucket",
            ResourceType::Ec2Image => "AWS::EC2::Image",
            ResourceType::Ec2Snapshot => "AWS::EC2::Snapshot",
            ResourceType::Ec2KeyPair => "AWS::EC2::KeyPair",
        }
    }

    /// Namespace (backend) that can enumerate and delete this type
    pub fn namespace(self) -> Namespace {
        match self {
            ResourceType::IamUser | ResourceType::IamRole | ResourceType::IamInstanceProfile => {
                Namespace::Iam
            }
            ResourceType::AutoScalingLaunchConfiguration | ResourceType::AutoScalingGroup => {
                Namespace::AutoScaling
            }
            ResourceType::ElasticLoadBalancingLoadBalancer => Namespace::ElasticLoadBalancing,
            ResourceType::Route53HostedZone => Namespace::Route53,
            ResourceType::S3Bucket => Namespace::S3,
            _ => Namespace::Ec2,
        }
    }

    /// Whether the generic tagging API can find resources of this type.
    ///
    /// Unsupported types need a namespace-specific discovery call.
    pub fn tagging_supported(self) -> bool {
        !matches!(
            self,
            ResourceType::AutoScalingGroup
                | ResourceType::AutoScalingLaunchConfiguration
                | ResourceType::Route53HostedZone
                | ResourceType::IamUser
                | ResourceType::IamRole
                | ResourceType::IamInstanceProfile
                | ResourceType::Ec2EipAssociation
                | ResourceType::Ec2RouteTableAssociation
        )
    }

    /// Types the generic tagging API cannot discover
    pub fn tagging_unsupported() -> impl Iterator<Item = ResourceType> {
        Self::ALL.into_iter().filter(|rt| !rt.tagging_supported())
    }

    /// Resource token that precedes the name inside an ARN's resource part.
    ///
    /// S3 bucket ARNs carry no token, so `None` is returned for them.
    pub fn arn_token(self) -> Option<&'static str> {
        Some(match self {
            ResourceType::Ec2Vpc => "vpc",
            ResourceType::Ec2VpnGateway => "vpn-gateway",
            ResourceType::Ec2SecurityGroup => "security-group",
            ResourceType::Ec2RouteTable => "route-table",
            ResourceType::Ec2Subnet => "subnet",
            ResourceType::Ec2Volume => "volume",
            ResourceType::Ec2CustomerGateway => "customer-gateway",
            ResourceType::Ec2VpnConnection => "vpn-connection",
            ResourceType::Ec2NetworkAcl => "network-acl",
            ResourceType::Ec2NetworkInterface => "network-interface",
            ResourceType::Ec2InternetGateway => "internet-gateway",
            ResourceType::IamUser => "user",
            ResourceType::IamRole => "role",
            ResourceType::IamInstanceProfile => "instance-profile",
            ResourceType::AutoScalingLaunchConfiguration => "launchConfiguration",
            ResourceType::Ec2Eip => "elastic-ip",
            ResourceType::Ec2EipAssociation => "elastic-ip-association",
            ResourceType::Ec2NatGateway => "natgateway",
            ResourceType::ElasticLoadBalancingLoadBalancer => "loadbalancer",
            ResourceType::AutoScalingGroup => "autoScalingGroup",
            ResourceType::Ec2Instance => "instance",
            ResourceType::Ec2RouteTableAssociation => "route-table-association",
            ResourceType::Route53HostedZone => "hostedzone",
            ResourceType::S3Bucket => return None,
            ResourceType::Ec2Image => "image",
            ResourceType::Ec2Snapshot => "snapshot",
            ResourceType::Ec2KeyPair => "key-pair",
        })
    }

    /// Look up a type from an ARN's service and resource token
    pub fn from_arn_token(service: &str, token: &str) -> Option<Self> {
        let namespace = Namespace::from_service(service)?;
        Self::ALL
            .into_iter()
            .find(|rt| rt.namespace() == namespace && rt.arn_token() == Some(token))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource type name that is not in the known set
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown resource type '{0}'")]
pub struct UnknownResourceType(pub String);

impl FromStr for ResourceType {
    type Err = UnknownResourceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|rt| rt.as_str() == s)
            .ok_or_else(|| UnknownResourceType(s.to_string()))
    }
}

impl TryFrom<String> for ResourceType {
    type Error = UnknownResourceType;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ResourceType> for String {
    fn from(rt: ResourceType) -> Self {
        rt.as_str().to_string()
    }
}
