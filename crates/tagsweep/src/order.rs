//! Deletion ordering
//!
//! [`DELETE_ORDER`] lists resource types so that every type comes before
//! the types that must be gone before it can be deleted: a VPC is listed
//! first because subnets, gateways and instances inside it must go first.
//! Execution therefore walks the table back to front.

use crate::bucket::ResourceBuckets;
use tagsweep_common::{ResourceName, ResourceType};

/// Dependency-ranked resource types, dependencies last
pub const DELETE_ORDER: [ResourceType; 24] = [
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
];

/// Position of a type in [`DELETE_ORDER`], if ranked
pub fn rank(resource_type: ResourceType) -> Option<usize> {
    DELETE_ORDER.iter().position(|t| *t == resource_type)
}

/// All names of one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub resource_type: ResourceType,
    pub names: Vec<ResourceName>,
}

/// Buckets laid out for execution.
///
/// The first `ranked` buckets follow [`DELETE_ORDER`]; the rest hold types
/// the table does not rank, in type order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPlan {
    buckets: Vec<Bucket>,
    ranked: usize,
}

impl DeletionPlan {
    /// Order the buckets by the deletion table.
    pub fn organize(buckets: ResourceBuckets) -> Self {
        let mut remaining = buckets.into_inner();

        let mut ordered: Vec<Bucket> = DELETE_ORDER
            .iter()
            .filter_map(|t| {
                remaining.remove(t).map(|names| Bucket {
                    resource_type: *t,
                    names,
                })
            })
            .collect();
        let ranked = ordered.len();

        ordered.extend(
            remaining
                .into_iter()
                .map(|(resource_type, names)| Bucket { resource_type, names }),
        );

        Self {
            buckets: ordered,
            ranked,
        }
    }

    /// Buckets in table order, unranked last
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn ranked(&self) -> &[Bucket] {
        &self.buckets[..self.ranked]
    }

    pub fn unranked(&self) -> &[Bucket] {
        &self.buckets[self.ranked..]
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Order in which buckets are deleted: ranked buckets back to front,
    /// then unranked buckets.
    pub fn execution_order(&self) -> impl Iterator<Item = &Bucket> {
        self.ranked().iter().rev().chain(self.unranked())
    }
}
