//! EC2 dependency edges
//!
//! A VPC cannot be deleted while it still holds subnets, non-default
//! security groups, non-main route tables, gateways or network
//! interfaces. A subnet cannot be deleted while instances or network
//! interfaces remain in it.

use super::call::CallContext;
use super::context::{AwsContext, FromAwsContext};
use super::ec2::Ec2Client;
use super::error::AwsError;
use crate::expand::DependencySource;
use tagsweep_common::{ResourceName, ResourceType};

/// [`DependencySource`] answering from live EC2 describe calls
pub struct Ec2DependencySource {
    ec2: Ec2Client,
}

impl FromAwsContext for Ec2DependencySource {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            ec2: Ec2Client::from_context(ctx),
        }
    }
}

fn tagged(resource_type: ResourceType, ids: Vec<String>) -> impl Iterator<Item = (ResourceType, ResourceName)> {
    ids.into_iter().map(move |id| (resource_type, ResourceName::from(id)))
}

impl DependencySource for Ec2DependencySource {
    async fn dependents(
        &self,
        call: &CallContext,
        resource_type: ResourceType,
        name: &ResourceName,
    ) -> Result<Vec<(ResourceType, ResourceName)>, AwsError> {
        let id = name.as_str();
        let mut found = Vec::new();

        match resource_type {
            ResourceType::Ec2Vpc => {
                found.extend(tagged(ResourceType::Ec2Subnet, self.ec2.subnets_in_vpc(call, id).await?));
                found.extend(tagged(
                    ResourceType::Ec2SecurityGroup,
                    self.ec2.security_groups_in_vpc(call, id).await?,
                ));
                found.extend(tagged(
                    ResourceType::Ec2RouteTable,
                    self.ec2.route_tables_in_vpc(call, id).await?,
                ));
                found.extend(tagged(
                    ResourceType::Ec2InternetGateway,
                    self.ec2.internet_gateways_in_vpc(call, id).await?,
                ));
                found.extend(tagged(
                    ResourceType::Ec2NatGateway,
                    self.ec2.nat_gateways_in_vpc(call, id).await?,
                ));
                found.extend(tagged(
                    ResourceType::Ec2VpnGateway,
                    self.ec2.vpn_gateways_in_vpc(call, id).await?,
                ));
                found.extend(tagged(
                    ResourceType::Ec2NetworkInterface,
                    self.ec2.network_interfaces(call, "vpc-id", id).await?,
                ));
            }
            ResourceType::Ec2Subnet => {
                found.extend(tagged(
                    ResourceType::Ec2Instance,
                    self.ec2.instances_in_subnet(call, id).await?,
                ));
                found.extend(tagged(
                    ResourceType::Ec2NetworkInterface,
                    self.ec2.network_interfaces(call, "subnet-id", id).await?,
                ));
            }
            _ => {}
        }

        Ok(found)
    }
}
