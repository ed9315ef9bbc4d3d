//! EC2 and VPC resource deletion and dependency queries

use super::call::CallContext;
use super::context::{AwsContext, FromAwsContext};
use super::error::{AwsError, DeleteFailure, ignore_not_found};
use aws_sdk_ec2::Client;
use aws_sdk_ec2::types::{AttachmentStatus, Filter};
use tagsweep_common::ResourceType;
use tracing::{debug, info};

/// EC2 client for VPC teardown
pub struct Ec2Client {
    client: Client,
}

impl FromAwsContext for Ec2Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
        }
    }
}

fn filter(name: &str, value: &str) -> Filter {
    Filter::builder().name(name).values(value).build()
}

impl Ec2Client {
    /// Delete one EC2 resource of the given type.
    pub async fn delete(
        &self,
        call: &CallContext,
        resource_type: ResourceType,
        id: &str,
    ) -> Result<(), DeleteFailure> {
        info!(resource_type = %resource_type, id = %id, "Deleting EC2 resource");
        let c = &self.client;

        match resource_type {
            ResourceType::Ec2Instance => {
                call.run(c.terminate_instances().instance_ids(id).send()).await?;
            }
            ResourceType::Ec2Vpc => {
                call.run(c.delete_vpc().vpc_id(id).send()).await?;
            }
            ResourceType::Ec2Subnet => {
                call.run(c.delete_subnet().subnet_id(id).send()).await?;
            }
            ResourceType::Ec2SecurityGroup => {
                call.run(c.delete_security_group().group_id(id).send()).await?;
            }
            ResourceType::Ec2RouteTable => {
                call.run(c.delete_route_table().route_table_id(id).send()).await?;
            }
            ResourceType::Ec2InternetGateway => self.delete_internet_gateway(call, id).await?,
            ResourceType::Ec2VpnGateway => self.delete_vpn_gateway(call, id).await?,
            ResourceType::Ec2NatGateway => {
                call.run(c.delete_nat_gateway().nat_gateway_id(id).send()).await?;
            }
            ResourceType::Ec2Eip => {
                call.run(c.release_address().allocation_id(id).send()).await?;
            }
            ResourceType::Ec2EipAssociation => {
                call.run(c.disassociate_address().association_id(id).send()).await?;
            }
            ResourceType::Ec2RouteTableAssociation => {
                call.run(c.disassociate_route_table().association_id(id).send())
                    .await?;
            }
            ResourceType::Ec2NetworkInterface => {
                call.run(c.delete_network_interface().network_interface_id(id).send())
                    .await?;
            }
            ResourceType::Ec2NetworkAcl => {
                call.run(c.delete_network_acl().network_acl_id(id).send()).await?;
            }
            ResourceType::Ec2Volume => {
                call.run(c.delete_volume().volume_id(id).send()).await?;
            }
            ResourceType::Ec2CustomerGateway => {
                call.run(c.delete_customer_gateway().customer_gateway_id(id).send())
                    .await?;
            }
            ResourceType::Ec2VpnConnection => {
                call.run(c.delete_vpn_connection().vpn_connection_id(id).send())
                    .await?;
            }
            ResourceType::Ec2Image => {
                call.run(c.deregister_image().image_id(id).send()).await?;
            }
            ResourceType::Ec2Snapshot => {
                call.run(c.delete_snapshot().snapshot_id(id).send()).await?;
            }
            ResourceType::Ec2KeyPair => {
                call.run(c.delete_key_pair().key_pair_id(id).send()).await?;
            }
            other => {
                return Err(AwsError::Sdk {
                    code: None,
                    message: format!("{other} is not an EC2 resource type"),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Detach from every VPC, then delete.
    ///
    /// A failed detach is attributed to the VPC it was attached to.
    async fn delete_internet_gateway(&self, call: &CallContext, id: &str) -> Result<(), DeleteFailure> {
        let response = ignore_not_found(
            call.run(
                self.client
                    .describe_internet_gateways()
                    .internet_gateway_ids(id)
                    .send(),
            )
            .await,
        )?;

        let vpc_ids: Vec<String> = response
            .iter()
            .flat_map(|r| r.internet_gateways())
            .flat_map(|g| g.attachments())
            .filter_map(|a| a.vpc_id())
            .map(str::to_string)
            .collect();

        for vpc_id in vpc_ids {
            debug!(igw = %id, vpc = %vpc_id, "Detaching internet gateway");
            call.run(
                self.client
                    .detach_internet_gateway()
                    .internet_gateway_id(id)
                    .vpc_id(&vpc_id)
                    .send(),
            )
            .await
            .map_err(|e| DeleteFailure::with_parent(e, ResourceType::Ec2Vpc, vpc_id))?;
        }

        call.run(self.client.delete_internet_gateway().internet_gateway_id(id).send())
            .await?;
        Ok(())
    }

    /// Detach from attached VPCs, then delete.
    async fn delete_vpn_gateway(&self, call: &CallContext, id: &str) -> Result<(), DeleteFailure> {
        let response = ignore_not_found(
            call.run(self.client.describe_vpn_gateways().vpn_gateway_ids(id).send())
                .await,
        )?;

        let vpc_ids: Vec<String> = response
            .iter()
            .flat_map(|r| r.vpn_gateways())
            .flat_map(|g| g.vpc_attachments())
            .filter(|a| a.state() != Some(&AttachmentStatus::Detached))
            .filter_map(|a| a.vpc_id())
            .map(str::to_string)
            .collect();

        for vpc_id in vpc_ids {
            debug!(vgw = %id, vpc = %vpc_id, "Detaching VPN gateway");
            call.run(
                self.client
                    .detach_vpn_gateway()
                    .vpn_gateway_id(id)
                    .vpc_id(&vpc_id)
                    .send(),
            )
            .await
            .map_err(|e| DeleteFailure::with_parent(e, ResourceType::Ec2Vpc, vpc_id))?;
        }

        call.run(self.client.delete_vpn_gateway().vpn_gateway_id(id).send())
            .await?;
        Ok(())
    }

    pub async fn subnets_in_vpc(&self, call: &CallContext, vpc_id: &str) -> Result<Vec<String>, AwsError> {
        let response = call
            .run(
                self.client
                    .describe_subnets()
                    .filters(filter("vpc-id", vpc_id))
                    .send(),
            )
            .await?;
        Ok(response
            .subnets()
            .iter()
            .filter_map(|s| s.subnet_id())
            .map(str::to_string)
            .collect())
    }

    /// Security groups in a VPC, excluding the undeletable default group
    pub async fn security_groups_in_vpc(
        &self,
        call: &CallContext,
        vpc_id: &str,
    ) -> Result<Vec<String>, AwsError> {
        let response = call
            .run(
                self.client
                    .describe_security_groups()
                    .filters(filter("vpc-id", vpc_id))
                    .send(),
            )
            .await?;
        Ok(response
            .security_groups()
            .iter()
            .filter(|g| g.group_name() != Some("default"))
            .filter_map(|g| g.group_id())
            .map(str::to_string)
            .collect())
    }

    /// Route tables in a VPC, excluding the main route table
    pub async fn route_tables_in_vpc(
        &self,
        call: &CallContext,
        vpc_id: &str,
    ) -> Result<Vec<String>, AwsError> {
        let response = call
            .run(
                self.client
                    .describe_route_tables()
                    .filters(filter("vpc-id", vpc_id))
                    .send(),
            )
            .await?;
        Ok(response
            .route_tables()
            .iter()
            .filter(|t| !t.associations().iter().any(|a| a.main() == Some(true)))
            .filter_map(|t| t.route_table_id())
            .map(str::to_string)
            .collect())
    }

    pub async fn internet_gateways_in_vpc(
        &self,
        call: &CallContext,
        vpc_id: &str,
    ) -> Result<Vec<String>, AwsError> {
        let response = call
            .run(
                self.client
                    .describe_internet_gateways()
                    .filters(filter("attachment.vpc-id", vpc_id))
                    .send(),
            )
            .await?;
        Ok(response
            .internet_gateways()
            .iter()
            .filter_map(|g| g.internet_gateway_id())
            .map(str::to_string)
            .collect())
    }

    pub async fn nat_gateways_in_vpc(&self, call: &CallContext, vpc_id: &str) -> Result<Vec<String>, AwsError> {
        let response = call
            .run(
                self.client
                    .describe_nat_gateways()
                    .filter(filter("vpc-id", vpc_id))
                    .send(),
            )
            .await?;
        Ok(response
            .nat_gateways()
            .iter()
            .filter_map(|g| g.nat_gateway_id())
            .map(str::to_string)
            .collect())
    }

    pub async fn vpn_gateways_in_vpc(&self, call: &CallContext, vpc_id: &str) -> Result<Vec<String>, AwsError> {
        let response = call
            .run(
                self.client
                    .describe_vpn_gateways()
                    .filters(filter("attachment.vpc-id", vpc_id))
                    .send(),
            )
            .await?;
        Ok(response
            .vpn_gateways()
            .iter()
            .filter_map(|g| g.vpn_gateway_id())
            .map(str::to_string)
            .collect())
    }

    /// Network interfaces matching `filter_name` (`vpc-id` or `subnet-id`)
    pub async fn network_interfaces(
        &self,
        call: &CallContext,
        filter_name: &str,
        id: &str,
    ) -> Result<Vec<String>, AwsError> {
        let response = call
            .run(
                self.client
                    .describe_network_interfaces()
                    .filters(filter(filter_name, id))
                    .send(),
            )
            .await?;
        Ok(response
            .network_interfaces()
            .iter()
            .filter_map(|n| n.network_interface_id())
            .map(str::to_string)
            .collect())
    }

    /// Instances in a subnet that are not already terminated
    pub async fn instances_in_subnet(
        &self,
        call: &CallContext,
        subnet_id: &str,
    ) -> Result<Vec<String>, AwsError> {
        let response = call
            .run(
                self.client
                    .describe_instances()
                    .filters(filter("subnet-id", subnet_id))
                    .filters(
                        Filter::builder()
                            .name("instance-state-name")
                            .values("pending")
                            .values("running")
                            .values("stopping")
                            .values("stopped")
                            .build(),
                    )
                    .send(),
            )
            .await?;
        Ok(response
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .filter_map(|i| i.instance_id())
            .map(str::to_string)
            .collect())
    }
}
