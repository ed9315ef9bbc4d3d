//! Per-type dispatch of deletions to the service clients

use super::autoscaling::AutoScalingClient;
use super::call::CallContext;
use super::context::{AwsContext, FromAwsContext};
use super::ec2::Ec2Client;
use super::elb::ElbClient;
use super::error::DeleteFailure;
use super::iam::IamClient;
use super::route53::Route53Client;
use super::s3::S3Client;
use crate::execute::{DeleteConfig, DeleteError, ResourceDeleter, delete_each};
use tagsweep_common::{Namespace, ResourceName, ResourceType};

/// [`ResourceDeleter`] backed by the AWS service APIs
pub struct AwsResourceDeleter {
    ec2: Ec2Client,
    s3: S3Client,
    iam: IamClient,
    autoscaling: AutoScalingClient,
    route53: Route53Client,
    elb: ElbClient,
    call: CallContext,
}

impl AwsResourceDeleter {
    pub fn new(ctx: &AwsContext, call: CallContext) -> Self {
        Self {
            ec2: Ec2Client::from_context(ctx),
            s3: S3Client::from_context(ctx),
            iam: IamClient::from_context(ctx),
            autoscaling: AutoScalingClient::from_context(ctx),
            route53: Route53Client::from_context(ctx),
            elb: ElbClient::from_context(ctx),
            call,
        }
    }

    async fn delete_one(&self, resource_type: ResourceType, name: &ResourceName) -> Result<(), DeleteFailure> {
        let call = &self.call;
        let name = name.as_str();

        match resource_type {
            ResourceType::S3Bucket => self.s3.delete_bucket(call, name).await,
            ResourceType::IamRole => self.iam.delete_role(call, name).await,
            ResourceType::IamInstanceProfile => self.iam.delete_instance_profile(call, name).await,
            ResourceType::IamUser => self.iam.delete_user(call, name).await,
            ResourceType::AutoScalingGroup => self.autoscaling.delete_group(call, name).await,
            ResourceType::AutoScalingLaunchConfiguration => {
                self.autoscaling.delete_launch_configuration(call, name).await
            }
            ResourceType::Route53HostedZone => self.route53.delete_hosted_zone(call, name).await,
            ResourceType::ElasticLoadBalancingLoadBalancer => {
                self.elb.delete_load_balancer(call, name).await
            }
            ec2_type => {
                debug_assert_eq!(ec2_type.namespace(), Namespace::Ec2);
                self.ec2.delete(call, ec2_type, name).await
            }
        }
    }
}

impl ResourceDeleter for AwsResourceDeleter {
    async fn delete_resources(
        &self,
        resource_type: ResourceType,
        names: &[ResourceName],
        config: &DeleteConfig,
    ) -> Result<(), DeleteError> {
        delete_each(resource_type, names, config, move |name| async move {
            self.delete_one(resource_type, &name).await
        })
        .await
    }
}
