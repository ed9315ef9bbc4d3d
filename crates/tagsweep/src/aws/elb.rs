//! Classic Elastic Load Balancing deletion

use super::call::CallContext;
use super::context::{AwsContext, FromAwsContext};
use super::error::DeleteFailure;
use aws_sdk_elasticloadbalancing::Client;
use tracing::info;

pub struct ElbClient {
    client: Client,
}

impl FromAwsContext for ElbClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.elb_client(),
        }
    }
}

impl ElbClient {
    pub async fn delete_load_balancer(&self, call: &CallContext, name: &str) -> Result<(), DeleteFailure> {
        info!(load_balancer = %name, "Deleting classic load balancer");
        call.run(
            self.client
                .delete_load_balancer()
                .load_balancer_name(name)
                .send(),
        )
        .await?;
        Ok(())
    }
}
