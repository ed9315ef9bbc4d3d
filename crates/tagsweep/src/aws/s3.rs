//! S3 bucket deletion

use super::call::CallContext;
use super::context::{AwsContext, FromAwsContext};
use super::error::DeleteFailure;
use aws_sdk_s3::Client;
use tracing::{debug, info};

/// S3 client for emptying and deleting buckets
pub struct S3Client {
    client: Client,
}

impl FromAwsContext for S3Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.s3_client(),
        }
    }
}

impl S3Client {
    /// Delete a bucket and all its objects
    pub async fn delete_bucket(&self, call: &CallContext, bucket: &str) -> Result<(), DeleteFailure> {
        info!(bucket = %bucket, "Deleting bucket and contents");

        // List and delete all objects
        let mut continuation_token = None;
        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket);

            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = call.run(request.send()).await?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    debug!(key = %key, "Deleting object");
                    call.run(self.client.delete_object().bucket(bucket).key(key).send())
                        .await?;
                }
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(|s| s.to_string());
            } else {
                break;
            }
        }

        // Delete the bucket itself
        call.run(self.client.delete_bucket().bucket(bucket).send())
            .await?;

        Ok(())
    }
}
