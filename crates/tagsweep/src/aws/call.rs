//! Cancellation and timeouts for individual AWS calls

use super::error::AwsError;
use aws_sdk_ec2::error::ProvideErrorMetadata;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-call control shared by every AWS request a run makes.
///
/// Cancelling the token stops in-flight calls with [`AwsError::Cancelled`];
/// the optional timeout bounds each call individually.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl CallContext {
    pub fn new(cancel: CancellationToken, timeout: Option<Duration>) -> Self {
        Self { cancel, timeout }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive one SDK call under this context, classifying its error.
    pub async fn run<T, E, F>(&self, call: F) -> Result<T, AwsError>
    where
        F: Future<Output = Result<T, E>>,
        E: ProvideErrorMetadata + fmt::Display,
    {
        let guarded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, call)
                    .await
                    .map_err(|_| AwsError::TimedOut(limit)),
                None => Ok(call.await),
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AwsError::Cancelled),
            result = guarded => result?.map_err(|e| AwsError::from_sdk(&e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeError;

    impl fmt::Display for FakeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake failure")
        }
    }

    impl ProvideErrorMetadata for FakeError {
        fn meta(&self) -> &aws_sdk_ec2::error::ErrorMetadata {
            static META: std::sync::OnceLock<aws_sdk_ec2::error::ErrorMetadata> =
                std::sync::OnceLock::new();
            META.get_or_init(|| {
                aws_sdk_ec2::error::ErrorMetadata::builder()
                    .code("InvalidVpcID.NotFound")
                    .message("gone")
                    .build()
            })
        }
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let ctx = CallContext::default();
        let value = ctx.run(async { Ok::<_, FakeError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_errors_are_classified() {
        let ctx = CallContext::default();
        let err = ctx.run(async { Err::<(), _>(FakeError) }).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message(), "gone");
    }

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = CallContext::new(token, None);
        let err = ctx
            .run(async { Ok::<_, FakeError>(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, AwsError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_call() {
        let ctx = CallContext::new(CancellationToken::new(), Some(Duration::from_secs(5)));
        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, FakeError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AwsError::TimedOut(d) if d == Duration::from_secs(5)));
    }
}
