use async_trait::async_trait;

/// Executes one request against a remote service.
///
/// The dispatcher never inspects requests, responses or errors; it only
/// forwards whatever the executor produced to the submitter.
#[async_trait]
pub trait RequestExecutor: Send + Sync + 'static {
    type Request: Send + 'static;
    type Response: Send + 'static;
    type Error: Send + 'static;

    async fn execute(&self, request: Self::Request) -> Result<Self::Response, Self::Error>;
}
