//! Collaborator Timeouts
//!
//! Deadline configuration for the two timeouts the engine has, and a
//! wrapper that maps an elapsed deadline to `CollaboratorTimeout` so it
//! feeds the retry budget like any other recoverable failure.

use std::future::Future;
use std::time::Duration;

use crate::constants::network;
use crate::types::{ForgeError, Result};

/// Timeout configuration for collaborator traffic.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Deadline for one full generation round-trip.
    pub request: Duration,
    /// Deadline for establishing the connection.
    pub connect: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(network::DEFAULT_TIMEOUT_SECS),
            connect: Duration::from_secs(network::CONNECTION_TIMEOUT_SECS),
        }
    }
}

impl TimeoutConfig {
    pub fn with_request_secs(mut self, secs: u64) -> Self {
        self.request = Duration::from_secs(secs);
        self
    }
}

/// Execute a collaborator operation under a deadline.
///
/// An elapsed deadline becomes `CollaboratorTimeout` for the named
/// provider; inner errors pass through untouched.
pub async fn with_timeout<T, F>(deadline: Duration, future: F, provider: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => Err(ForgeError::timeout(provider, deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_deadlines() {
        let config = TimeoutConfig::default();
        assert_eq!(config.request.as_secs(), 120);
        assert_eq!(config.connect.as_secs(), 10);
    }

    #[tokio::test]
    async fn test_with_timeout_passes_result() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, ForgeError>(7) },
            "mock",
        )
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, ForgeError>(7)
            },
            "mock",
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            ForgeError::CollaboratorTimeout { .. }
        ));
    }
}
