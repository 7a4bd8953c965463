use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::RngCore;
use tokio::sync::Mutex;
use tracing::debug;

/// One-time upload tokens.
///
/// A token is 32 random bytes, hex-encoded, and is accepted once within its
/// time-to-live. Expired tokens are dropped by [`UploadTokens::purge_expired`],
/// which the server runs periodically.
#[derive(Clone)]
pub struct UploadTokens {
    issued: Arc<Mutex<HashMap<String, Instant>>>,
    ttl: Duration,
}

impl UploadTokens {
    pub fn new(ttl: Duration) -> Self {
        Self {
            issued: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn issue(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        self.issued
            .lock()
            .await
            .insert(token.clone(), Instant::now() + self.ttl);
        token
    }

    /// Consume `token`. Returns `false` if it was never issued, was already
    /// used, or has expired.
    pub async fn redeem(&self, token: &str) -> bool {
        let expires_at = self.issued.lock().await.remove(token);
        matches!(expires_at, Some(at) if Instant::now() < at)
    }

    pub async fn purge_expired(&self) {
        let mut issued = self.issued.lock().await;
        let before = issued.len();
        let now = Instant::now();
        issued.retain(|_, expires_at| now < *expires_at);

        let purged = before - issued.len();
        if purged > 0 {
            debug!(purged, remaining = issued.len(), "Purged expired upload tokens");
        }
    }

    #[cfg(test)]
    pub async fn pending(&self) -> usize {
        self.issued.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_single_use() {
        let tokens = UploadTokens::new(Duration::from_secs(60));
        let token = tokens.issue().await;
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

        assert!(tokens.redeem(&token).await);
        assert!(!tokens.redeem(&token).await);
        assert!(!tokens.redeem("deadbeef").await);
    }

    #[tokio::test]
    async fn test_distinct_tokens() {
        let tokens = UploadTokens::new(Duration::from_secs(60));
        let a = tokens.issue().await;
        let b = tokens.issue().await;
        assert_ne!(a, b);
        assert_eq!(tokens.pending().await, 2);
    }

    #[tokio::test]
    async fn test_expiry_and_purge() {
        let tokens = UploadTokens::new(Duration::ZERO);
        let token = tokens.issue().await;
        tokens.issue().await;

        assert!(!tokens.redeem(&token).await);
        assert_eq!(tokens.pending().await, 1);

        tokens.purge_expired().await;
        assert_eq!(tokens.pending().await, 0);
    }
}
