use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::time::{Duration, Instant};
use uuid::Uuid;

/// Single-use tokens guarding admin schedule submissions.
///
/// A token is handed out with `issue` and accepted exactly once by `consume`,
/// provided it has not outlived `lifetime`.
#[derive(Clone)]
pub struct NonceRegistry {
    issued: Arc<Mutex<HashMap<String, Instant>>>,
    lifetime: Duration,
}

impl NonceRegistry {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            issued: Arc::new(Mutex::new(HashMap::new())),
            lifetime,
        }
    }

    pub fn issue(&self) -> String {
        let nonce = Uuid::new_v4().to_string();
        let now = Instant::now();
        let mut issued = self.issued.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let lifetime = self.lifetime;
        issued.retain(|_, issued_at| now.duration_since(*issued_at) <= lifetime);
        issued.insert(nonce.clone(), now);
        nonce
    }

    pub fn consume(&self, nonce: &str) -> bool {
        let mut issued = self.issued.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match issued.remove(nonce) {
            Some(issued_at) => issued_at.elapsed() <= self.lifetime,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_is_single_use() {
        let registry = NonceRegistry::new(Duration::from_secs(60));
        let nonce = registry.issue();
        assert!(registry.consume(&nonce));
        assert!(!registry.consume(&nonce));
    }

    #[test]
    fn unknown_nonce_is_rejected() {
        let registry = NonceRegistry::new(Duration::from_secs(60));
        registry.issue();
        assert!(!registry.consume("not-a-nonce"));
        assert!(!registry.consume(""));
    }

    #[test]
    fn nonces_are_distinct() {
        let registry = NonceRegistry::new(Duration::from_secs(60));
        let first = registry.issue();
        let second = registry.issue();
        assert_ne!(first, second);
        assert!(registry.consume(&second));
        assert!(registry.consume(&first));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_nonce_is_rejected() {
        let registry = NonceRegistry::new(Duration::from_secs(60));
        let nonce = registry.issue();
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!registry.consume(&nonce));
    }
}
