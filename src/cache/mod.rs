//! In-process lookup cache
//!
//! Read-through cache in front of the payment lookup path. Entries are keyed
//! by (merchant id, payment id) and expire after a fixed TTL, checked lazily
//! on read. Write paths never touch the cache and never invalidate it: a
//! freshly processed payment becomes visible through the cache on its first
//! lookup, and an entry written now stays served until its window lapses.
//! That staleness window is part of the design.

use crate::error::AppResult;
use crate::services::payments::PaymentView;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const VERSION: &str = "v1";
pub const NAMESPACE: &str = "payment";

/// Typed cache key: a payment is cached per looking-up merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaymentKey {
    pub merchant_id: Uuid,
    pub payment_id: Uuid,
}

impl PaymentKey {
    pub fn new(merchant_id: Uuid, payment_id: Uuid) -> Self {
        Self {
            merchant_id,
            payment_id,
        }
    }
}

impl fmt::Display for PaymentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            VERSION, NAMESPACE, self.merchant_id, self.payment_id
        )
    }
}

struct CacheEntry {
    view: PaymentView,
    stored_at: Instant,
}

/// TTL map guarded by a single map-level async lock; no global locks, no
/// blocking in the hot path.
pub struct PaymentViewCache {
    entries: RwLock<HashMap<PaymentKey, CacheEntry>>,
    ttl: Duration,
}

impl PaymentViewCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn get(&self, key: &PaymentKey) -> Option<PaymentView> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    return Some(entry.view.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: evict under the write lock.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.view.clone());
            }
            entries.remove(key);
        }
        None
    }

    pub async fn insert(&self, key: PaymentKey, view: PaymentView) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                view,
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Cache-then-delegate lookup, composed explicitly around whatever loader the
/// caller supplies. Only a non-empty successful result is stored; misses and
/// failures pass through untouched.
pub async fn read_through<F, Fut>(
    cache: &PaymentViewCache,
    key: PaymentKey,
    load: F,
) -> AppResult<Option<PaymentView>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<Option<PaymentView>>>,
{
    if let Some(hit) = cache.get(&key).await {
        return Ok(Some(hit));
    }

    let result = load().await?;
    if let Some(view) = &result {
        cache.insert(key, view.clone()).await;
    }

    Ok(result)
}
