use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Clock abstraction so TTL expiry can be tested without real timers.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock implementation used outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Cinema search results, keyed by location parameter + radius
    Search { location: String, radius: u32 },
    /// Geocoding resolutions, keyed by raw search term
    Geocode(String),
    /// Movie metadata payloads, keyed by endpoint-specific id
    Movie(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Search { location, radius } => {
                write!(f, "cinema:{}:{}", location.to_lowercase(), radius)
            }
            CacheKey::Geocode(term) => write!(f, "geocode:{}", term.to_lowercase()),
            CacheKey::Movie(id) => write!(f, "movie:{}", id),
        }
    }
}

struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

/// In-process TTL cache.
///
/// Entries live for a fixed duration. Each write schedules its own deferred
/// eviction task; reads additionally check expiry against the injected clock,
/// so a stale entry is never served even if its eviction task has not fired.
/// Lifetime is process-wide, no persistence across restarts.
#[derive(Clone)]
pub struct TtlCache<T> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone + Send + Sync + 'static> TtlCache<T> {
    /// Creates a cache backed by the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates a cache with an injected clock (for deterministic TTL tests)
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// Retrieves a live value, dropping the entry if its TTL has elapsed
    pub async fn get(&self, key: &CacheKey) -> Option<T> {
        let key = key.to_string();
        let now = self.clock.now();

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: remove it so the map does not accumulate stale entries.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(&key) {
            if entry.expires_at <= now {
                entries.remove(&key);
            }
        }
        None
    }

    /// Stores a value and schedules its deferred eviction.
    ///
    /// A re-insert under the same key refreshes `expires_at`, so an eviction
    /// task scheduled by an earlier write leaves the newer entry in place.
    pub async fn insert(&self, key: &CacheKey, value: T) {
        let key = key.to_string();
        let expires_at = self.clock.now() + self.ttl;

        self.entries
            .write()
            .await
            .insert(key.clone(), CacheEntry { value, expires_at });

        let entries = Arc::clone(&self.entries);
        let clock = Arc::clone(&self.clock);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let now = clock.now();
            let mut entries = entries.write().await;
            if let Some(entry) = entries.get(&key) {
                if entry.expires_at <= now {
                    entries.remove(&key);
                }
            }
        });
    }

    /// Removes an entry before its TTL elapses
    pub async fn evict(&self, key: &CacheKey) {
        self.entries.write().await.remove(&key.to_string());
    }

    /// Drops all entries
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, including any not yet evicted
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Test clock advanced by hand
    struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    #[test]
    fn test_cache_key_display_search_lowercases_location() {
        let key = CacheKey::Search {
            location: "Frankfurt am Main".to_string(),
            radius: 25000,
        };
        assert_eq!(format!("{}", key), "cinema:frankfurt am main:25000");
    }

    #[test]
    fn test_cache_key_display_geocode_lowercases_term() {
        let key = CacheKey::Geocode("HAMBURG".to_string());
        assert_eq!(format!("{}", key), "geocode:hamburg");
    }

    #[test]
    fn test_cache_key_display_movie() {
        let key = CacheKey::Movie("popular:1".to_string());
        assert_eq!(format!("{}", key), "movie:popular:1");
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(600));
        let key = CacheKey::Geocode("60311".to_string());

        cache.insert(&key, "value".to_string()).await;
        assert_eq!(cache.get(&key).await, Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_get_miss_returns_none() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(600));
        let key = CacheKey::Geocode("missing".to_string());
        assert_eq!(cache.get(&key).await, None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<String> =
            TtlCache::with_clock(Duration::from_secs(600), Arc::clone(&clock) as Arc<dyn Clock>);
        let key = CacheKey::Geocode("berlin".to_string());

        cache.insert(&key, "coords".to_string()).await;
        assert!(cache.get(&key).await.is_some());

        clock.advance(Duration::from_secs(601));
        assert_eq!(cache.get(&key).await, None);
        // The expired read also removed the entry
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_entry_live_just_before_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<u32> =
            TtlCache::with_clock(Duration::from_secs(600), Arc::clone(&clock) as Arc<dyn Clock>);
        let key = CacheKey::Geocode("köln".to_string());

        cache.insert(&key, 7).await;
        clock.advance(Duration::from_secs(599));
        assert_eq!(cache.get(&key).await, Some(7));
    }

    #[tokio::test]
    async fn test_reinsert_refreshes_expiry() {
        let clock = Arc::new(ManualClock::new());
        let cache: TtlCache<u32> =
            TtlCache::with_clock(Duration::from_secs(600), Arc::clone(&clock) as Arc<dyn Clock>);
        let key = CacheKey::Geocode("hamburg".to_string());

        cache.insert(&key, 1).await;
        clock.advance(Duration::from_secs(400));
        cache.insert(&key, 2).await;
        clock.advance(Duration::from_secs(400));

        // 800s after the first write, but only 400s after the refresh
        assert_eq!(cache.get(&key).await, Some(2));
    }

    #[tokio::test]
    async fn test_evict_and_clear() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(600));
        let key_a = CacheKey::Geocode("a".to_string());
        let key_b = CacheKey::Geocode("b".to_string());

        cache.insert(&key_a, 1).await;
        cache.insert(&key_b, 2).await;
        assert_eq!(cache.len().await, 2);

        cache.evict(&key_a).await;
        assert_eq!(cache.get(&key_a).await, None);
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_keys_with_same_term_different_radius_are_distinct() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(600));
        let near = CacheKey::Search {
            location: "60311".to_string(),
            radius: 10000,
        };
        let far = CacheKey::Search {
            location: "60311".to_string(),
            radius: 25000,
        };

        cache.insert(&near, 1).await;
        cache.insert(&far, 2).await;
        assert_eq!(cache.get(&near).await, Some(1));
        assert_eq!(cache.get(&far).await, Some(2));
    }
}
