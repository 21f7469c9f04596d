//! 종목별 일봉 시계열 TTL 캐시.
//!
//! 전역 싱글톤 대신 호출자가 생성해 배치 분석에 넘겨주는 명시적 캐시입니다.
//! 같은 종목에 대한 동시 요청은 종목별 Lock으로 직렬화되어
//! 저장소 조회가 한 번만 일어납니다.

use crate::error::Result;
use crate::provider::PriceStore;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use swing_core::{CacheConfig, PricePoint};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, instrument};

/// 동시성 제어를 위한 종목별 Lock 맵.
type FetchLockMap = Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    points: Arc<Vec<PricePoint>>,
    fetched_at: Instant,
}

/// 캐시 통계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeriesCacheStats {
    /// 캐시 적중 횟수
    pub hits: u64,
    /// 저장소 조회 횟수
    pub misses: u64,
    /// 현재 보관 중인 종목 수 (만료 포함)
    pub entries: usize,
}

/// 종목 코드 키 TTL 캐시.
pub struct SeriesCache {
    ttl: Duration,
    enabled: bool,
    entries: RwLock<HashMap<String, CacheEntry>>,
    fetch_locks: FetchLockMap,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SeriesCache {
    /// 주어진 TTL로 캐시 생성.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            enabled: true,
            entries: RwLock::new(HashMap::new()),
            fetch_locks: Arc::new(RwLock::new(HashMap::new())),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// 설정에서 캐시 생성.
    pub fn from_config(config: &CacheConfig) -> Self {
        let mut cache = Self::new(Duration::from_secs(config.ttl_secs));
        cache.enabled = config.enabled;
        cache
    }

    /// 항상 저장소를 조회하는 비활성 캐시.
    pub fn disabled() -> Self {
        let mut cache = Self::new(Duration::ZERO);
        cache.enabled = false;
        cache
    }

    /// TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 캐시된 시계열을 반환하거나 저장소에서 조회합니다.
    #[instrument(skip(self, store), fields(store = store.name()))]
    pub async fn get_or_fetch(
        &self,
        code: &str,
        store: &dyn PriceStore,
    ) -> Result<Arc<Vec<PricePoint>>> {
        if !self.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::new(store.load_prices(code).await?));
        }

        if let Some(points) = self.fresh(code).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(code, "Series cache hit");
            return Ok(points);
        }

        let lock = self.get_fetch_lock(code).await;
        let _guard = lock.lock().await;

        // Lock 대기 중 다른 요청이 채웠을 수 있음
        if let Some(points) = self.fresh(code).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(code, "Series cache hit after wait");
            return Ok(points);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(code, "Series cache miss, fetching from store");

        let points = Arc::new(store.load_prices(code).await?);
        self.entries.write().await.insert(
            code.to_string(),
            CacheEntry {
                points: points.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(points)
    }

    /// 종목 캐시 무효화.
    pub async fn invalidate(&self, code: &str) -> bool {
        let removed = self.entries.write().await.remove(code).is_some();
        if removed {
            debug!(code, "Series cache invalidated");
        }
        removed
    }

    /// 전체 캐시 비우기.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        self.fetch_locks.write().await.clear();
    }

    /// 캐시 통계.
    pub async fn stats(&self) -> SeriesCacheStats {
        SeriesCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.read().await.len(),
        }
    }

    async fn fresh(&self, code: &str) -> Option<Arc<Vec<PricePoint>>> {
        let entries = self.entries.read().await;
        let entry = entries.get(code)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(entry.points.clone())
        } else {
            debug!(code, "Series cache entry expired");
            None
        }
    }

    async fn get_fetch_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let locks = self.fetch_locks.read().await;
        if let Some(lock) = locks.get(key) {
            return lock.clone();
        }
        drop(locks);

        let mut locks = self.fetch_locks.write().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl std::fmt::Debug for SeriesCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesCache")
            .field("ttl", &self.ttl)
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::atomic::AtomicUsize;

    struct CountingStore {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingStore {
        fn new(delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceStore for CountingStore {
        fn name(&self) -> &str {
            "counting"
        }

        async fn load_prices(&self, _code: &str) -> Result<Vec<PricePoint>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(vec![PricePoint::from_close(
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                dec!(100),
            )])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl_and_refetch_after_expiry() {
        let cache = SeriesCache::new(Duration::from_secs(300));
        let store = CountingStore::new(Duration::ZERO);

        cache.get_or_fetch("005930", &store).await.unwrap();
        cache.get_or_fetch("005930", &store).await.unwrap();
        assert_eq!(store.calls(), 1);

        tokio::time::advance(Duration::from_secs(301)).await;
        cache.get_or_fetch("005930", &store).await.unwrap();
        assert_eq!(store.calls(), 2);

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_fetch_once() {
        let cache = SeriesCache::new(Duration::from_secs(60));
        let store = CountingStore::new(Duration::from_millis(50));

        let (a, b) = tokio::join!(
            cache.get_or_fetch("000660", &store),
            cache.get_or_fetch("000660", &store)
        );
        assert_eq!(a.unwrap().len(), 1);
        assert_eq!(b.unwrap().len(), 1);
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let cache = SeriesCache::new(Duration::from_secs(60));
        let store = CountingStore::new(Duration::ZERO);

        cache.get_or_fetch("A", &store).await.unwrap();
        cache.get_or_fetch("B", &store).await.unwrap();
        assert!(cache.invalidate("A").await);
        assert!(!cache.invalidate("A").await);

        cache.get_or_fetch("A", &store).await.unwrap();
        assert_eq!(store.calls(), 3);

        cache.clear().await;
        assert_eq!(cache.stats().await.entries, 0);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_fetches() {
        let cache = SeriesCache::from_config(&CacheConfig {
            enabled: false,
            ttl_secs: 300,
        });
        let store = CountingStore::new(Duration::ZERO);

        cache.get_or_fetch("A", &store).await.unwrap();
        cache.get_or_fetch("A", &store).await.unwrap();
        assert_eq!(store.calls(), 2);
        assert_eq!(cache.stats().await.entries, 0);
    }
}
