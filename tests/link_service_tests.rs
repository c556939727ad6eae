//! LinkService tests
//!
//! Creation collision handling, resolution with click capture, and the
//! read-only stats path, against in-memory and SQLite stores.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use linkscope::config::DatabaseConfig;
use linkscope::errors::{LinkscopeError, Result};
use linkscope::services::{
    ClickCapture, CodeGenerator, CodePolicy, LinkService, RandomCodeGenerator,
};
use linkscope::storage::{
    ClickEvent, ClientMeta, LinkStore, MemoryStore, NewClickEvent, NewShortLink, SeaOrmStorage,
    ShortLink,
};
use parking_lot::Mutex;
use tempfile::TempDir;

// =============================================================================
// Test Setup
// =============================================================================

/// Returns scripted codes in order, then falls back to random ones.
struct ScriptedGenerator {
    codes: Mutex<VecDeque<String>>,
    fallback: RandomCodeGenerator,
    calls: AtomicU32,
}

impl ScriptedGenerator {
    fn new(codes: &[&str]) -> Self {
        Self {
            codes: Mutex::new(codes.iter().map(|c| c.to_string()).collect()),
            fallback: RandomCodeGenerator::seeded(1),
            calls: AtomicU32::new(0),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CodeGenerator for ScriptedGenerator {
    fn generate(&self, length: usize) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.codes
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.generate(length))
    }
}

/// Always yields a code made of `A`s of the requested length.
struct ConstantGenerator;

impl CodeGenerator for ConstantGenerator {
    fn generate(&self, length: usize) -> String {
        "A".repeat(length)
    }
}

/// Delegates to a MemoryStore but fails every click write.
struct FailingClickStore {
    inner: MemoryStore,
}

#[async_trait]
impl LinkStore for FailingClickStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        self.inner.find_by_code(code).await
    }

    async fn save(&self, link: NewShortLink) -> Result<ShortLink> {
        self.inner.save(link).await
    }

    async fn find_all(&self) -> Result<Vec<ShortLink>> {
        self.inner.find_all().await
    }

    async fn save_click(&self, _click: NewClickEvent) -> Result<ClickEvent> {
        Err(LinkscopeError::database_operation("click table unavailable"))
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }

    fn backend_name(&self) -> &str {
        "failing-click"
    }
}

/// Hides existing codes from `find_by_code` for the first `races` saves,
/// so the store's uniqueness check is what catches the collision.
struct RacingStore {
    inner: MemoryStore,
    races: AtomicU32,
}

#[async_trait]
impl LinkStore for RacingStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        if self.races.load(Ordering::SeqCst) > 0 {
            return Ok(None);
        }
        self.inner.find_by_code(code).await
    }

    async fn save(&self, link: NewShortLink) -> Result<ShortLink> {
        let _ = self
            .races
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        self.inner.save(link).await
    }

    async fn find_all(&self) -> Result<Vec<ShortLink>> {
        self.inner.find_all().await
    }

    async fn save_click(&self, click: NewClickEvent) -> Result<ClickEvent> {
        self.inner.save_click(click).await
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }

    fn backend_name(&self) -> &str {
        "racing"
    }
}

/// Store whose reads always fail.
struct BrokenStore;

#[async_trait]
impl LinkStore for BrokenStore {
    async fn find_by_code(&self, _code: &str) -> Result<Option<ShortLink>> {
        Err(LinkscopeError::database_connection("connection refused"))
    }

    async fn save(&self, _link: NewShortLink) -> Result<ShortLink> {
        Err(LinkscopeError::database_connection("connection refused"))
    }

    async fn find_all(&self) -> Result<Vec<ShortLink>> {
        Err(LinkscopeError::database_connection("connection refused"))
    }

    async fn save_click(&self, _click: NewClickEvent) -> Result<ClickEvent> {
        Err(LinkscopeError::database_connection("connection refused"))
    }

    async fn count(&self) -> Result<u64> {
        Err(LinkscopeError::database_connection("connection refused"))
    }

    fn backend_name(&self) -> &str {
        "broken"
    }
}

fn memory_service() -> (LinkService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = LinkService::new(
        store.clone(),
        Arc::new(RandomCodeGenerator::seeded(42)),
        CodePolicy::default(),
    );
    (service, store)
}

async fn seed(store: &dyn LinkStore, code: &str, url: &str) -> ShortLink {
    store
        .save(NewShortLink {
            code: code.to_string(),
            original_url: url.to_string(),
            created_at: Utc::now(),
        })
        .await
        .expect("Failed to seed link")
}

/// Create a test service backed by a temporary SQLite database
async fn sqlite_service() -> (LinkService, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test_service.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..DatabaseConfig::default()
    };

    let storage = SeaOrmStorage::new(&config, "sqlite")
        .await
        .expect("Failed to create storage");

    let service = LinkService::new(
        Arc::new(storage),
        Arc::new(RandomCodeGenerator::new()),
        CodePolicy::default(),
    );

    (service, temp_dir)
}

fn browser_meta() -> ClientMeta {
    ClientMeta {
        address: Some("203.0.113.7".to_string()),
        referrer: Some("https://news.example.org/".to_string()),
        user_agent: Some("Mozilla/5.0".to_string()),
    }
}

// =============================================================================
// Create Tests
// =============================================================================

#[cfg(test)]
mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_returns_persisted_link() {
        let (service, store) = memory_service();

        let link = service.create("https://example.com").await.unwrap();

        assert_eq!(link.code.len(), 6);
        assert!(link.code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(link.original_url, "https://example.com");
        assert!(link.clicks.is_empty());

        let stored = store.find_by_code(&link.code).await.unwrap().unwrap();
        assert_eq!(stored.id, link.id);
        assert_eq!(stored.created_at, link.created_at);
    }

    #[tokio::test]
    async fn test_create_accepts_any_string_verbatim() {
        let (service, _store) = memory_service();

        for url in ["", "not a url", "example.com", "  spaced  "] {
            let link = service.create(url).await.unwrap();
            assert_eq!(link.original_url, url);
        }
    }

    #[tokio::test]
    async fn test_codes_are_unique_across_creates() {
        let (service, store) = memory_service();

        let mut codes = std::collections::HashSet::new();
        for i in 0..200 {
            let link = service.create(&format!("https://e.com/{}", i)).await.unwrap();
            assert!(codes.insert(link.code));
        }
        assert_eq!(store.count().await.unwrap(), 200);
    }

    #[tokio::test]
    async fn test_create_skips_existing_codes() {
        let store = Arc::new(MemoryStore::new());
        seed(store.as_ref(), "taken1", "https://old.example").await;
        seed(store.as_ref(), "taken2", "https://old.example").await;

        let generator = Arc::new(ScriptedGenerator::new(&["taken1", "taken2", "fresh1"]));
        let service = LinkService::new(store.clone(), generator.clone(), CodePolicy::fixed(6, 5));

        let link = service.create("https://new.example").await.unwrap();

        assert_eq!(link.code, "fresh1");
        assert_eq!(generator.calls(), 3);
        // 已存在的链接不受影响
        let old = store.find_by_code("taken1").await.unwrap().unwrap();
        assert_eq!(old.original_url, "https://old.example");
    }

    #[tokio::test]
    async fn test_create_retries_on_store_conflict() {
        let inner = MemoryStore::new();
        seed(&inner, "raced1", "https://winner.example").await;
        let store = Arc::new(RacingStore {
            inner,
            races: AtomicU32::new(1),
        });

        let generator = Arc::new(ScriptedGenerator::new(&["raced1", "fresh2"]));
        let service = LinkService::new(store.clone(), generator.clone(), CodePolicy::fixed(6, 5));

        let link = service.create("https://loser.example").await.unwrap();

        assert_eq!(link.code, "fresh2");
        assert_eq!(generator.calls(), 2);
        let winner = store.find_by_code("raced1").await.unwrap().unwrap();
        assert_eq!(winner.original_url, "https://winner.example");
    }

    #[tokio::test]
    async fn test_create_widens_code_when_length_is_congested() {
        let store = Arc::new(MemoryStore::new());
        seed(store.as_ref(), "AA", "https://x.example").await;

        let policy = CodePolicy {
            length: 2,
            max_attempts: 3,
            max_length: 4,
        };
        let service = LinkService::new(store, Arc::new(ConstantGenerator), policy);

        let link = service.create("https://y.example").await.unwrap();
        assert_eq!(link.code, "AAA");
    }

    #[tokio::test]
    async fn test_create_reports_exhausted_code_space() {
        let store = Arc::new(MemoryStore::new());
        seed(store.as_ref(), "AA", "https://x.example").await;
        seed(store.as_ref(), "AAA", "https://x.example").await;

        let policy = CodePolicy {
            length: 2,
            max_attempts: 3,
            max_length: 3,
        };
        let service = LinkService::new(store.clone(), Arc::new(ConstantGenerator), policy);

        let err = service.create("https://y.example").await.unwrap_err();
        assert!(matches!(err, LinkscopeError::CodeSpaceExhausted(_)));
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_propagates_storage_errors() {
        let service = LinkService::new(
            Arc::new(BrokenStore),
            Arc::new(RandomCodeGenerator::seeded(3)),
            CodePolicy::default(),
        );

        let err = service.create("https://example.com").await.unwrap_err();
        assert!(err.is_storage_error());
    }
}

// =============================================================================
// Resolve Tests
// =============================================================================

#[cfg(test)]
mod resolve_tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_round_trip_records_click() {
        let (service, store) = memory_service();
        let created = service.create("https://example.com").await.unwrap();

        let before = Utc::now();
        let resolved = service
            .resolve(&created.code, browser_meta())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.original_url, "https://example.com");
        assert_eq!(resolved.id, created.id);

        let stats = store.find_by_code(&created.code).await.unwrap().unwrap();
        assert_eq!(stats.click_count(), 1);
        let click = &stats.clicks[0];
        assert!(click.clicked_at >= before);
        assert_eq!(click.client_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(click.referrer.as_deref(), Some("https://news.example.org/"));
        assert_eq!(click.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_resolve_adds_one_click_per_call() {
        let (service, store) = memory_service();
        let created = service.create("https://example.com").await.unwrap();

        for expected in 1..=3 {
            service
                .resolve(&created.code, ClientMeta::default())
                .await
                .unwrap();
            let stats = store.find_by_code(&created.code).await.unwrap().unwrap();
            assert_eq!(stats.click_count(), expected);
        }
    }

    #[tokio::test]
    async fn test_resolve_unknown_code_records_nothing() {
        let (service, store) = memory_service();
        service.create("https://example.com").await.unwrap();

        let result = service.resolve("nope00", browser_meta()).await.unwrap();

        assert!(result.is_none());
        assert_eq!(store.click_total(), 0);
    }

    #[tokio::test]
    async fn test_resolve_is_case_sensitive() {
        let store = Arc::new(MemoryStore::new());
        seed(store.as_ref(), "AbCdEf", "https://example.com").await;
        let service = LinkService::new(
            store.clone(),
            Arc::new(RandomCodeGenerator::new()),
            CodePolicy::default(),
        );

        assert!(service.resolve("abcdef", ClientMeta::default()).await.unwrap().is_none());
        assert!(service.resolve("AbCdEf", ClientMeta::default()).await.unwrap().is_some());
        assert_eq!(store.click_total(), 1);
    }

    #[tokio::test]
    async fn test_resolve_returns_link_without_new_click() {
        let (service, _store) = memory_service();
        let created = service.create("https://example.com").await.unwrap();

        let first = service
            .resolve(&created.code, ClientMeta::default())
            .await
            .unwrap()
            .unwrap();
        assert!(first.clicks.is_empty());

        let second = service
            .resolve(&created.code, ClientMeta::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.click_count(), 1);
    }

    #[tokio::test]
    async fn test_click_failure_does_not_change_result() {
        let store = Arc::new(FailingClickStore {
            inner: MemoryStore::new(),
        });
        seed(store.as_ref(), "abc123", "https://example.com").await;
        let service = LinkService::new(
            store,
            Arc::new(RandomCodeGenerator::new()),
            CodePolicy::default(),
        );

        let resolved = service.resolve("abc123", browser_meta()).await.unwrap();
        assert_eq!(resolved.unwrap().original_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let service = LinkService::new(
            Arc::new(BrokenStore),
            Arc::new(RandomCodeGenerator::new()),
            CodePolicy::default(),
        );

        let err = service
            .resolve("abc123", ClientMeta::default())
            .await
            .unwrap_err();
        assert!(err.is_storage_error());
    }

    #[tokio::test]
    async fn test_click_capture_drops_disabled_fields() {
        let store = Arc::new(MemoryStore::new());
        seed(store.as_ref(), "abc123", "https://example.com").await;
        let service = LinkService::new(
            store.clone(),
            Arc::new(RandomCodeGenerator::new()),
            CodePolicy::default(),
        )
        .with_click_capture(ClickCapture {
            address: false,
            referrer: true,
            user_agent: false,
        });

        service.resolve("abc123", browser_meta()).await.unwrap();

        let stats = store.find_by_code("abc123").await.unwrap().unwrap();
        let click = &stats.clicks[0];
        assert_eq!(click.client_address, None);
        assert_eq!(click.referrer.as_deref(), Some("https://news.example.org/"));
        assert_eq!(click.user_agent, None);
    }
}

// =============================================================================
// List / Stats Tests
// =============================================================================

#[cfg(test)]
mod stats_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_stats_never_records_clicks() {
        let (service, store) = memory_service();
        let created = service.create("https://example.com").await.unwrap();

        for _ in 0..3 {
            let stats = service.get_stats(&created.code).await.unwrap().unwrap();
            assert!(stats.clicks.is_empty());
        }
        assert_eq!(store.click_total(), 0);
        assert!(service.get_stats("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_returns_every_link_in_insertion_order() {
        let (service, _store) = memory_service();
        assert!(service.get_all().await.unwrap().is_empty());

        let a = service.create("https://a.example").await.unwrap();
        let b = service.create("https://b.example").await.unwrap();
        service.resolve(&b.code, ClientMeta::default()).await.unwrap();

        let all = service.get_all().await.unwrap();
        let codes: Vec<&str> = all.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec![a.code.as_str(), b.code.as_str()]);
        assert_eq!(all[1].click_count(), 1);
    }
}

// =============================================================================
// SQLite-backed Tests
// =============================================================================

#[cfg(test)]
mod sqlite_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_flow_on_sqlite() {
        let (service, _temp) = sqlite_service().await;

        let link = service.create("example.com").await.unwrap();
        assert_eq!(link.code.len(), 6);
        assert!(link.id > 0);

        let resolved = service
            .resolve(&link.code, browser_meta())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.original_url, "example.com");

        let stats = service.get_stats(&link.code).await.unwrap().unwrap();
        assert_eq!(stats.click_count(), 1);
        assert_eq!(
            stats.clicks[0].client_address.as_deref(),
            Some("203.0.113.7")
        );

        assert!(service.resolve("zzzzzz", browser_meta()).await.unwrap().is_none());
        let stats = service.get_stats(&link.code).await.unwrap().unwrap();
        assert_eq!(stats.click_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_unique() {
        let (service, _temp) = sqlite_service().await;
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for i in 0..20 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.create(&format!("https://c.example/{}", i)).await
            }));
        }

        let mut codes = std::collections::HashSet::new();
        for handle in handles {
            let link = handle.await.unwrap().unwrap();
            assert!(codes.insert(link.code));
        }
        assert_eq!(service.get_all().await.unwrap().len(), 20);
    }
}
