//! Integration tests for catalog load precedence
//!
//! Tests cover:
//! - Remote non-empty list shadows fallback and cache, and overwrites cache
//! - Fallback wins when remote is empty, failing or too slow
//! - Cache is used unchanged when both network sources are non-authoritative
//! - Reads are strictly sequential (fallback never starts before remote ends)

use async_trait::async_trait;
use reel_common::sources::{parse_document, BundledFallback, RemoteCredentials, RemoteStore};
use reel_common::storage::{KeyValueStore, MemoryStore, CATALOG_BACKUP_KEY, CATALOG_KEY};
use reel_common::{CatalogEvent, CatalogStore, Error, EventBus, LoadSource, Result, VideoInput, VideoRecord};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted behaviour of a fake source
#[derive(Clone)]
enum Script {
    Returns(Vec<VideoRecord>),
    /// Raw body decoded the way the HTTP and file sources decode it
    Document(&'static str),
    Fails,
    Malformed,
    Hangs,
}

type CallLog = Arc<Mutex<Vec<String>>>;

struct FakeSource {
    name: &'static str,
    script: Script,
    log: CallLog,
}

impl FakeSource {
    async fn run(&self) -> Result<Vec<VideoRecord>> {
        self.log.lock().unwrap().push(format!("{}:start", self.name));
        // Yield so an overlapping read would interleave in the log
        tokio::task::yield_now().await;
        let result = match &self.script {
            Script::Returns(videos) => Ok(videos.clone()),
            Script::Document(body) => parse_document(body),
            Script::Fails => Err(Error::Network(format!("{} unreachable", self.name))),
            Script::Malformed => Err(Error::Parse(format!("{} is not JSON", self.name))),
            Script::Hangs => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(vec![video("late")])
            }
        };
        self.log.lock().unwrap().push(format!("{}:end", self.name));
        result
    }
}

#[async_trait]
impl RemoteStore for FakeSource {
    async fn fetch(&self) -> Result<Vec<VideoRecord>> {
        self.run().await
    }

    async fn write(&self, _credentials: &RemoteCredentials, _document: &str) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl BundledFallback for FakeSource {
    async fn fetch(&self) -> Result<Vec<VideoRecord>> {
        self.run().await
    }
}

fn video(id: &str) -> VideoRecord {
    VideoRecord::from_input(&VideoInput::with_id(id).name(format!("Video {}", id)), 1_700_000_000_000)
}

fn cached(cache: &MemoryStore) -> Vec<VideoRecord> {
    cache
        .get(CATALOG_KEY)
        .unwrap()
        .map(|raw| serde_json::from_str(&raw).unwrap())
        .unwrap_or_default()
}

struct Harness {
    store: CatalogStore,
    cache: Arc<MemoryStore>,
    log: CallLog,
    events: EventBus,
}

fn harness(remote: Script, fallback: Script, prior_cache: Option<Vec<VideoRecord>>) -> Harness {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let cache = Arc::new(MemoryStore::new());
    if let Some(prior) = prior_cache {
        cache
            .set(CATALOG_KEY, &serde_json::to_string(&prior).unwrap())
            .unwrap();
    }
    let events = EventBus::new(16);

    let store = CatalogStore::new(
        cache.clone(),
        Arc::new(FakeSource { name: "remote", script: remote, log: log.clone() }),
        Arc::new(FakeSource { name: "fallback", script: fallback, log: log.clone() }),
        events.clone(),
    )
    .with_io_timeout(Duration::from_millis(100));

    Harness { store, cache, log, events }
}

// =============================================================================
// Remote wins
// =============================================================================

#[tokio::test]
async fn test_remote_non_empty_becomes_catalog_and_overwrites_cache() {
    let remote = vec![video("r1")];
    let mut h = harness(
        Script::Returns(remote.clone()),
        Script::Returns(vec![video("f1")]),
        Some(vec![video("old")]),
    );

    let loaded = h.store.load().await.to_vec();

    assert_eq!(loaded, remote);
    assert_eq!(cached(&h.cache), remote);
    assert_eq!(h.store.load_source(), Some(LoadSource::Remote));
}

#[tokio::test]
async fn test_remote_win_never_touches_fallback() {
    let mut h = harness(Script::Returns(vec![video("r1")]), Script::Returns(vec![video("f1")]), None);

    h.store.load().await;

    let log = h.log.lock().unwrap().clone();
    assert_eq!(log, vec!["remote:start", "remote:end"]);
}

// =============================================================================
// Fallback wins
// =============================================================================

#[tokio::test]
async fn test_fallback_wins_when_remote_empty() {
    let fallback = vec![video("f1"), video("f2")];
    let mut h = harness(Script::Returns(vec![]), Script::Returns(fallback.clone()), Some(vec![video("old")]));

    assert_eq!(h.store.load().await.to_vec(), fallback);
    assert_eq!(cached(&h.cache), fallback);
    assert_eq!(h.store.load_source(), Some(LoadSource::Fallback));
}

#[tokio::test]
async fn test_fallback_wins_when_remote_fails_or_is_malformed() {
    for failure in [Script::Fails, Script::Malformed] {
        let fallback = vec![video("f1")];
        let mut h = harness(failure, Script::Returns(fallback.clone()), None);

        assert_eq!(h.store.load().await.to_vec(), fallback);
        assert_eq!(h.store.load_source(), Some(LoadSource::Fallback));
    }
}

#[tokio::test]
async fn test_remote_timeout_falls_through_to_fallback() {
    let fallback = vec![video("f1")];
    let mut h = harness(Script::Hangs, Script::Returns(fallback.clone()), None);

    assert_eq!(h.store.load().await.to_vec(), fallback);
    // The hung remote never completed
    let log = h.log.lock().unwrap().clone();
    assert_eq!(log, vec!["remote:start", "fallback:start", "fallback:end"]);
}

#[tokio::test]
async fn test_reads_are_sequential() {
    let mut h = harness(Script::Fails, Script::Fails, None);

    h.store.load().await;

    let log = h.log.lock().unwrap().clone();
    assert_eq!(log, vec!["remote:start", "remote:end", "fallback:start", "fallback:end"]);
}

// =============================================================================
// Cache wins
// =============================================================================

#[tokio::test]
async fn test_cache_used_unchanged_when_both_sources_non_authoritative() {
    let prior = vec![video("c1"), video("c2")];
    let prior_raw = serde_json::to_string(&prior).unwrap();
    let mut h = harness(Script::Returns(vec![]), Script::Fails, Some(prior.clone()));

    assert_eq!(h.store.load().await.to_vec(), prior);
    assert_eq!(h.store.load_source(), Some(LoadSource::Cache));
    // Not rewritten
    assert_eq!(h.cache.get(CATALOG_KEY).unwrap(), Some(prior_raw));
}

#[tokio::test]
async fn test_empty_everything_gives_empty_catalog() {
    let mut h = harness(Script::Fails, Script::Returns(vec![]), None);

    assert!(h.store.load().await.is_empty());
    assert_eq!(h.store.load_source(), Some(LoadSource::Cache));
    assert_eq!(h.cache.get(CATALOG_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_corrupt_cache_counts_as_empty() {
    let mut h = harness(Script::Fails, Script::Fails, None);
    h.cache.set(CATALOG_KEY, "{oops").unwrap();

    assert!(h.store.load().await.is_empty());
    // Kept aside before anything can overwrite it
    assert_eq!(h.cache.get(CATALOG_BACKUP_KEY).unwrap(), Some("{oops".to_string()));
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_load_emits_catalog_changed_newest_first() {
    let mut h = harness(
        Script::Returns(vec![video("A"), video("B"), video("C")]),
        Script::Fails,
        None,
    );
    let mut rx = h.events.subscribe();

    h.store.load().await;

    match rx.try_recv().expect("load should notify") {
        CatalogEvent::CatalogChanged { videos, .. } => {
            let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
            assert_eq!(ids, vec!["C", "B", "A"]);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_loaded_duplicates_are_trusted() {
    // Uniqueness is enforced on add only
    let mut h = harness(Script::Returns(vec![video("dup"), video("dup")]), Script::Fails, None);

    assert_eq!(h.store.load().await.len(), 2);
    assert!(matches!(
        h.store.add(&VideoInput::with_id("dup")),
        Err(Error::Duplicate(_))
    ));
}

// =============================================================================
// Unusual but well-formed documents
// =============================================================================

/// Older or hand-edited documents: `null` fields and a float timestamp
const LOOSE_DOCUMENT: &str = r#"[
    {"id":"r1","name":"Ok","timestamp":1700000000000},
    {"id":"r2","name":null,"category":null,"role":null,"description":null,"timestamp":1700000000001.0}
]"#;

fn assert_loose_records(videos: &[VideoRecord]) {
    let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["r1", "r2"]);
    assert_eq!(videos[1].name, "Untitled Video");
    assert_eq!(videos[1].category, "Custom Video");
    assert_eq!(videos[1].role, "Motion Designer");
    assert_eq!(videos[1].description, "");
    assert_eq!(videos[1].timestamp, 1_700_000_000_001);
}

#[tokio::test]
async fn test_remote_with_null_fields_and_float_timestamp_wins() {
    let mut h = harness(
        Script::Document(LOOSE_DOCUMENT),
        Script::Returns(vec![video("f1")]),
        Some(vec![video("old")]),
    );

    assert_loose_records(h.store.load().await);
    assert_eq!(h.store.load_source(), Some(LoadSource::Remote));
    assert_loose_records(&cached(&h.cache));
}

#[tokio::test]
async fn test_fallback_with_null_fields_and_float_timestamp_wins() {
    let mut h = harness(Script::Fails, Script::Document(LOOSE_DOCUMENT), Some(vec![video("old")]));

    assert_loose_records(h.store.load().await);
    assert_eq!(h.store.load_source(), Some(LoadSource::Fallback));
    assert_loose_records(&cached(&h.cache));
}

#[tokio::test]
async fn test_cache_with_null_fields_survives_next_mutation() {
    let mut h = harness(Script::Fails, Script::Fails, None);
    h.cache
        .set(
            CATALOG_KEY,
            r#"[{"id":"keep-me","name":"Kept","category":"Reel","role":"Editor","description":null,"timestamp":1.5e12}]"#,
        )
        .unwrap();

    let loaded = h.store.load().await.to_vec();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].timestamp, 1_500_000_000_000);
    assert_eq!(h.store.load_source(), Some(LoadSource::Cache));

    h.store.add(&VideoInput::with_id("new")).unwrap();

    let ids: Vec<String> = cached(&h.cache).into_iter().map(|v| v.id).collect();
    assert_eq!(ids, vec!["keep-me", "new"]);
    assert_eq!(h.cache.get(CATALOG_BACKUP_KEY).unwrap(), None);
}
