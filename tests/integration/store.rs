//! Store scenarios: explicit dumps, ticker flushes, debouncing and teardown

use kfzf::error::KfzfResult;
use kfzf::resources::{K8sResource, ObjectMeta, Pod, ResourceType};
use kfzf::store::{load_snapshot, JsonCodec, SnapshotCodec, Store, StoreConfig, StoreState};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn pod_resource(name: &str, ns: &str, app: &str) -> K8sResource {
    Pod {
        metadata: ObjectMeta::namespaced(name, ns)
            .with_labels([("app", app)])
            .created_at(chrono::Utc::now()),
        ..Default::default()
    }
    .into()
}

async fn setup(period: Duration) -> (TempDir, StoreConfig, CancellationToken) {
    let temp = TempDir::new().unwrap();
    let config = StoreConfig::new("test", temp.path(), period);
    config.create_dest_dir().await.unwrap();
    (temp, config, CancellationToken::new())
}

async fn pod_store(period: Duration) -> (TempDir, CancellationToken, Store<K8sResource>) {
    let (temp, config, token) = setup(period).await;
    let store = Store::new(token.clone(), &config, ResourceType::Pod).unwrap();

    for pod in [
        pod_resource("Test1", "ns1", "app1"),
        pod_resource("Test2", "ns2", "app2"),
        pod_resource("Test3", "ns2", "app2"),
        pod_resource("Test4", "aaa", "app3"),
    ] {
        store.add_resource(pod).unwrap();
    }

    (temp, token, store)
}

async fn load_pods(path: PathBuf) -> BTreeMap<String, K8sResource> {
    load_snapshot(&JsonCodec, &path).await.unwrap()
}

#[tokio::test]
async fn dump_pod_full_state() {
    let (temp, _token, store) = pod_store(Duration::from_millis(500)).await;

    store.dump_full_state().await.unwrap();

    let pod_file = temp.path().join("test").join("pods");
    assert!(pod_file.exists());
    let pods = load_pods(pod_file).await;
    assert_eq!(pods.len(), 4);
    for key in ["ns1_Test1", "ns2_Test2", "ns2_Test3", "aaa_Test4"] {
        assert!(pods.contains_key(key), "missing {}", key);
    }
}

#[tokio::test]
async fn ticker_pod_dump_full_state() {
    let (temp, _token, store) = pod_store(Duration::from_millis(500)).await;
    let pod_file = temp.path().join("test").join("pods");

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(pod_file.exists());
    assert_eq!(load_pods(pod_file.clone()).await.len(), 4);
    assert!(!store.is_dump_required());

    store.add_resource(pod_resource("Test5", "ns1", "app1")).unwrap();
    assert!(store.is_dump_required());

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(!store.is_dump_required());
    let pods = load_pods(pod_file).await;
    assert_eq!(pods.len(), 5);
    assert!(pods.contains_key("ns1_Test5"));
}

#[tokio::test]
async fn burst_between_ticks_collapses_into_one_dump() {
    let (_temp, config, token) = setup(Duration::from_millis(300)).await;
    let store: Store<K8sResource> = Store::new(token, &config, ResourceType::Pod).unwrap();

    for i in 0..100 {
        store
            .add_resource(pod_resource(&format!("pod-{}", i), "burst", "app"))
            .unwrap();
    }

    tokio::time::sleep(Duration::from_millis(450)).await;
    assert_eq!(store.stats().dumps, 1);
    assert_eq!(load_pods(store.file_path().to_path_buf()).await.len(), 100);

    // Nothing changed, so later ticks stay quiet
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(store.stats().dumps, 1);
    assert!(store.stats().last_dump.is_some());
}

/// JSON codec that can be switched into failing mode
#[derive(Clone, Default)]
struct FlakyCodec {
    failing: Arc<AtomicBool>,
}

impl SnapshotCodec for FlakyCodec {
    fn encode<T: Serialize>(&self, entries: &BTreeMap<String, T>) -> KfzfResult<Vec<u8>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(kfzf::KfzfError::io(
                "encoding snapshot",
                std::io::Error::other("disk full"),
            ));
        }
        JsonCodec.encode(entries)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> KfzfResult<BTreeMap<String, T>> {
        JsonCodec.decode(bytes)
    }
}

#[tokio::test]
async fn failed_dump_is_retried_next_tick() {
    let (_temp, config, token) = setup(Duration::from_millis(100)).await;
    let codec = FlakyCodec::default();
    codec.failing.store(true, Ordering::SeqCst);
    let store = Store::with_codec(token, &config, ResourceType::Pod, codec.clone()).unwrap();

    store.add_resource(pod_resource("Test1", "ns1", "app1")).unwrap();

    tokio::time::sleep(Duration::from_millis(350)).await;
    let stats = store.stats();
    assert!(stats.failures >= 1);
    assert_eq!(stats.dumps, 0);
    assert!(stats.last_error.as_deref().unwrap().contains("encoding snapshot"));
    assert!(store.is_dump_required());
    assert!(!store.file_path().exists());

    codec.failing.store(false, Ordering::SeqCst);

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(!store.is_dump_required());
    assert_eq!(store.stats().dumps, 1);
    assert_eq!(load_pods(store.file_path().to_path_buf()).await.len(), 1);
}

#[tokio::test]
async fn explicit_dump_fails_without_crashing_store() {
    let (_temp, config, token) = setup(Duration::from_secs(60)).await;
    let codec = FlakyCodec::default();
    codec.failing.store(true, Ordering::SeqCst);
    let store = Store::with_codec(token, &config, ResourceType::Pod, codec).unwrap();
    store.add_resource(pod_resource("Test1", "ns1", "app1")).unwrap();

    let err = store.dump_full_state().await.unwrap_err();

    assert!(err.is_retryable());
    assert!(store.is_dump_required());
    assert_eq!(store.stats().failures, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ingestion_while_ticking() {
    let (_temp, config, token) = setup(Duration::from_millis(20)).await;
    let store: Arc<Store<K8sResource>> =
        Arc::new(Store::new(token, &config, ResourceType::Pod).unwrap());

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for i in 0..250 {
                    store
                        .add_resource(pod_resource(&format!("pod-{}", i), &format!("ns{}", w), "app"))
                        .unwrap();
                    if i % 50 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            })
        })
        .collect();

    for writer in writers {
        writer.await.unwrap();
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!store.is_dump_required());
    assert_eq!(load_pods(store.file_path().to_path_buf()).await.len(), 1000);
}

/// Codec whose encode always fails with a setup error
struct MisconfiguredCodec;

impl SnapshotCodec for MisconfiguredCodec {
    fn encode<T: Serialize>(&self, _entries: &BTreeMap<String, T>) -> KfzfResult<Vec<u8>> {
        Err(kfzf::KfzfError::DestDirMissing(PathBuf::from("/gone")))
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> KfzfResult<BTreeMap<String, T>> {
        JsonCodec.decode(bytes)
    }
}

#[tokio::test]
async fn non_retryable_failure_keeps_loop_running() {
    let (_temp, config, token) = setup(Duration::from_millis(50)).await;
    let store = Store::with_codec(token, &config, ResourceType::Pod, MisconfiguredCodec).unwrap();
    store.add_resource(pod_resource("Test1", "ns1", "app1")).unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;

    let stats = store.stats();
    assert!(stats.failures >= 2, "loop gave up after {} attempts", stats.failures);
    assert!(stats.last_error.as_deref().unwrap().contains("/gone"));
    assert!(store.is_dump_required());
    assert_eq!(store.state(), StoreState::Running);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn explicit_and_ticker_dumps_never_tear_the_file() {
    let (_temp, config, token) = setup(Duration::from_millis(1)).await;
    let store: Arc<Store<K8sResource>> =
        Arc::new(Store::new(token, &config, ResourceType::Pod).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let path = store.file_path().to_path_buf();
        let done = Arc::clone(&done);
        tokio::spawn(async move {
            let (mut good, mut bad) = (0u64, 0u64);
            while !done.load(Ordering::SeqCst) {
                if path.exists() {
                    match load_snapshot::<_, K8sResource>(&JsonCodec, &path).await {
                        Ok(_) => good += 1,
                        Err(_) => bad += 1,
                    }
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            (good, bad)
        })
    };

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for i in 0..300 {
                    store
                        .add_resource(pod_resource(&format!("pod-{}", i), &format!("ns{}", w), "app"))
                        .unwrap();
                    if i % 10 == 0 {
                        store.dump_full_state().await.unwrap();
                    }
                }
            })
        })
        .collect();

    for writer in writers {
        writer.await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    done.store(true, Ordering::SeqCst);

    let (good, bad) = reader.await.unwrap();
    assert_eq!(bad, 0, "{} of {} reads saw a torn file", bad, good + bad);
    assert!(good > 0);
    assert!(!store.is_dump_required());
    assert_eq!(store.stats().failures, 0);
    assert_eq!(load_pods(store.file_path().to_path_buf()).await.len(), 1200);
}

#[tokio::test]
async fn cancellation_stops_flushing() {
    let (_temp, token, store) = pod_store(Duration::from_millis(100)).await;

    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), store.stopped())
        .await
        .unwrap();
    assert_eq!(store.state(), StoreState::Stopped);

    store.add_resource(pod_resource("Late", "ns1", "app1")).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(store.is_dump_required());
    assert_eq!(store.stats().dumps, 0);
    assert!(!store.file_path().exists());

    // Explicit dumps still work after the loop stopped
    store.dump_full_state().await.unwrap();
    assert_eq!(load_pods(store.file_path().to_path_buf()).await.len(), 5);
}
