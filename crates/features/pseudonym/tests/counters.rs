use psn_domain::DomainId;
use psn_pseudonym::{CounterError, CounterStore, FileCounterStore, MemoryCounterStore};
use psn_storage::Storage;
use std::collections::BTreeSet;
use std::sync::Arc;

const TASKS: i64 = 64;

async fn hammer<C: CounterStore + 'static>(store: Arc<C>, domain: DomainId) -> BTreeSet<i64> {
    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.increment(domain, 100).await.unwrap() })
        })
        .collect();

    let mut seen = BTreeSet::new();
    for handle in handles {
        assert!(seen.insert(handle.await.unwrap()), "counter value handed out twice");
    }
    seen
}

async fn file_store(root: &std::path::Path) -> FileCounterStore {
    let storage = Storage::builder().root(root).connect().await.unwrap();
    FileCounterStore::new(&storage).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_increments_are_distinct() {
    let store = Arc::new(MemoryCounterStore::new());
    let seen = hammer(Arc::clone(&store), DomainId(1)).await;

    assert_eq!(seen, (101..=100 + TASKS).collect());
    assert_eq!(store.get(DomainId(1)).await.unwrap(), Some(100 + TASKS));
    assert_eq!(store.get(DomainId(2)).await.unwrap(), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn file_increments_are_distinct_and_durable() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Arc::new(file_store(tmp.path()).await);

    let seen = hammer(Arc::clone(&store), DomainId(7)).await;
    assert_eq!(seen, (101..=100 + TASKS).collect());

    let reopened = file_store(tmp.path()).await;
    assert_eq!(reopened.get(DomainId(7)).await.unwrap(), Some(100 + TASKS));
    assert_eq!(reopened.increment(DomainId(7), 0).await.unwrap(), 101 + TASKS);
    assert_eq!(reopened.domains().await.unwrap(), vec![DomainId(7)]);
}

#[tokio::test]
async fn set_remove_and_overflow() {
    let tmp = tempfile::tempdir().unwrap();
    let store = file_store(tmp.path()).await;

    store.set(DomainId(3), i64::MAX).await.unwrap();
    let err = store.increment(DomainId(3), 0).await.unwrap_err();
    assert!(matches!(err, CounterError::Overflow { domain: DomainId(3), .. }));
    assert_eq!(store.get(DomainId(3)).await.unwrap(), Some(i64::MAX));

    store.remove(DomainId(3)).await.unwrap();
    store.remove(DomainId(3)).await.unwrap();
    assert_eq!(store.get(DomainId(3)).await.unwrap(), None);

    let memory = MemoryCounterStore::new();
    memory.set(DomainId(3), i64::MAX).await.unwrap();
    assert!(memory.increment(DomainId(3), 0).await.is_err());
}

#[tokio::test]
async fn corrupt_counter_file_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let store = file_store(tmp.path()).await;
    store.set(DomainId(9), 1).await.unwrap();

    let path = tmp.path().join("counters").join("9");
    tokio::fs::write(&path, b"not a number").await.unwrap();

    let err = store.increment(DomainId(9), 0).await.unwrap_err();
    assert_eq!(err.kind(), "Corrupt");
}
