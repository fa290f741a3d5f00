use std::sync::Arc;

use mld_core::paths::PyramidPaths;
use mld_pyramid::{build, PyramidConfig};
use mld_query::{fetch, FetchRequest, QueryStrategy};
use mld_store::{InMemoryObjectStore, ObjectStore};

fn raw_csv(n: i64) -> String {
    (0..n)
        .flat_map(|i| {
            vec![
                format!("{},{:.2},power", i * 100, (i % 50) as f64),
                format!("{},{:.2},current", i * 100, (i % 10) as f64),
            ]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn fetch_returns_downsampled_channels_after_build() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
    store.put("power.csv", raw_csv(5000)).await.unwrap();

    let cfg = PyramidConfig::new(1000, 10, 50);
    build(store.clone(), "power.csv", cfg).await.unwrap();

    let req = FetchRequest {
        strategy: QueryStrategy::Max,
        number_records: 100,
        start: None,
        end: None,
    };
    let paths = PyramidPaths::default();
    let result = fetch(store.as_ref(), "power.csv", &req, &paths).await.unwrap();

    assert_eq!(result.channels.len(), 2);
    assert!(result.channels.iter().all(|c| c.data.len() <= 100));
    assert!(result.precision > 0.0);
}

#[tokio::test]
async fn fetch_before_preprocessing_reports_incomplete() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
    let req = FetchRequest {
        strategy: QueryStrategy::Avg,
        number_records: 10,
        start: None,
        end: None,
    };
    let paths = PyramidPaths::default();
    let err = fetch(store.as_ref(), "missing.csv", &req, &paths).await.unwrap_err();
    assert!(matches!(err, mld_query::QueryError::PreprocessIncomplete));
}

#[tokio::test]
async fn fetch_outside_range_returns_empty_without_error() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
    store.put("power.csv", raw_csv(5000)).await.unwrap();
    let cfg = PyramidConfig::new(1000, 10, 50);
    build(store.clone(), "power.csv", cfg).await.unwrap();

    let req = FetchRequest {
        strategy: QueryStrategy::Lttb,
        number_records: 10,
        start: Some(10_000_000),
        end: Some(20_000_000),
    };
    let paths = PyramidPaths::default();
    let result = fetch(store.as_ref(), "power.csv", &req, &paths).await.unwrap();
    assert!(result.channels.is_empty());
    assert_eq!(result.precision, 0.0);
}
