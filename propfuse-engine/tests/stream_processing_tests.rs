// Stream processing integration tests
//
// Verifies chunked consumption of an asynchronous record source: strictly
// sequential chunks, per-chunk completion callbacks, and the documented
// chunk-boundary limitation (fusion never spans chunks).

use propfuse_common::models::RawPropertyRecord;
use propfuse_engine::{BatchProcessor, StreamOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn record(street: &str, source_key: &str) -> RawPropertyRecord {
    RawPropertyRecord::new(street, source_key)
}

/// Capture engine tracing output in test runs (RUST_LOG controls verbosity)
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn stream_processes_async_source_in_chunks() {
    init_tracing();
    let processor = BatchProcessor::default();
    let options = StreamOptions {
        chunk_size: 3,
        ..Default::default()
    };

    // Lazy async source: records become available one at a time
    let records = async_stream::stream! {
        for i in 0..8 {
            tokio::task::yield_now().await;
            yield record(&format!("{} Market St", i + 1), "zillow");
        }
    };

    let fused = processor.stream_process(records, &options).await;

    // 8 distinct addresses: 3 + 3 + 2 across three chunks
    assert_eq!(fused.len(), 8);
}

#[tokio::test]
async fn chunk_callbacks_fire_in_order_and_enable_incremental_persistence() {
    init_tracing();
    let processor = BatchProcessor::default();
    let options = StreamOptions {
        chunk_size: 2,
        ..Default::default()
    };

    let records = async_stream::stream! {
        for i in 0..5 {
            yield record(&format!("{} Broad St", i + 1), "county-records");
        }
    };

    let persisted = Arc::new(AtomicUsize::new(0));
    let persisted_in_callback = Arc::clone(&persisted);
    let mut seen_indexes = Vec::new();

    let fused = processor
        .stream_process_with(records, &options, |index, chunk| {
            seen_indexes.push(index);
            let persisted = Arc::clone(&persisted_in_callback);
            async move {
                // Stand-in for an async upsert of this chunk's leads
                persisted.fetch_add(chunk.len(), Ordering::SeqCst);
                Ok(())
            }
        })
        .await
        .unwrap();

    assert_eq!(seen_indexes, vec![0, 1, 2]);
    assert_eq!(persisted.load(Ordering::SeqCst), 5);
    assert_eq!(fused.len(), 5);
}

// A property whose observations straddle a chunk boundary fuses twice.
// This is the documented scalability trade-off, not a crash: callers
// reconcile downstream by re-keying on the shared address hash.
#[tokio::test]
async fn same_property_across_chunk_boundary_yields_two_leads() {
    init_tracing();
    let processor = BatchProcessor::default();
    let options = StreamOptions {
        chunk_size: 2,
        ..Default::default()
    };

    let records = async_stream::stream! {
        yield record("1 Front St", "zillow");
        yield record("2 Side St", "zillow");
        // Second observation of 1 Front St lands in the next chunk
        yield record("1 Front St", "county-records");
    };

    let fused = processor.stream_process(records, &options).await;

    assert_eq!(fused.len(), 3);
    let front_st: Vec<_> = fused
        .iter()
        .filter(|l| l.address.street == "1 Front St")
        .collect();
    assert_eq!(front_st.len(), 2);
    assert_eq!(
        front_st[0].address_hash, front_st[1].address_hash,
        "both leads carry the same identity for downstream reconciliation"
    );
    assert_eq!(front_st[0].sources.len(), 1);
    assert_eq!(front_st[1].sources.len(), 1);
}
