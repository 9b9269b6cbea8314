//! Batch and stream orchestration
//!
//! Runs deduplication and fusion across large incoming batches or
//! continuous streams in bounded-size chunks, optionally enhancing records
//! with an authoritative data source keyed by address signature.
//!
//! Enhancement runs *before* batch-level deduplication so grouped records
//! already carry authoritative values. Stream processing is strictly
//! sequential: each chunk's fusion and completion callback are awaited
//! before the next chunk is pulled, bounding memory to one chunk of raw
//! records plus the accumulated output. Fusion never spans chunk
//! boundaries: a property whose records straddle two chunks fuses twice
//! into two leads sharing one address hash, which callers reconcile
//! downstream (e.g. a second dedup pass over re-collected records).

use futures::{pin_mut, Future, Stream, StreamExt};
use propfuse_common::config::{EngineConfig, DEFAULT_CHUNK_SIZE};
use propfuse_common::models::{AuthoritativePayload, FusedLeadRecord, RawPropertyRecord};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::fusion::LeadFuser;
use crate::services::deduplicator::Deduplicator;
use crate::services::normalizer;

/// Error type accepted from chunk-completion callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stream processing stopped because a chunk-completion callback failed
///
/// Callback errors are neither swallowed nor retried; the fused records
/// computed before the abort (current chunk included) ride along so no
/// output is discarded.
#[derive(Debug, Error)]
#[error("stream processing aborted at chunk {chunk_index}: {source}")]
pub struct StreamAborted {
    pub chunk_index: usize,
    /// Fused output accumulated up to and including the failing chunk
    pub fused: Vec<FusedLeadRecord>,
    #[source]
    pub source: BoxError,
}

/// Batch processing options
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Authoritative payloads keyed by address hash
    pub authoritative: HashMap<String, AuthoritativePayload>,
    /// Run the deduplicator over the (possibly enhanced) record set
    pub deduplicate: bool,
    /// Enhance matching records with their authoritative payload before
    /// deduplication; `None` enables enhancement whenever payloads were
    /// supplied
    pub enhance_with_authoritative: Option<bool>,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self {
            authoritative: HashMap::new(),
            deduplicate: true,
            enhance_with_authoritative: None,
        }
    }

    fn enhancement_enabled(&self) -> bool {
        self.enhance_with_authoritative
            .unwrap_or(!self.authoritative.is_empty())
            && !self.authoritative.is_empty()
    }
}

/// Stream processing options
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Records per chunk (minimum 1)
    pub chunk_size: usize,
    pub batch: BatchOptions,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            batch: BatchOptions::new(),
        }
    }
}

/// Batch/Stream Processor
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    fuser: LeadFuser,
    dedup: Deduplicator,
}

impl BatchProcessor {
    pub fn new(fuser: LeadFuser) -> Self {
        Self {
            dedup: Deduplicator::new(fuser.clone()),
            fuser,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(LeadFuser::from_config(config))
    }

    /// Process one batch: fill missing hashes, optionally enhance with
    /// authoritative payloads, optionally deduplicate
    ///
    /// With deduplication disabled, every record is still wrapped as a
    /// fused lead so downstream consumers see a uniform shape; enhanced
    /// leads are returned directly in that mode, preserving
    /// authoritative-only fields that have no raw-record equivalent.
    pub fn process_batch(
        &self,
        mut records: Vec<RawPropertyRecord>,
        options: &BatchOptions,
    ) -> Vec<FusedLeadRecord> {
        for record in &mut records {
            normalizer::ensure_address_hash(record);
        }

        let input_count = records.len();
        let enhance = options.enhancement_enabled();
        let mut enhanced_count = 0usize;

        let fused = if options.deduplicate {
            let records: Vec<RawPropertyRecord> = if enhance {
                records
                    .into_iter()
                    .map(|record| {
                        match self.payload_for(&record, options) {
                            Some(payload) => {
                                enhanced_count += 1;
                                // Fold the enhanced lead back into a raw
                                // record so hash grouping can see it
                                self.fuser
                                    .fuse(Some(payload), std::slice::from_ref(&record))
                                    .into_raw()
                            }
                            None => record,
                        }
                    })
                    .collect()
            } else {
                records
            };
            self.dedup.deduplicate(records)
        } else {
            records
                .iter()
                .map(|record| {
                    let payload = if enhance {
                        self.payload_for(record, options)
                    } else {
                        None
                    };
                    if payload.is_some() {
                        enhanced_count += 1;
                    }
                    self.fuser.fuse(payload, std::slice::from_ref(record))
                })
                .collect()
        };

        debug!(
            input_count,
            enhanced = enhanced_count,
            deduplicated = options.deduplicate,
            fused = fused.len(),
            "Batch processed"
        );
        fused
    }

    /// Consume a record stream in fixed-size chunks
    ///
    /// Each chunk runs through [`Self::process_batch`] independently; the
    /// trailing partial chunk is processed too. Returns the concatenation
    /// of every chunk's fused output.
    pub async fn stream_process<S>(
        &self,
        records: S,
        options: &StreamOptions,
    ) -> Vec<FusedLeadRecord>
    where
        S: Stream<Item = RawPropertyRecord>,
    {
        let result = self
            .stream_process_with(records, options, |_, _| {
                std::future::ready(Ok::<(), BoxError>(()))
            })
            .await;
        match result {
            Ok(fused) => fused,
            // The no-op callback cannot fail
            Err(aborted) => aborted.fused,
        }
    }

    /// Like [`Self::stream_process`], invoking `on_chunk_complete` with
    /// each chunk's fused output as soon as the chunk finishes
    ///
    /// The callback enables incremental persistence; it is awaited before
    /// the next chunk is pulled. A callback failure stops the stream and
    /// returns [`StreamAborted`] carrying everything fused so far.
    pub async fn stream_process_with<S, F, Fut>(
        &self,
        records: S,
        options: &StreamOptions,
        mut on_chunk_complete: F,
    ) -> Result<Vec<FusedLeadRecord>, StreamAborted>
    where
        S: Stream<Item = RawPropertyRecord>,
        F: FnMut(usize, Vec<FusedLeadRecord>) -> Fut,
        Fut: Future<Output = Result<(), BoxError>>,
    {
        let chunk_size = options.chunk_size.max(1);
        let chunked = records.chunks(chunk_size);
        pin_mut!(chunked);

        let mut fused_all: Vec<FusedLeadRecord> = Vec::new();
        let mut chunk_index = 0usize;

        while let Some(chunk) = chunked.next().await {
            let record_count = chunk.len();
            let fused = self.process_batch(chunk, &options.batch);
            debug!(
                chunk_index,
                records = record_count,
                fused = fused.len(),
                "Chunk processed"
            );

            let for_callback = fused.clone();
            fused_all.extend(fused);

            if let Err(source) = on_chunk_complete(chunk_index, for_callback).await {
                return Err(StreamAborted {
                    chunk_index,
                    fused: fused_all,
                    source,
                });
            }
            chunk_index += 1;
        }

        info!(
            chunks = chunk_index,
            fused = fused_all.len(),
            "Stream processing complete"
        );
        Ok(fused_all)
    }

    fn payload_for<'a>(
        &self,
        record: &RawPropertyRecord,
        options: &'a BatchOptions,
    ) -> Option<&'a AuthoritativePayload> {
        record
            .address_hash
            .as_ref()
            .and_then(|hash| options.authoritative.get(hash))
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(LeadFuser::default())
    }
}
