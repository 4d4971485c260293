//! Collection Watcher
//!
//! Tails a MongoDB change stream and fans full-document snapshots out to
//! subscribers over a broadcast channel. Used for the admin order review
//! feed and per-user notification feeds.
//!
//! Live-feed semantics: no checkpointing, always starts from the current
//! position, reconnects with exponential backoff on stream errors.

use mongodb::{Client, Collection};
use mongodb::bson::{doc, Document};
use mongodb::options::{ChangeStreamOptions, FullDocumentType};
use futures::stream::StreamExt;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tokio::time::Duration;
use tracing::{info, warn, debug};
use std::marker::PhantomData;

/// Reconnection settings
const INITIAL_BACKOFF_MS: u64 = 5000;
const MAX_BACKOFF_MS: u64 = 60000;
const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Default broadcast channel capacity. Slow subscribers past this lag
/// lose intermediate snapshots, which is acceptable for a live feed.
const DEFAULT_CAPACITY: usize = 256;

pub struct CollectionWatcher<T> {
    client: Client,
    database: String,
    collection: String,
    sender: broadcast::Sender<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CollectionWatcher<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(client: Client, database: impl Into<String>, collection: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self {
            client,
            database: database.into(),
            collection: collection.into(),
            sender,
            _marker: PhantomData,
        }
    }

    /// Subscribe to live document snapshots
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    /// Run the watch loop until the process shuts down.
    ///
    /// Reconnects with exponential backoff on stream errors. Intended to be
    /// spawned as a background task.
    pub async fn run(&self) {
        let db = self.client.database(&self.database);
        let collection: Collection<Document> = db.collection(&self.collection);

        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let options = ChangeStreamOptions::builder()
                .full_document(Some(FullDocumentType::UpdateLookup))
                .build();

            let pipeline = vec![doc! {
                "$match": { "operationType": { "$in": ["insert", "update", "replace"] } }
            }];

            let stream_result = collection.watch().pipeline(pipeline).with_options(options).await;
            let mut stream = match stream_result {
                Ok(s) => {
                    backoff_ms = INITIAL_BACKOFF_MS;
                    info!("[watch:{}] Change stream opened", self.collection);
                    s
                }
                Err(e) => {
                    warn!(
                        "[watch:{}] Failed to open change stream, retrying in {}ms: {}",
                        self.collection, backoff_ms, e
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = next_backoff(backoff_ms);
                    continue;
                }
            };

            while let Some(event_result) = stream.next().await {
                match event_result {
                    Ok(event) => {
                        let Some(full_document) = event.full_document else {
                            continue;
                        };
                        match mongodb::bson::from_document::<T>(full_document) {
                            Ok(snapshot) => {
                                // Send fails only when no subscribers exist
                                let _ = self.sender.send(snapshot);
                            }
                            Err(e) => {
                                debug!(
                                    "[watch:{}] Skipping undeserializable document: {}",
                                    self.collection, e
                                );
                            }
                        }
                    }
                    Err(e) => {
                        warn!(
                            "[watch:{}] Change stream error, reconnecting in {}ms: {}",
                            self.collection, backoff_ms, e
                        );
                        break;
                    }
                }
            }

            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            backoff_ms = next_backoff(backoff_ms);
        }
    }
}

fn next_backoff(current_ms: u64) -> u64 {
    let next = (current_ms as f64 * BACKOFF_MULTIPLIER) as u64;
    next.min(MAX_BACKOFF_MS)
}

/// Convert a broadcast receiver into a stream, skipping lagged gaps.
pub fn into_stream<T: Clone + Send + 'static>(
    receiver: broadcast::Receiver<T>,
) -> impl futures::Stream<Item = T> {
    futures::stream::unfold(receiver, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(item) => return Some((item, rx)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Subscriber lagged, skipped {} snapshots", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_backoff_progression() {
        assert_eq!(next_backoff(5000), 10000);
        assert_eq!(next_backoff(40000), 60000);
        assert_eq!(next_backoff(60000), 60000);
    }

    #[tokio::test]
    async fn test_into_stream_forwards_items() {
        let (tx, rx) = broadcast::channel::<String>(8);
        let mut stream = Box::pin(into_stream(rx));

        tx.send("first".to_string()).unwrap();
        tx.send("second".to_string()).unwrap();

        assert_eq!(stream.next().await, Some("first".to_string()));
        assert_eq!(stream.next().await, Some("second".to_string()));

        drop(tx);
        assert_eq!(stream.next().await, None);
    }
}
