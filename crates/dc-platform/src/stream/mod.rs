//! Live Update Streams
//!
//! Change-stream watchers backing the SSE live feeds.

pub mod watcher;

pub use watcher::{CollectionWatcher, into_stream};
