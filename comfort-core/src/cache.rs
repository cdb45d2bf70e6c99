//! Single-generation snapshot cache with replay-last-value fan-out.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::model::WeatherSnapshot;

/// One generation of the city list. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SnapshotCollection {
    generation: u64,
    snapshots: Arc<[WeatherSnapshot]>,
}

impl SnapshotCollection {
    fn empty() -> Self {
        Self {
            generation: 0,
            snapshots: Arc::from(Vec::new()),
        }
    }

    /// 0 for the empty collection held before the first publish.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshots(&self) -> &[WeatherSnapshot] {
        &self.snapshots
    }

    pub fn shared(&self) -> Arc<[WeatherSnapshot]> {
        Arc::clone(&self.snapshots)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[derive(Debug)]
struct Inner {
    current: SnapshotCollection,
    subscribers: Vec<mpsc::UnboundedSender<SnapshotCollection>>,
}

/// Holds the most recent city list and republishes it to subscribers.
///
/// Clones share the same underlying state.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    inner: Arc<Mutex<Inner>>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                current: SnapshotCollection::empty(),
                subscribers: Vec::new(),
            })),
        }
    }

    /// Replace the held collection and notify every live subscriber.
    pub fn publish(&self, snapshots: Vec<WeatherSnapshot>) -> SnapshotCollection {
        let mut inner = self.inner.lock();

        let collection = SnapshotCollection {
            generation: inner.current.generation + 1,
            snapshots: Arc::from(snapshots),
        };
        inner.current = collection.clone();
        inner
            .subscribers
            .retain(|tx| tx.send(collection.clone()).is_ok());

        tracing::debug!(
            generation = collection.generation,
            cities = collection.len(),
            subscribers = inner.subscribers.len(),
            "published snapshot collection"
        );

        collection
    }

    pub fn current(&self) -> SnapshotCollection {
        self.inner.lock().current.clone()
    }

    /// Subscribe to the cache. The current collection is delivered first.
    pub fn subscribe(&self) -> SnapshotSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();

        // Receiver is alive, so this cannot fail.
        let _ = tx.send(inner.current.clone());
        inner.subscribers.push(tx);

        SnapshotSubscription { rx }
    }

    /// Number of subscriptions that have not been dropped, as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.subscribers.retain(|tx| !tx.is_closed());
        inner.subscribers.len()
    }
}

/// Stream of collections from a [`SnapshotCache`]. Dropping it detaches.
#[derive(Debug)]
pub struct SnapshotSubscription {
    rx: mpsc::UnboundedReceiver<SnapshotCollection>,
}

impl SnapshotSubscription {
    /// Wait for the next collection. Returns `None` once the cache is gone.
    pub async fn next(&mut self) -> Option<SnapshotCollection> {
        self.rx.recv().await
    }

    /// Next collection if one is already queued.
    pub fn try_next(&mut self) -> Option<SnapshotCollection> {
        self.rx.try_recv().ok()
    }
}
