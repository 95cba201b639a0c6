//! Bounded, fire-and-forget click recording.
//!
//! The redirect path hands clicks to a [`ClickRecorder`], which pushes them into a
//! bounded channel without waiting. [`run_click_worker`] drains the channel and runs at
//! most `concurrency` recordings at a time. When the queue is full the click is dropped
//! and counted; the redirect is never delayed.

use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc, mpsc::error::TrySendError};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::click_event::{ClickEvent, RequestContext};

/// Consumes click events taken off the queue.
///
/// Implementations must swallow their own failures: nothing is reported back to the
/// request that produced the click.
#[async_trait]
pub trait ClickProcessor: Send + Sync {
    async fn process(&self, event: ClickEvent);
}

/// Producer half of the click queue, cloned into every component that records clicks.
#[derive(Clone)]
pub struct ClickRecorder {
    sender: mpsc::Sender<ClickEvent>,
}

impl ClickRecorder {
    /// Creates a recorder and the receiver to hand to [`run_click_worker`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ClickEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Queues a click without blocking.
    ///
    /// Returns `false` if the click was dropped because the queue is full or closed.
    pub fn enqueue(&self, link_id: Uuid, slug: &str, context: RequestContext) -> bool {
        let event = ClickEvent::new(link_id, slug, context);

        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!("Click queue full, dropping click for {}", event.slug);
                counter!("clicks_dropped_total", "reason" => "queue_full").increment(1);
                false
            }
            Err(TrySendError::Closed(event)) => {
                warn!("Click queue closed, dropping click for {}", event.slug);
                counter!("clicks_dropped_total", "reason" => "queue_closed").increment(1);
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots left in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

/// Drains the click queue until every [`ClickRecorder`] has been dropped.
///
/// Each event is processed on its own task; a semaphore caps the number of tasks in
/// flight at `concurrency`. Once the channel closes, the worker waits for in-flight
/// recordings before returning, so awaiting the returned future drains the queue.
pub async fn run_click_worker(
    mut receiver: mpsc::Receiver<ClickEvent>,
    processor: Arc<dyn ClickProcessor>,
    concurrency: usize,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    info!("Click worker started (concurrency: {})", concurrency);

    while let Some(event) = receiver.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };

        let processor = processor.clone();
        tasks.spawn(async move {
            processor.process(event).await;
            drop(permit);
        });

        while let Some(finished) = tasks.try_join_next() {
            if let Err(e) = finished {
                warn!("Click task panicked: {}", e);
            }
        }
    }

    debug!("Click queue closed, waiting for {} in-flight clicks", tasks.len());

    while let Some(finished) = tasks.join_next().await {
        if let Err(e) = finished {
            warn!("Click task panicked: {}", e);
        }
    }

    info!("Click worker stopped");
}
