//! Block feed
//!
//! Forwards new-head block numbers from a dedicated WS subscription into
//! a bounded channel. Back-pressure is drop-if-busy: when the evaluator
//! is still working on a cycle, the notification is dropped — each cycle
//! reads fresh chain state anyway, so a queued stale head has no value.

use ethers::prelude::*;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info};

/// At most one head in flight; newer heads are dropped until the
/// evaluator catches up.
const FEED_DEPTH: usize = 1;

pub struct BlockFeed {
    provider: Arc<Provider<Ws>>,
}

impl BlockFeed {
    pub fn new(provider: Arc<Provider<Ws>>) -> Self {
        Self { provider }
    }

    /// The channel pair connecting the feed to the evaluation loop.
    pub fn channel() -> (mpsc::Sender<u64>, mpsc::Receiver<u64>) {
        mpsc::channel(FEED_DEPTH)
    }

    /// Runs until the subscription ends or the receiver is dropped.
    pub async fn run(&self, tx: mpsc::Sender<u64>) {
        let mut stream = match self.provider.subscribe_blocks().await {
            Ok(stream) => stream,
            Err(e) => {
                error!("Failed to subscribe to new heads: {}", e);
                return;
            }
        };
        info!("WS head subscription active");

        while let Some(block) = stream.next().await {
            let number = match block.number {
                Some(n) => n.as_u64(),
                None => continue, // pending header without a number
            };
            debug!("New head: {}", number);

            match tx.try_send(number) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    debug!("Evaluator busy - dropping head {}", number);
                }
                Err(TrySendError::Closed(_)) => break,
            }
        }

        // Stream ended: the WS connection dropped. Exit so a supervisor
        // can restart the process.
        error!("WS head subscription ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feed_channel_drops_when_busy() {
        let (tx, mut rx) = BlockFeed::channel();

        // First head fits, second is dropped while the consumer is busy
        assert!(tx.try_send(100).is_ok());
        assert!(matches!(tx.try_send(101), Err(TrySendError::Full(101))));

        assert_eq!(rx.recv().await, Some(100));

        // Consumer caught up: the next head goes through again
        assert!(tx.try_send(102).is_ok());
        assert_eq!(rx.recv().await, Some(102));
    }

    #[tokio::test]
    async fn test_feed_channel_closed_receiver() {
        let (tx, rx) = BlockFeed::channel();
        drop(rx);
        assert!(matches!(tx.try_send(100), Err(TrySendError::Closed(100))));
    }
}
