use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::application::ChatClient;
use crate::domain::{Delivery, DomainError, HistoryEntry, Outcome, SessionHandle, Turn};

/// Default interval at which consumers drain the relay.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How turns submitted to one relay are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// One task per turn. Replies are delivered in completion order, so
    /// concurrent turns may be answered out of submission order.
    #[default]
    Concurrent,
    /// A single worker sends turns one at a time in submission order.
    Serialized,
}

/// Moves turns onto a background dispatch path and outcomes back to a single
/// consumer through an unbounded FIFO channel.
///
/// The relay never touches the conversation log: callers record the returned
/// [`Turn`] themselves and apply each drained [`Delivery`].
///
/// Must be constructed and used from within a Tokio runtime.
pub struct TurnRelay {
    client: Arc<dyn ChatClient>,
    session: SessionHandle,
    mode: DispatchMode,
    deliveries_tx: mpsc::UnboundedSender<Delivery>,
    deliveries_rx: mpsc::UnboundedReceiver<Delivery>,
    /// Present only in serialized mode.
    serial_tx: Option<mpsc::UnboundedSender<Turn>>,
    next_seq: u64,
    in_flight: usize,
}

impl TurnRelay {
    pub fn new(client: Arc<dyn ChatClient>, session: SessionHandle, mode: DispatchMode) -> Self {
        let (deliveries_tx, deliveries_rx) = mpsc::unbounded_channel();

        let serial_tx = match mode {
            DispatchMode::Concurrent => None,
            DispatchMode::Serialized => {
                let (tx, rx) = mpsc::unbounded_channel();
                tokio::spawn(run_serial_worker(
                    client.clone(),
                    session.clone(),
                    rx,
                    deliveries_tx.clone(),
                ));
                Some(tx)
            }
        };

        Self {
            client,
            session,
            mode,
            deliveries_tx,
            deliveries_rx,
            serial_tx,
            next_seq: 0,
            in_flight: 0,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Turns dispatched whose outcome has not been drained yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Hand `text` to the dispatch path without waiting for the reply.
    ///
    /// Blank or whitespace-only input is ignored and yields `None`.
    pub fn submit(&mut self, text: &str) -> Option<Turn> {
        let turn = Turn::new(self.next_seq, text)?;
        self.next_seq += 1;
        self.in_flight += 1;

        debug!(seq = turn.seq(), mode = ?self.mode, "Dispatching turn");

        match &self.serial_tx {
            Some(serial_tx) => {
                if let Err(mpsc::error::SendError(turn)) = serial_tx.send(turn.clone()) {
                    // Worker gone: still honour one outcome per turn.
                    let delivery = Delivery::new(
                        turn.seq(),
                        Outcome::failure("dispatch worker is no longer running"),
                    );
                    let _ = self.deliveries_tx.send(delivery);
                }
            }
            None => {
                tokio::spawn(dispatch_and_deliver(
                    self.client.clone(),
                    self.session.clone(),
                    turn.clone(),
                    self.deliveries_tx.clone(),
                ));
            }
        }

        Some(turn)
    }

    /// Drain every delivery available right now, in FIFO order. Never blocks.
    pub fn try_drain(&mut self) -> Vec<Delivery> {
        let mut drained = Vec::new();
        while let Ok(delivery) = self.deliveries_rx.try_recv() {
            drained.push(delivery);
        }
        self.in_flight = self.in_flight.saturating_sub(drained.len());
        drained
    }

    /// Wait for the next delivery. Returns `None` when nothing is in flight.
    pub async fn recv(&mut self) -> Option<Delivery> {
        if self.in_flight == 0 {
            return None;
        }
        let delivery = self.deliveries_rx.recv().await?;
        self.in_flight -= 1;
        Some(delivery)
    }

    /// The provider's record of this relay's session.
    pub async fn history(&self) -> Result<Vec<HistoryEntry>, DomainError> {
        self.client
            .get_history(&self.session)
            .await
            .map_err(|e| match e {
                DomainError::HistoryRetrievalError(_) => e,
                other => DomainError::history(other.reason()),
            })
    }
}

async fn run_serial_worker(
    client: Arc<dyn ChatClient>,
    session: SessionHandle,
    mut turns: mpsc::UnboundedReceiver<Turn>,
    deliveries: mpsc::UnboundedSender<Delivery>,
) {
    while let Some(turn) = turns.recv().await {
        dispatch_and_deliver(client.clone(), session.clone(), turn, deliveries.clone()).await;
    }
    debug!("Serial dispatch worker stopped");
}

async fn dispatch_and_deliver(
    client: Arc<dyn ChatClient>,
    session: SessionHandle,
    turn: Turn,
    deliveries: mpsc::UnboundedSender<Delivery>,
) {
    let outcome = dispatch(client.as_ref(), &session, &turn).await;
    if deliveries.send(Delivery::new(turn.seq(), outcome)).is_err() {
        debug!(seq = turn.seq(), "Relay dropped before delivery");
    }
}

/// Exactly one send per turn; errors and panics both become a `Failure`.
async fn dispatch(client: &dyn ChatClient, session: &SessionHandle, turn: &Turn) -> Outcome {
    let call = AssertUnwindSafe(client.send(session, turn.text())).catch_unwind();
    match call.await {
        Ok(Ok(reply)) => Outcome::success(reply),
        Ok(Err(e)) => {
            warn!(seq = turn.seq(), "Turn failed: {e}");
            Outcome::failure(e.reason())
        }
        Err(_) => {
            warn!(seq = turn.seq(), "Turn dispatch panicked");
            Outcome::failure("dispatch task panicked")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockChatClient;

    async fn relay_with(client: MockChatClient, mode: DispatchMode) -> TurnRelay {
        let client: Arc<dyn ChatClient> = Arc::new(client);
        let session = client.create_session("mock-model").await.unwrap();
        TurnRelay::new(client, session, mode)
    }

    async fn drain_until(relay: &mut TurnRelay, count: usize) -> Vec<Delivery> {
        let mut all = Vec::new();
        while all.len() < count {
            all.extend(relay.try_drain());
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        all
    }

    #[tokio::test]
    async fn blank_submission_is_ignored() {
        let mut relay = relay_with(MockChatClient::new(), DispatchMode::Concurrent).await;

        assert!(relay.submit("   ").is_none());
        assert!(relay.submit("").is_none());
        assert_eq!(relay.in_flight(), 0);
        assert!(relay.recv().await.is_none());
    }

    #[tokio::test]
    async fn submit_returns_before_reply() {
        let client = MockChatClient::new().with_latency(Duration::from_millis(200));
        let mut relay = relay_with(client, DispatchMode::Concurrent).await;

        let turn = relay.submit("Hello").unwrap();
        assert_eq!(turn.text(), "Hello");
        assert!(relay.try_drain().is_empty());
        assert_eq!(relay.in_flight(), 1);

        let delivery = relay.recv().await.unwrap();
        assert_eq!(delivery.seq(), turn.seq());
        assert_eq!(delivery.outcome(), &Outcome::success("Echo: Hello"));
        assert_eq!(relay.in_flight(), 0);
    }

    #[tokio::test]
    async fn failure_becomes_outcome_and_relay_keeps_working() {
        let client = MockChatClient::new().with_failure("Hello", "upstream down");
        let mut relay = relay_with(client, DispatchMode::Concurrent).await;

        relay.submit("Hello");
        let first = relay.recv().await.unwrap();
        assert_eq!(first.outcome(), &Outcome::failure("upstream down"));

        relay.submit("again");
        let second = relay.recv().await.unwrap();
        assert!(second.outcome().is_success());
    }

    #[tokio::test]
    async fn serialized_mode_delivers_in_submission_order() {
        let client = MockChatClient::new()
            .with_reply_after("A", "reply-A", Duration::from_millis(80))
            .with_reply_after("B", "reply-B", Duration::from_millis(5));
        let mut relay = relay_with(client, DispatchMode::Serialized).await;

        relay.submit("A");
        relay.submit("B");

        let seqs: Vec<u64> = drain_until(&mut relay, 2).await.iter().map(Delivery::seq).collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[tokio::test]
    async fn history_reflects_completed_turns() {
        let mut relay = relay_with(MockChatClient::new(), DispatchMode::Concurrent).await;

        relay.submit("ping");
        relay.recv().await.unwrap();

        let history = relay.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role(), "user");
        assert_eq!(history[1].text(), "Echo: ping");
    }
}
