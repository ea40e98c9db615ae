//! A single-owner event loop.
//!
//! The state lives inside one task, and is only ever mutated by the events
//! that task processes, one at a time. Work that has to wait (network calls)
//! is spawned separately and reports back by sending another event.

use std::fmt::Debug;

use tokio::sync::mpsc;
use tracing::Instrument;

/// An event that the loop applies to its state.
pub(crate) trait Event<S>: Send + Debug + 'static {
    /// Handles the event with mutable access to the state.
    fn apply(self: Box<Self>, state: &mut S, handle: &Handle<S>);
}

/// The loop was gone before the event could be delivered.
#[derive(Debug)]
pub(crate) struct LoopClosed;

/// Handle to an event loop. The loop stops once every handle is dropped.
pub(crate) struct Handle<S> {
    tx: mpsc::UnboundedSender<Box<dyn Event<S>>>,
}

impl<S: Send + 'static> Handle<S> {
    /// Spawns the loop on the current tokio runtime.
    pub(crate) fn spawn(state: S, label: &'static str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let weak_tx = tx.downgrade();
        tokio::spawn(
            run(state, weak_tx, rx).instrument(trace_span!("event loop", label)),
        );
        Self { tx }
    }

    /// Sends an event to the loop.
    #[inline]
    pub(crate) fn send<E: Event<S>>(&self, event: E) -> Result<(), LoopClosed> {
        self.tx.send(Box::new(event)).map_err(|_| LoopClosed)
    }
}

impl<S> Clone for Handle<S> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

async fn run<S: Send + 'static>(
    mut state: S,
    weak_tx: mpsc::WeakUnboundedSender<Box<dyn Event<S>>>,
    mut rx: mpsc::UnboundedReceiver<Box<dyn Event<S>>>,
) {
    debug!("started");
    while let Some(event) = rx.recv().await {
        trace!("received event: {event:?}");
        let Some(tx) = weak_tx.upgrade() else {
            warn!("last handle has been dropped, discard the event");
            break;
        };
        event.apply(&mut state, &Handle { tx });
    }
    debug!("will terminate");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::oneshot;
    use tokio::time::timeout;

    use super::*;

    #[derive(Debug)]
    struct Add(u32);

    impl Event<u32> for Add {
        fn apply(self: Box<Self>, state: &mut u32, _handle: &Handle<u32>) {
            *state += self.0;
        }
    }

    #[derive(Debug)]
    struct AddLater(u32);

    impl Event<u32> for AddLater {
        fn apply(self: Box<Self>, _state: &mut u32, handle: &Handle<u32>) {
            let handle = handle.clone();
            let value = self.0;
            tokio::spawn(async move {
                handle.send(Add(value)).ok();
            });
        }
    }

    #[derive(Debug)]
    struct Get(oneshot::Sender<u32>);

    impl Event<u32> for Get {
        fn apply(self: Box<Self>, state: &mut u32, _handle: &Handle<u32>) {
            self.0.send(*state).ok();
        }
    }

    async fn get(handle: &Handle<u32>) -> u32 {
        let (tx, rx) = oneshot::channel();
        handle.send(Get(tx)).unwrap();
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn test_events_apply_in_order() {
        let handle = Handle::spawn(0u32, "test");
        handle.send(Add(40)).unwrap();
        handle.send(Add(2)).unwrap();
        assert_eq!(get(&handle).await, 42);
    }

    #[tokio::test]
    async fn test_spawned_work_reports_back() {
        let handle = Handle::spawn(1u32, "test");
        handle.send(AddLater(9)).unwrap();
        let wait = async {
            while get(&handle).await != 10 {
                tokio::task::yield_now().await;
            }
        };
        timeout(Duration::from_millis(500), wait).await.unwrap();
    }
}
