use tokio::sync::mpsc;

/// Producer half of an unbounded, cancellable FIFO.
///
/// `push` never blocks and never fails from the producer's point of view;
/// values pushed after the queue has been cancelled are silently discarded by
/// the consumer. Cloning the handle gives multiple producers whose pushes
/// interleave in arrival order.
///
/// There is no capacity bound: a slow consumer grows the queue instead of
/// applying backpressure. Acceptable for per-session audio/event volumes, but
/// a known resource-exhaustion risk if a consumer stalls entirely.
pub struct EventQueue<T> {
    tx: mpsc::UnboundedSender<Item<T>>,
}

/// Consumer half. Single consumer only.
pub struct EventStream<T> {
    rx: mpsc::UnboundedReceiver<Item<T>>,
    done: bool,
}

enum Item<T> {
    Value(T),
    Done,
}

/// Create a connected queue/stream pair.
pub fn channel<T>() -> (EventQueue<T>, EventStream<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventQueue { tx }, EventStream { rx, done: false })
}

impl<T> EventQueue<T> {
    /// Enqueue a value. Non-blocking; a no-op once the stream is gone.
    pub fn push(&self, value: T) {
        let _ = self.tx.send(Item::Value(value));
    }

    /// Permanently close the queue. Pending and future `next()` calls on the
    /// stream resolve to `None`; values pushed afterwards are dropped.
    pub fn cancel(&self) {
        let _ = self.tx.send(Item::Done);
    }
}

// Manual impl so T does not need to be Clone.
impl<T> Clone for EventQueue<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> EventStream<T> {
    /// Await the next value in FIFO order. Resolves to `None` once the queue
    /// has been cancelled or every producer handle has been dropped, and keeps
    /// resolving to `None` from then on.
    pub async fn next(&mut self) -> Option<T> {
        if self.done {
            return None;
        }

        match self.rx.recv().await {
            Some(Item::Value(value)) => Some(value),
            Some(Item::Done) | None => {
                self.done = true;
                self.rx.close();
                None
            }
        }
    }
}
