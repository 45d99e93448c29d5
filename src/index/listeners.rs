use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, join_all};
use tracing::warn;

use crate::model::task::Task;

pub type ListenerResult = Result<(), Box<dyn std::error::Error>>;

type Listener = Box<dyn Fn(Rc<Vec<Task>>) -> LocalBoxFuture<'static, ListenerResult>>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscribers to "index updated" notifications
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub fn subscribe<F, Fut>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(Rc<Vec<Task>>) -> Fut + 'static,
        Fut: Future<Output = ListenerResult> + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let boxed: Listener = Box::new(move |tasks| listener(tasks).boxed_local());
        self.listeners.push((id, boxed));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `tasks` to every listener concurrently.
    ///
    /// A listener that fails or panics is logged; the others still run and
    /// nothing is returned to the caller.
    pub async fn notify(&self, tasks: Rc<Vec<Task>>) {
        let deliveries = self.listeners.iter().map(|(id, listener)| {
            let tasks = tasks.clone();
            let delivery = async move { listener(tasks).await };
            async move {
                match AssertUnwindSafe(delivery).catch_unwind().await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(subscription = id.0, "index listener failed: {}", e),
                    Err(_) => warn!(subscription = id.0, "index listener panicked"),
                }
            }
        });
        join_all(deliveries).await;
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
