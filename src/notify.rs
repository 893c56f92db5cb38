//! Refresh notifications after a language switch.
//!
//! Each subscriber runs in isolation: an error or panic in one callback is
//! recorded and the remaining callbacks still run.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

/// A callback invoked after the active language changes.
pub type RefreshCallback = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// One subscriber that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberFailure {
    /// Position of the subscriber at dispatch time
    pub index: usize,
    pub message: String,
}

/// Outcome of a notification round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Subscribers that returned `Ok`
    pub delivered: usize,
    pub failures: Vec<SubscriberFailure>,
}

impl NotifyReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered list of refresh subscribers. Duplicates are allowed.
#[derive(Default)]
pub struct Notifier {
    subscribers: Mutex<Vec<RefreshCallback>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscriber.
    pub fn subscribe(&self, callback: RefreshCallback) {
        self.lock().push(callback);
    }

    /// Append a closure as a subscriber and return the handle that
    /// unsubscribes it.
    pub fn subscribe_fn<F>(&self, callback: F) -> RefreshCallback
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let callback: RefreshCallback = Arc::new(callback);
        self.subscribe(Arc::clone(&callback));
        callback
    }

    /// Remove the first entry that is the same callback as `callback`.
    ///
    /// Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, callback: &RefreshCallback) -> bool {
        let mut subscribers = self.lock();
        match subscribers
            .iter()
            .position(|existing| Arc::ptr_eq(existing, callback))
        {
            Some(index) => {
                subscribers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Invoke every subscriber in subscription order.
    ///
    /// The list is snapshotted first, so callbacks may subscribe or
    /// unsubscribe without affecting the current round.
    pub fn notify_all(&self) -> NotifyReport {
        let subscribers: Vec<RefreshCallback> = self.lock().clone();
        let mut report = NotifyReport::default();

        for (index, callback) in subscribers.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| callback())) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => report.failures.push(SubscriberFailure {
                    index,
                    message: format!("{:#}", e),
                }),
                Err(payload) => report.failures.push(SubscriberFailure {
                    index,
                    message: format!("panicked: {}", panic_message(payload.as_ref())),
                }),
            }
        }

        if !report.is_clean() {
            warn!(
                "{} of {} refresh subscribers failed: {:?}",
                report.failures.len(),
                subscribers.len(),
                report.failures
            );
        }

        report
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RefreshCallback>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
