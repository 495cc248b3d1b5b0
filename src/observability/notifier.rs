use anyhow::Result;
use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::value_objects::enums::notification_durations::NotificationDuration;

#[derive(Clone, Debug, PartialEq)]
pub struct UserNotification {
    pub message: String,
    pub duration: NotificationDuration,
    pub created_at: DateTime<Local>,
}

/// Something that can show a notification to the user. Sinks run on the
/// thread that drives the `NotificationDispatcher`, never on upload tasks.
pub trait NotificationSink: Send {
    fn show(&mut self, notification: &UserNotification) -> Result<()>;
    fn sink_name(&self) -> &'static str;
}

/// Fire-and-forget handle used by background work to reach the user.
#[derive(Clone, Debug)]
pub struct UserNotifier {
    tx: mpsc::Sender<UserNotification>,
}

impl UserNotifier {
    pub fn channel(capacity: usize) -> (Self, NotificationDispatcher) {
        let (tx, rx) = mpsc::channel::<UserNotification>(capacity.max(1));
        (Self { tx }, NotificationDispatcher { rx })
    }

    pub fn notify(&self, message: impl Into<String>, duration: NotificationDuration) {
        let notification = UserNotification {
            message: message.into(),
            duration,
            created_at: Local::now(),
        };

        match self.tx.try_send(notification) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Notification queue full; dropping notification");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Notification queue closed; dropping notification");
            }
        }
    }
}

/// Receiving end of the notification queue. Drive it from the primary thread.
#[derive(Debug)]
pub struct NotificationDispatcher {
    rx: mpsc::Receiver<UserNotification>,
}

impl NotificationDispatcher {
    /// Delivers notifications on the calling thread until every
    /// `UserNotifier` is dropped. Must not be called from inside an async
    /// runtime; use `run` there.
    pub fn run_blocking(mut self, mut sinks: Vec<Box<dyn NotificationSink>>) -> usize {
        let mut delivered = 0;
        while let Some(notification) = self.rx.blocking_recv() {
            deliver(&mut sinks, &notification);
            delivered += 1;
        }
        debug!(delivered, "Notification dispatcher finished");
        delivered
    }

    pub async fn run(mut self, mut sinks: Vec<Box<dyn NotificationSink>>) -> usize {
        let mut delivered = 0;
        while let Some(notification) = self.rx.recv().await {
            deliver(&mut sinks, &notification);
            delivered += 1;
        }
        debug!(delivered, "Notification dispatcher finished");
        delivered
    }

    /// Returns whatever is queued right now without waiting.
    pub fn drain_pending(&mut self) -> Vec<UserNotification> {
        let mut pending = Vec::new();
        while let Ok(notification) = self.rx.try_recv() {
            pending.push(notification);
        }
        pending
    }
}

fn deliver(sinks: &mut [Box<dyn NotificationSink>], notification: &UserNotification) {
    for sink in sinks.iter_mut() {
        if let Err(error) = sink.show(notification) {
            warn!(
                sink = sink.sink_name(),
                error = %error,
                "Notification sink failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread::{self, ThreadId};

    #[derive(Clone, Default)]
    struct RecordingSink {
        seen: Arc<Mutex<Vec<(String, ThreadId)>>>,
    }

    impl NotificationSink for RecordingSink {
        fn show(&mut self, notification: &UserNotification) -> Result<()> {
            self.seen
                .lock()
                .unwrap()
                .push((notification.message.clone(), thread::current().id()));
            Ok(())
        }

        fn sink_name(&self) -> &'static str {
            "recording"
        }
    }

    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn show(&mut self, _notification: &UserNotification) -> Result<()> {
            anyhow::bail!("display unavailable")
        }

        fn sink_name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn drain_pending_returns_queued_notifications_in_order() {
        let (notifier, mut dispatcher) = UserNotifier::channel(8);

        notifier.notify("first", NotificationDuration::Short);
        notifier.notify("second", NotificationDuration::Long);

        let pending = dispatcher.drain_pending();
        let messages: Vec<_> = pending.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(pending[1].duration, NotificationDuration::Long);
        assert!(dispatcher.drain_pending().is_empty());
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (notifier, mut dispatcher) = UserNotifier::channel(1);

        notifier.notify("kept", NotificationDuration::Short);
        notifier.notify("dropped", NotificationDuration::Short);

        let pending = dispatcher.drain_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].message, "kept");
    }

    #[test]
    fn notify_after_dispatcher_is_gone_does_not_panic() {
        let (notifier, dispatcher) = UserNotifier::channel(4);
        drop(dispatcher);

        notifier.notify("nobody listening", NotificationDuration::Short);
    }

    #[test]
    fn run_blocking_delivers_on_the_calling_thread() {
        let (notifier, dispatcher) = UserNotifier::channel(8);
        let sink = RecordingSink::default();
        let seen = Arc::clone(&sink.seen);

        let worker = thread::spawn(move || {
            notifier.notify("from worker", NotificationDuration::Short);
            thread::current().id()
        });

        let delivered = dispatcher.run_blocking(vec![Box::new(sink)]);
        let worker_id = worker.join().unwrap();

        assert_eq!(delivered, 1);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "from worker");
        assert_eq!(seen[0].1, thread::current().id());
        assert_ne!(seen[0].1, worker_id);
    }

    #[tokio::test]
    async fn failing_sink_does_not_starve_the_others() {
        let (notifier, dispatcher) = UserNotifier::channel(8);
        let sink = RecordingSink::default();
        let seen = Arc::clone(&sink.seen);

        notifier.notify("hello", NotificationDuration::Long);
        drop(notifier);

        let delivered = dispatcher
            .run(vec![Box::new(FailingSink), Box::new(sink)])
            .await;

        assert_eq!(delivered, 1);
        assert_eq!(seen.lock().unwrap()[0].0, "hello");
    }
}
