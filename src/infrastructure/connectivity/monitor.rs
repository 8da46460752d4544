use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::watch;

/// Read side of the connectivity flag. Cheap to clone; every clone shares the
/// one underlying channel, so the platform registration is shared too.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    receiver: watch::Receiver<bool>,
}

/// Write side, owned by whatever glue holds the OS callback registration.
pub struct ConnectivityHandle {
    sender: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn channel(initial: bool) -> (ConnectivityHandle, ConnectivityMonitor) {
        let (sender, receiver) = watch::channel(initial);
        (
            ConnectivityHandle { sender },
            ConnectivityMonitor { receiver },
        )
    }

    pub fn offline() -> (ConnectivityHandle, ConnectivityMonitor) {
        Self::channel(false)
    }

    pub fn online() -> (ConnectivityHandle, ConnectivityMonitor) {
        Self::channel(true)
    }

    /// Non-blocking read of the current flag.
    pub fn is_available(&self) -> bool {
        *self.receiver.borrow()
    }

    /// The current value immediately, then every transition. Rapid flips can
    /// coalesce to the latest value under a slow consumer.
    pub fn changes(&self) -> BoxStream<'static, bool> {
        let receiver = self.receiver.clone();
        futures::stream::unfold((receiver, true), |(mut receiver, first)| async move {
            if first {
                let current = *receiver.borrow_and_update();
                return Some((current, (receiver, false)));
            }
            match receiver.changed().await {
                Ok(()) => {
                    let value = *receiver.borrow_and_update();
                    Some((value, (receiver, false)))
                }
                Err(_) => None,
            }
        })
        .boxed()
    }
}

impl ConnectivityHandle {
    /// Publishes a transition. Reporting the current value again is a no-op,
    /// so platform callbacks may fire as often as they like.
    pub fn set_available(&self, available: bool) {
        self.sender.send_if_modified(|current| {
            if *current == available {
                false
            } else {
                *current = available;
                true
            }
        });
    }
}

impl Drop for ConnectivityHandle {
    fn drop(&mut self) {
        // No registration left to report changes; readers must see offline
        // rather than a stale flag.
        self.sender.send_if_modified(|current| {
            if *current {
                *current = false;
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    #[tokio::test]
    async fn emits_current_value_first() {
        let (_handle, monitor) = ConnectivityMonitor::online();
        let mut changes = monitor.changes();
        assert_eq!(changes.next().await, Some(true));
    }

    #[tokio::test]
    async fn repeated_reports_do_not_reemit() {
        let (handle, monitor) = ConnectivityMonitor::offline();
        let mut changes = monitor.changes();
        assert_eq!(changes.next().await, Some(false));

        handle.set_available(false);
        assert!(changes.next().now_or_never().is_none());

        handle.set_available(true);
        assert_eq!(changes.next().await, Some(true));
    }

    #[tokio::test]
    async fn clones_share_the_flag() {
        let (handle, monitor) = ConnectivityMonitor::offline();
        let clone = monitor.clone();
        handle.set_available(true);
        assert!(monitor.is_available());
        assert!(clone.is_available());
    }

    #[tokio::test]
    async fn dropping_the_handle_forces_offline() {
        let (handle, monitor) = ConnectivityMonitor::online();
        let mut changes = monitor.changes();
        assert_eq!(changes.next().await, Some(true));

        drop(handle);
        assert_eq!(changes.next().await, Some(false));
        assert_eq!(changes.next().await, None);
        assert!(!monitor.is_available());
    }
}
