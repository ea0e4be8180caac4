use std::sync::Arc;

use tokio::sync::watch;

/// Cooperative cancellation signal shared between a caller and a running
/// summary job. Once cancelled it stays cancelled.
#[derive(Debug, Clone)]
pub struct Cancellation {
    sender: Arc<watch::Sender<bool>>,
}

impl Cancellation {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once `cancel` has been called, immediately if it already was.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        loop {
            let cancelled = *receiver.borrow_and_update();
            if cancelled {
                return;
            }
            // the sender lives as long as `self`
            if receiver.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn drop_guard(&self) -> CancelOnDrop {
        CancelOnDrop {
            cancellation: Some(self.clone()),
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancels the job when dropped, e.g. when actix drops a handler future
/// because the client went away.
#[derive(Debug)]
pub struct CancelOnDrop {
    cancellation: Option<Cancellation>,
}

impl CancelOnDrop {
    pub fn disarm(mut self) {
        self.cancellation = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(cancellation) = self.cancellation.take() {
            cancellation.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_cancel_wakes_waiters() {
        let cancellation = Cancellation::new();
        let waiter = cancellation.clone();

        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
            waiter.is_cancelled()
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!cancellation.is_cancelled());
        cancellation.cancel();

        let observed = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(observed);
    }

    #[tokio::test]
    async fn test_cancelled_resolves_when_already_cancelled() {
        let cancellation = Cancellation::new();
        cancellation.cancel();

        tokio::time::timeout(
            Duration::from_millis(100),
            cancellation.cancelled(),
        )
        .await
        .unwrap();
    }

    #[test]
    fn test_drop_guard() {
        let cancellation = Cancellation::new();
        {
            let _guard = cancellation.drop_guard();
        }
        assert!(cancellation.is_cancelled());

        let cancellation = Cancellation::new();
        cancellation.drop_guard().disarm();
        assert!(!cancellation.is_cancelled());
    }
}
