use std::sync::Arc;
use log::trace;
use tokio::sync::watch;

/// Ends when the view it belongs to is torn down. Calls bound to it are
/// abandoned at that point and their results discarded.
#[derive(Clone, Debug)]
pub struct ViewLifetime {
    ended: Arc<watch::Sender<bool>>,
}

impl ViewLifetime {
    pub fn new() -> Self {
        ViewLifetime {
            ended: Arc::new(watch::Sender::new(false)),
        }
    }

    pub fn end(&self) {
        if !self.ended.send_replace(true) {
            trace!("view lifetime ended");
        }
    }

    pub fn is_ended(&self) -> bool {
        *self.ended.borrow()
    }

    pub async fn ended(&self) {
        let mut receiver = self.ended.subscribe();
        // can't fail, the sender lives in self
        let _ = receiver.wait_for(|ended| *ended).await;
    }

    /// Runs `future` unless the lifetime ends first.
    pub async fn guard<F: Future>(&self, future: F) -> Option<F::Output> {
        if self.is_ended() {
            return None
        }
        tokio::select! {
            biased;
            _ = self.ended() => None,
            output = future => Some(output),
        }
    }
}

impl Default for ViewLifetime {
    fn default() -> Self {
        Self::new()
    }
}
