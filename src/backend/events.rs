use log::{debug, trace, warn};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use crate::backend::AuthEvent;
use crate::lib_constants::SESSION_EVENTS_BUFFER_SIZE;

/// Fan-out of session changes to every live [`SessionSubscription`].
pub struct SessionEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(SESSION_EVENTS_BUFFER_SIZE);
        SessionEvents { sender }
    }

    pub fn subscribe(&self) -> SessionSubscription {
        debug!("subscribing to session changes");
        SessionSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn emit(&self, event: AuthEvent) {
        trace!("emitting session event {event:?}");
        // the only possible error is not having subscribers
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SessionSubscription {
    receiver: broadcast::Receiver<AuthEvent>,
}

impl SessionSubscription {
    /// Cancel safe. `None` once the backend is gone.
    pub async fn next_event(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(n)) => {
                    warn!("missed {n} session events");
                    continue
                },
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn try_next_event(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(n)) => {
                    warn!("missed {n} session events");
                    continue
                },
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        debug!("unsubscribing from session changes");
    }
}
