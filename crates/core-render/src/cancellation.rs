//! Cooperative cancellation (§5 "a render checks for cancellation between
//! features, never mid-feature"): an optional receiver a caller can signal
//! by dropping or sending on the paired sender, checked at each poll point
//! in the processor's feature loop.

use crossbeam_channel::{Receiver, TryRecvError};

#[derive(Clone, Default)]
pub struct CancellationToken {
    receiver: Option<Receiver<()>>,
}

impl CancellationToken {
    pub fn none() -> Self {
        Self { receiver: None }
    }

    pub fn new(receiver: Receiver<()>) -> Self {
        Self { receiver: Some(receiver) }
    }

    /// `true` once the paired sender has sent or been dropped. A token
    /// built via `none()` never cancels.
    pub fn is_cancelled(&self) -> bool {
        match &self.receiver {
            None => false,
            Some(rx) => match rx.try_recv() {
                Ok(()) => true,
                Err(TryRecvError::Disconnected) => true,
                Err(TryRecvError::Empty) => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_token_with_no_receiver_never_cancels() {
        assert!(!CancellationToken::none().is_cancelled());
    }

    #[test]
    fn sending_on_the_paired_sender_cancels_the_token() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let token = CancellationToken::new(rx);
        assert!(!token.is_cancelled());
        tx.send(()).unwrap();
        assert!(token.is_cancelled());
    }

    #[test]
    fn dropping_the_sender_cancels_the_token() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let token = CancellationToken::new(rx);
        drop(tx);
        assert!(token.is_cancelled());
    }
}
