use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use log::debug;

use crate::{CiError, Event};

type Notice = Result<Event, CiError>;

/// A queue of build events waiting to be handled.
///
/// Providers feed it from a background task through a [`Publisher`]; the consumer
/// blocks in [`next_event`](Subscription::next_event) and handles one event at a time,
/// in delivery order. Errors travel down the same queue, so a failing source or an
/// [`Interrupter`] wakes the consumer just like an event does. An interrupt is also
/// visible without waiting through [`check_interrupted`](Subscription::check_interrupted),
/// and publishers can see through [`Publisher::is_closed`] that the subscription is gone.
///
/// # Examples
///
/// ```
/// use buildlamp_ci::{CiError, Subscription};
///
/// let subscription = Subscription::new();
/// subscription.interrupter().interrupt();
/// assert!(matches!(subscription.next_event(), Err(CiError::Interrupted)));
/// ```
#[derive(Debug)]
pub struct Subscription {
    sender: Sender<Notice>,
    receiver: Receiver<Notice>,
    interrupted: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

impl Subscription {
    /// Creates an empty subscription.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Subscription {
            sender,
            receiver,
            interrupted: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a handle that providers use to deliver events.
    pub fn publisher(&self) -> Publisher {
        Publisher {
            sender: self.sender.clone(),
            closed: self.closed.clone(),
        }
    }

    /// Returns a handle that can stop the consumer from another thread.
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            sender: self.sender.clone(),
            interrupted: self.interrupted.clone(),
        }
    }

    /// Blocks until the next event or error arrives.
    ///
    /// # Errors
    ///
    /// Returns whatever error the source published, [`CiError::Interrupted`] after an
    /// interrupt, or [`CiError::StreamClosed`] once the source has closed.
    pub fn next_event(&self) -> Result<Event, CiError> {
        // The subscription holds a sender itself, so recv only fails if that invariant breaks.
        self.receiver.recv().unwrap_or(Err(CiError::StreamClosed))
    }

    /// Fails fast if an interrupt has been requested, without waiting for events.
    ///
    /// # Errors
    ///
    /// Returns [`CiError::Interrupted`] once any [`Interrupter`] has fired.
    pub fn check_interrupted(&self) -> Result<(), CiError> {
        if self.interrupted.load(Ordering::SeqCst) {
            Err(CiError::Interrupted)
        } else {
            Ok(())
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Subscription::new()
    }
}

/// The feeding end of a [`Subscription`].
#[derive(Debug, Clone)]
pub struct Publisher {
    sender: Sender<Notice>,
    closed: Arc<AtomicBool>,
}

impl Publisher {
    /// Queues an event. Returns `false` once the subscription has been dropped.
    pub fn publish(&self, event: Event) -> bool {
        debug!("Queueing event: {}", event);
        self.sender.send(Ok(event)).is_ok()
    }

    /// Returns whether the subscription has been dropped, so nothing will read further events.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Queues an error that ends the consumer's loop.
    pub fn fail(&self, error: CiError) -> bool {
        debug!("Queueing event source failure: {}", error);
        self.sender.send(Err(error)).is_ok()
    }

    /// Signals that no more events will come.
    pub fn close(self) {
        let _ = self.sender.send(Err(CiError::StreamClosed));
    }
}

/// Stops a [`Subscription`]'s consumer from another thread.
#[derive(Debug, Clone)]
pub struct Interrupter {
    sender: Sender<Notice>,
    interrupted: Arc<AtomicBool>,
}

impl Interrupter {
    /// Makes the consumer's next (or current) wait return [`CiError::Interrupted`].
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        let _ = self.sender.send(Err(CiError::Interrupted));
    }
}
