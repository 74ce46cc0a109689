//! Linked in-process channel endpoints
//!
//! [`Port::pair`] is the channel-pair primitive the function bridge is built on.
//! Every post runs the host clone, so a message arrives with its transferables
//! moved and everything else deep-copied.

use crate::handle::next_handle_id;
use crate::host::structured_clone;
use crate::{CodecError, CodecResult, Transferable, Value};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, broadcast, mpsc};

/// Close flag shared by both ends of a pair
#[derive(Clone)]
struct CloseHandle {
    triggered: Arc<AtomicBool>,
    sender: broadcast::Sender<()>,
}

impl CloseHandle {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Returns true only for the first trigger
    fn trigger(&self) -> bool {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            let _ = self.sender.send(());
            return true;
        }
        false
    }

    fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    fn signal(&self) -> CloseSignal {
        CloseSignal {
            triggered: self.triggered.clone(),
            receiver: self.sender.subscribe(),
        }
    }
}

struct CloseSignal {
    triggered: Arc<AtomicBool>,
    receiver: broadcast::Receiver<()>,
}

impl CloseSignal {
    fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Returns immediately if already triggered
    async fn wait(&mut self) {
        if self.is_triggered() {
            return;
        }
        let _ = self.receiver.recv().await;
    }
}

/// One end of a linked channel pair
///
/// Clones refer to the same endpoint.
#[derive(Clone)]
pub struct Port {
    inner: Arc<PortInner>,
}

struct PortInner {
    id: u64,
    peer: mpsc::UnboundedSender<Value>,
    inbox: Mutex<mpsc::UnboundedReceiver<Value>>,
    close: CloseHandle,
}

impl Port {
    /// Create two entangled endpoints
    pub fn pair() -> (Port, Port) {
        let (to_a, inbox_a) = mpsc::unbounded_channel();
        let (to_b, inbox_b) = mpsc::unbounded_channel();
        let close = CloseHandle::new();

        let a = Port::from_parts(to_b, inbox_a, close.clone());
        let b = Port::from_parts(to_a, inbox_b, close);
        (a, b)
    }

    fn from_parts(
        peer: mpsc::UnboundedSender<Value>,
        inbox: mpsc::UnboundedReceiver<Value>,
        close: CloseHandle,
    ) -> Self {
        Self {
            inner: Arc::new(PortInner {
                id: next_handle_id(),
                peer,
                inbox: Mutex::new(inbox),
                close,
            }),
        }
    }

    /// Process-unique id of this endpoint
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Check whether both handles refer to the same endpoint
    pub fn same_handle(&self, other: &Port) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Send a message to the peer, moving the listed handles
    pub fn post(&self, message: Value, transfer: &[Transferable]) -> CodecResult<()> {
        if self.is_closed() {
            return Err(CodecError::ChannelClosed);
        }
        if transfer.iter().any(|t| matches!(t, Transferable::Port(p) if p.same_handle(self))) {
            return Err(CodecError::DataClone(
                "a port cannot be transferred over itself".to_string(),
            ));
        }

        let cloned = structured_clone(&message, transfer)?;
        self.inner
            .peer
            .send(cloned)
            .map_err(|_| CodecError::ChannelClosed)
    }

    /// Wait for the next message
    ///
    /// Returns `None` once the pair is closed, or when the peer endpoint has been
    /// dropped and every queued message was consumed.
    pub async fn recv(&self) -> Option<Value> {
        let mut signal = self.inner.close.signal();
        if signal.is_triggered() {
            return None;
        }

        let mut inbox = self.inner.inbox.lock().await;
        tokio::select! {
            message = inbox.recv() => message,
            _ = signal.wait() => None,
        }
    }

    /// Close both ends of the pair
    ///
    /// Pending and future `recv` calls return `None`; posts on either end fail.
    pub fn close(&self) {
        if self.inner.close.trigger() {
            tracing::debug!(port = self.id(), "port closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.close.is_triggered()
    }

    /// Wait until either end closes the pair
    pub async fn closed(&self) {
        self.inner.close.signal().wait().await;
    }
}

impl PartialEq for Port {
    fn eq(&self, other: &Self) -> bool {
        self.same_handle(other)
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("id", &self.id())
            .field("closed", &self.is_closed())
            .finish()
    }
}
