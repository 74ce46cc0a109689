//! Host-native handles carried by reference: buffers, views, blobs and streams

use crate::Port;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique handle id
pub(crate) fn next_handle_id() -> u64 {
    NEXT_HANDLE_ID.fetch_add(1, Ordering::SeqCst)
}

/// Shared, detachable byte store
///
/// Clones share the same storage. Transferring a buffer through
/// [`structured_clone`](crate::host::structured_clone) moves the bytes out and
/// leaves this handle detached and empty.
#[derive(Clone)]
pub struct Buffer {
    inner: Arc<BufferInner>,
}

struct BufferInner {
    id: u64,
    bytes: Mutex<Vec<u8>>,
    detached: AtomicBool,
}

impl Buffer {
    /// Create a buffer owning the given bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: Arc::new(BufferInner {
                id: next_handle_id(),
                bytes: Mutex::new(bytes.into()),
                detached: AtomicBool::new(false),
            }),
        }
    }

    /// Process-unique id of this handle
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn len(&self) -> usize {
        self.inner.bytes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy out the current contents
    pub fn to_vec(&self) -> Vec<u8> {
        self.inner.bytes.lock().clone()
    }

    /// Run a closure over the current contents
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.inner.bytes.lock())
    }

    /// Whether the contents were moved away by a transfer
    pub fn is_detached(&self) -> bool {
        self.inner.detached.load(Ordering::SeqCst)
    }

    /// Check whether both handles refer to the same storage
    pub fn same_handle(&self, other: &Buffer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Move the contents out, leaving this handle detached
    pub(crate) fn detach(&self) -> Vec<u8> {
        self.inner.detached.store(true, Ordering::SeqCst);
        std::mem::take(&mut *self.inner.bytes.lock())
    }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        if self.same_handle(other) {
            return true;
        }
        self.is_detached() == other.is_detached() && self.to_vec() == other.to_vec()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.id())
            .field("len", &self.len())
            .field("detached", &self.is_detached())
            .finish()
    }
}

/// Window over a [`Buffer`]
#[derive(Clone, Debug)]
pub struct BufferView {
    buffer: Buffer,
    offset: usize,
    len: usize,
}

impl BufferView {
    /// Create a view; returns `None` when the window exceeds the buffer
    pub fn new(buffer: Buffer, offset: usize, len: usize) -> Option<Self> {
        let end = offset.checked_add(len)?;
        if end > buffer.len() {
            return None;
        }
        Some(Self {
            buffer,
            offset,
            len,
        })
    }

    /// View covering the whole buffer
    pub fn whole(buffer: Buffer) -> Self {
        let len = buffer.len();
        Self {
            buffer,
            offset: 0,
            len,
        }
    }

    /// The buffer that owns the viewed bytes
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy out the viewed bytes; a detached buffer yields nothing
    pub fn to_vec(&self) -> Vec<u8> {
        self.buffer.with_bytes(|bytes| {
            bytes
                .get(self.offset..self.offset + self.len)
                .map(<[u8]>::to_vec)
                .unwrap_or_default()
        })
    }

    pub(crate) fn rebase(&self, buffer: Buffer) -> Self {
        Self {
            buffer,
            offset: self.offset,
            len: self.len,
        }
    }
}

impl PartialEq for BufferView {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && self.len == other.len && self.buffer == other.buffer
    }
}

/// Immutable bytes with a MIME type; a file when it also has a name
#[derive(Clone)]
pub struct Blob {
    inner: Arc<BlobInner>,
}

#[derive(PartialEq)]
struct BlobInner {
    bytes: Vec<u8>,
    mime: String,
    name: Option<String>,
}

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>, mime: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(BlobInner {
                bytes: bytes.into(),
                mime: mime.into(),
                name: None,
            }),
        }
    }

    /// Create a file-like blob
    pub fn file(bytes: impl Into<Vec<u8>>, mime: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(BlobInner {
                bytes: bytes.into(),
                mime: mime.into(),
                name: Some(name.into()),
            }),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.inner.bytes
    }

    pub fn mime(&self) -> &str {
        &self.inner.mime
    }

    /// File name, if this blob is file-like
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub fn same_handle(&self, other: &Blob) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Self) -> bool {
        self.same_handle(other) || self.inner == other.inner
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("len", &self.inner.bytes.len())
            .field("mime", &self.inner.mime)
            .field("name", &self.inner.name)
            .finish()
    }
}

/// Queue of byte chunks that can only be moved, never copied
#[derive(Clone)]
pub struct Stream {
    inner: Arc<StreamInner>,
}

struct StreamInner {
    id: u64,
    chunks: Mutex<VecDeque<Vec<u8>>>,
}

impl Stream {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StreamInner {
                id: next_handle_id(),
                chunks: Mutex::new(VecDeque::new()),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Append a chunk
    pub fn push(&self, chunk: impl Into<Vec<u8>>) {
        self.inner.chunks.lock().push_back(chunk.into());
    }

    /// Take the next chunk, if any
    pub fn read(&self) -> Option<Vec<u8>> {
        self.inner.chunks.lock().pop_front()
    }

    pub fn same_handle(&self, other: &Stream) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        self.same_handle(other)
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").field("id", &self.id()).finish()
    }
}

/// Handle that a send must move instead of copy
#[derive(Clone, Debug)]
pub enum Transferable {
    Buffer(Buffer),
    Port(Port),
    Stream(Stream),
}

impl Transferable {
    /// Process-unique id of the underlying handle
    pub fn id(&self) -> u64 {
        match self {
            Transferable::Buffer(b) => b.id(),
            Transferable::Port(p) => p.id(),
            Transferable::Stream(s) => s.id(),
        }
    }

    /// Check whether both refer to the same handle
    pub fn same_handle(&self, other: &Transferable) -> bool {
        match (self, other) {
            (Transferable::Buffer(a), Transferable::Buffer(b)) => a.same_handle(b),
            (Transferable::Port(a), Transferable::Port(b)) => a.same_handle(b),
            (Transferable::Stream(a), Transferable::Stream(b)) => a.same_handle(b),
            _ => false,
        }
    }
}

impl PartialEq for Transferable {
    fn eq(&self, other: &Self) -> bool {
        self.same_handle(other)
    }
}
