// SPDX-License-Identifier: MIT
//
// WrappingIO — the buffering shim placed between writers and a real
// output stream while a live render owns the terminal.
//
// While capturing, everything written lands in a buffer instead of the
// terminal, and each completed line pings the registered listeners so the
// renderer can clear its bar, let the buffered text through, and redraw
// below it. Outside capture the shim is a transparent passthrough with
// line-triggered flushing.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use stride_term::TermStream;

// ─── Listeners ───────────────────────────────────────────────────────────────

/// A redraw observer, notified synchronously when a captured write
/// completes a line.
pub trait RenderListener: Send + Sync {
    fn update(&self);
}

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn RenderListener>)>,
}

/// Shared, insertion-ordered listener registry.
///
/// Clones share the same table, so a wrapper and the shims on both of its
/// streams all see one set of listeners.
#[derive(Clone, Default)]
pub struct Listeners {
    table: Arc<Mutex<ListenerTable>>,
}

impl Listeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ListenerTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener and return its removal handle.
    pub fn add(&self, listener: Arc<dyn RenderListener>) -> ListenerId {
        let mut table = self.lock();
        let id = ListenerId(table.next_id);
        table.next_id += 1;
        table.entries.push((id, listener));
        id
    }

    /// Remove a listener. Returns whether it was present.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut table = self.lock();
        let before = table.entries.len();
        table.entries.retain(|(entry_id, _)| *entry_id != id);
        table.entries.len() != before
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Call every listener, in registration order.
    ///
    /// The table lock is released before the callbacks run, so a listener
    /// may add or remove listeners without deadlocking.
    pub fn notify(&self) {
        let listeners: Vec<Arc<dyn RenderListener>> = self
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener.update();
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.lock().entries.len())
            .finish()
    }
}

// ─── WrappingIO ──────────────────────────────────────────────────────────────

/// The buffering shim over a single output stream.
pub struct WrappingIO<T: TermStream> {
    target: T,
    buffer: String,
    capturing: bool,
    needs_clear: bool,
    listeners: Listeners,
}

impl<T: TermStream> WrappingIO<T> {
    #[must_use]
    pub fn new(target: T, listeners: Listeners) -> Self {
        Self {
            target,
            buffer: String::new(),
            capturing: false,
            needs_clear: false,
            listeners,
        }
    }

    /// Write a chunk.
    ///
    /// Capturing: the chunk is buffered, and a newline anywhere in it
    /// marks the render region dirty and notifies the listeners.
    /// Passthrough: the chunk goes straight to the target, with a flush
    /// after any chunk that completes a line.
    pub fn write(&mut self, data: &str) -> io::Result<()> {
        if self.capturing {
            self.buffer.push_str(data);
            if data.contains('\n') {
                self.needs_clear = true;
                self.listeners.notify();
            }
            Ok(())
        } else {
            self.target.write_all(data.as_bytes())?;
            if data.contains('\n') {
                self.target.flush()?;
            }
            Ok(())
        }
    }

    /// Move the buffered content verbatim to the target and flush it.
    ///
    /// Always clears the dirty flag and flushes the target, buffered
    /// content or not.
    pub fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            self.target.write_all(self.buffer.as_bytes())?;
            self.buffer.clear();
        }
        self.needs_clear = false;
        self.target.flush()
    }

    /// Flush and close the target.
    pub fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.target.close()
    }

    #[must_use]
    pub fn is_tty(&self) -> bool {
        self.target.is_tty()
    }

    pub fn set_capturing(&mut self, capturing: bool) {
        self.capturing = capturing;
    }

    #[must_use]
    pub const fn capturing(&self) -> bool {
        self.capturing
    }

    /// Whether a captured line is waiting and the render region must be
    /// cleared before the next passthrough.
    #[must_use]
    pub const fn needs_clear(&self) -> bool {
        self.needs_clear
    }

    /// The buffered, not-yet-flushed content.
    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }
}

impl<T: TermStream> std::fmt::Debug for WrappingIO<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WrappingIO")
            .field("capturing", &self.capturing)
            .field("needs_clear", &self.needs_clear)
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    struct CountingListener {
        updates: AtomicUsize,
    }

    impl CountingListener {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                updates: AtomicUsize::new(0),
            })
        }

        fn count(&self) -> usize {
            self.updates.load(Ordering::Relaxed)
        }
    }

    impl RenderListener for CountingListener {
        fn update(&self) {
            self.updates.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn passthrough_writes_reach_the_target() {
        let mut io = WrappingIO::new(Vec::new(), Listeners::new());
        io.write("hello").expect("write");
        assert_eq!(io.target(), b"hello");
        assert_eq!(io.buffer(), "");
        assert!(!io.needs_clear());
    }

    #[test]
    fn capturing_buffers_instead_of_writing() {
        let mut io = WrappingIO::new(Vec::new(), Listeners::new());
        io.set_capturing(true);
        io.write("buffered").expect("write");
        assert_eq!(io.target(), b"");
        assert_eq!(io.buffer(), "buffered");
        assert!(!io.needs_clear());
    }

    #[test]
    fn captured_newline_sets_dirty_and_notifies() {
        let listeners = Listeners::new();
        let listener = CountingListener::new();
        listeners.add(listener.clone());

        let mut io = WrappingIO::new(Vec::new(), listeners);
        io.set_capturing(true);
        io.write("partial").expect("write");
        assert_eq!(listener.count(), 0);

        io.write(" line\nmore").expect("write");
        assert!(io.needs_clear());
        assert_eq!(listener.count(), 1);
        assert_eq!(io.buffer(), "partial line\nmore");
    }

    #[test]
    fn passthrough_newline_does_not_notify() {
        let listeners = Listeners::new();
        let listener = CountingListener::new();
        listeners.add(listener.clone());

        let mut io = WrappingIO::new(Vec::new(), listeners);
        io.write("a line\n").expect("write");
        assert_eq!(listener.count(), 0);
        assert_eq!(io.target(), b"a line\n");
    }

    #[test]
    fn flush_moves_buffer_verbatim_and_resets() {
        let mut io = WrappingIO::new(Vec::new(), Listeners::new());
        io.set_capturing(true);
        io.write("one\ntwo").expect("write");
        assert!(io.needs_clear());

        io.flush().expect("flush");
        assert_eq!(io.target(), b"one\ntwo");
        assert_eq!(io.buffer(), "");
        assert!(!io.needs_clear());

        // A second flush is a no-op on content.
        io.flush().expect("flush");
        assert_eq!(io.target(), b"one\ntwo");
    }

    #[test]
    fn close_flushes_first() {
        let mut io = WrappingIO::new(Vec::new(), Listeners::new());
        io.set_capturing(true);
        io.write("tail").expect("write");
        io.close().expect("close");
        assert_eq!(io.target(), b"tail");
    }

    #[test]
    fn removed_listener_is_not_notified() {
        let listeners = Listeners::new();
        let first = CountingListener::new();
        let second = CountingListener::new();
        let first_id = listeners.add(first.clone());
        listeners.add(second.clone());

        assert!(listeners.remove(first_id));
        assert!(!listeners.remove(first_id));

        let mut io = WrappingIO::new(Vec::new(), listeners);
        io.set_capturing(true);
        io.write("x\n").expect("write");
        assert_eq!(first.count(), 0);
        assert_eq!(second.count(), 1);
    }

    #[test]
    fn listener_may_remove_itself_during_notify() {
        struct SelfRemover {
            listeners: Listeners,
            id: Mutex<Option<ListenerId>>,
        }

        impl RenderListener for SelfRemover {
            fn update(&self) {
                if let Some(id) = self.id.lock().expect("lock").take() {
                    self.listeners.remove(id);
                }
            }
        }

        let listeners = Listeners::new();
        let remover = Arc::new(SelfRemover {
            listeners: listeners.clone(),
            id: Mutex::new(None),
        });
        let id = listeners.add(remover.clone());
        *remover.id.lock().expect("lock") = Some(id);

        listeners.notify();
        assert!(listeners.is_empty());
    }
}
