// SPDX-License-Identifier: MIT
//
// StreamWrapper — ref-counted interception of stdout and stderr.
//
// Several independent renderers may wrap the same process streams; every
// count here is a refcount so the Nth wrapper is free and only the return
// to zero tears anything down. A panic hook flushes whatever a capture
// session was still holding, so a traceback is never followed by silence.

use std::io;
use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once, OnceLock};

use stride_term::caps::env_flag;
use stride_term::{StderrStream, StdoutStream, TermStream};

use crate::wrap::{ListenerId, Listeners, RenderListener, WrappingIO};

/// Env flag: wrap stdout as soon as the process-wide wrapper is created.
pub const ENV_WRAP_STDOUT: &str = "STRIDE_WRAP_STDOUT";

/// Env flag: wrap stderr as soon as the process-wide wrapper is created.
pub const ENV_WRAP_STDERR: &str = "STRIDE_WRAP_STDERR";

type DynStream = Box<dyn TermStream + Send>;

/// Which process stream an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdStream {
    Stdout,
    Stderr,
}

// ─── Panic hook ──────────────────────────────────────────────────────────────
//
// Installed at most once per process and a no-op while no wrapper holds a
// reference. The previous hook runs first so the default traceback
// printing is preserved; the flush comes after it.

static HOOK_INSTALL: Once = Once::new();
static HOOK_REFS: AtomicUsize = AtomicUsize::new(0);

fn acquire_panic_hook() {
    HOOK_REFS.fetch_add(1, Ordering::Relaxed);
    HOOK_INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            previous(info);
            if HOOK_REFS.load(Ordering::Relaxed) == 0 {
                return;
            }
            if let Some(streams) = STREAMS.get() {
                // try_lock: the panicking thread may already hold the lock.
                if let Ok(mut wrapper) = streams.try_lock() {
                    wrapper.flush();
                }
            }
        }));
    });
}

fn release_panic_hook() {
    HOOK_REFS.fetch_sub(1, Ordering::Relaxed);
}

// ─── StreamWrapper ───────────────────────────────────────────────────────────

/// Ref-counted wrapping of a stdout/stderr pair.
///
/// Explicitly constructed; tests inject in-memory targets. The
/// process-wide instance over the real streams lives behind [`streams`].
pub struct StreamWrapper {
    stdout: WrappingIO<DynStream>,
    stderr: WrappingIO<DynStream>,
    wrapped_stdout: usize,
    wrapped_stderr: usize,
    capturing: usize,
    listeners: Listeners,
}

impl StreamWrapper {
    /// A wrapper over injected targets. Nothing is wrapped yet.
    #[must_use]
    pub fn new(stdout: DynStream, stderr: DynStream) -> Self {
        let listeners = Listeners::new();
        Self {
            stdout: WrappingIO::new(stdout, listeners.clone()),
            stderr: WrappingIO::new(stderr, listeners.clone()),
            wrapped_stdout: 0,
            wrapped_stderr: 0,
            capturing: 0,
            listeners,
        }
    }

    /// A wrapper over the real process streams.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(Box::new(StdoutStream::new()), Box::new(StderrStream::new()))
    }

    fn io(&mut self, stream: StdStream) -> &mut WrappingIO<DynStream> {
        match stream {
            StdStream::Stdout => &mut self.stdout,
            StdStream::Stderr => &mut self.stderr,
        }
    }

    fn refcount(&mut self, stream: StdStream) -> &mut usize {
        match stream {
            StdStream::Stdout => &mut self.wrapped_stdout,
            StdStream::Stderr => &mut self.wrapped_stderr,
        }
    }

    // ── Wrapping ────────────────────────────────────────────────────────

    /// Wrap a stream. Counted; only the first wrap changes anything.
    pub fn wrap(&mut self, stream: StdStream) {
        let count = self.refcount(stream);
        *count += 1;
        if *count == 1 {
            acquire_panic_hook();
            let capturing = self.capturing > 0;
            self.io(stream).set_capturing(capturing);
        }
    }

    /// Unwrap a stream. Only the return to zero deactivates wrapping,
    /// flushing any buffered remainder to the target.
    pub fn unwrap(&mut self, stream: StdStream) {
        let count = self.refcount(stream);
        if *count == 0 {
            return;
        }
        *count -= 1;
        if *count == 0 {
            release_panic_hook();
            let io = self.io(stream);
            io.set_capturing(false);
            if io.flush().is_err() {
                log::warn!("failed to flush {stream:?} while unwrapping");
            }
        }
    }

    pub fn wrap_stdout(&mut self) {
        self.wrap(StdStream::Stdout);
    }

    pub fn wrap_stderr(&mut self) {
        self.wrap(StdStream::Stderr);
    }

    pub fn unwrap_stdout(&mut self) {
        self.unwrap(StdStream::Stdout);
    }

    pub fn unwrap_stderr(&mut self) {
        self.unwrap(StdStream::Stderr);
    }

    /// Whether a stream is currently wrapped.
    #[must_use]
    pub const fn is_wrapped(&self, stream: StdStream) -> bool {
        match stream {
            StdStream::Stdout => self.wrapped_stdout > 0,
            StdStream::Stderr => self.wrapped_stderr > 0,
        }
    }

    // ── Capture sessions ────────────────────────────────────────────────

    /// Enter a capture session. Counted; while any session is open,
    /// writes to wrapped streams are buffered instead of forwarded.
    pub fn start_capturing(&mut self) {
        self.capturing += 1;
        self.update_capturing();
    }

    /// Leave a capture session. The last exit flushes the buffers.
    pub fn stop_capturing(&mut self) {
        self.capturing = self.capturing.saturating_sub(1);
        self.update_capturing();
    }

    fn update_capturing(&mut self) {
        let capturing = self.capturing > 0;
        if self.wrapped_stdout > 0 {
            self.stdout.set_capturing(capturing);
        }
        if self.wrapped_stderr > 0 {
            self.stderr.set_capturing(capturing);
        }
        if !capturing {
            self.flush();
        }
    }

    // ── Listeners ───────────────────────────────────────────────────────

    pub fn add_listener(&self, listener: Arc<dyn RenderListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    // ── IO ──────────────────────────────────────────────────────────────

    /// Write to a stream through its shim.
    pub fn write(&mut self, stream: StdStream, data: &str) -> io::Result<()> {
        self.io(stream).write(data)
    }

    /// Flush both wrapped streams.
    ///
    /// Never propagates: a stream whose flush fails is unwrapped entirely
    /// and the failure logged, so one broken pipe cannot take down the
    /// render loop.
    pub fn flush(&mut self) {
        for stream in [StdStream::Stdout, StdStream::Stderr] {
            if !self.is_wrapped(stream) {
                continue;
            }
            if let Err(error) = self.io(stream).flush() {
                log::warn!("disabling {stream:?} wrapping after flush failure: {error}");
                *self.refcount(stream) = 0;
                release_panic_hook();
                self.io(stream).set_capturing(false);
            }
        }
    }

    /// Whether either stream holds a captured line the renderer must
    /// clear for.
    #[must_use]
    pub const fn needs_clear(&self) -> bool {
        self.stdout.needs_clear() || self.stderr.needs_clear()
    }

    /// Direct access to the stdout shim.
    pub fn stdout(&mut self) -> &mut WrappingIO<DynStream> {
        &mut self.stdout
    }

    /// Direct access to the stderr shim.
    pub fn stderr(&mut self) -> &mut WrappingIO<DynStream> {
        &mut self.stderr
    }
}

impl Drop for StreamWrapper {
    // The counterpart of an at-exit flush: whatever is still buffered
    // reaches the terminal when the wrapper goes away.
    fn drop(&mut self) {
        self.flush();
        if self.wrapped_stdout > 0 {
            release_panic_hook();
        }
        if self.wrapped_stderr > 0 {
            release_panic_hook();
        }
    }
}

impl std::fmt::Debug for StreamWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamWrapper")
            .field("wrapped_stdout", &self.wrapped_stdout)
            .field("wrapped_stderr", &self.wrapped_stderr)
            .field("capturing", &self.capturing)
            .finish()
    }
}

// ─── Process-wide instance ───────────────────────────────────────────────────

static STREAMS: OnceLock<Mutex<StreamWrapper>> = OnceLock::new();

/// The process-wide wrapper over the real stdout and stderr.
///
/// Created on first use. The `STRIDE_WRAP_STDOUT`/`STRIDE_WRAP_STDERR`
/// flags wrap the corresponding stream eagerly at creation.
pub fn streams() -> &'static Mutex<StreamWrapper> {
    STREAMS.get_or_init(|| {
        let mut wrapper = StreamWrapper::stdio();
        if env_flag(ENV_WRAP_STDOUT) == Some(true) {
            wrapper.wrap_stdout();
        }
        if env_flag(ENV_WRAP_STDERR) == Some(true) {
            wrapper.wrap_stderr();
        }
        Mutex::new(wrapper)
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use pretty_assertions::assert_eq;

    use super::*;

    fn test_wrapper() -> StreamWrapper {
        StreamWrapper::new(Box::new(Vec::new()), Box::new(Vec::new()))
    }

    // Tests that wrap streams touch the process-global hook refcount;
    // serialize them so the count assertions stay deterministic.
    fn hook_guard() -> std::sync::MutexGuard<'static, ()> {
        static GUARD: Mutex<()> = Mutex::new(());
        GUARD.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    struct CountingListener {
        updates: AtomicUsize,
    }

    impl RenderListener for CountingListener {
        fn update(&self) {
            self.updates.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn wrapping_is_refcounted() {
        let _guard = hook_guard();
        let mut wrapper = test_wrapper();
        assert!(!wrapper.is_wrapped(StdStream::Stdout));

        wrapper.wrap_stdout();
        wrapper.wrap_stdout();
        assert!(wrapper.is_wrapped(StdStream::Stdout));

        wrapper.unwrap_stdout();
        assert!(wrapper.is_wrapped(StdStream::Stdout));
        wrapper.unwrap_stdout();
        assert!(!wrapper.is_wrapped(StdStream::Stdout));

        // Extra unwraps are ignored.
        wrapper.unwrap_stdout();
        assert!(!wrapper.is_wrapped(StdStream::Stdout));
    }

    #[test]
    fn capture_buffers_and_last_stop_flushes() {
        let _guard = hook_guard();
        let mut wrapper = test_wrapper();
        wrapper.wrap_stdout();

        wrapper.start_capturing();
        wrapper.start_capturing();
        wrapper.write(StdStream::Stdout, "captured\n").expect("write");
        assert_eq!(wrapper.stdout().buffer(), "captured\n");
        assert!(wrapper.needs_clear());

        wrapper.stop_capturing();
        // One session still open: nothing flushed yet.
        assert_eq!(wrapper.stdout().buffer(), "captured\n");

        wrapper.stop_capturing();
        assert_eq!(wrapper.stdout().buffer(), "");
        assert!(!wrapper.needs_clear());
    }

    #[test]
    fn capture_before_wrap_applies_when_wrapped() {
        let _guard = hook_guard();
        let mut wrapper = test_wrapper();
        wrapper.start_capturing();
        wrapper.wrap_stdout();
        wrapper.write(StdStream::Stdout, "late").expect("write");
        assert_eq!(wrapper.stdout().buffer(), "late");
    }

    #[test]
    fn unwrap_flushes_the_remainder() {
        let _guard = hook_guard();
        let mut wrapper = test_wrapper();
        wrapper.wrap_stdout();
        wrapper.start_capturing();
        wrapper.write(StdStream::Stdout, "tail").expect("write");

        wrapper.unwrap_stdout();
        assert_eq!(wrapper.stdout().buffer(), "");
        assert!(!wrapper.stdout().capturing());
    }

    #[test]
    fn unwrapped_stream_passes_through() {
        let mut wrapper = test_wrapper();
        wrapper.start_capturing();
        // Not wrapped: capture does not apply.
        wrapper.write(StdStream::Stdout, "direct").expect("write");
        assert_eq!(wrapper.stdout().buffer(), "");
    }

    #[test]
    fn listeners_fire_for_captured_lines_on_both_streams() {
        let _guard = hook_guard();
        let mut wrapper = test_wrapper();
        let listener = Arc::new(CountingListener {
            updates: AtomicUsize::new(0),
        });
        let id = wrapper.add_listener(listener.clone());

        wrapper.wrap_stdout();
        wrapper.wrap_stderr();
        wrapper.start_capturing();

        wrapper.write(StdStream::Stdout, "one\n").expect("write");
        wrapper.write(StdStream::Stderr, "two\n").expect("write");
        assert_eq!(listener.updates.load(Ordering::Relaxed), 2);

        assert!(wrapper.remove_listener(id));
        wrapper.write(StdStream::Stdout, "three\n").expect("write");
        assert_eq!(listener.updates.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn hook_refs_follow_wrap_transitions() {
        let _guard = hook_guard();
        let before = HOOK_REFS.load(Ordering::Relaxed);
        let mut wrapper = test_wrapper();
        wrapper.wrap_stdout();
        wrapper.wrap_stdout();
        wrapper.wrap_stderr();
        // One reference per wrapped stream, not per wrap call.
        assert_eq!(HOOK_REFS.load(Ordering::Relaxed), before + 2);

        drop(wrapper);
        assert_eq!(HOOK_REFS.load(Ordering::Relaxed), before);
    }

    #[test]
    fn needs_clear_covers_either_stream() {
        let _guard = hook_guard();
        let mut wrapper = test_wrapper();
        wrapper.wrap_stderr();
        wrapper.start_capturing();
        assert!(!wrapper.needs_clear());
        wrapper.write(StdStream::Stderr, "err\n").expect("write");
        assert!(wrapper.needs_clear());
    }
}
