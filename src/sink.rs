// Stream sinks - synchronized line writers for routed messages
//
// A sink owns its destination and serializes writers on its own mutex, so
// two emitters racing into the same sink never interleave partial lines.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const NEWLINE: char = '\n';

/// Newline-terminating, flushing writer shared by registry bindings.
pub struct StreamSink {
    stream: Mutex<Box<dyn Write + Send>>,
}

impl StreamSink {
    pub fn new<W: Write + Send + 'static>(stream: W) -> Self {
        Self {
            stream: Mutex::new(Box::new(stream)),
        }
    }

    /// Convenience constructor returning the sink ready for binding.
    pub fn shared<W: Write + Send + 'static>(stream: W) -> Arc<Self> {
        Arc::new(Self::new(stream))
    }

    /// Write one line, terminate it unless it already ends with a newline,
    /// then flush.
    ///
    /// The whole sequence runs under the sink lock.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut stream = self.lock_stream();
        stream.write_all(line.as_bytes())?;
        if !line.ends_with(NEWLINE) {
            stream.write_all(b"\n")?;
        }
        stream.flush()
    }

    fn lock_stream(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        // A panic while writing leaves at worst a partial line behind; the
        // stream itself is still usable.
        self.stream.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSink").finish_non_exhaustive()
    }
}

/// In-memory write target that stays readable after being handed to a sink.
///
/// Clones share the same underlying bytes.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw captured bytes.
    pub fn bytes(&self) -> Vec<u8> {
        self.lock_bytes().clone()
    }

    /// Captured bytes as text (lossy for invalid UTF-8).
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock_bytes()).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_bytes().is_empty()
    }

    fn lock_bytes(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock_bytes().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.lock_bytes().len())
            .finish()
    }
}
