use std::sync::Arc;

use parking_lot::Mutex;

use crate::process::{Console, OutputStream};

/// Captures everything written to it, one entry per write.
#[derive(Clone, Debug, Default)]
pub struct ConsoleMock {
    output: Arc<Mutex<Vec<(OutputStream, Vec<u8>)>>>,
    failing: bool,
}

impl ConsoleMock {
    /// A console refusing every write.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    /// Every write, in order.
    pub fn output(&self) -> Vec<(OutputStream, String)> {
        self.output
            .lock()
            .iter()
            .map(|(stream, data)| (*stream, String::from_utf8_lossy(data).to_string()))
            .collect()
    }

    /// The writes to stdout.
    pub fn stdout(&self) -> Vec<String> {
        self.writes_to(OutputStream::Stdout)
    }

    /// The writes to stderr.
    pub fn stderr(&self) -> Vec<String> {
        self.writes_to(OutputStream::Stderr)
    }

    fn writes_to(&self, stream: OutputStream) -> Vec<String> {
        self.output()
            .into_iter()
            .filter(|(written_to, _)| *written_to == stream)
            .map(|(_, data)| data)
            .collect()
    }
}

impl Console for ConsoleMock {
    fn write(&self, stream: OutputStream, data: &[u8]) -> std::io::Result<()> {
        if self.failing {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "Mock error reason",
            ));
        }
        self.output.lock().push((stream, data.to_vec()));
        Ok(())
    }
}
