use std::fmt::{Debug, Display, Formatter};
use std::io::Write;

/// The two output channels a child process is relayed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl Display for OutputStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputStream::Stdout => write!(f, "stdout"),
            OutputStream::Stderr => write!(f, "stderr"),
        }
    }
}

/// Where relayed output ends up.
///
/// The default [`StdConsole`] writes to the process stdout/stderr; tests swap it for a capturing
/// one (see `mocks::console::ConsoleMock`).
pub trait Console: Debug + Send + Sync {
    /// Writes (and flushes) `data` to the given output stream.
    fn write(&self, stream: OutputStream, data: &[u8]) -> std::io::Result<()>;
}

/// The current process stdout and stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write(&self, stream: OutputStream, data: &[u8]) -> std::io::Result<()> {
        match stream {
            OutputStream::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(data)?;
                stdout.flush()
            }
            OutputStream::Stderr => {
                let mut stderr = std::io::stderr().lock();
                stderr.write_all(data)?;
                stderr.flush()
            }
        }
    }
}
