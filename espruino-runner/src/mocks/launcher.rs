use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::io::{AsyncRead, ReadBuf};

use crate::process::{Invocation, LaunchedProcess, OutputReader, ProcessLauncher};

/// Yields its chunks one read at a time, then the end of stream.
#[derive(Debug, Default)]
pub struct ChunkedReader {
    chunks: VecDeque<Vec<u8>>,
}

impl ChunkedReader {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into_iter().filter(|chunk| !chunk.is_empty()).collect(),
        }
    }
}

impl AsyncRead for ChunkedReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        if let Some(mut chunk) = self.chunks.pop_front() {
            let size = chunk.len().min(buf.remaining());
            buf.put_slice(&chunk[..size]);
            if size < chunk.len() {
                self.chunks.push_front(chunk.split_off(size));
            }
        }
        Poll::Ready(Ok(()))
    }
}

/// What a mocked process does once launched.
#[derive(Clone, Debug)]
pub struct MockRun {
    stdout: Vec<Vec<u8>>,
    stderr: Vec<Vec<u8>>,
    exit_code: Option<i32>,
    exit_error: Option<String>,
    launch_error: Option<String>,
}

impl Default for MockRun {
    /// A process printing nothing and exiting with 0.
    fn default() -> Self {
        Self {
            stdout: vec![],
            stderr: vec![],
            exit_code: Some(0),
            exit_error: None,
            launch_error: None,
        }
    }
}

impl MockRun {
    /// A process that cannot be launched.
    pub fn failing<S: Into<String>>(message: S) -> Self {
        Self {
            launch_error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Adds a chunk to the process stdout.
    pub fn stdout<D: Into<Vec<u8>>>(mut self, chunk: D) -> Self {
        self.stdout.push(chunk.into());
        self
    }

    /// Adds a chunk to the process stderr.
    pub fn stderr<D: Into<Vec<u8>>>(mut self, chunk: D) -> Self {
        self.stderr.push(chunk.into());
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// The process ends without an exit code (killed by a signal).
    pub fn killed(mut self) -> Self {
        self.exit_code = None;
        self
    }

    /// Waiting for the process fails.
    pub fn exit_error<S: Into<String>>(mut self, message: S) -> Self {
        self.exit_error = Some(message.into());
        self
    }
}

/// Records every launch and plays the queued [`MockRun`]s in order (default ones once empty).
#[derive(Clone, Debug, Default)]
pub struct LauncherMock {
    calls: Arc<Mutex<Vec<Invocation>>>,
    sequence: Arc<Mutex<VecDeque<MockRun>>>,
}

impl LauncherMock {
    /// Queues the behavior of the next launched process.
    pub fn add(&self, run: MockRun) -> &Self {
        self.sequence.lock().push_back(run);
        self
    }

    /// Every invocation launched so far.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }
}

impl ProcessLauncher for LauncherMock {
    fn launch(&self, invocation: &Invocation) -> std::io::Result<LaunchedProcess> {
        self.calls.lock().push(invocation.clone());
        let run = self.sequence.lock().pop_front().unwrap_or_default();

        if let Some(message) = run.launch_error {
            return Err(std::io::Error::other(message));
        }

        let stdout: OutputReader = Box::new(ChunkedReader::new(run.stdout));
        let stderr: OutputReader = Box::new(ChunkedReader::new(run.stderr));
        let exit_code = run.exit_code;
        let exit_error = run.exit_error;
        let exit = async move {
            match exit_error {
                Some(message) => Err(std::io::Error::other(message)),
                None => Ok(exit_code),
            }
        }
        .boxed();

        Ok(LaunchedProcess {
            stdout: Some(stdout),
            stderr: Some(stderr),
            exit,
        })
    }
}
