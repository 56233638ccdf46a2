use std::fmt::{Debug, Display, Formatter};
use std::process::Stdio;

use futures::future::BoxFuture;
use futures::FutureExt;
use log::trace;
use tokio::io::AsyncRead;
use tokio::process::Command;

/// A command line: the program and its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Display for Invocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A readable output stream of a child process.
pub type OutputReader = Box<dyn AsyncRead + Send + Unpin>;

/// A started child process.
pub struct LaunchedProcess {
    /// The child standard output (if captured).
    pub stdout: Option<OutputReader>,
    /// The child standard error (if captured).
    pub stderr: Option<OutputReader>,
    /// Resolves to the exit code once the child is done (`None` when killed by a signal).
    pub exit: BoxFuture<'static, std::io::Result<Option<i32>>>,
}

impl Debug for LaunchedProcess {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchedProcess")
            .field("stdout", &self.stdout.is_some())
            .field("stderr", &self.stderr.is_some())
            .finish_non_exhaustive()
    }
}

/// Starts child processes.
pub trait ProcessLauncher: Debug + Send + Sync {
    /// Starts the given invocation with its stdout and stderr captured.
    ///
    /// # Errors
    /// Any spawn failure (program not found, not executable, etc.).
    fn launch(&self, invocation: &Invocation) -> std::io::Result<LaunchedProcess>;
}

/// Launches real OS processes (through `tokio::process`).
///
/// The child stdin is a pipe that is never written to, kept open until the child exits: an
/// interactive espruino-cli does not see an end of input.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, invocation: &Invocation) -> std::io::Result<LaunchedProcess> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        trace!("Process spawned ({:?}): {}", child.id(), invocation);

        let stdout = child.stdout.take().map(|out| Box::new(out) as OutputReader);
        let stderr = child.stderr.take().map(|err| Box::new(err) as OutputReader);
        let stdin = child.stdin.take();

        let exit = async move {
            let status = child.wait().await;
            drop(stdin);
            status.map(|status| status.code())
        }
        .boxed();

        Ok(LaunchedProcess {
            stdout,
            stderr,
            exit,
        })
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[test]
    fn test_invocation_display() {
        let invocation = Invocation {
            program: String::from("node"),
            args: vec![
                String::from("espruino-cli.js"),
                String::from("9600"),
                String::from("port1"),
            ],
        };
        assert_eq!(invocation.to_string(), "node espruino-cli.js 9600 port1");
    }

    #[cfg(unix)]
    #[espruino_macros::test]
    async fn test_system_launcher() {
        let invocation = Invocation {
            program: String::from("sh"),
            args: vec![
                String::from("-c"),
                String::from("echo \"$0 $1\"; echo oops >&2; exit 3"),
                String::from("9600"),
                String::from("port1"),
            ],
        };

        let process = SystemLauncher.launch(&invocation).unwrap();

        let mut stdout = String::new();
        process
            .stdout
            .unwrap()
            .read_to_string(&mut stdout)
            .await
            .unwrap();
        assert_eq!(stdout, "9600 port1\n");

        let mut stderr = String::new();
        process
            .stderr
            .unwrap()
            .read_to_string(&mut stderr)
            .await
            .unwrap();
        assert_eq!(stderr, "oops\n");

        assert_eq!(process.exit.await.unwrap(), Some(3));
    }

    #[espruino_macros::test]
    async fn test_system_launcher_missing_program() {
        let invocation = Invocation {
            program: String::from("espruino-runner-missing-program"),
            args: vec![],
        };

        let result = SystemLauncher.launch(&invocation);
        assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::NotFound);
    }
}
