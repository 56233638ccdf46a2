//! Defines the espruino-runner task runtime.
use std::future::Future;

use log::error;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;

use crate::errors::{Error, RuntimeError, Unknown};

/// Represents the result of a task.
/// A task may return either () or Result<(), Error> for flexibility which
/// will be converted to TaskResult sent to the runtime.
pub enum TaskResult {
    Ok,
    Err(Error),
}

/// Represents a handler on a running task.
pub type TaskHandler = JoinHandle<Result<(), Error>>;

/// Globally accessible runtime transmitter(TX)/receiver(RX) (not initialised yet)
pub static RUNTIME_TX: OnceCell<Mutex<Option<UnboundedSender<UnboundedReceiver<TaskResult>>>>> =
    OnceCell::const_new();
pub static RUNTIME_RX: OnceCell<Mutex<Option<UnboundedReceiver<UnboundedReceiver<TaskResult>>>>> =
    OnceCell::const_new();

impl From<Result<(), Error>> for TaskResult {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(_) => TaskResult::Ok,
            Err(e) => TaskResult::Err(e),
        }
    }
}

impl From<()> for TaskResult {
    fn from(_: ()) -> Self {
        TaskResult::Ok
    }
}

/// Prepares the runtime channel: called first thing by `#[espruino_runner::runtime]`.
pub async fn init_task_channel() {
    RUNTIME_RX
        .get_or_init(|| async {
            let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<UnboundedReceiver<TaskResult>>();

            RUNTIME_TX
                .get_or_init(|| async { Mutex::new(Some(tx)) })
                .await;

            Mutex::new(Some(rx))
        })
        .await;
}

/// Waits for every task started with [`run`] (including the ones started meanwhile) to be done.
/// Called last thing by `#[espruino_runner::runtime]`.
///
/// Failed tasks are reported on stderr.
pub async fn wait_for_tasks() {
    // The receiver is taken out of its cell while waiting: no lock is held across awaits.
    let receiver = RUNTIME_RX.get().and_then(|cell| cell.lock().take());
    let Some(mut receiver) = receiver else {
        error!("{}", RuntimeError);
        return;
    };

    while let Ok(mut task_receiver) = receiver.try_recv() {
        if let Some(TaskResult::Err(err)) = task_receiver.recv().await {
            error!("Task failed: {}", err);
            eprintln!("Task failed: {:?}", err.to_string());
        }
    }

    if let Some(cell) = RUNTIME_RX.get() {
        *cell.lock() = Some(receiver);
    }
}

/// Runs a given future as a Tokio task while ensuring the main function (marked by `#[espruino_runner::runtime]`)
/// will not finish before all running tasks are done.
/// This is done by using a globally accessible channel to communicate the handlers to be waited by the
/// runtime.
///
/// # Parameters
/// * `future`: A future that implements `Future<Output = ()>` (or `Result<(), Error>`), `Send`, and has a `'static` lifetime.
///
/// # Errors
/// `RuntimeError` if called outside the runtime (no tokio runtime or no task channel).
///
/// # Example
/// ```no_run
/// use espruino_runner::utils::task;
///
/// #[espruino_runner::runtime]
/// async fn main() {
///     task::run(async move {
///         // whatever
///     }).unwrap();
/// }
/// ```
pub fn run<F, T>(future: F) -> Result<TaskHandler, Error>
where
    F: Future<Output = T> + Send + 'static,
    T: Into<TaskResult> + Send + 'static,
{
    let runtime = Handle::try_current().map_err(|_| RuntimeError)?;
    let cell = RUNTIME_TX.get().ok_or(RuntimeError)?;
    let mut lock = cell.lock();
    let runtime_tx = lock.as_mut().ok_or(RuntimeError)?;

    // Create a transmitter(tx)/receiver(rx) unique to this task.
    let (task_tx, task_rx) = tokio::sync::mpsc::unbounded_channel();

    // Register the receiver(rx) side first: the runtime must know about the task before it can end.
    runtime_tx.send(task_rx).map_err(|err| Unknown {
        info: err.to_string(),
    })?;

    let handler = runtime.spawn(async move {
        let result = future.await.into();
        task_tx.send(result).map_err(|err| Unknown {
            info: err.to_string(),
        })?;
        Ok(())
    });

    Ok(handler)
}

#[macro_export]
macro_rules! pause {
    ($ms:expr) => {
        tokio::time::sleep(tokio::time::Duration::from_millis($ms as u64)).await
    };
}
