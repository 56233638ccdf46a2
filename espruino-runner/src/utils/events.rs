//! Defines espruino-runner event manager system.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use log::warn;
use parking_lot::Mutex;

use crate::errors::Error;
use crate::utils::task;

type SyncedCallbackMap = Mutex<HashMap<String, Vec<CallbackWrapper>>>;
pub type EventHandler = usize;

#[derive(Clone, Default)]
pub struct EventManager {
    callbacks: Arc<SyncedCallbackMap>,
    next_id: Arc<AtomicUsize>,
}

struct CallbackWrapper {
    id: EventHandler,
    callback: Box<
        dyn FnMut(Arc<dyn Any + Send + Sync>) -> BoxFuture<'static, Result<(), Error>> + Send,
    >,
}

impl EventManager {
    /// Register event handler for a specific event name.
    ///
    /// # Parameters
    /// * `event` - The event name (any type that matches an Into<String>)
    /// * `callback` - An async moved callback that accepts a single parameter as an argument.
    ///                The argument can be anything that might be both `Send + Sync`.
    ///                You can trick multiple parameters by turning them in a single tuple.
    ///
    /// # Return
    /// Returns an EventHandler that can be used by the `unregister()` method.
    ///
    /// # Errors
    /// If the event handler does not match the expected emitted payload type exactly it will not
    /// be called (a warning is logged).
    ///
    /// # Example
    ///
    /// ```
    /// use espruino_runner::utils::EventManager;
    ///
    /// let events: EventManager = Default::default();
    ///
    /// events.on("exit", |code: i32| async move {
    ///     println!("Exited with {}", code);
    ///     Ok(())
    /// });
    /// ```
    pub fn on<S, F, T, Fut>(&self, event: S, mut callback: F) -> EventHandler
    where
        S: Into<String>,
        T: 'static + Send + Sync + Clone,
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        let event_name = event.into();
        let callback_event = event_name.clone();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        // Boxes the callback and downcast its parameter.
        let boxed_callback = Box::new(move |arg: Arc<dyn Any + Send + Sync>| {
            match arg.downcast::<T>() {
                Ok(arg) => (callback)((*arg).clone()).boxed(),
                Err(_) => {
                    warn!(
                        "The callback for event '{}' could not be called because parameter does not match",
                        callback_event
                    );
                    async { Ok::<(), Error>(()) }.boxed()
                }
            }
        });

        self.callbacks
            .lock()
            .entry(event_name)
            .or_default()
            .push(CallbackWrapper {
                id,
                callback: boxed_callback,
            });

        id
    }

    /// Invoke all event handlers registered for a specific event name.
    /// Each handler runs as its own task (see [`task::run`]): this method does not wait for them.
    ///
    /// # Parameters
    /// * `event`:  The event name (any type that matches an `Into<String>`)
    /// * `payload`: The event payload (must be `'static + Send + Sync`)
    pub fn emit<S, T>(&self, event: S, payload: T)
    where
        S: Into<String>,
        T: 'static + Send + Sync,
    {
        let event_name = event.into();
        let payload: Arc<dyn Any + Send + Sync> = Arc::new(payload);
        if let Some(callbacks) = self.callbacks.lock().get_mut(&event_name) {
            for wrapper in callbacks.iter_mut() {
                let future = (wrapper.callback)(payload.clone());
                if let Err(err) = task::run(future) {
                    warn!("Event '{}' handler could not run: {}", event_name, err);
                }
            }
        }
    }

    /// Unregister a given handler if found.
    pub fn unregister(&self, handler: EventHandler) {
        self.callbacks
            .lock()
            .values_mut()
            .for_each(|v| v.retain(|cb| cb.id != handler));
    }
}

impl Debug for EventManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let callbacks = self.callbacks.lock();
        let mut events: Vec<(&String, usize)> = callbacks
            .iter()
            .map(|(event, handlers)| (event, handlers.len()))
            .collect();
        events.sort();
        f.debug_struct("EventManager")
            .field("callbacks", &events)
            .finish()
    }
}
