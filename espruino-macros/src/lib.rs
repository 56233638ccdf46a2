//! Defines espruino-runner runtime macros.

extern crate proc_macro;

use proc_macro::TokenStream;

use crate::internals::{runtime_macro, TokioMode};

mod internals;

/// Macro definition for the espruino-runner runtime.
///
/// This macro should probably be used once only in a project above your main.
/// It replaces the original tokio [`#[tokio::main]`] which it depends on.
///
/// _Executes the entire function inside a tokio runtime and waits, before returning, for every
/// task started in the background (using `task::run`): the espruino-cli relays and the
/// event callbacks included._
///
/// # Example
/// ```ignore
/// #[espruino_runner::runtime]
/// async fn main() {
///     // whatever
/// }
/// ```
#[proc_macro_attribute]
pub fn runtime(_: TokenStream, item: TokenStream) -> TokenStream {
    runtime_macro(item.into(), TokioMode::Main).into()
}

/// Same as `#[espruino_macros::runtime]` but for tests.
///
/// Tests are serialized since the task runtime is process-wide.
#[proc_macro_attribute]
pub fn test(_: TokenStream, item: TokenStream) -> TokenStream {
    runtime_macro(item.into(), TokioMode::Test).into()
}
