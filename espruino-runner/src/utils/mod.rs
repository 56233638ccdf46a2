pub use tokio;
pub use tokio::time::sleep;

pub use crate::utils::events::{EventHandler, EventManager};

pub mod events;
pub mod task;
