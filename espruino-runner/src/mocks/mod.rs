pub mod console;
pub mod launcher;
