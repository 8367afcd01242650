pub mod actions;
pub mod clipboard;
mod history_store;
mod session_manager;

pub use history_store::*;
pub use session_manager::*;
