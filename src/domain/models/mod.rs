mod action;
mod backend;
mod direction;
mod event;
mod history;
mod session;
mod slash_commands;

pub use action::*;
pub use backend::*;
pub use direction::*;
pub use event::*;
pub use history::*;
pub use session::*;
pub use slash_commands::*;
