pub mod app;
pub mod components;
pub mod format;
pub mod layout;
pub mod notifications;
pub mod terminal;
pub mod theme;
pub mod views;

pub use app::{App, Command};
pub use terminal::{init as init_terminal, restore as restore_terminal, Tui};
