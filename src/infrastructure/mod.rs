pub mod observability;
pub mod status_command;
pub mod web;

pub use status_command::StatusCommand;
