pub mod dashboard;
pub mod events;
pub mod theme;
pub mod watch;
