pub mod brief;
pub mod content;
pub mod outline;
pub mod user;
