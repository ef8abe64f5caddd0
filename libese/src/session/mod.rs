// libese/libese/src/session/mod.rs

//! Session handle and its builder.

pub mod builder;
pub mod handle;

pub use builder::SessionBuilder;
pub use handle::{Closed, Opened, Session};
