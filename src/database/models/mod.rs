pub mod appointment;
mod macros;
pub mod page;
pub mod user;

// Re-export all models for easy importing
pub use appointment::*;
pub use page::*;
pub use user::*;
