pub mod appointment;
pub mod user;

// Re-export all repositories for easy importing
pub use appointment::{AppointmentFilter, AppointmentRepository};
pub use user::UserRepository;
