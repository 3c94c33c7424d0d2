pub mod access;
pub mod auth;
pub mod calendar;
pub mod notifications;
pub mod validation;

pub use auth::AuthService;
pub use calendar::CalendarGrid;
pub use notifications::{LogMailer, MailSink, Notifier, NotifyAction};
