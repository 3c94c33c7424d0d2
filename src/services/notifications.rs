use std::sync::Arc;

use crate::database::models::Appointment;

/// What happened to the record, selecting the message template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyAction {
    Created,
    Updated,
    StatusChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Delivery seam for outgoing mail. The application only ever hands a fully
/// rendered message to the sink; whatever the sink does with it is its own
/// business.
pub trait MailSink: Send + Sync {
    fn deliver(&self, message: &MailMessage) -> anyhow::Result<()>;
}

/// Default sink: writes the message to the application log. Stands in for a
/// real SMTP relay in development and test environments.
pub struct LogMailer;

impl MailSink for LogMailer {
    fn deliver(&self, message: &MailMessage) -> anyhow::Result<()> {
        log::info!(
            "mail to={} subject={:?} body={:?}",
            message.to.join(","),
            message.subject,
            message.body
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn MailSink>,
    from: String,
}

impl Notifier {
    pub fn new(sink: Arc<dyn MailSink>, from: String) -> Self {
        Self { sink, from }
    }

    /// Send the per-action notification for an appointment. Best-effort by
    /// policy: a record without an email address is skipped silently, and a
    /// failing sink is logged and ignored so the triggering operation never
    /// fails on account of mail.
    pub fn notify(&self, appointment: &Appointment, action: NotifyAction) {
        let Some(email) = appointment.email.as_deref().filter(|e| !e.trim().is_empty()) else {
            return;
        };

        let message = MailMessage {
            from: self.from.clone(),
            to: vec![email.to_string()],
            subject: render_subject(appointment, action),
            body: render_body(appointment, action),
        };

        if let Err(err) = self.sink.deliver(&message) {
            log::warn!(
                "Failed to deliver {:?} notification for appointment {}: {}",
                action,
                appointment.id,
                err
            );
        }
    }
}

fn render_subject(appointment: &Appointment, action: NotifyAction) -> String {
    match action {
        NotifyAction::Created => format!("Appointment scheduled: {}", appointment.title),
        NotifyAction::Updated => format!("Appointment updated: {}", appointment.title),
        NotifyAction::StatusChanged => format!(
            "Appointment {}: {}",
            appointment.status.as_str(),
            appointment.title
        ),
    }
}

fn render_body(appointment: &Appointment, action: NotifyAction) -> String {
    let when = match (appointment.scheduled_date, appointment.scheduled_time) {
        (Some(date), Some(time)) => format!("{} at {}", date, time.format("%H:%M")),
        (Some(date), None) => date.to_string(),
        _ => "unscheduled".to_string(),
    };

    let lead = match action {
        NotifyAction::Created => "your appointment has been scheduled",
        NotifyAction::Updated => "your appointment details have changed",
        NotifyAction::StatusChanged => "the status of your appointment has changed",
    };

    format!(
        "Hello {},\n\n\
         This is a confirmation that {}.\n\n\
         Title:  {}\n\
         When:   {}\n\
         Status: {}\n",
        appointment.full_name(),
        lead,
        appointment.title,
        when,
        appointment.status.label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::AppointmentStatus;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct RecordingSink {
        delivered: Mutex<Vec<MailMessage>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                delivered: Mutex::new(Vec::new()),
            })
        }
    }

    impl MailSink for RecordingSink {
        fn deliver(&self, message: &MailMessage) -> anyhow::Result<()> {
            self.delivered.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl MailSink for FailingSink {
        fn deliver(&self, _message: &MailMessage) -> anyhow::Result<()> {
            anyhow::bail!("smtp connection refused")
        }
    }

    fn appointment(email: Option<&str>) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: 7,
            owner_id: None,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: email.map(str::to_string),
            phone: None,
            title: "Dental cleaning".to_string(),
            description: String::new(),
            status: AppointmentStatus::Confirmed,
            scheduled_date: NaiveDate::from_ymd_opt(2024, 7, 4),
            scheduled_time: NaiveTime::from_hms_opt(9, 30, 0),
            address: None,
            city: None,
            state: None,
            zip_code: None,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn delivers_rendered_message_to_sink() {
        let sink = RecordingSink::new();
        let notifier = Notifier::new(sink.clone(), "noreply@example.com".to_string());

        notifier.notify(&appointment(Some("john@example.com")), NotifyAction::Created);

        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        let message = &delivered[0];
        assert_eq!(message.from, "noreply@example.com");
        assert_eq!(message.to, vec!["john@example.com".to_string()]);
        assert_eq!(message.subject, "Appointment scheduled: Dental cleaning");
        assert!(message.body.contains("John Doe"));
        assert!(message.body.contains("2024-07-04 at 09:30"));
        assert!(message.body.contains("Confirmed"));
    }

    #[test]
    fn status_change_subject_names_the_new_status() {
        let sink = RecordingSink::new();
        let notifier = Notifier::new(sink.clone(), "noreply@example.com".to_string());

        notifier.notify(
            &appointment(Some("john@example.com")),
            NotifyAction::StatusChanged,
        );

        let delivered = sink.delivered.lock().unwrap();
        assert_eq!(
            delivered[0].subject,
            "Appointment confirmed: Dental cleaning"
        );
    }

    #[test]
    fn skips_records_without_an_email() {
        let sink = RecordingSink::new();
        let notifier = Notifier::new(sink.clone(), "noreply@example.com".to_string());

        notifier.notify(&appointment(None), NotifyAction::Created);
        notifier.notify(&appointment(Some("  ")), NotifyAction::Updated);

        assert!(sink.delivered.lock().unwrap().is_empty());
    }

    #[test]
    fn sink_failures_are_swallowed() {
        let notifier = Notifier::new(Arc::new(FailingSink), "noreply@example.com".to_string());

        // Must not panic or propagate.
        notifier.notify(&appointment(Some("john@example.com")), NotifyAction::Created);
    }

    #[test]
    fn unscheduled_appointments_render_without_a_date() {
        let mut appt = appointment(Some("john@example.com"));
        appt.scheduled_date = None;
        appt.scheduled_time = None;

        let body = render_body(&appt, NotifyAction::Updated);
        assert!(body.contains("When:   unscheduled"));
    }
}
