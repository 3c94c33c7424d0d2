use uuid::Uuid;

use crate::database::models::Appointment;
use crate::error::AppError;

/// Mutating operations guarded by the ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Edit,
    Delete,
    StatusUpdate,
}

impl Operation {
    fn verb(&self) -> &'static str {
        match self {
            Operation::Edit => "edit",
            Operation::Delete => "delete",
            Operation::StatusUpdate => "update the status of",
        }
    }
}

/// A record with no owner predates the owner column and is open to anyone;
/// otherwise only the owner may act on it.
pub fn is_owner(user_id: Uuid, appointment: &Appointment) -> bool {
    match appointment.owner_id {
        None => true,
        Some(owner) => owner == user_id,
    }
}

/// Gate a mutating operation on ownership. Denial is surfaced as a 403,
/// distinct from not-found, so callers never mutate on a failed check.
pub fn authorize(
    user_id: Uuid,
    appointment: &Appointment,
    operation: Operation,
) -> Result<(), AppError> {
    if is_owner(user_id, appointment) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(format!(
            "You may only {} your own appointments",
            operation.verb()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::AppointmentStatus;
    use chrono::Utc;

    fn appointment(owner_id: Option<Uuid>) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: 1,
            owner_id,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: None,
            phone: None,
            title: "Test Appointment".to_string(),
            description: String::new(),
            status: AppointmentStatus::Pending,
            scheduled_date: None,
            scheduled_time: None,
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
    fn owner_may_perform_every_operation() {
        let user = Uuid::new_v4();
        let appt = appointment(Some(user));
        for op in [Operation::Edit, Operation::Delete, Operation::StatusUpdate] {
            assert!(authorize(user, &appt, op).is_ok());
        }
    }

    #[test]
    fn non_owner_is_denied() {
        let appt = appointment(Some(Uuid::new_v4()));
        let other = Uuid::new_v4();
        for op in [Operation::Edit, Operation::Delete, Operation::StatusUpdate] {
            let err = authorize(other, &appt, op).unwrap_err();
            assert!(matches!(err, AppError::PermissionDenied(_)));
        }
    }

    #[test]
    fn ownerless_records_are_open_to_anyone() {
        let appt = appointment(None);
        assert!(authorize(Uuid::new_v4(), &appt, Operation::Delete).is_ok());
    }
}
