use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::database::models::Appointment;
use crate::error::AppError;

/// A month laid out as a grid of weeks. Rows hold seven cells indexed by
/// day-of-week (0 = Sunday); cells outside the month are 0. Appointments are
/// bucketed by day-of-month in the order they were supplied.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[u32; 7]>,
    pub appointments_by_day: BTreeMap<u32, Vec<Appointment>>,
    pub prev: MonthRef,
    pub next: MonthRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

/// First day of the month and first day of the following month, forming the
/// half-open range used by the month query.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::BadRequest(format!(
            "Month must be between 1 and 12, got {}",
            month
        )));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid year {}", year)))?;
    let next = next_month(year, month);
    let first_of_next = NaiveDate::from_ymd_opt(next.year, next.month, 1)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid year {}", next.year)))?;
    Ok((first, first_of_next))
}

pub fn prev_month(year: i32, month: u32) -> MonthRef {
    if month == 1 {
        MonthRef {
            year: year - 1,
            month: 12,
        }
    } else {
        MonthRef {
            year,
            month: month - 1,
        }
    }
}

pub fn next_month(year: i32, month: u32) -> MonthRef {
    if month == 12 {
        MonthRef {
            year: year + 1,
            month: 1,
        }
    } else {
        MonthRef {
            year,
            month: month + 1,
        }
    }
}

impl CalendarGrid {
    /// Lay out `candidates` on the month grid. The candidate set must
    /// already be restricted to this month (and to the viewer); the builder
    /// only buckets and arranges.
    pub fn build(year: i32, month: u32, candidates: Vec<Appointment>) -> Result<Self, AppError> {
        let (first, first_of_next) = month_bounds(year, month)?;
        let days_in_month = (first_of_next - first).num_days() as u32;
        let leading = first.weekday().num_days_from_sunday();

        let mut weeks: Vec<[u32; 7]> = Vec::new();
        let mut week = [0u32; 7];
        let mut slot = leading as usize;
        for day in 1..=days_in_month {
            week[slot] = day;
            slot += 1;
            if slot == 7 {
                weeks.push(week);
                week = [0u32; 7];
                slot = 0;
            }
        }
        if slot > 0 {
            weeks.push(week);
        }

        let mut appointments_by_day: BTreeMap<u32, Vec<Appointment>> = BTreeMap::new();
        for appointment in candidates {
            if let Some(date) = appointment.scheduled_date {
                appointments_by_day
                    .entry(date.day())
                    .or_default()
                    .push(appointment);
            }
        }

        Ok(CalendarGrid {
            year,
            month,
            weeks,
            appointments_by_day,
            prev: prev_month(year, month),
            next: next_month(year, month),
        })
    }
}
