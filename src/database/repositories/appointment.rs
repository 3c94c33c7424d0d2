use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{
    models::{
        page::{clamp_page, total_pages},
        Appointment, AppointmentInput, AppointmentStatus, Page,
    },
    utils::sql,
};

const APPOINTMENT_COLUMNS: &str = r#"
    id,
    owner_id,
    first_name,
    last_name,
    email,
    phone,
    title,
    description,
    status,
    scheduled_date,
    scheduled_time,
    address,
    city,
    state,
    zip_code,
    notes,
    created_at,
    updated_at
"#;

/// Filters applied by the list query. All fields are optional; `owner`
/// restricts visibility to records owned by that user plus ownerless
/// (public) records.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub owner: Option<Uuid>,
    pub search: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new appointment owned by `owner_id`.
    pub async fn create(
        &self,
        owner_id: Option<Uuid>,
        input: AppointmentInput,
    ) -> Result<Appointment> {
        let now = Utc::now();
        let status = input.status.unwrap_or(AppointmentStatus::Pending);

        let appointment = sqlx::query_as::<_, Appointment>(&sql(&format!(
            r#"
            INSERT INTO
                appointments (
                    owner_id,
                    first_name,
                    last_name,
                    email,
                    phone,
                    title,
                    description,
                    status,
                    scheduled_date,
                    scheduled_time,
                    address,
                    city,
                    state,
                    zip_code,
                    notes,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                {APPOINTMENT_COLUMNS}
            "#
        )))
        .bind(owner_id)
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.email)
        .bind(input.phone)
        .bind(input.title)
        .bind(input.description)
        .bind(status)
        .bind(input.scheduled_date)
        .bind(input.scheduled_time)
        .bind(input.address)
        .bind(input.city)
        .bind(input.state)
        .bind(input.zip_code)
        .bind(input.notes)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(appointment)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>> {
        let appointment = sqlx::query_as::<_, Appointment>(&sql(&format!(
            r#"
            SELECT
                {APPOINTMENT_COLUMNS}
            FROM
                appointments
            WHERE
                id = ?
            "#
        )))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment)
    }

    /// Replace the editable fields of an appointment. Owner and creation
    /// timestamp are never touched; `updated_at` advances. The caller decides
    /// the resulting `status`; `input.status` is ignored here.
    pub async fn update(
        &self,
        id: i64,
        input: AppointmentInput,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>> {
        let now = Utc::now();

        let appointment = sqlx::query_as::<_, Appointment>(&sql(&format!(
            r#"
            UPDATE appointments
            SET
                first_name = ?,
                last_name = ?,
                email = ?,
                phone = ?,
                title = ?,
                description = ?,
                status = ?,
                scheduled_date = ?,
                scheduled_time = ?,
                address = ?,
                city = ?,
                state = ?,
                zip_code = ?,
                notes = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                {APPOINTMENT_COLUMNS}
            "#
        )))
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.email)
        .bind(input.phone)
        .bind(input.title)
        .bind(input.description)
        .bind(status)
        .bind(input.scheduled_date)
        .bind(input.scheduled_time)
        .bind(input.address)
        .bind(input.city)
        .bind(input.state)
        .bind(input.zip_code)
        .bind(input.notes)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment)
    }

    /// Status-only transition, leaving every other field as-is.
    pub async fn update_status(
        &self,
        id: i64,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>> {
        let now = Utc::now();

        let appointment = sqlx::query_as::<_, Appointment>(&sql(&format!(
            r#"
            UPDATE appointments
            SET
                status = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                {APPOINTMENT_COLUMNS}
            "#
        )))
        .bind(status)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment)
    }

    /// Delete an appointment. Returns false when no row matched.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(&sql("DELETE FROM appointments WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Filtered, ordered, paginated listing. Ordering is newest schedule
    /// first (date desc, then time desc, unscheduled records last); the
    /// requested page is clamped into the valid range.
    pub async fn list(
        &self,
        filter: &AppointmentFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Page<Appointment>> {
        let (where_clause, params) = build_filter_clause(filter);

        let count_query = format!("SELECT COUNT(*) FROM appointments{where_clause}");
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count = count.bind(param);
        }
        let total = count.fetch_one(&self.pool).await?;

        let pages = total_pages(total, page_size);
        let page = clamp_page(page, pages);
        let offset = (page - 1) * page_size;

        let list_query = format!(
            r#"SELECT {columns} FROM appointments{where_clause}
               ORDER BY scheduled_date DESC NULLS LAST, scheduled_time DESC NULLS LAST, id DESC
               LIMIT ${limit} OFFSET ${offset}"#,
            columns = APPOINTMENT_COLUMNS,
            where_clause = where_clause,
            limit = params.len() + 1,
            offset = params.len() + 2,
        );

        let mut prepared = sqlx::query_as::<_, Appointment>(&list_query);
        for param in &params {
            prepared = prepared.bind(param);
        }
        let items = prepared
            .bind(page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items,
            page,
            page_size,
            total,
            total_pages: pages,
        })
    }

    /// All appointments visible to `owner` that fall inside the given month,
    /// in calendar order. The caller (the grid builder) does no filtering of
    /// its own.
    pub async fn list_for_month(
        &self,
        owner: Option<Uuid>,
        first_of_month: NaiveDate,
        first_of_next: NaiveDate,
    ) -> Result<Vec<Appointment>> {
        let filter = AppointmentFilter {
            owner,
            ..Default::default()
        };
        let (mut where_clause, mut params) = build_filter_clause(&filter);

        let range = format!(
            "scheduled_date >= ${}::date AND scheduled_date < ${}::date",
            params.len() + 1,
            params.len() + 2
        );
        if where_clause.is_empty() {
            where_clause = format!(" WHERE {range}");
        } else {
            where_clause.push_str(" AND ");
            where_clause.push_str(&range);
        }
        params.push(first_of_month.to_string());
        params.push(first_of_next.to_string());

        let query = format!(
            r#"SELECT {APPOINTMENT_COLUMNS} FROM appointments{where_clause}
               ORDER BY scheduled_date ASC, scheduled_time ASC NULLS LAST, id ASC"#
        );

        let mut prepared = sqlx::query_as::<_, Appointment>(&query);
        for param in &params {
            prepared = prepared.bind(param);
        }
        let appointments = prepared.fetch_all(&self.pool).await?;

        Ok(appointments)
    }
}

/// Escape ILIKE metacharacters so a search term matches literally once it is
/// wrapped in `%` wildcards.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Build the WHERE clause and its text-bound parameters for a filter. Typed
/// columns take an explicit cast so every parameter can travel as text.
fn build_filter_clause(filter: &AppointmentFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(owner) = filter.owner {
        conditions.push(format!(
            "(owner_id = ${}::uuid OR owner_id IS NULL)",
            params.len() + 1
        ));
        params.push(owner.to_string());
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let idx = params.len() + 1;
        conditions.push(format!(
            "(first_name ILIKE ${idx} OR last_name ILIKE ${idx} OR email ILIKE ${idx} \
             OR title ILIKE ${idx} OR description ILIKE ${idx})"
        ));
        params.push(format!("%{}%", escape_like(search.trim())));
    }

    if let Some(status) = filter.status {
        conditions.push(format!("status = ${}", params.len() + 1));
        params.push(status.to_string());
    }

    if let Some(date) = filter.date {
        conditions.push(format!("scheduled_date = ${}::date", params.len() + 1));
        params.push(date.to_string());
    }

    if conditions.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), params)
    }
}
