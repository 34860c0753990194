//! Hall-ticket issuance and expiry. Every ticket gets a globally unique
//! number from the persisted counter; the notification email is fire-and-forget.

use crate::error::AppError;
use crate::mailer::{ticket_email_html, Mailer, TICKET_EMAIL_SUBJECT};
use crate::service::ticket_number::ticket_number;
use crate::service::validation;
use crate::store;
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const TICKET_COLUMNS: &str = "id, name, father_name, dob, ssc_hall_ticket_no, mobile, email, \
     mother_name, community, aadhar_no, parent_no, gender, district, hall_ticket_number, \
     issued_at, expires_at";

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct HallTicket {
    pub id: Uuid,
    pub name: String,
    pub father_name: String,
    pub dob: String,
    pub ssc_hall_ticket_no: String,
    pub mobile: String,
    pub email: String,
    pub mother_name: String,
    pub community: String,
    pub aadhar_no: String,
    pub parent_no: String,
    pub gender: String,
    pub district: String,
    pub hall_ticket_number: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Registrant details plus the caller-supplied payment flag. Everything is
/// defaulted so missing fields reach validation instead of a decode rejection.
#[derive(Clone, Debug, Deserialize)]
pub struct GenerateTicketRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub father_name: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub ssc_hall_ticket_no: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mother_name: String,
    #[serde(default)]
    pub community: String,
    #[serde(default)]
    pub aadhar_no: String,
    #[serde(default)]
    pub parent_no: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub months_selected: u32,
    #[serde(default)]
    pub is_payment_done: bool,
}

pub struct TicketService;

impl TicketService {
    /// Issue a ticket. The payment flag and registrant fields are checked
    /// before any state is touched; only then is the counter incremented, the
    /// number formatted, the row inserted, and the email dispatched from a
    /// detached task.
    pub async fn issue(
        pool: &PgPool,
        mailer: Arc<dyn Mailer>,
        req: GenerateTicketRequest,
    ) -> Result<HallTicket, AppError> {
        if !req.is_payment_done {
            return Err(AppError::PaymentRequired(
                "payment must be completed before a hall ticket is generated".into(),
            ));
        }
        validation::require("name", &req.name)?;
        validation::require_mobile("mobile", &req.mobile)?;
        validation::require_email("email", &req.email)?;
        validation::require("district", &req.district)?;
        if req.months_selected < 1 {
            return Err(AppError::Validation(
                "months_selected must be at least 1".into(),
            ));
        }

        let issued_at = Utc::now();
        let expires_at = expiry_after(issued_at, req.months_selected)
            .ok_or_else(|| AppError::Validation("months_selected is out of range".into()))?;
        let sequence = store::next_sequence(pool, store::HALL_TICKET_COUNTER).await?;
        let number = ticket_number(issued_at.date_naive(), &req.district, sequence);

        let sql = format!(
            "INSERT INTO hall_tickets ({TICKET_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {TICKET_COLUMNS}"
        );
        let ticket: HallTicket = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&req.name)
            .bind(&req.father_name)
            .bind(&req.dob)
            .bind(&req.ssc_hall_ticket_no)
            .bind(&req.mobile)
            .bind(&req.email)
            .bind(&req.mother_name)
            .bind(&req.community)
            .bind(&req.aadhar_no)
            .bind(&req.parent_no)
            .bind(&req.gender)
            .bind(&req.district)
            .bind(&number)
            .bind(issued_at)
            .bind(expires_at)
            .fetch_one(pool)
            .await?;
        tracing::info!(
            hall_ticket_number = %ticket.hall_ticket_number,
            sequence,
            "hall ticket issued"
        );

        let email_ticket = ticket.clone();
        tokio::spawn(async move {
            let html = ticket_email_html(&email_ticket);
            if let Err(e) = mailer
                .send(&email_ticket.email, TICKET_EMAIL_SUBJECT, html)
                .await
            {
                tracing::warn!(
                    error = %e,
                    hall_ticket_number = %email_ticket.hall_ticket_number,
                    "ticket email failed"
                );
            }
        });

        Ok(ticket)
    }

    pub async fn fetch_by_number(
        pool: &PgPool,
        hall_ticket_number: &str,
    ) -> Result<Option<HallTicket>, AppError> {
        let sql =
            format!("SELECT {TICKET_COLUMNS} FROM hall_tickets WHERE hall_ticket_number = $1");
        Ok(sqlx::query_as(&sql)
            .bind(hall_ticket_number)
            .fetch_optional(pool)
            .await?)
    }
}

/// Calendar-month expiry. Day-of-month overflow clamps to the last day of the
/// target month, so a ticket issued on Jan 31 with one month expires Feb 28/29.
pub fn expiry_after(start: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    start.checked_add_months(Months::new(months))
}

/// Expired strictly after the expiry instant; at the instant the ticket is
/// still valid.
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > expires_at
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn expiry_boundary_is_strict() {
        let expires = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(!is_expired(expires, expires - Duration::seconds(1)));
        assert!(!is_expired(expires, expires));
        assert!(is_expired(expires, expires + Duration::seconds(1)));
    }

    #[test]
    fn month_end_overflow_clamps() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 31, 10, 30, 0).unwrap();
        assert_eq!(
            expiry_after(issued, 1).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 29, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn mid_month_expiry_lands_on_the_same_day() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        assert_eq!(
            expiry_after(issued, 6).unwrap(),
            Utc.with_ymd_and_hms(2024, 7, 15, 8, 0, 0).unwrap()
        );
    }
}
