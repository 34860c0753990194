//! Hall-ticket endpoints: generate, expiry check, fetch, and download.

use crate::error::AppError;
use crate::mailer::html_escape;
use crate::response::{success_one, success_one_ok};
use crate::service::tickets::{is_expired, GenerateTicketRequest, HallTicket, TicketService};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = TicketService::issue(&state.pool, state.mailer.clone(), req).await?;
    Ok(success_one(ticket))
}

#[derive(Deserialize)]
pub struct CheckExpiryRequest {
    #[serde(default)]
    pub hall_ticket_number: String,
}

#[derive(Serialize)]
struct ExpiryStatus {
    hall_ticket_number: String,
    expiry_date: String,
    is_expired: bool,
}

pub async fn check_expiry(
    State(state): State<AppState>,
    Json(req): Json<CheckExpiryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let number = req.hall_ticket_number.trim();
    if number.is_empty() {
        return Err(AppError::BadRequest("hall_ticket_number is required".into()));
    }
    let ticket = TicketService::fetch_by_number(&state.pool, number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("hall ticket {number}")))?;
    Ok(success_one_ok(ExpiryStatus {
        hall_ticket_number: ticket.hall_ticket_number,
        expiry_date: ticket.expires_at.date_naive().to_string(),
        is_expired: is_expired(ticket.expires_at, Utc::now()),
    }))
}

pub async fn fetch(
    State(state): State<AppState>,
    Path(hall_ticket_number): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = TicketService::fetch_by_number(&state.pool, &hall_ticket_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("hall ticket {hall_ticket_number}")))?;
    Ok(success_one_ok(ticket))
}

/// Renders the stored ticket as a self-contained HTML document served as an
/// attachment.
pub async fn download(
    State(state): State<AppState>,
    Path(hall_ticket_number): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = TicketService::fetch_by_number(&state.pool, &hall_ticket_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("hall ticket {hall_ticket_number}")))?;
    let html = ticket_document_html(&ticket);
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "text/html; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename={}_hall_ticket.html",
                    ticket.hall_ticket_number
                ),
            ),
        ],
        html,
    ))
}

fn ticket_document_html(ticket: &HallTicket) -> String {
    let row = |label: &str, value: &str| {
        format!(
            "<tr><th style=\"text-align:left;padding:8px;border:1px solid #333;background:#f0f0f0;width:40%\">{}</th>\
             <td style=\"padding:8px;border:1px solid #333\">{}</td></tr>",
            label,
            html_escape(value)
        )
    };
    let rows = [
        row("Hall Ticket Number", &ticket.hall_ticket_number),
        row("Name", &ticket.name),
        row("Father's Name", &ticket.father_name),
        row("Mother's Name", &ticket.mother_name),
        row("Date of Birth", &ticket.dob),
        row("Gender", &ticket.gender),
        row("Community", &ticket.community),
        row("SSC Hall Ticket No", &ticket.ssc_hall_ticket_no),
        row("Aadhar No", &ticket.aadhar_no),
        row("Mobile", &ticket.mobile),
        row("Parent's Mobile", &ticket.parent_no),
        row("Email", &ticket.email),
        row("District", &ticket.district),
        row("Issued On", &ticket.issued_at.date_naive().to_string()),
        row("Valid Till", &ticket.expires_at.date_naive().to_string()),
    ]
    .join("\n");
    format!(
        "<!DOCTYPE html>\
         <html><head><meta charset=\"utf-8\"><title>Hall Ticket {number}</title></head>\
         <body style=\"font-family:Arial,sans-serif;margin:40px\">\
         <h1 style=\"text-align:center;border-bottom:3px solid #004080;padding-bottom:12px\">Hall Ticket</h1>\
         <table style=\"border-collapse:collapse;width:100%\">{rows}</table>\
         <p style=\"margin-top:24px;font-size:12px\">This document must be presented together \
         with a government-issued photo ID at the examination centre.</p>\
         </body></html>",
        number = html_escape(&ticket.hall_ticket_number),
        rows = rows
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn document_renders_every_identity_field() {
        let ticket = HallTicket {
            id: Uuid::new_v4(),
            name: "Asha Rao".into(),
            father_name: "Ravi Rao".into(),
            dob: "2002-09-01".into(),
            ssc_hall_ticket_no: "SSC42".into(),
            mobile: "9876543210".into(),
            email: "asha@example.com".into(),
            mother_name: "Lakshmi Rao".into(),
            community: "BC-B".into(),
            aadhar_no: "999912345678".into(),
            parent_no: "9876543211".into(),
            gender: "F".into(),
            district: "Warangal".into(),
            hall_ticket_number: "20240115WL0003".into(),
            issued_at: Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap(),
            expires_at: Utc.with_ymd_and_hms(2024, 7, 15, 6, 0, 0).unwrap(),
        };
        let html = ticket_document_html(&ticket);
        for field in [
            "20240115WL0003",
            "Asha Rao",
            "Ravi Rao",
            "Lakshmi Rao",
            "9876543210",
            "Warangal",
            "2024-01-15",
            "2024-07-15",
        ] {
            assert!(html.contains(field), "missing {field}");
        }
    }
}
