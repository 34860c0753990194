//! HTTP handlers, one module per resource.

pub mod banner;
pub mod centres;
pub mod chairman;
pub mod contact;
pub mod course;
pub mod faq;
pub mod hallticket;
pub mod mission_vision;
pub mod multipart;
pub mod notices;
pub mod question_paper;

use crate::error::AppError;
use uuid::Uuid;

pub(crate) fn parse_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::BadRequest("invalid uuid".into()))
}
