//! REST backend for an educational institute's public site: hall ticket
//! issuance with sequential numbering, exam centre directories, and the
//! content sections the site renders (banners, courses, FAQs, notices).

pub mod error;
pub mod handlers;
pub mod mailer;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod state;
pub mod storage;
pub mod store;

pub use error::AppError;
pub use mailer::{LogMailer, Mailer, SmtpMailer};
pub use response::{success_many, success_one};
pub use service::tickets::{HallTicket, TicketService};
pub use settings::Settings;
pub use state::AppState;
pub use storage::ObjectStorage;
pub use store::{ensure_database, ensure_tables};
