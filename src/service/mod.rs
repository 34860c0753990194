//! Business logic: ticket issuance, the exam-centre tree, field validation.

pub mod centres;
pub mod ticket_number;
pub mod tickets;
pub mod validation;

pub use tickets::TicketService;
