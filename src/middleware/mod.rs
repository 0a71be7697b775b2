//! Request middleware

pub mod session;

pub use session::{require_session, GateMode, SessionRejection};
