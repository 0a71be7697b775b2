//! Session authentication - credentials, tokens, sessions and quotas

pub mod manager;
pub mod quota;
pub mod token;

pub use manager::{AuthManager, Session, SessionData};
pub use quota::{QuotaDecision, QuotaKind, QuotaLedger};
pub use token::{TokenClaims, TokenSigner};
