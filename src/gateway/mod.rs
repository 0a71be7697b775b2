//! Gateway module - request serialization queue and worker

pub mod queue;

pub use queue::{ChatGateway, ChatTask};
