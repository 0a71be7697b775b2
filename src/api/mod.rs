//! API module - HTTP routes, handlers, models and pages

pub mod handlers;
pub mod models;
pub mod pages;
pub mod routes;
