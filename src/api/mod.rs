/*
 * Responsibility
 * - HTTP surface: routes, handlers, extractors, dto
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{PROTECTED_PATHS, routes};
