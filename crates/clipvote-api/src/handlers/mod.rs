//! HTTP request handlers.

pub mod auth;
pub mod health;
pub mod rankings;
pub mod videos;
pub mod votes;
