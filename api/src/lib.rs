//! HTTP surface for the Tokenwarden token lifecycle engine

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod routes;
pub mod telemetry;
