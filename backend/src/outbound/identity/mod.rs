//! HTTP adapter for the identity provider port.

mod dto;
mod workos_http_client;

pub use workos_http_client::WorkosHttpClient;
