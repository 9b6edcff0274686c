//! Transports carrying JSON-RPC messages to [`crate::PlaybookMcpServer`]

pub mod stdio;

#[cfg(feature = "http")]
pub mod http;
