//! Client for the remote proof-generation service.
//!
//! The service answers `GET <base_url>?pairs=<ids>` with `{"proof": "0x…"}`.
//! This crate performs exactly one request per call; retries belong to the
//! caller.

mod client;
mod config;
mod error;
mod payload;

pub use client::ProofServiceClient;
pub use config::ProofServiceConfig;
pub use error::ProofFetchError;
pub use payload::{ProofPayload, parse_proof_response};
