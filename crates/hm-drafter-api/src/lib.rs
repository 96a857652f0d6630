// Library root: the HiveMind tournament API client and its payload decoding.

pub mod client;
pub mod parse;
pub mod tournament;

pub use client::{ApiConfig, HiveMindClient, DEFAULT_BASE_URL};
pub use tournament::Tournament;
