//! Client code for petrel.
//!
//! This crate provides the outbound HTTP side of the worker: the `Fetcher`
//! trait the resolver and sync replayer talk to, and its reqwest-backed
//! implementation.

pub mod fetch;

pub use fetch::{FetchConfig, Fetcher, HttpFetcher};
