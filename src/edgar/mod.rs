// src/edgar/mod.rs
pub mod client;
pub mod fetcher;
pub mod models;

pub use client::{EdgarClient, EdgarEndpoints};
pub use fetcher::{EdgarFetcher, FetchConfig, RatePolicy};
