// src/extractors/mod.rs
pub mod subsidiaries;

pub use subsidiaries::{ParsedSubsidiary, SubsidiaryExtractor};
