//! Single-pass document activity reports over account exports

pub mod cli;
pub mod parsers;
pub mod services;
pub mod types;
