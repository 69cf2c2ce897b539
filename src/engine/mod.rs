//! Core engine modules for taskchain.

pub mod chain;
pub mod clock;
pub mod db;
pub mod error;
pub mod import;
pub mod memory;
pub mod report;
pub mod repo;
pub mod sequence;
pub mod task;
pub mod types;
