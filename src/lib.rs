//! Chains of sequentially dependent tasks, with schedule status derived on
//! every read.

pub mod engine;
pub mod logging;
