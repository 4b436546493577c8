//! Core modules shared by the provisioning and document pipelines.
//!
//! Configuration, the table model and service seam, the header-preserving
//! writer and the embedded document assets all live here.

pub mod assets;
pub mod config;
pub mod error;
pub mod header;
pub mod memory;
pub mod output;
pub mod service;
pub mod table;
pub mod time;
