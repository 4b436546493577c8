//! Command implementations: table provisioning and document generation.

pub mod dynamo;
pub mod provision;
pub mod specs;
