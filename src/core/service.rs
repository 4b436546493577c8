//! Table service seam used by the provisioner.
//!
//! The "not found" and "already exists" conditions are ordinary data here
//! ([`TableLookup::Absent`], [`CreateResult::Conflict`]); only genuinely
//! unexpected failures travel in the `Err` arm.

use crate::core::table::TableDescriptor;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The request reached the transport layer and failed there or at the service.
    #[error("{0}")]
    Request(String),
    /// The request could not be built from the descriptor.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLookup {
    Found(TableDescriptor),
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateResult {
    Created,
    /// A table with this name already exists.
    Conflict,
}

pub trait TableService {
    /// Lightweight introspection call, used as a liveness probe.
    fn list_tables(&self) -> Result<Vec<String>, ServiceError>;

    fn describe_table(&self, name: &str) -> Result<TableLookup, ServiceError>;

    /// Create the table with its full key schema, indexes and billing mode in one call.
    fn create_table(&self, descriptor: &TableDescriptor) -> Result<CreateResult, ServiceError>;
}

impl<T: TableService + ?Sized> TableService for &T {
    fn list_tables(&self) -> Result<Vec<String>, ServiceError> {
        (**self).list_tables()
    }

    fn describe_table(&self, name: &str) -> Result<TableLookup, ServiceError> {
        (**self).describe_table(name)
    }

    fn create_table(&self, descriptor: &TableDescriptor) -> Result<CreateResult, ServiceError> {
        (**self).create_table(descriptor)
    }
}
