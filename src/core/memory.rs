//! In-process [`TableService`] with the same naming semantics as DynamoDB.
//!
//! Used by the test suites. Faults can be injected to exercise every
//! provisioning branch.

use crate::core::service::{CreateResult, ServiceError, TableLookup, TableService};
use crate::core::table::TableDescriptor;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Every call fails as if the endpoint refused the connection.
    Unreachable(String),
    /// `describe_table` fails with something other than "not found".
    DescribeFails(String),
    /// `create_table` fails with something other than "already exists".
    CreateFails(String),
    /// Another process creates the table between describe and create.
    ConcurrentCreate,
}

#[derive(Debug, Default)]
pub struct MemoryTableService {
    tables: Mutex<BTreeMap<String, TableDescriptor>>,
    fault: Option<Fault>,
    create_calls: AtomicUsize,
}

impl MemoryTableService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fault(fault: Fault) -> Self {
        Self {
            fault: Some(fault),
            ..Self::default()
        }
    }

    /// Seed a table that exists before any provisioner runs.
    pub fn with_table(mut self, descriptor: TableDescriptor) -> Self {
        if let Ok(tables) = self.tables.get_mut() {
            tables.insert(descriptor.name.clone(), descriptor);
        }
        self
    }

    /// Number of `create_table` calls that reached the service.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), ServiceError> {
        match &self.fault {
            Some(Fault::Unreachable(reason)) => Err(ServiceError::Request(reason.clone())),
            _ => Ok(()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, TableDescriptor>>, ServiceError> {
        self.tables
            .lock()
            .map_err(|_| ServiceError::Request("memory table service lock poisoned".into()))
    }
}

impl TableService for MemoryTableService {
    fn list_tables(&self) -> Result<Vec<String>, ServiceError> {
        self.check_reachable()?;
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn describe_table(&self, name: &str) -> Result<TableLookup, ServiceError> {
        self.check_reachable()?;
        match &self.fault {
            Some(Fault::DescribeFails(reason)) => {
                return Err(ServiceError::Request(reason.clone()));
            }
            Some(Fault::ConcurrentCreate) => {
                let mut tables = self.lock()?;
                if !tables.contains_key(name) {
                    let racer = TableDescriptor::application_table(name);
                    tables.insert(name.to_string(), racer);
                    return Ok(TableLookup::Absent);
                }
            }
            _ => {}
        }
        Ok(match self.lock()?.get(name) {
            Some(desc) => TableLookup::Found(desc.clone()),
            None => TableLookup::Absent,
        })
    }

    fn create_table(&self, descriptor: &TableDescriptor) -> Result<CreateResult, ServiceError> {
        self.check_reachable()?;
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(Fault::CreateFails(reason)) = &self.fault {
            return Err(ServiceError::Request(reason.clone()));
        }
        let mut tables = self.lock()?;
        if tables.contains_key(&descriptor.name) {
            return Ok(CreateResult::Conflict);
        }
        tables.insert(descriptor.name.clone(), descriptor.clone());
        Ok(CreateResult::Created)
    }
}
