//! Desired-state description of the application table.
//!
//! A [`TableDescriptor`] is built once at startup and handed to the
//! provisioner. It describes what the table should look like, not what the
//! service currently reports; backends convert their observed state into the
//! same type so the two can be compared directly.

use serde::Serialize;
use std::fmt;

/// Attribute type of a key attribute (DynamoDB scalar types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttributeKind {
    String,
    Number,
    Binary,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            AttributeKind::String => "S",
            AttributeKind::Number => "N",
            AttributeKind::Binary => "B",
        };
        write!(f, "{}", code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyAttribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl KeyAttribute {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, AttributeKind::String)
    }
}

/// Which attributes a secondary index copies from the base table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Projection {
    All,
    KeysOnly,
    Include(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryIndex {
    pub name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
    pub projection: Projection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BillingMode {
    PayPerRequest,
    Provisioned { read: i64, write: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    pub name: String,
    pub partition_key: KeyAttribute,
    /// `None` for a hash-only key schema.
    pub sort_key: Option<KeyAttribute>,
    pub indexes: Vec<SecondaryIndex>,
    pub billing: BillingMode,
}

impl TableDescriptor {
    /// Composite-key table with no secondary indexes, billed per request.
    pub fn new(name: impl Into<String>, partition_key: KeyAttribute, sort_key: KeyAttribute) -> Self {
        Self {
            name: name.into(),
            partition_key,
            sort_key: Some(sort_key),
            indexes: Vec::new(),
            billing: BillingMode::PayPerRequest,
        }
    }

    /// Table keyed by partition key alone.
    pub fn hash_only(name: impl Into<String>, partition_key: KeyAttribute) -> Self {
        Self {
            name: name.into(),
            partition_key,
            sort_key: None,
            indexes: Vec::new(),
            billing: BillingMode::PayPerRequest,
        }
    }

    pub fn with_index(mut self, index: SecondaryIndex) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn with_billing(mut self, billing: BillingMode) -> Self {
        self.billing = billing;
        self
    }

    /// The single-table layout the application expects: `PK`/`SK` plus one
    /// overloaded global index `GSI1` projecting every attribute.
    pub fn application_table(name: impl Into<String>) -> Self {
        Self::new(name, KeyAttribute::string("PK"), KeyAttribute::string("SK")).with_index(
            SecondaryIndex {
                name: "GSI1".to_string(),
                partition_key: KeyAttribute::string("GSI1PK"),
                sort_key: Some(KeyAttribute::string("GSI1SK")),
                projection: Projection::All,
            },
        )
    }

    /// Every key attribute of the table and its indexes, first occurrence wins.
    pub fn attribute_definitions(&self) -> Vec<KeyAttribute> {
        let mut defs: Vec<KeyAttribute> = Vec::new();
        let keys = std::iter::once(&self.partition_key)
            .chain(self.sort_key.as_ref())
            .chain(
                self.indexes
                    .iter()
                    .flat_map(|idx| std::iter::once(&idx.partition_key).chain(idx.sort_key.as_ref())),
            );
        for key in keys {
            if !defs.iter().any(|d| d.name == key.name) {
                defs.push(key.clone());
            }
        }
        defs
    }

    /// True when `other` has the same primary and index key schema.
    /// Billing and projections are not compared.
    pub fn same_key_schema(&self, other: &TableDescriptor) -> bool {
        self.name == other.name
            && self.partition_key == other.partition_key
            && self.sort_key == other.sort_key
            && self.indexes.len() == other.indexes.len()
            && self.indexes.iter().all(|idx| {
                other.indexes.iter().any(|o| {
                    o.name == idx.name
                        && o.partition_key == idx.partition_key
                        && o.sort_key == idx.sort_key
                })
            })
    }
}
