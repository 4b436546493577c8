//! DynamoDB-backed [`TableService`].
//!
//! The SDK is async; this adapter owns a current-thread tokio runtime and
//! blocks on each request so the provisioner stays a plain synchronous
//! check-then-act sequence. `ResourceNotFoundException` and
//! `ResourceInUseException` are mapped onto [`TableLookup::Absent`] and
//! [`CreateResult::Conflict`].

use crate::core::config::ProvisionConfig;
use crate::core::error::EsfError;
use crate::core::service::{CreateResult, ServiceError, TableLookup, TableService};
use crate::core::table::{
    AttributeKind, BillingMode, KeyAttribute, Projection, SecondaryIndex, TableDescriptor,
};
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode as SdkBillingMode, GlobalSecondaryIndex, KeySchemaElement,
    KeyType, Projection as SdkProjection, ProjectionType, ProvisionedThroughput,
    ScalarAttributeType, TableDescription,
};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

const CREDENTIALS_PROVIDER_NAME: &str = "esf-bootstrap-static";

pub struct DynamoTableService {
    client: Client,
    runtime: Runtime,
}

impl DynamoTableService {
    pub fn connect(config: &ProvisionConfig) -> Result<Self, EsfError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EsfError::IoError)?;

        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );
        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .endpoint_url(config.endpoint.clone())
                .region(Region::new(config.region.clone()))
                .credentials_provider(credentials)
                .load(),
        );
        debug!(endpoint = %config.endpoint, region = %config.region, "dynamodb client configured");

        Ok(Self {
            client: Client::new(&sdk_config),
            runtime,
        })
    }
}

impl TableService for DynamoTableService {
    fn list_tables(&self) -> Result<Vec<String>, ServiceError> {
        let out = self
            .runtime
            .block_on(self.client.list_tables().send())
            .map_err(|e| ServiceError::Request(DisplayErrorContext(&e).to_string()))?;
        Ok(out.table_names().to_vec())
    }

    fn describe_table(&self, name: &str) -> Result<TableLookup, ServiceError> {
        match self
            .runtime
            .block_on(self.client.describe_table().table_name(name).send())
        {
            Ok(out) => match out.table() {
                Some(table) => Ok(TableLookup::Found(descriptor_from_description(table))),
                None => Err(ServiceError::Request(format!(
                    "describe_table({}) returned no table description",
                    name
                ))),
            },
            Err(err) => match err.as_service_error() {
                Some(e) if e.is_resource_not_found_exception() => Ok(TableLookup::Absent),
                _ => Err(ServiceError::Request(DisplayErrorContext(&err).to_string())),
            },
        }
    }

    fn create_table(&self, descriptor: &TableDescriptor) -> Result<CreateResult, ServiceError> {
        let request = build_create_request(&self.client, descriptor)
            .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;
        match self.runtime.block_on(request.send()) {
            Ok(_) => Ok(CreateResult::Created),
            Err(err) => match err.as_service_error() {
                Some(e) if e.is_resource_in_use_exception() => Ok(CreateResult::Conflict),
                _ => Err(ServiceError::Request(DisplayErrorContext(&err).to_string())),
            },
        }
    }
}

fn scalar_type(kind: AttributeKind) -> ScalarAttributeType {
    match kind {
        AttributeKind::String => ScalarAttributeType::S,
        AttributeKind::Number => ScalarAttributeType::N,
        AttributeKind::Binary => ScalarAttributeType::B,
    }
}

fn key_element(name: &str, key_type: KeyType) -> Result<KeySchemaElement, BuildError> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
}

fn attribute_definition(attr: &KeyAttribute) -> Result<AttributeDefinition, BuildError> {
    AttributeDefinition::builder()
        .attribute_name(&attr.name)
        .attribute_type(scalar_type(attr.kind))
        .build()
}

fn projection(projection: &Projection) -> SdkProjection {
    match projection {
        Projection::All => SdkProjection::builder()
            .projection_type(ProjectionType::All)
            .build(),
        Projection::KeysOnly => SdkProjection::builder()
            .projection_type(ProjectionType::KeysOnly)
            .build(),
        Projection::Include(attrs) => SdkProjection::builder()
            .projection_type(ProjectionType::Include)
            .set_non_key_attributes(Some(attrs.clone()))
            .build(),
    }
}

fn throughput(read: i64, write: i64) -> Result<ProvisionedThroughput, BuildError> {
    ProvisionedThroughput::builder()
        .read_capacity_units(read)
        .write_capacity_units(write)
        .build()
}

fn global_index(
    index: &SecondaryIndex,
    billing: BillingMode,
) -> Result<GlobalSecondaryIndex, BuildError> {
    let mut builder = GlobalSecondaryIndex::builder()
        .index_name(&index.name)
        .key_schema(key_element(&index.partition_key.name, KeyType::Hash)?)
        .projection(projection(&index.projection));
    if let Some(sort_key) = &index.sort_key {
        builder = builder.key_schema(key_element(&sort_key.name, KeyType::Range)?);
    }
    if let BillingMode::Provisioned { read, write } = billing {
        builder = builder.provisioned_throughput(throughput(read, write)?);
    }
    builder.build()
}

fn build_create_request(
    client: &Client,
    descriptor: &TableDescriptor,
) -> Result<aws_sdk_dynamodb::operation::create_table::builders::CreateTableFluentBuilder, BuildError>
{
    let mut request = client
        .create_table()
        .table_name(&descriptor.name)
        .key_schema(key_element(&descriptor.partition_key.name, KeyType::Hash)?);
    if let Some(sort_key) = &descriptor.sort_key {
        request = request.key_schema(key_element(&sort_key.name, KeyType::Range)?);
    }

    for attr in descriptor.attribute_definitions() {
        request = request.attribute_definitions(attribute_definition(&attr)?);
    }
    for index in &descriptor.indexes {
        request = request.global_secondary_indexes(global_index(index, descriptor.billing)?);
    }

    request = match descriptor.billing {
        BillingMode::PayPerRequest => request.billing_mode(SdkBillingMode::PayPerRequest),
        BillingMode::Provisioned { read, write } => request
            .billing_mode(SdkBillingMode::Provisioned)
            .provisioned_throughput(throughput(read, write)?),
    };
    Ok(request)
}

fn attribute_kind(table: &TableDescription, name: &str) -> AttributeKind {
    table
        .attribute_definitions()
        .iter()
        .find(|d| d.attribute_name() == name)
        .map(|d| match d.attribute_type() {
            ScalarAttributeType::N => AttributeKind::Number,
            ScalarAttributeType::B => AttributeKind::Binary,
            _ => AttributeKind::String,
        })
        .unwrap_or(AttributeKind::String)
}

fn key_attribute(
    table: &TableDescription,
    schema: &[KeySchemaElement],
    key_type: KeyType,
) -> Option<KeyAttribute> {
    schema
        .iter()
        .find(|k| *k.key_type() == key_type)
        .map(|k| KeyAttribute::new(k.attribute_name(), attribute_kind(table, k.attribute_name())))
}

/// Observed table state expressed as a descriptor so it can be compared with
/// the desired one. A missing hash key becomes an empty attribute name.
fn descriptor_from_description(table: &TableDescription) -> TableDescriptor {
    let name = table.table_name().unwrap_or_default().to_string();
    let partition_key = key_attribute(table, table.key_schema(), KeyType::Hash).unwrap_or_else(|| {
        warn!(table = %name, "described table reports no hash key");
        KeyAttribute::string("")
    });
    let sort_key = key_attribute(table, table.key_schema(), KeyType::Range);

    let mut indexes = Vec::new();
    for gsi in table.global_secondary_indexes() {
        let index_name = gsi.index_name().unwrap_or_default().to_string();
        let pk = key_attribute(table, gsi.key_schema(), KeyType::Hash)
            .unwrap_or_else(|| KeyAttribute::string(""));
        let sk = key_attribute(table, gsi.key_schema(), KeyType::Range);
        let projection = match gsi.projection().and_then(|p| p.projection_type()) {
            Some(ProjectionType::KeysOnly) => Projection::KeysOnly,
            Some(ProjectionType::Include) => Projection::Include(
                gsi.projection()
                    .map(|p| p.non_key_attributes().to_vec())
                    .unwrap_or_default(),
            ),
            _ => Projection::All,
        };
        indexes.push(SecondaryIndex {
            name: index_name,
            partition_key: pk,
            sort_key: sk,
            projection,
        });
    }

    let billing = match table
        .billing_mode_summary()
        .and_then(|s| s.billing_mode())
    {
        Some(SdkBillingMode::Provisioned) | None => match table.provisioned_throughput() {
            Some(tp) if tp.read_capacity_units().unwrap_or(0) > 0 => BillingMode::Provisioned {
                read: tp.read_capacity_units().unwrap_or(0),
                write: tp.write_capacity_units().unwrap_or(0),
            },
            _ => BillingMode::PayPerRequest,
        },
        Some(_) => BillingMode::PayPerRequest,
    };

    TableDescriptor {
        name,
        partition_key,
        sort_key,
        indexes,
        billing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::{BillingModeSummary, GlobalSecondaryIndexDescription};

    fn described_application_table() -> TableDescription {
        TableDescription::builder()
            .table_name("enterprise-data")
            .key_schema(key_element("PK", KeyType::Hash).unwrap())
            .key_schema(key_element("SK", KeyType::Range).unwrap())
            .attribute_definitions(attribute_definition(&KeyAttribute::string("PK")).unwrap())
            .attribute_definitions(attribute_definition(&KeyAttribute::string("SK")).unwrap())
            .attribute_definitions(attribute_definition(&KeyAttribute::string("GSI1PK")).unwrap())
            .attribute_definitions(attribute_definition(&KeyAttribute::string("GSI1SK")).unwrap())
            .global_secondary_indexes(
                GlobalSecondaryIndexDescription::builder()
                    .index_name("GSI1")
                    .key_schema(key_element("GSI1PK", KeyType::Hash).unwrap())
                    .key_schema(key_element("GSI1SK", KeyType::Range).unwrap())
                    .projection(projection(&Projection::All))
                    .build(),
            )
            .billing_mode_summary(
                BillingModeSummary::builder()
                    .billing_mode(SdkBillingMode::PayPerRequest)
                    .build(),
            )
            .build()
    }

    #[test]
    fn description_converts_to_matching_descriptor() {
        let observed = descriptor_from_description(&described_application_table());
        let desired = TableDescriptor::application_table("enterprise-data");
        assert!(desired.same_key_schema(&observed));
        assert_eq!(observed, desired);
    }

    #[test]
    fn hash_only_table_is_still_described() {
        let table = TableDescription::builder()
            .table_name("enterprise-data")
            .key_schema(key_element("id", KeyType::Hash).unwrap())
            .build();
        let observed = descriptor_from_description(&table);
        assert_eq!(observed.partition_key, KeyAttribute::string("id"));
        assert_eq!(observed.sort_key, None);
        assert!(!observed.same_key_schema(&TableDescriptor::application_table("enterprise-data")));
    }

    #[test]
    fn index_without_range_key_is_still_described() {
        let table = TableDescription::builder()
            .table_name("enterprise-data")
            .key_schema(key_element("PK", KeyType::Hash).unwrap())
            .key_schema(key_element("SK", KeyType::Range).unwrap())
            .global_secondary_indexes(
                GlobalSecondaryIndexDescription::builder()
                    .index_name("byEmail")
                    .key_schema(key_element("email", KeyType::Hash).unwrap())
                    .projection(projection(&Projection::KeysOnly))
                    .build(),
            )
            .build();
        let observed = descriptor_from_description(&table);
        assert_eq!(observed.indexes.len(), 1);
        assert_eq!(observed.indexes[0].partition_key, KeyAttribute::string("email"));
        assert_eq!(observed.indexes[0].sort_key, None);
        assert_eq!(observed.indexes[0].projection, Projection::KeysOnly);
    }

    #[test]
    fn global_index_carries_throughput_only_when_provisioned() {
        let index = &TableDescriptor::application_table("t").indexes[0];
        let on_demand = global_index(index, BillingMode::PayPerRequest).unwrap();
        assert!(on_demand.provisioned_throughput().is_none());

        let provisioned = global_index(index, BillingMode::Provisioned { read: 5, write: 5 }).unwrap();
        let tp = provisioned.provisioned_throughput().unwrap();
        assert_eq!(tp.read_capacity_units(), 5);
        assert_eq!(tp.write_capacity_units(), 5);
    }

    #[test]
    fn include_projection_keeps_attributes() {
        let p = projection(&Projection::Include(vec!["email".to_string()]));
        assert_eq!(p.projection_type(), Some(&ProjectionType::Include));
        assert_eq!(p.non_key_attributes(), ["email".to_string()]);
    }
}
