use esf_bootstrap::core::memory::{Fault, MemoryTableService};
use esf_bootstrap::core::service::{TableLookup, TableService};
use esf_bootstrap::core::table::{KeyAttribute, TableDescriptor};
use esf_bootstrap::plugins::provision::{
    ProvisionFailure, ProvisionStage, ProvisioningOutcome, ResourceProvisioner,
};
use std::sync::{Arc, Barrier};
use std::thread;

fn t1() -> TableDescriptor {
    TableDescriptor::new("t1", KeyAttribute::string("PK"), KeyAttribute::string("SK"))
}

#[test]
fn ensure_creates_then_reports_existing() {
    let provisioner = ResourceProvisioner::new(MemoryTableService::new());

    assert_eq!(provisioner.ensure(&t1()), ProvisioningOutcome::Created);
    assert_eq!(provisioner.ensure(&t1()), ProvisioningOutcome::AlreadyExists);
    assert_eq!(provisioner.service().create_calls(), 1);

    match provisioner.service().describe_table("t1").unwrap() {
        TableLookup::Found(observed) => {
            assert_eq!(observed.partition_key, KeyAttribute::string("PK"));
            assert_eq!(observed.sort_key, Some(KeyAttribute::string("SK")));
            assert!(observed.same_key_schema(&t1()));
        }
        TableLookup::Absent => panic!("t1 should exist after ensure"),
    }
}

#[test]
fn application_table_is_created_with_its_index() {
    let svc = MemoryTableService::new();
    let desired = TableDescriptor::application_table("enterprise-data");
    assert_eq!(
        ResourceProvisioner::new(&svc).ensure(&desired),
        ProvisioningOutcome::Created
    );
    match svc.describe_table("enterprise-data").unwrap() {
        TableLookup::Found(observed) => assert_eq!(observed, desired),
        TableLookup::Absent => panic!("table missing"),
    }
}

#[test]
fn unreachable_service_fails_fast_without_creating() {
    let svc = MemoryTableService::with_fault(Fault::Unreachable("connection refused".into()));
    let outcome = ResourceProvisioner::new(&svc).ensure(&t1());

    assert_eq!(
        outcome,
        ProvisioningOutcome::Failed(ProvisionFailure::ServiceUnreachable(
            "connection refused".into()
        ))
    );
    assert_eq!(svc.create_calls(), 0);
}

#[test]
fn unexpected_describe_error_propagates() {
    let svc = MemoryTableService::with_fault(Fault::DescribeFails("AccessDenied".into()));
    let outcome = ResourceProvisioner::new(&svc).ensure(&t1());

    assert_eq!(
        outcome,
        ProvisioningOutcome::Failed(ProvisionFailure::Describe("AccessDenied".into()))
    );
    assert_eq!(svc.create_calls(), 0);
}

#[test]
fn creation_error_is_reported_verbatim() {
    let svc = MemoryTableService::with_fault(Fault::CreateFails(
        "ValidationException: One or more parameter values were invalid".into(),
    ));
    let outcome = ResourceProvisioner::new(&svc).ensure(&t1());
    match outcome {
        ProvisioningOutcome::Failed(ProvisionFailure::Creation(reason)) => {
            assert_eq!(reason, "ValidationException: One or more parameter values were invalid");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn losing_the_creation_race_counts_as_existing() {
    let svc = MemoryTableService::with_fault(Fault::ConcurrentCreate);
    let outcome = ResourceProvisioner::new(&svc).ensure(&t1());

    assert_eq!(outcome, ProvisioningOutcome::AlreadyExists);
    assert_eq!(svc.create_calls(), 1);
}

#[test]
fn concurrent_provisioners_converge_on_one_creation() {
    let svc = Arc::new(MemoryTableService::new());
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let svc = Arc::clone(&svc);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ResourceProvisioner::new(svc.as_ref()).ensure(&t1())
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("provisioner thread"))
        .collect();

    assert!(outcomes.iter().all(ProvisioningOutcome::is_success));
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| **o == ProvisioningOutcome::Created)
            .count(),
        1
    );
    assert_eq!(svc.list_tables().unwrap(), vec!["t1".to_string()]);
}

#[test]
fn existing_table_with_different_key_schema_is_left_alone() {
    let existing = TableDescriptor::hash_only("enterprise-data", KeyAttribute::string("id"));
    let svc = MemoryTableService::new().with_table(existing.clone());

    let outcome =
        ResourceProvisioner::new(&svc).ensure(&TableDescriptor::application_table("enterprise-data"));

    assert_eq!(outcome, ProvisioningOutcome::AlreadyExists);
    assert_eq!(svc.create_calls(), 0);
    assert_eq!(
        svc.describe_table("enterprise-data").unwrap(),
        TableLookup::Found(existing)
    );
}

#[test]
fn stages_are_reported_in_order() {
    let svc = MemoryTableService::new();
    let provisioner = ResourceProvisioner::new(&svc);
    let desired = t1();

    let mut stages = Vec::new();
    let outcome = provisioner.ensure_with(&desired, |stage| stages.push(stage));
    assert_eq!(outcome, ProvisioningOutcome::Created);
    assert_eq!(
        stages,
        vec![ProvisionStage::ServiceReachable, ProvisionStage::Creating("t1")]
    );

    let mut again = Vec::new();
    provisioner.ensure_with(&desired, |stage| again.push(stage));
    assert_eq!(again, vec![ProvisionStage::ServiceReachable]);
}

#[test]
fn unreachable_service_reports_no_stages() {
    let svc = MemoryTableService::with_fault(Fault::Unreachable("refused".into()));
    let descriptor = t1();
    let mut stages = Vec::new();
    ResourceProvisioner::new(&svc).ensure_with(&descriptor, |stage| stages.push(stage));
    assert!(stages.is_empty());
}
