use employees_kernel::replay::audit_index;
use employees_kernel::{
    ContractError, Employee, EmployeesContract, InMemoryPrivateDataStore, StaticIdentity,
    TransactionContext, TransientInput,
};

fn hire(name: &str) -> TransientInput {
    TransientInput::new()
        .with("name", name)
        .with("surname", "Doe")
        .with("dni", "123")
        .with("hiringDate", "2020-01-01")
}

#[tokio::test]
async fn create_read_verify_delete_round() {
    let identity = StaticIdentity::new("Org1MSP");
    let contract = EmployeesContract::new(InMemoryPrivateDataStore::new());

    let ctx = TransactionContext::resolve(&identity, hire("J"));
    contract.create_employees(&ctx, "001").await.unwrap();

    let read_ctx = TransactionContext::resolve(&identity, TransientInput::new());
    let employee = contract.read_employees(&read_ctx, "001").await.unwrap();
    assert_eq!(employee, Employee::new("J", "Doe", 123, "2020-01-01"));

    // Another organization verifies without seeing content.
    let auditor = TransactionContext::for_org("Org2MSP");
    assert!(contract
        .verify_employees(&auditor, "Org1MSP", "001", &employee)
        .await
        .unwrap());

    let forged = Employee {
        name: "X".into(),
        ..employee.clone()
    };
    assert!(!contract
        .verify_employees(&auditor, "Org1MSP", "001", &forged)
        .await
        .unwrap());

    // Auditor cannot read Org1's record from its own partition.
    let err = contract.read_employees(&auditor, "001").await.unwrap_err();
    assert!(matches!(err, ContractError::NotFound { .. }));

    contract.delete_employees(&read_ctx, "001").await.unwrap();
    assert!(!contract.employees_exists(&read_ctx, "001").await.unwrap());

    let err = contract
        .verify_employees(&auditor, "Org1MSP", "001", &employee)
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::NoCommitment { .. }));
}

#[tokio::test]
async fn verify_tracks_most_recent_write() {
    let ctx = TransactionContext::for_org("one");
    let contract = EmployeesContract::new(InMemoryPrivateDataStore::new());

    contract
        .create_employees(&ctx.clone().with_transient(hire("A")), "001")
        .await
        .unwrap();
    contract
        .update_employees(&ctx.clone().with_transient(hire("B")), "001")
        .await
        .unwrap();

    let old = Employee::new("A", "Doe", 123, "2020-01-01");
    let new = Employee::new("B", "Doe", 123, "2020-01-01");

    assert!(!contract.verify_employees(&ctx, "one", "001", &old).await.unwrap());
    assert!(contract.verify_employees(&ctx, "one", "001", &new).await.unwrap());
}

#[tokio::test]
async fn store_history_replays_to_live_index() {
    let ctx = TransactionContext::for_org("one");
    let contract = EmployeesContract::new(InMemoryPrivateDataStore::new());

    for key in ["001", "002", "003"] {
        contract
            .create_employees(&ctx.clone().with_transient(hire(key)), key)
            .await
            .unwrap();
    }
    contract
        .update_employees(&ctx.clone().with_transient(hire("Z")), "002")
        .await
        .unwrap();
    contract.delete_employees(&ctx, "003").await.unwrap();

    let store = contract.store();
    let report = audit_index(&store.commitment_log().await, &store.commitment_index().await)
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(report.events_replayed, 5);
    assert_eq!(report.keys, 2);
}
