use std::sync::{Arc, Barrier};
use std::thread;

use chrono::NaiveDate;
use lettings::occupancy::{
    AssignmentEngine, AssignmentPolicy, EngineError, InMemoryStore, LandlordId, LeaseStatus,
    LeaseTerms, LettingsStore, NullNotifier, Occupancy, Property, PropertyId, PropertyStatus,
    Reconciler, TenancyType, Tenant, TenantId,
};

fn landlord() -> LandlordId {
    LandlordId("landlord-001".to_string())
}

fn terms(monthly_rent: f64) -> LeaseTerms {
    LeaseTerms {
        start_date: NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date"),
        end_date: NaiveDate::from_ymd_opt(2027, 1, 31),
        monthly_rent,
        security_deposit: monthly_rent * 1.2,
        tenancy_type: TenancyType::AssuredShorthold,
        rent_due_day: Some(1),
    }
}

fn tenant(id: &str) -> Tenant {
    Tenant {
        id: TenantId(id.to_string()),
        landlord: landlord(),
        full_name: "Alex Morgan".to_string(),
        employment: None,
        affordability: None,
        right_to_rent_verified: true,
        leases: Vec::new(),
        revision: 0,
    }
}

fn single_unit_property(id: &str) -> Property {
    Property {
        id: PropertyId(id.to_string()),
        landlord: landlord(),
        address: "7 Weaver Street".to_string(),
        units: Vec::new(),
        occupancy: Some(Occupancy::vacant()),
        status: PropertyStatus::Available,
        revision: 0,
    }
}

fn engine_with_store() -> (
    Arc<AssignmentEngine<InMemoryStore, NullNotifier>>,
    Arc<InMemoryStore>,
) {
    let store = Arc::new(InMemoryStore::new());
    let engine = Arc::new(AssignmentEngine::new(
        store.clone(),
        Arc::new(NullNotifier),
        AssignmentPolicy::default(),
    ));
    (engine, store)
}

#[test]
fn assign_then_unassign_round_trip_stays_consistent() {
    let (engine, store) = engine_with_store();
    store.insert_tenant(tenant("t-1")).expect("seed tenant");
    store
        .insert_property(single_unit_property("p-1"))
        .expect("seed property");

    engine
        .assign(
            &TenantId("t-1".to_string()),
            &PropertyId("p-1".to_string()),
            None,
            terms(1500.0),
            &landlord(),
        )
        .expect("assignment succeeds");

    let property = store
        .property(&PropertyId("p-1".to_string()), &landlord())
        .expect("load")
        .expect("present");
    assert_eq!(property.status, PropertyStatus::Occupied);
    let occupancy = property.occupancy.as_ref().expect("occupancy set");
    assert!(occupancy.is_occupied);
    assert_eq!(occupancy.tenant, Some(TenantId("t-1".to_string())));

    let stored = store
        .tenant(&TenantId("t-1".to_string()), &landlord())
        .expect("load")
        .expect("present");
    assert_eq!(stored.leases.len(), 1);
    assert_eq!(stored.leases[0].status, LeaseStatus::Active);
    assert_eq!(stored.leases[0].property, PropertyId("p-1".to_string()));

    engine
        .unassign(
            &TenantId("t-1".to_string()),
            &PropertyId("p-1".to_string()),
            None,
            &landlord(),
            Some("end of fixed term".to_string()),
        )
        .expect("unassignment succeeds");

    let property = store
        .property(&PropertyId("p-1".to_string()), &landlord())
        .expect("load")
        .expect("present");
    assert_eq!(property.status, PropertyStatus::Available);
    assert!(!property.slot_occupied(None));

    let stored = store
        .tenant(&TenantId("t-1".to_string()), &landlord())
        .expect("load")
        .expect("present");
    assert_eq!(stored.leases[0].status, LeaseStatus::Terminated);

    // Already consistent, so the repair pass finds nothing to do.
    let report = Reconciler::new(store)
        .sync_tenant_assignments(&landlord())
        .expect("scan runs");
    assert_eq!(report.synced_count, 0);
}

#[test]
fn drift_is_repaired_from_the_lease_log() {
    let (_, store) = engine_with_store();

    // Simulate drift: an active lease written without the engine, so the
    // property side never learned about it.
    let mut drifted = tenant("t-1");
    drifted.leases.push(lettings::occupancy::Lease {
        property: PropertyId("p-1".to_string()),
        unit: None,
        status: LeaseStatus::Active,
        start_date: NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date"),
        end_date: None,
        monthly_rent: 1500.0,
        security_deposit: 1800.0,
        tenancy_type: TenancyType::AssuredShorthold,
        rent_due_day: Some(1),
        termination_date: None,
        termination_reason: None,
    });
    store.insert_tenant(drifted).expect("seed tenant");
    store
        .insert_property(single_unit_property("p-1"))
        .expect("seed property");

    let reconciler = Reconciler::new(store.clone());
    let report = reconciler
        .sync_tenant_assignments(&landlord())
        .expect("scan runs");
    assert_eq!(report.synced_count, 1);

    let property = store
        .property(&PropertyId("p-1".to_string()), &landlord())
        .expect("load")
        .expect("present");
    assert_eq!(
        property.slot_tenant(None),
        Some(&TenantId("t-1".to_string()))
    );

    let repeat = reconciler
        .sync_tenant_assignments(&landlord())
        .expect("scan runs");
    assert_eq!(repeat.synced_count, 0);
}

#[test]
fn racing_assignments_resolve_to_exactly_one_winner() {
    let (engine, store) = engine_with_store();
    store.insert_tenant(tenant("t-1")).expect("seed tenant");
    store.insert_tenant(tenant("t-2")).expect("seed tenant");
    store
        .insert_property(single_unit_property("p-1"))
        .expect("seed property");

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = ["t-1", "t-2"]
        .into_iter()
        .map(|tenant_id| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            let tenant_id = TenantId(tenant_id.to_string());
            thread::spawn(move || {
                barrier.wait();
                engine.assign(
                    &tenant_id,
                    &PropertyId("p-1".to_string()),
                    None,
                    terms(1500.0),
                    &landlord(),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread completes"))
        .collect();

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1, "exactly one racing assignment may commit");
    let loser = results
        .iter()
        .find_map(|result| result.as_ref().err())
        .expect("one racer loses");
    assert!(
        matches!(
            loser,
            EngineError::AlreadyOccupied | EngineError::DuplicateLease | EngineError::Contention
        ),
        "loser observes the committed state, got {loser:?}"
    );

    // Exactly one active lease exists and it matches the pointer.
    let tenants = store.tenants(&landlord()).expect("tenants load");
    let active: Vec<_> = tenants
        .iter()
        .flat_map(|tenant| tenant.active_leases().map(move |lease| (tenant, lease)))
        .collect();
    assert_eq!(active.len(), 1);
    let property = store
        .property(&PropertyId("p-1".to_string()), &landlord())
        .expect("load")
        .expect("present");
    assert_eq!(property.slot_tenant(None), Some(&active[0].0.id));
}

#[test]
fn force_unassign_recovers_a_partially_drifted_tenant() {
    let (engine, store) = engine_with_store();

    // One real assignment plus one dangling pointer from a failed edit.
    store.insert_tenant(tenant("t-1")).expect("seed tenant");
    store
        .insert_property(single_unit_property("p-1"))
        .expect("seed property");
    let mut orphaned = single_unit_property("p-2");
    orphaned.occupancy = Some(Occupancy {
        is_occupied: true,
        tenant: Some(TenantId("t-1".to_string())),
        lease_start: None,
        lease_end: None,
    });
    orphaned.status = PropertyStatus::Occupied;
    store.insert_property(orphaned).expect("seed property");

    engine
        .assign(
            &TenantId("t-1".to_string()),
            &PropertyId("p-1".to_string()),
            None,
            terms(1500.0),
            &landlord(),
        )
        .expect("assignment succeeds");

    let outcome = engine
        .force_unassign_tenant(&TenantId("t-1".to_string()), &landlord())
        .expect("cleanup runs");
    assert_eq!(outcome.leases_terminated, 1);
    assert_eq!(outcome.properties_updated, 2);

    for id in ["p-1", "p-2"] {
        let property = store
            .property(&PropertyId(id.to_string()), &landlord())
            .expect("load")
            .expect("present");
        assert!(!property.slot_occupied(None), "{id} is released");
        assert_eq!(property.status, PropertyStatus::Available);
    }

    let repeat = engine
        .force_unassign_tenant(&TenantId("t-1".to_string()), &landlord())
        .expect("cleanup is repeatable");
    assert_eq!(repeat.leases_terminated, 0);
    assert_eq!(repeat.properties_updated, 0);
}
