use chrono::{Local, NaiveDate};
use clap::Args;
use std::sync::Arc;

use crate::infra::SummaryNotifier;
use lettings::error::AppError;
use lettings::occupancy::{
    check_affordability, check_income_qualification, portfolio_summary, AffordabilityAssessment,
    AssignmentEngine, AssignmentPolicy, EmploymentDetails, EngineError, InMemoryStore, LandlordId,
    Lease, LeaseStatus, LeaseTerms, LettingsStore, Occupancy, Property, PropertyId, PropertyStatus,
    Reconciler, TenancyType, Tenant, TenantId, Unit,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Lease start date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
}

const DEMO_LANDLORD: &str = "landlord-demo";

/// Seeded walkthrough of the assignment lifecycle: assign, conflict,
/// qualification, drift, repair, unassign, force-unassign.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let start_date = args
        .start_date
        .unwrap_or_else(|| Local::now().date_naive());
    let owner = LandlordId(DEMO_LANDLORD.to_string());

    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(SummaryNotifier::new(store.clone()));
    let engine = AssignmentEngine::new(store.clone(), notifier, AssignmentPolicy::default());

    seed_portfolio(&store, &owner)?;

    println!("Tenancy assignment demo ({DEMO_LANDLORD})\n");

    println!("1. Assigning tenants");
    let outcome = engine.assign(
        &TenantId("t-hart".to_string()),
        &PropertyId("p-riverside".to_string()),
        None,
        terms(start_date, 1500.0),
        &owner,
    )?;
    println!(
        "   {} -> {} ({})",
        outcome.tenant.full_name,
        outcome.property.address,
        outcome.lease.status.label()
    );

    let outcome = engine.assign(
        &TenantId("t-okafor".to_string()),
        &PropertyId("p-granary".to_string()),
        Some("2A"),
        terms(start_date, 950.0),
        &owner,
    )?;
    println!(
        "   {} -> {} unit 2A ({})",
        outcome.tenant.full_name,
        outcome.property.address,
        outcome.lease.status.label()
    );

    println!("\n2. Conflicts are surfaced, not silently resolved");
    match engine.assign(
        &TenantId("t-hart".to_string()),
        &PropertyId("p-riverside".to_string()),
        None,
        terms(start_date, 1500.0),
        &owner,
    ) {
        Err(err @ EngineError::DuplicateLease) => println!("   duplicate: {err}"),
        other => println!("   unexpected result: {other:?}"),
    }

    println!("\n3. Advisory qualification checks");
    let applicant = store
        .tenant(&TenantId("t-okafor".to_string()), &owner)
        .map_err(to_app_error)?
        .expect("seeded tenant present");
    let income = check_income_qualification(&applicant, 950.0);
    println!(
        "   income check: qualified={} ratio={:?}",
        income.qualified, income.ratio
    );
    let affordability = check_affordability(&applicant, 950.0);
    println!(
        "   affordability: affordable={} disposable_after_rent={:?}",
        affordability.affordable, affordability.disposable_after_rent
    );

    println!("\n4. Drift and repair");
    seed_drifted_tenant(&store, &owner, start_date)?;
    let report = Reconciler::new(store.clone())
        .sync_tenant_assignments(&owner)
        .map_err(to_app_error)?;
    println!("   reconciler corrected {} pointer(s)", report.synced_count);

    println!("\n5. Ending tenancies");
    let outcome = engine.unassign(
        &TenantId("t-hart".to_string()),
        &PropertyId("p-riverside".to_string()),
        None,
        &owner,
        Some("end of fixed term".to_string()),
    )?;
    println!("   {}", outcome.message);

    let cleanup = engine.force_unassign_tenant(&TenantId("t-vance".to_string()), &owner)?;
    println!(
        "   force unassign: {} lease(s) terminated, {} propert(y/ies) updated",
        cleanup.leases_terminated, cleanup.properties_updated
    );

    println!("\n6. Portfolio after the dust settles");
    let properties = store.properties(&owner).map_err(to_app_error)?;
    let tenants = store.tenants(&owner).map_err(to_app_error)?;
    let summary = portfolio_summary(&properties, &tenants);
    println!(
        "   {} properties, {}/{} slots occupied ({}%), rent roll {:.2}",
        summary.properties,
        summary.occupied_slots,
        summary.total_slots,
        summary.occupancy_rate,
        summary.monthly_rent_roll
    );

    Ok(())
}

fn to_app_error(err: lettings::occupancy::StoreError) -> AppError {
    AppError::Engine(EngineError::from(err))
}

fn terms(start_date: NaiveDate, monthly_rent: f64) -> LeaseTerms {
    LeaseTerms {
        start_date,
        end_date: start_date.checked_add_months(chrono::Months::new(12)),
        monthly_rent,
        security_deposit: monthly_rent * 1.2,
        tenancy_type: TenancyType::AssuredShorthold,
        rent_due_day: Some(1),
    }
}

fn seed_portfolio(store: &Arc<InMemoryStore>, owner: &LandlordId) -> Result<(), AppError> {
    let tenants = [
        Tenant {
            id: TenantId("t-hart".to_string()),
            landlord: owner.clone(),
            full_name: "Rowan Hart".to_string(),
            employment: Some(EmploymentDetails {
                employer: Some("Fenwick & Co".to_string()),
                gross_monthly_income: Some(4200.0),
                net_monthly_income: Some(3300.0),
            }),
            affordability: None,
            right_to_rent_verified: true,
            leases: Vec::new(),
            revision: 0,
        },
        Tenant {
            id: TenantId("t-okafor".to_string()),
            landlord: owner.clone(),
            full_name: "Chidi Okafor".to_string(),
            employment: Some(EmploymentDetails {
                employer: Some("Northline Transit".to_string()),
                gross_monthly_income: Some(3100.0),
                net_monthly_income: Some(2500.0),
            }),
            affordability: Some(AffordabilityAssessment {
                monthly_income: 3100.0,
                monthly_expenses: 900.0,
                monthly_commitments: 250.0,
            }),
            right_to_rent_verified: true,
            leases: Vec::new(),
            revision: 0,
        },
    ];
    for tenant in tenants {
        store
            .insert_tenant(tenant)
            .map_err(|err| AppError::Engine(EngineError::from(err)))?;
    }

    let properties = [
        Property {
            id: PropertyId("p-riverside".to_string()),
            landlord: owner.clone(),
            address: "14 Riverside Walk".to_string(),
            units: Vec::new(),
            occupancy: Some(Occupancy::vacant()),
            status: PropertyStatus::Available,
            revision: 0,
        },
        Property {
            id: PropertyId("p-granary".to_string()),
            landlord: owner.clone(),
            address: "Granary Court".to_string(),
            units: vec![Unit::vacant("1A"), Unit::vacant("2A"), Unit::vacant("2B")],
            occupancy: None,
            status: PropertyStatus::Available,
            revision: 0,
        },
        Property {
            id: PropertyId("p-orchard".to_string()),
            landlord: owner.clone(),
            address: "3 Orchard Lane".to_string(),
            units: Vec::new(),
            occupancy: Some(Occupancy::vacant()),
            status: PropertyStatus::Available,
            revision: 0,
        },
    ];
    for property in properties {
        store
            .insert_property(property)
            .map_err(|err| AppError::Engine(EngineError::from(err)))?;
    }
    Ok(())
}

/// A tenant whose active lease was written without the engine, plus a
/// dangling pointer left behind by a deleted tenancy: both sides of drift.
fn seed_drifted_tenant(
    store: &Arc<InMemoryStore>,
    owner: &LandlordId,
    start_date: NaiveDate,
) -> Result<(), AppError> {
    let tenant = Tenant {
        id: TenantId("t-vance".to_string()),
        landlord: owner.clone(),
        full_name: "Mira Vance".to_string(),
        employment: None,
        affordability: None,
        right_to_rent_verified: false,
        leases: vec![Lease {
            property: PropertyId("p-orchard".to_string()),
            unit: None,
            status: LeaseStatus::Active,
            start_date,
            end_date: None,
            monthly_rent: 1250.0,
            security_deposit: 1500.0,
            tenancy_type: TenancyType::Periodic,
            rent_due_day: Some(1),
            termination_date: None,
            termination_reason: None,
        }],
        revision: 0,
    };
    store
        .insert_tenant(tenant)
        .map_err(|err| AppError::Engine(EngineError::from(err)))?;
    Ok(())
}
