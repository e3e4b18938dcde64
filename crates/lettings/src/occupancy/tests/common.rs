use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::occupancy::domain::{
    AffordabilityAssessment, EmploymentDetails, LandlordId, Lease, LeaseStatus, LeaseTerms,
    Occupancy, Property, PropertyId, PropertyStatus, TenancyType, Tenant, TenantId, Unit,
};
use crate::occupancy::engine::{AssignmentEngine, AssignmentPolicy};
use crate::occupancy::memory::InMemoryStore;
use crate::occupancy::notifier::{NotifyError, ReadModelNotifier};
use crate::occupancy::router::occupancy_router;
use crate::occupancy::store::{LettingsStore, StoreError};

pub(super) fn landlord() -> LandlordId {
    LandlordId("landlord-001".to_string())
}

pub(super) fn other_landlord() -> LandlordId {
    LandlordId("landlord-002".to_string())
}

pub(super) fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date")
}

pub(super) fn lease_terms(monthly_rent: f64) -> LeaseTerms {
    LeaseTerms {
        start_date: start_date(),
        end_date: NaiveDate::from_ymd_opt(2026, 12, 31),
        monthly_rent,
        security_deposit: monthly_rent * 1.2,
        tenancy_type: TenancyType::AssuredShorthold,
        rent_due_day: Some(1),
    }
}

pub(super) fn employed_tenant(id: &str) -> Tenant {
    Tenant {
        id: TenantId(id.to_string()),
        landlord: landlord(),
        full_name: "Jordan Price".to_string(),
        employment: Some(EmploymentDetails {
            employer: Some("Harbour Logistics".to_string()),
            gross_monthly_income: Some(4000.0),
            net_monthly_income: Some(3200.0),
        }),
        affordability: Some(AffordabilityAssessment {
            monthly_income: 4000.0,
            monthly_expenses: 1500.0,
            monthly_commitments: 500.0,
        }),
        right_to_rent_verified: true,
        leases: Vec::new(),
        revision: 0,
    }
}

pub(super) fn tenant_without_income(id: &str) -> Tenant {
    let mut tenant = employed_tenant(id);
    tenant.employment = None;
    tenant.affordability = None;
    tenant
}

pub(super) fn single_unit_property(id: &str) -> Property {
    Property {
        id: PropertyId(id.to_string()),
        landlord: landlord(),
        address: "14 Riverside Walk".to_string(),
        units: Vec::new(),
        occupancy: Some(Occupancy::vacant()),
        status: PropertyStatus::Available,
        revision: 0,
    }
}

pub(super) fn multi_unit_property(id: &str, unit_numbers: &[&str]) -> Property {
    Property {
        id: PropertyId(id.to_string()),
        landlord: landlord(),
        address: "Granary Court".to_string(),
        units: unit_numbers
            .iter()
            .map(|number| Unit::vacant(*number))
            .collect(),
        occupancy: None,
        status: PropertyStatus::Available,
        revision: 0,
    }
}

/// An active lease seeded directly into a tenant document, bypassing the
/// engine. This is how drift enters the dataset in tests.
pub(super) fn active_lease(property: &str, unit: Option<&str>, monthly_rent: f64) -> Lease {
    Lease {
        property: PropertyId(property.to_string()),
        unit: unit.map(str::to_string),
        status: LeaseStatus::Active,
        start_date: start_date(),
        end_date: NaiveDate::from_ymd_opt(2026, 12, 31),
        monthly_rent,
        security_deposit: monthly_rent * 1.2,
        tenancy_type: TenancyType::AssuredShorthold,
        rent_due_day: Some(1),
        termination_date: None,
        termination_reason: None,
    }
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    events: Mutex<Vec<LandlordId>>,
}

impl RecordingNotifier {
    pub(super) fn events(&self) -> Vec<LandlordId> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl ReadModelNotifier for RecordingNotifier {
    fn notify(&self, owner: &LandlordId) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(owner.clone());
        Ok(())
    }
}

pub(super) struct FailingNotifier;

impl ReadModelNotifier for FailingNotifier {
    fn notify(&self, _owner: &LandlordId) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("websocket hub offline".to_string()))
    }
}

/// Store double whose commits always lose the revision race.
pub(super) struct ContentionStore {
    inner: InMemoryStore,
}

impl ContentionStore {
    pub(super) fn seeded(inner: InMemoryStore) -> Self {
        Self { inner }
    }
}

impl LettingsStore for ContentionStore {
    fn tenant(
        &self,
        id: &TenantId,
        owner: &LandlordId,
    ) -> Result<Option<Tenant>, StoreError> {
        self.inner.tenant(id, owner)
    }

    fn property(
        &self,
        id: &PropertyId,
        owner: &LandlordId,
    ) -> Result<Option<Property>, StoreError> {
        self.inner.property(id, owner)
    }

    fn tenants(&self, owner: &LandlordId) -> Result<Vec<Tenant>, StoreError> {
        self.inner.tenants(owner)
    }

    fn properties(&self, owner: &LandlordId) -> Result<Vec<Property>, StoreError> {
        self.inner.properties(owner)
    }

    fn tenants_with_active_leases(&self, owner: &LandlordId) -> Result<Vec<Tenant>, StoreError> {
        self.inner.tenants_with_active_leases(owner)
    }

    fn properties_referencing_tenant(
        &self,
        owner: &LandlordId,
        tenant: &TenantId,
    ) -> Result<Vec<Property>, StoreError> {
        self.inner.properties_referencing_tenant(owner, tenant)
    }

    fn insert_tenant(&self, tenant: Tenant) -> Result<Tenant, StoreError> {
        self.inner.insert_tenant(tenant)
    }

    fn insert_property(&self, property: Property) -> Result<Property, StoreError> {
        self.inner.insert_property(property)
    }

    fn save_tenant(&self, _tenant: &Tenant) -> Result<Tenant, StoreError> {
        Err(StoreError::Contention)
    }

    fn save_property(&self, _property: &Property) -> Result<Property, StoreError> {
        Err(StoreError::Contention)
    }

    fn commit_pair(
        &self,
        _tenant: &Tenant,
        _property: &Property,
    ) -> Result<(Tenant, Property), StoreError> {
        Err(StoreError::Contention)
    }
}

pub(super) fn build_engine() -> (
    AssignmentEngine<InMemoryStore, RecordingNotifier>,
    Arc<InMemoryStore>,
    Arc<RecordingNotifier>,
) {
    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = AssignmentEngine::new(
        store.clone(),
        notifier.clone(),
        AssignmentPolicy::default(),
    );
    (engine, store, notifier)
}

pub(super) fn build_gated_engine() -> (
    AssignmentEngine<InMemoryStore, RecordingNotifier>,
    Arc<InMemoryStore>,
) {
    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = AssignmentEngine::new(
        store.clone(),
        notifier,
        AssignmentPolicy {
            enforce_income_qualification: true,
        },
    );
    (engine, store)
}

pub(super) fn router_with_engine(
    engine: AssignmentEngine<InMemoryStore, RecordingNotifier>,
) -> axum::Router {
    occupancy_router(Arc::new(engine))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Core cross-entity invariant: every active lease's slot points back at
/// its tenant, and every occupied slot has exactly one matching active
/// lease.
pub(super) fn assert_invariant_holds(store: &InMemoryStore, owner: &LandlordId) {
    let tenants = store.tenants(owner).expect("tenants load");
    let properties = store.properties(owner).expect("properties load");

    for tenant in &tenants {
        for lease in tenant.active_leases() {
            let property = properties
                .iter()
                .find(|property| property.id == lease.property)
                .expect("active lease references a stored property");
            assert_eq!(
                property.slot_tenant(lease.unit.as_deref()),
                Some(&tenant.id),
                "active lease for {} must be mirrored by the occupancy pointer",
                tenant.id.0
            );
        }
    }

    for property in &properties {
        let mut slots: Vec<(Option<&str>, Option<&TenantId>)> = Vec::new();
        if property.is_multi_unit() {
            for unit in &property.units {
                slots.push((Some(unit.unit_number.as_str()), unit.tenant.as_ref()));
            }
        } else {
            slots.push((
                None,
                property
                    .occupancy
                    .as_ref()
                    .and_then(|occupancy| occupancy.tenant.as_ref()),
            ));
        }

        for (unit_number, occupant) in slots {
            let Some(occupant) = occupant else { continue };
            let holders = tenants
                .iter()
                .filter(|tenant| {
                    tenant.id == *occupant
                        && tenant.active_lease(&property.id, unit_number).is_some()
                })
                .count();
            assert_eq!(
                holders, 1,
                "occupied slot {:?} of {} must map to exactly one active lease",
                unit_number, property.id.0
            );
        }
    }
}
