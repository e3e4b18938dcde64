use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for tenant documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

/// Identifier wrapper for property documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

/// Identifier for the landlord account that owns a record. Ownership is an
/// access-control boundary, not a business relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LandlordId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Available,
    Occupied,
    Maintenance,
    OffMarket,
    Pending,
}

impl PropertyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Maintenance => "maintenance",
            Self::OffMarket => "off_market",
            Self::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Available,
    Occupied,
    Maintenance,
    OffMarket,
}

impl UnitStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Maintenance => "maintenance",
            Self::OffMarket => "off_market",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Pending,
    Active,
    Terminated,
    Expired,
    Renewed,
}

impl LeaseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Terminated => "terminated",
            Self::Expired => "expired",
            Self::Renewed => "renewed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminated | Self::Expired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenancyType {
    AssuredShorthold,
    Periodic,
    CompanyLet,
    Student,
}

impl TenancyType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AssuredShorthold => "assured_shorthold",
            Self::Periodic => "periodic",
            Self::CompanyLet => "company_let",
            Self::Student => "student",
        }
    }
}

/// Occupancy pointer for a single-unit property. The tenant reference is
/// weak: it carries no ownership and may drift from the lease log until the
/// engine or the reconciler repairs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occupancy {
    pub is_occupied: bool,
    pub tenant: Option<TenantId>,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
}

impl Occupancy {
    pub fn vacant() -> Self {
        Self {
            is_occupied: false,
            tenant: None,
            lease_start: None,
            lease_end: None,
        }
    }
}

/// A unit embedded in a multi-unit property (e.g. an apartment building).
/// `unit_number` is unique within the parent property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub unit_number: String,
    pub tenant: Option<TenantId>,
    pub is_occupied: bool,
    pub status: UnitStatus,
}

impl Unit {
    pub fn vacant(unit_number: impl Into<String>) -> Self {
        Self {
            unit_number: unit_number.into(),
            tenant: None,
            is_occupied: false,
            status: UnitStatus::Available,
        }
    }
}

/// Property document. `units` is empty for single-unit properties, in which
/// case `occupancy` records who lives there; multi-unit properties track
/// occupancy per unit and leave `occupancy` unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub landlord: LandlordId,
    pub address: String,
    pub units: Vec<Unit>,
    pub occupancy: Option<Occupancy>,
    pub status: PropertyStatus,
    /// Store revision used for compare-and-swap commits.
    #[serde(default)]
    pub revision: u64,
}

impl Property {
    pub fn is_multi_unit(&self) -> bool {
        !self.units.is_empty()
    }

    pub fn unit(&self, unit_number: &str) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.unit_number == unit_number)
    }

    fn unit_mut(&mut self, unit_number: &str) -> Option<&mut Unit> {
        self.units
            .iter_mut()
            .find(|unit| unit.unit_number == unit_number)
    }

    /// Current occupant of the addressed slot, single-unit or named unit.
    pub fn slot_tenant(&self, unit_number: Option<&str>) -> Option<&TenantId> {
        match unit_number {
            Some(number) => self.unit(number).and_then(|unit| unit.tenant.as_ref()),
            None => self
                .occupancy
                .as_ref()
                .and_then(|occupancy| occupancy.tenant.as_ref()),
        }
    }

    /// Whether the addressed slot is marked occupied. The check covers both
    /// the flag and the pointer so a drifted record still counts as taken.
    pub fn slot_occupied(&self, unit_number: Option<&str>) -> bool {
        match unit_number {
            Some(number) => self
                .unit(number)
                .map(|unit| unit.is_occupied || unit.tenant.is_some())
                .unwrap_or(false),
            None => self
                .occupancy
                .as_ref()
                .map(|occupancy| occupancy.is_occupied || occupancy.tenant.is_some())
                .unwrap_or(false),
        }
    }

    /// Point the addressed slot at a tenant. Occupancy pointers are only
    /// mutated through this method and [`Property::vacate_slot`] so the
    /// engine and the reconciler remain the sole writers.
    pub(crate) fn occupy_slot(
        &mut self,
        unit_number: Option<&str>,
        tenant: TenantId,
        lease_start: NaiveDate,
        lease_end: Option<NaiveDate>,
    ) {
        match unit_number {
            Some(number) => {
                if let Some(unit) = self.unit_mut(number) {
                    unit.tenant = Some(tenant);
                    unit.is_occupied = true;
                    unit.status = UnitStatus::Occupied;
                }
            }
            None => {
                self.occupancy = Some(Occupancy {
                    is_occupied: true,
                    tenant: Some(tenant),
                    lease_start: Some(lease_start),
                    lease_end,
                });
                self.status = PropertyStatus::Occupied;
            }
        }
    }

    /// Clear the addressed slot and mark it available again.
    pub(crate) fn vacate_slot(&mut self, unit_number: Option<&str>) {
        match unit_number {
            Some(number) => {
                if let Some(unit) = self.unit_mut(number) {
                    unit.tenant = None;
                    unit.is_occupied = false;
                    unit.status = UnitStatus::Available;
                }
            }
            None => {
                self.occupancy = Some(Occupancy::vacant());
                self.status = PropertyStatus::Available;
            }
        }
    }
}

/// Employment income details used by the qualification evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmploymentDetails {
    pub employer: Option<String>,
    pub gross_monthly_income: Option<f64>,
    pub net_monthly_income: Option<f64>,
}

/// Explicit affordability assessment collected during referencing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityAssessment {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_commitments: f64,
}

/// Tenant document with its embedded lease log. Leases are append-only:
/// they are never deleted, only status-transitioned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub landlord: LandlordId,
    pub full_name: String,
    pub employment: Option<EmploymentDetails>,
    pub affordability: Option<AffordabilityAssessment>,
    #[serde(default)]
    pub right_to_rent_verified: bool,
    #[serde(default)]
    pub leases: Vec<Lease>,
    /// Store revision used for compare-and-swap commits.
    #[serde(default)]
    pub revision: u64,
}

impl Tenant {
    /// The tenant's active lease for a specific (property, unit) pair.
    pub fn active_lease(
        &self,
        property: &PropertyId,
        unit_number: Option<&str>,
    ) -> Option<&Lease> {
        self.leases.iter().find(|lease| {
            lease.status == LeaseStatus::Active
                && lease.property == *property
                && lease.unit.as_deref() == unit_number
        })
    }

    pub fn active_leases(&self) -> impl Iterator<Item = &Lease> {
        self.leases
            .iter()
            .filter(|lease| lease.status == LeaseStatus::Active)
    }

    pub fn has_active_lease(&self) -> bool {
        self.active_leases().next().is_some()
    }
}

/// Lease record embedded in a tenant document. The property reference is
/// strong; `unit` is absent for a single-unit property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    pub property: PropertyId,
    pub unit: Option<String>,
    pub status: LeaseStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub monthly_rent: f64,
    pub security_deposit: f64,
    pub tenancy_type: TenancyType,
    pub rent_due_day: Option<u8>,
    pub termination_date: Option<NaiveDate>,
    pub termination_reason: Option<String>,
}

/// Caller-supplied terms for a new tenancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseTerms {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub monthly_rent: f64,
    pub security_deposit: f64,
    pub tenancy_type: TenancyType,
    pub rent_due_day: Option<u8>,
}

/// Result of a committed assignment.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentOutcome {
    pub tenant: Tenant,
    pub property: Property,
    pub lease: Lease,
}

/// Result of a committed unassignment.
#[derive(Debug, Clone, Serialize)]
pub struct UnassignmentOutcome {
    pub message: String,
}

/// Counts reported by the force-unassign cleanup operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForceUnassignOutcome {
    pub properties_updated: usize,
    pub leases_terminated: usize,
}

/// Count of property corrections made by a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub synced_count: usize,
}
