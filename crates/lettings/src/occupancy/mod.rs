//! Tenant-to-property assignment consistency.
//!
//! Three independently stored facts must stay in agreement: a tenant's
//! lease log, a property's (or unit's) occupancy pointer, and the
//! property's/unit's availability status. The assignment engine is the
//! only writer allowed to touch both sides, and does so as one atomic
//! commit; the reconciler repairs drift after the fact with the lease log
//! as ground truth.

pub mod domain;
pub mod engine;
pub mod memory;
pub mod notifier;
pub mod qualification;
pub mod reconcile;
pub mod report;
pub mod router;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    AffordabilityAssessment, AssignmentOutcome, EmploymentDetails, ForceUnassignOutcome,
    LandlordId, Lease, LeaseStatus, LeaseTerms, Occupancy, Property, PropertyId, PropertyStatus,
    SyncReport, TenancyType, Tenant, TenantId, UnassignmentOutcome, Unit, UnitStatus,
};
pub use engine::{AssignmentEngine, AssignmentPolicy, EngineError};
pub use memory::InMemoryStore;
pub use notifier::{NotifyError, NullNotifier, ReadModelNotifier};
pub use qualification::{
    check_affordability, check_income_qualification, AffordabilityCheck, IncomeBasis,
    IncomeQualification, GROSS_INCOME_MULTIPLIER, NET_INCOME_MULTIPLIER,
};
pub use reconcile::Reconciler;
pub use report::{portfolio_summary, PortfolioSummary};
pub use router::occupancy_router;
pub use store::{LettingsStore, StoreError};
