use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::domain::{
    AssignmentOutcome, ForceUnassignOutcome, LandlordId, Lease, LeaseStatus, LeaseTerms, Property,
    PropertyId, TenantId, UnassignmentOutcome,
};
use super::notifier::ReadModelNotifier;
use super::qualification;
use super::store::{LettingsStore, StoreError};

/// How many times a transition is attempted before contention is surfaced
/// to the caller. The single reload lets a lost race re-run its checks and
/// fail with the precise domain conflict instead of an opaque retry error.
const COMMIT_ATTEMPTS: usize = 2;

/// Policy dials for the assignment engine. Income qualification is
/// advisory by default; flipping the flag turns it into a pre-write gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentPolicy {
    pub enforce_income_qualification: bool,
}

/// Errors surfaced by assignment transitions. `NotFound` deliberately
/// merges "does not exist" with "not owned by the caller" so responses
/// never leak the existence of another landlord's records.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("tenant or property not found")]
    NotFound,
    #[error("a unit number is required for a multi-unit property")]
    UnitRequired,
    #[error("property has no units; a unit number must not be supplied")]
    UnexpectedUnit,
    #[error("tenant already holds an active lease for this property and unit")]
    DuplicateLease,
    #[error("the requested property or unit is already occupied")]
    AlreadyOccupied,
    #[error("no active lease found for this property and unit")]
    NoActiveLease,
    #[error("income qualification failed: {reason}")]
    QualificationFailed { reason: String },
    #[error("could not commit under concurrent updates; the request may be retried")]
    Contention,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The only component permitted to mutate both sides of the tenant ↔
/// property relationship. Every transition runs as a single atomic commit
/// over the two documents, with the tenant loaded first and the property
/// second (fixed acquisition order).
pub struct AssignmentEngine<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    policy: AssignmentPolicy,
}

impl<S, N> AssignmentEngine<S, N>
where
    S: LettingsStore + 'static,
    N: ReadModelNotifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, policy: AssignmentPolicy) -> Self {
        Self {
            store,
            notifier,
            policy,
        }
    }

    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    pub fn policy(&self) -> AssignmentPolicy {
        self.policy
    }

    /// Assign a tenant to a property slot, appending an active lease and
    /// pointing the slot at the tenant in one atomic commit.
    pub fn assign(
        &self,
        tenant_id: &TenantId,
        property_id: &PropertyId,
        unit_number: Option<&str>,
        terms: LeaseTerms,
        requesting_user: &LandlordId,
    ) -> Result<AssignmentOutcome, EngineError> {
        for attempt in 0..COMMIT_ATTEMPTS {
            let tenant = self
                .store
                .tenant(tenant_id, requesting_user)?
                .ok_or(EngineError::NotFound)?;
            let property = self
                .store
                .property(property_id, requesting_user)?
                .ok_or(EngineError::NotFound)?;

            validate_slot_address(&property, unit_number)?;

            if self.policy.enforce_income_qualification {
                let verdict = qualification::check_income_qualification(&tenant, terms.monthly_rent);
                if !verdict.qualified {
                    return Err(EngineError::QualificationFailed {
                        reason: verdict
                            .reason
                            .unwrap_or_else(|| "income below the required multiple".to_string()),
                    });
                }
            }

            if tenant.active_lease(property_id, unit_number).is_some() {
                return Err(EngineError::DuplicateLease);
            }
            // Checked on the occupancy pointer rather than the lease log so
            // a drifted pointer still blocks the slot.
            if property.slot_occupied(unit_number) {
                return Err(EngineError::AlreadyOccupied);
            }

            let lease = Lease {
                property: property_id.clone(),
                unit: unit_number.map(str::to_string),
                status: LeaseStatus::Active,
                start_date: terms.start_date,
                end_date: terms.end_date,
                monthly_rent: terms.monthly_rent,
                security_deposit: terms.security_deposit,
                tenancy_type: terms.tenancy_type,
                rent_due_day: terms.rent_due_day,
                termination_date: None,
                termination_reason: None,
            };

            let mut tenant = tenant;
            let mut property = property;
            tenant.leases.push(lease.clone());
            property.occupy_slot(
                unit_number,
                tenant.id.clone(),
                terms.start_date,
                terms.end_date,
            );

            match self.store.commit_pair(&tenant, &property) {
                Ok((tenant, property)) => {
                    self.notify_read_model(requesting_user);
                    return Ok(AssignmentOutcome {
                        tenant,
                        property,
                        lease,
                    });
                }
                Err(StoreError::Contention) if attempt + 1 < COMMIT_ATTEMPTS => continue,
                Err(StoreError::Contention) => return Err(EngineError::Contention),
                Err(err) => return Err(err.into()),
            }
        }
        Err(EngineError::Contention)
    }

    /// Terminate the tenant's active lease for a slot and release the slot,
    /// in one atomic commit. Unassigning a pair with no active lease is an
    /// error, not a no-op, so callers can detect stale state.
    pub fn unassign(
        &self,
        tenant_id: &TenantId,
        property_id: &PropertyId,
        unit_number: Option<&str>,
        requesting_user: &LandlordId,
        termination_reason: Option<String>,
    ) -> Result<UnassignmentOutcome, EngineError> {
        for attempt in 0..COMMIT_ATTEMPTS {
            let mut tenant = self
                .store
                .tenant(tenant_id, requesting_user)?
                .ok_or(EngineError::NotFound)?;
            let mut property = self
                .store
                .property(property_id, requesting_user)?
                .ok_or(EngineError::NotFound)?;

            let position = tenant
                .leases
                .iter()
                .position(|lease| {
                    lease.status == LeaseStatus::Active
                        && lease.property == *property_id
                        && lease.unit.as_deref() == unit_number
                })
                .ok_or(EngineError::NoActiveLease)?;

            let lease = &mut tenant.leases[position];
            lease.status = LeaseStatus::Terminated;
            lease.termination_date = Some(Utc::now().date_naive());
            lease.termination_reason = termination_reason.clone();

            match property.slot_tenant(unit_number).cloned() {
                Some(occupant) if occupant != *tenant_id => {
                    // Drifted pointer held by someone else; their own
                    // lifecycle releases it.
                    warn!(
                        tenant = %tenant_id.0,
                        property = %property_id.0,
                        occupant = %occupant.0,
                        "slot pointer does not match the lease being terminated; leaving it in place"
                    );
                }
                _ => property.vacate_slot(unit_number),
            }

            match self.store.commit_pair(&tenant, &property) {
                Ok(_) => {
                    self.notify_read_model(requesting_user);
                    return Ok(UnassignmentOutcome {
                        message: format!(
                            "tenant {} unassigned from property {}",
                            tenant_id.0, property_id.0
                        ),
                    });
                }
                Err(StoreError::Contention) if attempt + 1 < COMMIT_ATTEMPTS => continue,
                Err(StoreError::Contention) => return Err(EngineError::Contention),
                Err(err) => return Err(err.into()),
            }
        }
        Err(EngineError::Contention)
    }

    /// Cleanup operation with a wider blast radius: terminates every active
    /// lease the tenant holds and clears every owner-scoped slot pointer
    /// referencing the tenant, each side handled independently so drifted
    /// records are recovered too. Idempotent; never fails for "nothing to
    /// unassign".
    pub fn force_unassign_tenant(
        &self,
        tenant_id: &TenantId,
        requesting_user: &LandlordId,
    ) -> Result<ForceUnassignOutcome, EngineError> {
        // Lease side first: a crash between the two phases must only ever
        // leave a stale pointer (cleaned by the next run), never an active
        // lease the reconciler would re-point.
        let mut leases_terminated = 0usize;
        for attempt in 0..COMMIT_ATTEMPTS {
            let mut tenant = self
                .store
                .tenant(tenant_id, requesting_user)?
                .ok_or(EngineError::NotFound)?;

            let today = Utc::now().date_naive();
            let mut terminated = 0usize;
            for lease in tenant
                .leases
                .iter_mut()
                .filter(|lease| lease.status == LeaseStatus::Active)
            {
                lease.status = LeaseStatus::Terminated;
                lease.termination_date = Some(today);
                lease.termination_reason = Some("force unassignment".to_string());
                terminated += 1;
            }

            if terminated == 0 {
                break;
            }
            match self.store.save_tenant(&tenant) {
                Ok(_) => {
                    leases_terminated = terminated;
                    break;
                }
                Err(StoreError::Contention) if attempt + 1 < COMMIT_ATTEMPTS => continue,
                Err(StoreError::Contention) => return Err(EngineError::Contention),
                Err(err) => return Err(err.into()),
            }
        }

        // Pointer side: clear every slot referencing the tenant, whether or
        // not a matching lease existed. Per-property failures are logged
        // and skipped; this is a repair pass, not a user transaction.
        let mut properties_updated = 0usize;
        for mut property in self
            .store
            .properties_referencing_tenant(requesting_user, tenant_id)?
        {
            if property.slot_tenant(None) == Some(tenant_id) {
                property.vacate_slot(None);
            }
            let unit_numbers: Vec<String> = property
                .units
                .iter()
                .filter(|unit| unit.tenant.as_ref() == Some(tenant_id))
                .map(|unit| unit.unit_number.clone())
                .collect();
            for number in unit_numbers {
                property.vacate_slot(Some(&number));
            }

            match self.store.save_property(&property) {
                Ok(_) => properties_updated += 1,
                Err(err) => warn!(
                    property = %property.id.0,
                    tenant = %tenant_id.0,
                    "failed to clear occupancy pointer during force unassignment: {err}"
                ),
            }
        }

        if leases_terminated > 0 || properties_updated > 0 {
            self.notify_read_model(requesting_user);
        }

        Ok(ForceUnassignOutcome {
            properties_updated,
            leases_terminated,
        })
    }

    fn notify_read_model(&self, owner: &LandlordId) {
        if let Err(err) = self.notifier.notify(owner) {
            warn!(owner = %owner.0, "read model notification failed: {err}");
        }
    }
}

/// Structural validation of the slot address: multi-unit properties need a
/// unit number that names an existing unit; single-unit properties must
/// not receive one.
fn validate_slot_address(property: &Property, unit_number: Option<&str>) -> Result<(), EngineError> {
    if property.is_multi_unit() {
        match unit_number {
            None => Err(EngineError::UnitRequired),
            Some(number) if property.unit(number).is_none() => Err(EngineError::NotFound),
            Some(_) => Ok(()),
        }
    } else if unit_number.is_some() {
        Err(EngineError::UnexpectedUnit)
    } else {
        Ok(())
    }
}
