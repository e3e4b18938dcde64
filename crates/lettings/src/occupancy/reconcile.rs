use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{LandlordId, Lease, Property, SyncReport, TenantId};
use super::store::{LettingsStore, StoreError};

/// Batch repair for drifted occupancy pointers. The lease log is the
/// source of truth: for every active lease whose property/unit pointer
/// disagrees, the pointer, flag, and status are rewritten to match. The
/// pass never touches tenant documents and takes one property write at a
/// time, so it cannot deadlock an in-flight assignment.
pub struct Reconciler<S> {
    store: Arc<S>,
}

impl<S> Reconciler<S>
where
    S: LettingsStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Scan the owner's tenants with active leases and repair every
    /// property-side pointer that has drifted. Safe to run repeatedly;
    /// per-item failures are logged and skipped. The only hard error is a
    /// scan that cannot start at all.
    pub fn sync_tenant_assignments(&self, owner: &LandlordId) -> Result<SyncReport, StoreError> {
        let tenants = self.store.tenants_with_active_leases(owner)?;

        let mut synced_count = 0usize;
        for tenant in &tenants {
            for lease in tenant.active_leases() {
                match self.repair_lease_pointer(owner, &tenant.id, lease) {
                    Ok(true) => synced_count += 1,
                    Ok(false) => {}
                    Err(err) => warn!(
                        tenant = %tenant.id.0,
                        property = %lease.property.0,
                        "skipping assignment repair: {err}"
                    ),
                }
            }
        }

        if synced_count > 0 {
            info!(owner = %owner.0, synced_count, "repaired drifted occupancy pointers");
        }
        Ok(SyncReport { synced_count })
    }

    /// Returns true when a corrective write was made for this lease.
    fn repair_lease_pointer(
        &self,
        owner: &LandlordId,
        tenant_id: &TenantId,
        lease: &Lease,
    ) -> Result<bool, RepairSkip> {
        let mut property = self
            .store
            .property(&lease.property, owner)
            .map_err(RepairSkip::Store)?
            .ok_or(RepairSkip::PropertyMissing)?;

        let unit_number = lease.unit.as_deref();
        validate_lease_slot(&property, unit_number)?;

        if property.slot_tenant(unit_number) == Some(tenant_id) {
            return Ok(false);
        }

        property.occupy_slot(
            unit_number,
            tenant_id.clone(),
            lease.start_date,
            lease.end_date,
        );
        self.store
            .save_property(&property)
            .map_err(RepairSkip::Store)?;
        Ok(true)
    }
}

fn validate_lease_slot(property: &Property, unit_number: Option<&str>) -> Result<(), RepairSkip> {
    match unit_number {
        Some(number) => {
            if property.unit(number).is_none() {
                return Err(RepairSkip::UnitMissing);
            }
        }
        None => {
            if property.is_multi_unit() {
                return Err(RepairSkip::SlotShapeMismatch);
            }
        }
    }
    Ok(())
}

/// Reasons a single lease repair was skipped. Skips never abort the scan.
#[derive(Debug, thiserror::Error)]
enum RepairSkip {
    #[error("referenced property no longer exists")]
    PropertyMissing,
    #[error("lease names a unit the property does not have")]
    UnitMissing,
    #[error("lease addresses the whole property but the property is multi-unit")]
    SlotShapeMismatch,
    #[error(transparent)]
    Store(StoreError),
}
