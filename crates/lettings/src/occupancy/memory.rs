use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{LandlordId, Property, PropertyId, Tenant, TenantId};
use super::store::{LettingsStore, StoreError};

/// Transaction-capable in-memory store.
///
/// All reads and writes go through one mutex over the document maps, so
/// every commit observes a consistent snapshot and `commit_pair` is
/// all-or-nothing by construction. Revision checks on top of that give the
/// engine its conflict-on-race guarantee: a writer that loaded revision N
/// can only commit while the stored document is still at revision N.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Documents>>,
}

#[derive(Default)]
struct Documents {
    tenants: HashMap<TenantId, Tenant>,
    properties: HashMap<PropertyId, Property>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_revision(stored: u64, offered: u64) -> Result<(), StoreError> {
    if stored == offered {
        Ok(())
    } else {
        Err(StoreError::Contention)
    }
}

impl LettingsStore for InMemoryStore {
    fn tenant(&self, id: &TenantId, owner: &LandlordId) -> Result<Option<Tenant>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard
            .tenants
            .get(id)
            .filter(|tenant| tenant.landlord == *owner)
            .cloned())
    }

    fn property(
        &self,
        id: &PropertyId,
        owner: &LandlordId,
    ) -> Result<Option<Property>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard
            .properties
            .get(id)
            .filter(|property| property.landlord == *owner)
            .cloned())
    }

    fn tenants(&self, owner: &LandlordId) -> Result<Vec<Tenant>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard
            .tenants
            .values()
            .filter(|tenant| tenant.landlord == *owner)
            .cloned()
            .collect())
    }

    fn properties(&self, owner: &LandlordId) -> Result<Vec<Property>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard
            .properties
            .values()
            .filter(|property| property.landlord == *owner)
            .cloned()
            .collect())
    }

    fn tenants_with_active_leases(&self, owner: &LandlordId) -> Result<Vec<Tenant>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard
            .tenants
            .values()
            .filter(|tenant| tenant.landlord == *owner && tenant.has_active_lease())
            .cloned()
            .collect())
    }

    fn properties_referencing_tenant(
        &self,
        owner: &LandlordId,
        tenant: &TenantId,
    ) -> Result<Vec<Property>, StoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard
            .properties
            .values()
            .filter(|property| {
                property.landlord == *owner
                    && (property.slot_tenant(None) == Some(tenant)
                        || property
                            .units
                            .iter()
                            .any(|unit| unit.tenant.as_ref() == Some(tenant)))
            })
            .cloned()
            .collect())
    }

    fn insert_tenant(&self, tenant: Tenant) -> Result<Tenant, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        if guard.tenants.contains_key(&tenant.id) {
            return Err(StoreError::Conflict);
        }
        let mut stored = tenant;
        stored.revision = 1;
        guard.tenants.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn insert_property(&self, property: Property) -> Result<Property, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        if guard.properties.contains_key(&property.id) {
            return Err(StoreError::Conflict);
        }
        let mut stored = property;
        stored.revision = 1;
        guard.properties.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    fn save_tenant(&self, tenant: &Tenant) -> Result<Tenant, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        let stored = guard.tenants.get(&tenant.id).ok_or(StoreError::NotFound)?;
        check_revision(stored.revision, tenant.revision)?;
        let mut updated = tenant.clone();
        updated.revision += 1;
        guard.tenants.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    fn save_property(&self, property: &Property) -> Result<Property, StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        let stored = guard
            .properties
            .get(&property.id)
            .ok_or(StoreError::NotFound)?;
        check_revision(stored.revision, property.revision)?;
        let mut updated = property.clone();
        updated.revision += 1;
        guard.properties.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    fn commit_pair(
        &self,
        tenant: &Tenant,
        property: &Property,
    ) -> Result<(Tenant, Property), StoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");

        // Validate both revisions before touching either document.
        let stored_tenant = guard.tenants.get(&tenant.id).ok_or(StoreError::NotFound)?;
        check_revision(stored_tenant.revision, tenant.revision)?;
        let stored_property = guard
            .properties
            .get(&property.id)
            .ok_or(StoreError::NotFound)?;
        check_revision(stored_property.revision, property.revision)?;

        let mut updated_tenant = tenant.clone();
        updated_tenant.revision += 1;
        let mut updated_property = property.clone();
        updated_property.revision += 1;
        guard
            .tenants
            .insert(updated_tenant.id.clone(), updated_tenant.clone());
        guard
            .properties
            .insert(updated_property.id.clone(), updated_property.clone());
        Ok((updated_tenant, updated_property))
    }
}
