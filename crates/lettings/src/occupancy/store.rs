use super::domain::{LandlordId, Property, PropertyId, Tenant, TenantId};

/// Storage abstraction over the tenant and property document collections.
///
/// Loads are owner-scoped: a document that exists but belongs to a different
/// landlord is reported as absent, so callers cannot distinguish "not found"
/// from "not yours". Writes use optimistic concurrency: every save compares
/// the document's `revision` against the stored one and fails with
/// [`StoreError::Contention`] when another writer got there first.
/// [`LettingsStore::commit_pair`] applies that check to a tenant and a
/// property together and writes both or neither, which is the transaction
/// boundary the assignment engine relies on.
pub trait LettingsStore: Send + Sync {
    fn tenant(&self, id: &TenantId, owner: &LandlordId) -> Result<Option<Tenant>, StoreError>;

    fn property(
        &self,
        id: &PropertyId,
        owner: &LandlordId,
    ) -> Result<Option<Property>, StoreError>;

    fn tenants(&self, owner: &LandlordId) -> Result<Vec<Tenant>, StoreError>;

    fn properties(&self, owner: &LandlordId) -> Result<Vec<Property>, StoreError>;

    /// Tenants owned by `owner` holding at least one active lease.
    fn tenants_with_active_leases(&self, owner: &LandlordId) -> Result<Vec<Tenant>, StoreError>;

    /// Properties owned by `owner` with any occupancy pointer referencing
    /// `tenant`, regardless of lease state on the tenant side.
    fn properties_referencing_tenant(
        &self,
        owner: &LandlordId,
        tenant: &TenantId,
    ) -> Result<Vec<Property>, StoreError>;

    fn insert_tenant(&self, tenant: Tenant) -> Result<Tenant, StoreError>;

    fn insert_property(&self, property: Property) -> Result<Property, StoreError>;

    /// Single-document compare-and-swap write. Returns the stored document
    /// with its bumped revision.
    fn save_tenant(&self, tenant: &Tenant) -> Result<Tenant, StoreError>;

    fn save_property(&self, property: &Property) -> Result<Property, StoreError>;

    /// Atomic two-document commit: both revisions are validated and both
    /// documents written under the same lock, or nothing is written at all.
    fn commit_pair(
        &self,
        tenant: &Tenant,
        property: &Property,
    ) -> Result<(Tenant, Property), StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document already exists")]
    Conflict,
    #[error("document not found")]
    NotFound,
    #[error("document revision moved under a concurrent write")]
    Contention,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
