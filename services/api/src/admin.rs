use clap::Args;
use serde::Deserialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use lettings::error::AppError;
use lettings::occupancy::{
    EngineError, InMemoryStore, LandlordId, LettingsStore, Property, Reconciler, Tenant,
};

#[derive(Args, Debug)]
pub(crate) struct ReconcileArgs {
    /// JSON export containing `tenants` and `properties` collections
    #[arg(long)]
    pub(crate) data: PathBuf,
    /// Landlord whose records should be repaired
    #[arg(long)]
    pub(crate) landlord: String,
}

/// Shape of a dataset export taken from the document store.
#[derive(Debug, Deserialize)]
struct DatasetExport {
    #[serde(default)]
    tenants: Vec<Tenant>,
    #[serde(default)]
    properties: Vec<Property>,
}

/// The sanctioned repair path for drifted datasets: load an export, run
/// the reconciler against it, and report what it fixed. Occupancy pointers
/// are never patched by hand.
pub(crate) fn run_reconcile(args: ReconcileArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.data)?;
    let dataset: DatasetExport = serde_json::from_str(&raw)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

    let store = Arc::new(InMemoryStore::new());
    let tenant_count = dataset.tenants.len();
    let property_count = dataset.properties.len();
    for tenant in dataset.tenants {
        store
            .insert_tenant(tenant)
            .map_err(|err| AppError::Engine(EngineError::from(err)))?;
    }
    for property in dataset.properties {
        store
            .insert_property(property)
            .map_err(|err| AppError::Engine(EngineError::from(err)))?;
    }

    println!(
        "Loaded {tenant_count} tenant(s) and {property_count} propert(y/ies) from {}",
        args.data.display()
    );

    let reconciler = Reconciler::new(store);
    let report = reconciler
        .sync_tenant_assignments(&LandlordId(args.landlord.clone()))
        .map_err(|err| AppError::Engine(EngineError::from(err)))?;

    println!(
        "Reconciliation for {}: {} occupancy pointer(s) corrected",
        args.landlord, report.synced_count
    );
    if report.synced_count == 0 {
        println!("Dataset is already consistent.");
    }
    Ok(())
}
