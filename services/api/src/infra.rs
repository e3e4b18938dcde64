use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use lettings::occupancy::{
    portfolio_summary, LandlordId, LettingsStore, NotifyError, ReadModelNotifier,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Read-model notifier that recomputes the owner's portfolio summary after
/// every committed transition. Stands in for the WebSocket push hub: the
/// refreshed aggregates are emitted on the log stream.
pub(crate) struct SummaryNotifier<S> {
    store: Arc<S>,
}

impl<S> SummaryNotifier<S> {
    pub(crate) fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> ReadModelNotifier for SummaryNotifier<S>
where
    S: LettingsStore + 'static,
{
    fn notify(&self, owner: &LandlordId) -> Result<(), NotifyError> {
        let properties = self
            .store
            .properties(owner)
            .map_err(|err| NotifyError::Transport(err.to_string()))?;
        let tenants = self
            .store
            .tenants(owner)
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        let summary = portfolio_summary(&properties, &tenants);
        info!(
            owner = %owner.0,
            occupied = summary.occupied_slots,
            total = summary.total_slots,
            occupancy_rate = summary.occupancy_rate,
            rent_roll = summary.monthly_rent_roll,
            "portfolio read model refreshed"
        );
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
