use serde::Serialize;

use super::domain::{Property, PropertyStatus, Tenant, UnitStatus};

/// Aggregate occupancy figures for a landlord's portfolio. This is the
/// read-side consumer of the consistent state the engine produces; it is
/// recomputed after every committed transition and on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub properties: usize,
    pub total_slots: usize,
    pub occupied_slots: usize,
    pub available_slots: usize,
    /// Occupied share of all slots, as a percentage rounded to 2 dp.
    pub occupancy_rate: f64,
    /// Sum of monthly rents across active leases.
    pub monthly_rent_roll: f64,
}

pub fn portfolio_summary(properties: &[Property], tenants: &[Tenant]) -> PortfolioSummary {
    let mut total_slots = 0usize;
    let mut occupied_slots = 0usize;
    let mut available_slots = 0usize;

    for property in properties {
        if property.is_multi_unit() {
            for unit in &property.units {
                total_slots += 1;
                if unit.is_occupied {
                    occupied_slots += 1;
                } else if unit.status == UnitStatus::Available {
                    available_slots += 1;
                }
            }
        } else {
            total_slots += 1;
            if property.slot_occupied(None) {
                occupied_slots += 1;
            } else if property.status == PropertyStatus::Available {
                available_slots += 1;
            }
        }
    }

    let occupancy_rate = if total_slots == 0 {
        0.0
    } else {
        let rate = occupied_slots as f64 / total_slots as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    };

    let monthly_rent_roll = tenants
        .iter()
        .flat_map(Tenant::active_leases)
        .map(|lease| lease.monthly_rent)
        .sum();

    PortfolioSummary {
        properties: properties.len(),
        total_slots,
        occupied_slots,
        available_slots,
        occupancy_rate,
        monthly_rent_roll,
    }
}
