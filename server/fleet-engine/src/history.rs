//! Lifetime history summary for one asset.

use std::collections::BTreeMap;

use crate::types::{AssetHistorySummary, RentalEvent};

/// Summarize an asset's events.
///
/// Rental days count closed events only; hours, fuel and breakdowns sum over
/// every event (open rentals contribute their running counters).
pub fn summarize(events: &[RentalEvent]) -> AssetHistorySummary {
  let mut rentals_per_site: BTreeMap<String, usize> = BTreeMap::new();
  for event in events {
    *rentals_per_site.entry(event.location().to_string()).or_insert(0) += 1;
  }

  let fuel: f64 = events.iter().map(|e| e.metrics.fuel_consumed_liters).sum();

  AssetHistorySummary {
    total_rentals: events.len(),
    total_rental_days: events.iter().filter_map(RentalEvent::rental_days).sum(),
    total_operating_hours: events.iter().map(|e| e.metrics.operating_hours).sum(),
    total_idle_hours: events.iter().map(|e| e.metrics.idle_hours).sum(),
    total_fuel_consumed_liters: (fuel * 100.0).round() / 100.0,
    lifetime_breakdowns: events.iter().map(|e| u64::from(e.metrics.breakdowns)).sum(),
    rentals_per_site,
  }
}
