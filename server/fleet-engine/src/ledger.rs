//! Append-only rental ledger: the single source of truth for every projection.
//!
//! Events are kept per equipment ID in ascending checkout order. Each asset's
//! event list sits behind an `Arc` and is replaced copy-on-write, so a reader
//! holding an [`EventHistory`] never observes a half-applied mutation, and a
//! write to one asset never touches another asset's list. New lists are built
//! outside the map's shard lock; the lock covers only the pointer swap.

use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::io::BufRead;
use std::sync::Arc;

use crate::error::EngineError;
use crate::types::{rental_id, NewRental, RentalEvent, UsageMetrics};

/// Immutable, restartable view of one asset's events in checkout order.
#[derive(Debug, Clone, Default)]
pub struct EventHistory(Arc<Vec<RentalEvent>>);

impl EventHistory {
  pub fn iter(&self) -> std::slice::Iter<'_, RentalEvent> {
    self.0.iter()
  }

  pub fn as_slice(&self) -> &[RentalEvent] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl<'a> IntoIterator for &'a EventHistory {
  type Item = &'a RentalEvent;
  type IntoIter = std::slice::Iter<'a, RentalEvent>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

#[derive(Debug, Default)]
pub struct Ledger {
  assets: DashMap<String, Arc<Vec<RentalEvent>>>,
}

impl Ledger {
  pub fn new() -> Self {
    Self::default()
  }

  /// Open a new rental. Fails with `Conflict` if the asset already has one open.
  pub fn append(&self, rental: NewRental) -> Result<RentalEvent, EngineError> {
    rental.validate()?;
    let event = rental.into_event();
    let equipment_id = event.equipment_id.clone();

    self.update(&equipment_id, |current| {
      if current.iter().any(RentalEvent::is_open) {
        return Err(EngineError::Conflict(equipment_id.clone()));
      }
      let mut opened = event.clone();
      opened.rental_id = unique_rental_id(current, &opened);
      let mut next = current.to_vec();
      insert_ordered(&mut next, opened.clone());
      Ok((next, opened))
    })
  }

  /// Close the asset's open rental, finalizing its counters.
  ///
  /// With more than one open rental (restored data anomaly) the most recently
  /// checked-out one is closed.
  pub fn close(
    &self,
    equipment_id: &str,
    checkin_date: NaiveDate,
    final_metrics: UsageMetrics,
  ) -> Result<RentalEvent, EngineError> {
    self.update(equipment_id, |current| {
      let idx = current
        .iter()
        .rposition(RentalEvent::is_open)
        .ok_or_else(|| EngineError::no_open_rental(equipment_id))?;

      if checkin_date < current[idx].checkout_date {
        return Err(EngineError::validation(
          "CheckIn_Date",
          "must not be before CheckOut_Date",
        ));
      }

      let mut next = current.to_vec();
      let closed = &mut next[idx];
      closed.checkin_date = Some(checkin_date);
      closed.metrics = final_metrics.clone();
      let closed = closed.clone();
      Ok((next, closed))
    })
  }

  /// Bulk-load persisted records verbatim. Returns the number of records loaded.
  ///
  /// Persisted history is authoritative, so the single-open-rental rule is not
  /// enforced here; the status projection reports any violation it finds.
  pub fn restore<I>(&self, records: I) -> usize
  where
    I: IntoIterator<Item = RentalEvent>,
  {
    let mut batches: BTreeMap<String, Vec<RentalEvent>> = BTreeMap::new();
    let mut count = 0;
    for event in records {
      batches.entry(event.equipment_id.clone()).or_default().push(event);
      count += 1;
    }

    for (equipment_id, batch) in batches {
      self
        .update(&equipment_id, |current| {
          let mut next = current.to_vec();
          for mut event in batch.iter().cloned() {
            if event.rental_id.is_empty() {
              event.rental_id = unique_rental_id(&next, &event);
            }
            insert_ordered(&mut next, event);
          }
          Ok((next, ()))
        })
        .unwrap_or_else(|never: Infallible| match never {});
    }
    count
  }

  /// Copy-on-write update of one asset's events.
  ///
  /// `build` runs against a snapshot with no lock held. The shard lock is taken
  /// only to swap in the new `Arc`, and only if no other writer swapped since
  /// the snapshot; otherwise `build` reruns on the fresh list.
  fn update<T, E, F>(&self, equipment_id: &str, mut build: F) -> Result<T, E>
  where
    F: FnMut(&[RentalEvent]) -> Result<(Vec<RentalEvent>, T), E>,
  {
    loop {
      let base = self.assets.get(equipment_id).map(|events| Arc::clone(&events));
      let current = base.as_deref().map(Vec::as_slice).unwrap_or(&[]);
      let (next, out) = build(current)?;

      let mut entry = self.assets.entry(equipment_id.to_string()).or_default();
      let unchanged = match &base {
        Some(base) => Arc::ptr_eq(base, &*entry),
        None => entry.is_empty(),
      };
      if unchanged {
        *entry = Arc::new(next);
        return Ok(out);
      }
    }
  }

  /// Events for one asset in ascending checkout order; empty for an unknown ID.
  pub fn events_for(&self, equipment_id: &str) -> EventHistory {
    self
      .assets
      .get(equipment_id)
      .map(|events| EventHistory(Arc::clone(&events)))
      .unwrap_or_default()
  }

  /// Snapshot of every asset's history, keyed and ordered by equipment ID.
  pub fn histories(&self) -> BTreeMap<String, EventHistory> {
    self
      .assets
      .iter()
      .filter(|entry| !entry.value().is_empty())
      .map(|entry| (entry.key().clone(), EventHistory(Arc::clone(entry.value()))))
      .collect()
  }

  pub fn all_events(&self) -> Vec<RentalEvent> {
    self
      .histories()
      .values()
      .flat_map(|history| history.iter().cloned())
      .collect()
  }

  pub fn all_open_events(&self) -> Vec<RentalEvent> {
    self
      .histories()
      .values()
      .flat_map(|history| history.iter().filter(|e| e.is_open()).cloned().collect::<Vec<_>>())
      .collect()
  }

  pub fn equipment_ids(&self) -> Vec<String> {
    self.histories().into_keys().collect()
  }

  /// Total number of events across all assets.
  pub fn len(&self) -> usize {
    self.assets.iter().map(|entry| entry.value().len()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Rental ID salted with the event's ordinal in `existing`, bumped past any ID
/// already taken so a same-day reopen never repeats one.
fn unique_rental_id(existing: &[RentalEvent], event: &RentalEvent) -> String {
  let mut ordinal = existing.len();
  loop {
    let id = rental_id(&event.equipment_id, event.checkout_date, &event.customer_id, ordinal);
    if !existing.iter().any(|e| e.rental_id == id) {
      return id;
    }
    ordinal += 1;
  }
}

/// Insert keeping checkout order; ties keep arrival order.
fn insert_ordered(events: &mut Vec<RentalEvent>, event: RentalEvent) {
  let pos = events.partition_point(|e| e.checkout_date <= event.checkout_date);
  events.insert(pos, event);
}

/// Parse ledger records, one JSON object per non-blank line.
pub fn load_json_lines<R: BufRead>(reader: R) -> Result<Vec<RentalEvent>, EngineError> {
  let mut records = Vec::new();
  for (idx, line) in reader.lines().enumerate() {
    let line = line.map_err(|e| EngineError::parse(format!("line {}: {}", idx + 1, e)))?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }
    let event: RentalEvent = serde_json::from_str(trimmed)
      .map_err(|e| EngineError::parse(format!("line {}: {}", idx + 1, e)))?;
    records.push(event);
  }
  Ok(records)
}
