//! Record lifecycle hooks.
//!
//! The host framework calls [`RecordHooks::on_record_saved`] after a
//! patient record is saved and [`RecordHooks::on_child_removed`] when a
//! medicine row is deleted. The two entry points carry different failure
//! policies: a failed save pass propagates its error so the host knows the
//! hook failed, while row-removal cleanup is logged and swallowed -- the
//! row goes away regardless of what the calendar says.

use async_trait::async_trait;
use chrono::Local;

use crate::calendar::client::{CalendarClient, EventRequest};
use crate::error::Result;
use crate::records::{Medicine, MedicineStatus, Patient};
use crate::schedule;

/// Repetitiveness applied when the record leaves the field empty.
pub const DEFAULT_REPETITIVENESS: &str = "Daily";

/// Counters for one save pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Medicines whose reminder events were created or updated.
    pub medicines_synced: usize,
    /// Medicines whose remote events were removed and identifier cleared.
    pub medicines_cleared: usize,
    /// Medicines force-completed because their end date passed.
    pub medicines_completed: usize,
}

/// Callback interface the host framework dispatches document events to.
#[async_trait]
pub trait RecordHooks {
    /// Called after a patient record is saved. Mutates the record in place
    /// (identifiers, forced status, next dose, progress); the host persists
    /// the result.
    async fn on_record_saved(&self, patient: &mut Patient) -> Result<SaveOutcome>;

    /// Called when a medicine row is removed. Returns whether at least one
    /// remote event was deleted. Never fails.
    async fn on_child_removed(&self, medicine: &Medicine) -> bool;
}

/// Lifecycle handler keeping medicine schedules and calendar events in step.
pub struct MedicineScheduleSync {
    client: CalendarClient,
}

impl MedicineScheduleSync {
    pub fn new(client: CalendarClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &CalendarClient {
        &self.client
    }

    /// Delete the stored events of a medicine and clear its identifier.
    ///
    /// The identifier is cleared even when individual deletions fail (the
    /// remote events are then orphaned); only an authentication failure
    /// leaves the record untouched.
    async fn clear_events(&self, med: &mut Medicine, reason: &str) -> Result<()> {
        if let Some(ids) = med.calendar_event_id.clone() {
            let deleted = self.client.delete_events(&ids).await?;
            if deleted {
                log::info!("Calendar events {ids} deleted ({reason})");
            } else {
                log::warn!("No calendar events deleted for '{}' ({reason})", med.medicine_name);
            }
            med.calendar_event_id = None;
        }
        Ok(())
    }
}

/// Clamp an inverted end date and derive a missing one from the
/// repetition count.
fn normalize_dates(med: &mut Medicine) {
    if let (Some(start), Some(end)) = (med.start_date, med.end_date) {
        if end < start {
            log::warn!(
                "End date {end} precedes start date {start} for '{}'; clamping to start",
                med.medicine_name
            );
            med.end_date = Some(start);
        }
    }
    if med.end_date.is_none() {
        if let (Some(start), Some(count)) = (med.start_date, med.repetition_count) {
            med.end_date = schedule::auto_end_date(start, &med.repetitiveness, count);
        }
    }
}

#[async_trait]
impl RecordHooks for MedicineScheduleSync {
    async fn on_record_saved(&self, patient: &mut Patient) -> Result<SaveOutcome> {
        let today = Local::now().date_naive();
        let patient_name = patient.patient_name.clone();
        let mut outcome = SaveOutcome::default();

        for med in &mut patient.medicines {
            if med.medicine_name.trim().is_empty() {
                continue;
            }

            normalize_dates(med);

            let status = med.status_kind();
            if status.is_inactive() {
                if med.calendar_event_id.is_some() {
                    self.clear_events(med, "inactive").await?;
                    outcome.medicines_cleared += 1;
                }
                med.next_dose = None;
                continue;
            }

            if med.end_date.is_some_and(|end| end < today) {
                med.status = MedicineStatus::Completed.as_str().to_string();
                if med.calendar_event_id.is_some() {
                    self.clear_events(med, "schedule ended").await?;
                    outcome.medicines_cleared += 1;
                }
                med.next_dose = None;
                outcome.medicines_completed += 1;
                continue;
            }

            if status == MedicineStatus::Active {
                let start_date = med.start_date.unwrap_or(today);
                let repetitiveness = if med.repetitiveness.trim().is_empty() {
                    DEFAULT_REPETITIVENESS.to_string()
                } else {
                    med.repetitiveness.trim().to_string()
                };

                let request = EventRequest {
                    title: format!("Take Medicine: {}", med.medicine_name),
                    start_date,
                    repetitiveness: repetitiveness.clone(),
                    patient: Some(patient_name.clone()),
                    existing_ids: med.calendar_event_id.clone(),
                    end_date: med.end_date,
                    reminder_minutes: self.client.config().reminder_minutes,
                    times_per_day: med.times(),
                };

                match self.client.create_or_update_events(&request).await? {
                    Some(new_ids) => {
                        if med.calendar_event_id.as_deref() != Some(new_ids.as_str()) {
                            med.calendar_event_id = Some(new_ids);
                        }
                        outcome.medicines_synced += 1;
                    }
                    None => {
                        // Keep the previous identifiers: a failed sync must
                        // not detach events that may still exist remotely.
                        log::warn!(
                            "No events synced for '{}'; keeping stored identifiers",
                            med.medicine_name
                        );
                    }
                }

                med.next_dose =
                    schedule::next_dose(start_date, &repetitiveness, med.end_date, today);
            }
            // Any other status: leave the row alone.
        }

        patient.medicine_progress = schedule::medicine_progress(&patient.medicines);
        Ok(outcome)
    }

    async fn on_child_removed(&self, medicine: &Medicine) -> bool {
        let Some(ids) = medicine.calendar_event_id.as_deref() else {
            return false;
        };
        if ids.trim().is_empty() {
            return false;
        }
        match self.client.delete_events(ids).await {
            Ok(true) => {
                log::info!("Calendar events {ids} deleted (row removed)");
                true
            }
            Ok(false) => {
                log::warn!("No calendar events deleted for removed row ({ids})");
                false
            }
            Err(e) => {
                log::error!("Calendar cleanup failed for removed row ({ids}): {e}");
                false
            }
        }
    }
}
