use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::domain::{Applicant, ApplicantId, ApplicantStatus, FilterCriteria};
use super::gateway::TransportError;

/// Ticket handed out when a load begins. A completed load is applied only if
/// its ticket is still the most recently issued one, so a slow response can
/// never overwrite a newer one regardless of arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Why a directory load produced no update.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("load superseded by a newer request")]
    Superseded,
    #[error("directory fetch failed: {0}")]
    Transport(#[source] TransportError),
}

/// Freshness of the working set, for "last updated" / stale-data notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    pub last_synced_at: Option<DateTime<Utc>>,
    pub stale: bool,
}

/// Count of applicants sharing a normalized location, plus the synthetic
/// "all" bucket holding the total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationFacet {
    pub label: String,
    pub count: usize,
}

impl LocationFacet {
    /// Capitalized form for display ("nairobi" -> "Nairobi").
    pub fn display_label(&self) -> String {
        let mut chars = self.label.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

/// In-memory mirror of the applicant table, eventually consistent with the
/// agency API. Mutations happen only through completed loads, reconciled
/// server responses, and local soft deletes.
#[derive(Debug, Default)]
pub struct ApplicantDirectory {
    records: Vec<Applicant>,
    issued: u64,
    applied: u64,
    last_synced_at: Option<DateTime<Utc>>,
    stale: bool,
}

impl ApplicantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new load. Issuing a ticket supersedes every load already
    /// in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket {
            generation: self.issued,
        }
    }

    /// Apply the outcome of a load. Superseded tickets are discarded without
    /// touching any shared state; transport failures keep the previous
    /// working set (stale data beats no data) and mark it stale.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<Vec<Applicant>, TransportError>,
    ) -> Result<usize, FetchError> {
        if ticket.generation != self.issued {
            debug!(
                generation = ticket.generation,
                newest = self.issued,
                "discarding superseded directory load"
            );
            return Err(FetchError::Superseded);
        }

        match outcome {
            Ok(records) => {
                let count = records.len();
                self.records = records;
                self.applied = ticket.generation;
                self.last_synced_at = Some(Utc::now());
                self.stale = false;
                debug!(count, "directory working set replaced");
                Ok(count)
            }
            Err(err) => {
                self.stale = true;
                warn!(error = %err, "directory load failed; keeping previous working set");
                Err(FetchError::Transport(err))
            }
        }
    }

    pub fn records(&self) -> &[Applicant] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: ApplicantId) -> Option<&Applicant> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn sync_status(&self) -> SyncStatus {
        SyncStatus {
            last_synced_at: self.last_synced_at,
            stale: self.stale,
        }
    }

    /// Replace the record with a matching id in place, preserving order.
    /// Used to reconcile authoritative server responses after an action.
    pub fn upsert(&mut self, updated: Applicant) -> bool {
        match self.records.iter_mut().find(|record| record.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    /// Local-only soft delete. The record returns on the next load that
    /// still contains it.
    pub fn remove(&mut self, id: ApplicantId) -> bool {
        let before = self.records.len();
        self.records.retain(|record| record.id != id);
        before != self.records.len()
    }

    /// Case-insensitive substring search over name and email; phone numbers
    /// are matched on the raw query since they are numeric. A blank query
    /// returns the full working set in order.
    pub fn search(&self, query: &str) -> Vec<&Applicant> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return self.records.iter().collect();
        }
        let lowered = query.to_lowercase();
        self.records
            .iter()
            .filter(|record| {
                record.full_name.to_lowercase().contains(&lowered)
                    || record.email.to_lowercase().contains(&lowered)
                    || record.phone_number.contains(query)
            })
            .collect()
    }

    /// Structured filter for the public directory view.
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<&Applicant> {
        self.records
            .iter()
            .filter(|record| criteria.matches(record))
            .collect()
    }

    /// Exact status filter; `None` places no constraint.
    pub fn with_status(&self, status: Option<ApplicantStatus>) -> Vec<&Applicant> {
        self.records
            .iter()
            .filter(|record| status.map_or(true, |wanted| record.status == wanted))
            .collect()
    }

    /// Distinct normalized locations in first-seen order, preceded by the
    /// synthetic "all" bucket. Counts always reflect the raw working set,
    /// independent of any active filters.
    pub fn location_facets(&self) -> Vec<LocationFacet> {
        let mut facets = vec![LocationFacet {
            label: "all".to_string(),
            count: self.records.len(),
        }];

        for record in &self.records {
            let bucket = record.location_bucket();
            match facets.iter_mut().find(|facet| facet.label == bucket) {
                Some(facet) => facet.count += 1,
                None => facets.push(LocationFacet {
                    label: bucket,
                    count: 1,
                }),
            }
        }

        facets
    }
}
