//! Applicant review: directory cache, workflow engine, refresh scheduling.

pub mod debounce;
pub mod directory;
pub mod domain;
pub mod gateway;
pub mod scheduler;
pub mod session;

#[cfg(test)]
mod tests;

pub use debounce::QueryDebouncer;
pub use directory::{ApplicantDirectory, FetchError, LoadTicket, LocationFacet, SyncStatus};
pub use domain::{
    Applicant, ApplicantId, ApplicantStatus, DocumentKind, FilterCriteria, JobInterest,
    LocationFilter, MediaKind, RegistrationPayload, ReviewAction,
};
pub use gateway::{DirectoryGateway, HttpDirectoryGateway, MediaFile, TransportError};
pub use scheduler::{RefreshPolicy, RefreshScheduler};
pub use session::{PreviewHandle, ReviewEngine, ReviewError, ReviewSession};
