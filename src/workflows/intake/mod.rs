//! Public registration intake: create the applicant record, then upload the
//! supporting documents collected by the multi-step form.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::workflows::review::domain::{
    Applicant, DocumentKind, JobInterest, RegistrationPayload,
};
use crate::workflows::review::gateway::{DirectoryGateway, MediaFile, TransportError};

/// Raw form data as collected from the registration steps, before
/// normalization.
#[derive(Debug, Clone, Default)]
pub struct RegistrationSubmission {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub dob: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub experience: Option<String>,
    pub current_location: Option<String>,
    pub languages: Vec<String>,
    pub employment_status: String,
    pub job_interest: Option<JobInterest>,
    pub has_cat: bool,
    pub has_dog: bool,
    pub extra_pay: bool,
    pub live_out: bool,
    pub private_room: bool,
    pub elderly_care: bool,
    pub special_needs: bool,
    pub older_than_1: bool,
    pub younger_than_1: bool,
    pub documents: Vec<(DocumentKind, MediaFile)>,
}

impl RegistrationSubmission {
    fn validate(&self) -> Result<(), IntakeError> {
        if self.full_name.trim().is_empty() {
            return Err(IntakeError::MissingField("fullName"));
        }
        if self.email.trim().is_empty() {
            return Err(IntakeError::MissingField("email"));
        }
        if self.phone_number.trim().is_empty() {
            return Err(IntakeError::MissingField("phoneNumber"));
        }
        if self.employment_status.trim().is_empty() {
            return Err(IntakeError::MissingField("employmentStatus"));
        }
        if self.job_interest.is_none() {
            return Err(IntakeError::MissingField("jobInterest"));
        }
        for (kind, file) in &self.documents {
            if file.is_empty() {
                return Err(IntakeError::EmptyDocument(*kind));
            }
        }
        Ok(())
    }

    /// Wire payload: enum-like values uppercased, empty optionals omitted.
    fn payload(&self) -> RegistrationPayload {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        RegistrationPayload {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            dob: self.dob,
            nationality: non_empty(&self.nationality),
            experience: non_empty(&self.experience),
            current_location: non_empty(&self.current_location),
            languages: self
                .languages
                .iter()
                .map(|language| language.trim().to_uppercase())
                .filter(|language| !language.is_empty())
                .collect(),
            employment_status: self.employment_status.trim().to_uppercase(),
            // validate() has already required the interest.
            job_interest: self.job_interest.unwrap_or(JobInterest::LocalJobs),
            has_cat: self.has_cat,
            has_dog: self.has_dog,
            extra_pay: self.extra_pay,
            live_out: self.live_out,
            private_room: self.private_room,
            elderly_care: self.elderly_care,
            special_needs: self.special_needs,
            older_than_1: self.older_than_1,
            younger_than_1: self.younger_than_1,
        }
    }
}

/// Outcome of a submission. The applicant record exists even when some
/// document uploads fail; failed kinds are reported so the form can offer a
/// retry for just those files.
#[derive(Debug)]
pub struct IntakeReceipt {
    pub applicant: Applicant,
    pub uploaded: usize,
    pub failed_documents: Vec<DocumentKind>,
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("missing required field {0}")]
    MissingField(&'static str),
    #[error("document {0} is empty")]
    EmptyDocument(DocumentKind),
    #[error("registration request failed: {0}")]
    Create(#[source] TransportError),
}

/// Submits registrations through the gateway.
#[derive(Debug)]
pub struct IntakeService<G> {
    gateway: Arc<G>,
}

impl<G> IntakeService<G>
where
    G: DirectoryGateway,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn submit(
        &self,
        submission: RegistrationSubmission,
    ) -> Result<IntakeReceipt, IntakeError> {
        submission.validate()?;

        let applicant = self
            .gateway
            .create_applicant(&submission.payload())
            .await
            .map_err(IntakeError::Create)?;
        info!(id = %applicant.id, "application created");

        let mut uploaded = 0;
        let mut failed_documents = Vec::new();
        for (kind, file) in &submission.documents {
            match self.gateway.upload_document(applicant.id, *kind, file).await {
                Ok(()) => uploaded += 1,
                Err(err) => {
                    warn!(id = %applicant.id, kind = %kind, error = %err, "document upload failed");
                    failed_documents.push(*kind);
                }
            }
        }

        Ok(IntakeReceipt {
            applicant,
            uploaded,
            failed_documents,
        })
    }
}
