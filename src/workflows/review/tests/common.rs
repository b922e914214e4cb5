use std::collections::VecDeque;
use std::sync::Mutex;

use crate::workflows::review::domain::{
    Applicant, ApplicantId, ApplicantStatus, DocumentKind, FilterCriteria, JobInterest, MediaKind,
    RegistrationPayload, ReviewAction,
};
use crate::workflows::review::gateway::{DirectoryGateway, MediaFile, TransportError};

pub(super) fn applicant(id: u64, name: &str, status: ApplicantStatus) -> Applicant {
    let handle = name.to_lowercase().replace(' ', ".");
    Applicant {
        id: ApplicantId(id),
        full_name: name.to_string(),
        email: format!("{handle}@agency.example"),
        phone_number: format!("07{id:08}"),
        dob: None,
        age: None,
        nationality: None,
        experience: None,
        current_location: None,
        languages: Vec::new(),
        employment_status: None,
        job_interest: Some(JobInterest::LocalJobs),
        status,
        created_at: None,
        updated_at: None,
        has_cat: false,
        has_dog: false,
        extra_pay: false,
        live_out: false,
        private_room: false,
        elderly_care: false,
        special_needs: false,
        older_than_1: false,
        younger_than_1: false,
        passport_photos: Vec::new(),
        full_photos: Vec::new(),
        national_id_photos: Vec::new(),
        resumes: Vec::new(),
        birth_certificates: Vec::new(),
        good_conducts: Vec::new(),
        videos: Vec::new(),
        showcase_photos: Vec::new(),
    }
}

pub(super) fn located(mut record: Applicant, location: &str) -> Applicant {
    record.current_location = Some(location.to_string());
    record
}

pub(super) fn photo(file_name: &str) -> MediaFile {
    MediaFile::new(file_name, mime::IMAGE_JPEG, vec![0xFF, 0xD8, 0xFF])
}

pub(super) fn video(file_name: &str) -> MediaFile {
    MediaFile::new(file_name, "video/mp4".parse().expect("valid mime"), vec![1, 2, 3, 4])
}

pub(super) fn status_error(endpoint: &str) -> TransportError {
    TransportError::Status {
        endpoint: endpoint.to_string(),
        status: 502,
    }
}

/// Sample listing served when no explicit response is queued, so the
/// scheduler loop always has something to load.
pub(super) fn default_listing() -> Vec<Applicant> {
    vec![
        located(applicant(1, "Jane Doe", ApplicantStatus::Pending), "Nairobi"),
        applicant(2, "John Otieno", ApplicantStatus::Vetted),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum GatewayCall {
    List,
    Filter,
    Transition(ApplicantId, ReviewAction),
    UploadMedia(ApplicantId, MediaKind, String),
}

/// In-memory gateway double. Responses are consumed front to back; an empty
/// listing queue falls back to [`default_listing`].
#[derive(Default)]
pub(super) struct RecordingGateway {
    list_responses: Mutex<VecDeque<Result<Vec<Applicant>, TransportError>>>,
    transition_responses: Mutex<VecDeque<Result<Applicant, TransportError>>>,
    upload_responses: Mutex<VecDeque<Result<Vec<String>, TransportError>>>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl RecordingGateway {
    pub(super) fn queue_listing(&self, outcome: Result<Vec<Applicant>, TransportError>) {
        self.list_responses
            .lock()
            .expect("gateway mutex poisoned")
            .push_back(outcome);
    }

    pub(super) fn queue_transition(&self, outcome: Result<Applicant, TransportError>) {
        self.transition_responses
            .lock()
            .expect("gateway mutex poisoned")
            .push_back(outcome);
    }

    pub(super) fn queue_upload(&self, outcome: Result<Vec<String>, TransportError>) {
        self.upload_responses
            .lock()
            .expect("gateway mutex poisoned")
            .push_back(outcome);
    }

    pub(super) fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("gateway mutex poisoned").clone()
    }

    pub(super) fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, GatewayCall::List))
            .count()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("gateway mutex poisoned").push(call);
    }
}

impl DirectoryGateway for RecordingGateway {
    async fn list_applicants(&self) -> Result<Vec<Applicant>, TransportError> {
        self.record(GatewayCall::List);
        self.list_responses
            .lock()
            .expect("gateway mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(default_listing()))
    }

    async fn filter_applicants(
        &self,
        _criteria: &FilterCriteria,
    ) -> Result<Vec<Applicant>, TransportError> {
        self.record(GatewayCall::Filter);
        Ok(Vec::new())
    }

    async fn transition(
        &self,
        id: ApplicantId,
        action: ReviewAction,
    ) -> Result<Applicant, TransportError> {
        self.record(GatewayCall::Transition(id, action));
        self.transition_responses
            .lock()
            .expect("gateway mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| panic!("no transition response queued for {action:?}"))
    }

    async fn upload_media(
        &self,
        id: ApplicantId,
        kind: MediaKind,
        file: &MediaFile,
    ) -> Result<Vec<String>, TransportError> {
        self.record(GatewayCall::UploadMedia(id, kind, file.file_name.clone()));
        self.upload_responses
            .lock()
            .expect("gateway mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| panic!("no upload response queued for {kind:?}"))
    }

    async fn create_applicant(
        &self,
        _payload: &RegistrationPayload,
    ) -> Result<Applicant, TransportError> {
        panic!("registration endpoints are not exercised by review tests");
    }

    async fn upload_document(
        &self,
        _id: ApplicantId,
        _kind: DocumentKind,
        _file: &MediaFile,
    ) -> Result<(), TransportError> {
        panic!("registration endpoints are not exercised by review tests");
    }
}
