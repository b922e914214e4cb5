use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use mime::Mime;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::auth::{AuthContext, AuthError};
use crate::config::ApiConfig;

use super::domain::{
    Applicant, ApplicantId, DocumentKind, FilterCriteria, MediaKind, RegistrationPayload,
    ReviewAction,
};

/// An in-memory file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: Mime,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(file_name: impl Into<String>, content_type: Mime, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Transport-level failures talking to the agency API.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to construct http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Seam between the review workflow and the agency HTTP API, so the cache,
/// engine, and scheduler can be exercised against in-memory doubles.
#[allow(async_fn_in_trait)]
pub trait DirectoryGateway {
    /// `GET /api/applications` — the full applicant listing.
    async fn list_applicants(&self) -> Result<Vec<Applicant>, TransportError>;

    /// `POST /api/applications/filter` — server-side structured filtering
    /// for the public directory.
    async fn filter_applicants(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Applicant>, TransportError>;

    /// `PATCH /api/applications/{id}/{action}` — returns the updated record.
    async fn transition(
        &self,
        id: ApplicantId,
        action: ReviewAction,
    ) -> Result<Applicant, TransportError>;

    /// `POST /api/media/{id}/showcase|videos` — multipart upload, returns
    /// the stored server-relative URLs.
    async fn upload_media(
        &self,
        id: ApplicantId,
        kind: MediaKind,
        file: &MediaFile,
    ) -> Result<Vec<String>, TransportError>;

    /// `POST /api/applications` — create a record from a registration
    /// submission; the returned id drives the document uploads.
    async fn create_applicant(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<Applicant, TransportError>;

    /// `POST /api/media/{id}/photo|resume?kind=...` — registration-time
    /// document upload.
    async fn upload_document(
        &self,
        id: ApplicantId,
        kind: DocumentKind,
        file: &MediaFile,
    ) -> Result<(), TransportError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaFileDto {
    file_url: String,
}

/// Reqwest-backed gateway. Holds the optional staff session and signs every
/// request with it, refusing to send once the session has expired.
#[derive(Debug)]
pub struct HttpDirectoryGateway {
    http: reqwest::Client,
    base_url: String,
    auth: Mutex<Option<AuthContext>>,
}

impl HttpDirectoryGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            auth: Mutex::new(None),
        })
    }

    /// Install or clear the staff session used to sign requests.
    pub fn set_auth(&self, context: Option<AuthContext>) {
        *self.auth.lock().unwrap_or_else(PoisonError::into_inner) = context;
    }

    /// Join a server-relative media path onto the configured base URL.
    pub fn media_url(&self, relative: &str) -> String {
        if relative.starts_with('/') {
            format!("{}{relative}", self.base_url)
        } else {
            format!("{}/{relative}", self.base_url)
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer header when a session is present. An expired
    /// session is cleared and reported without issuing the request.
    fn sign(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, TransportError> {
        let mut guard = self.auth.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(context) => match context.bearer(Utc::now()) {
                Ok(header) => Ok(request.header(reqwest::header::AUTHORIZATION, header)),
                Err(err) => {
                    *guard = None;
                    Err(TransportError::Auth(err))
                }
            },
            None => Ok(request),
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = self
            .sign(request)?
            .send()
            .await
            .map_err(|source| TransportError::Request {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| TransportError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })
    }

    fn part_for(file: &MediaFile, endpoint: &str) -> Result<reqwest::multipart::Part, TransportError> {
        reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.content_type.as_ref())
            .map_err(|source| TransportError::Request {
                endpoint: endpoint.to_string(),
                source,
            })
    }
}

impl DirectoryGateway for HttpDirectoryGateway {
    async fn list_applicants(&self) -> Result<Vec<Applicant>, TransportError> {
        let endpoint = self.endpoint("/api/applications");
        self.send_json(&endpoint, self.http.get(&endpoint)).await
    }

    async fn filter_applicants(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Applicant>, TransportError> {
        let endpoint = self.endpoint("/api/applications/filter");
        self.send_json(&endpoint, self.http.post(&endpoint).json(criteria))
            .await
    }

    async fn transition(
        &self,
        id: ApplicantId,
        action: ReviewAction,
    ) -> Result<Applicant, TransportError> {
        let endpoint = self.endpoint(&format!("/api/applications/{id}/{}", action.endpoint()));
        debug!(%id, action = action.label(), "issuing transition");
        self.send_json(&endpoint, self.http.patch(&endpoint)).await
    }

    async fn upload_media(
        &self,
        id: ApplicantId,
        kind: MediaKind,
        file: &MediaFile,
    ) -> Result<Vec<String>, TransportError> {
        let endpoint = self.endpoint(&format!("/api/media/{id}/{}", kind.endpoint()));
        // The API takes a file list even for a single upload.
        let form =
            reqwest::multipart::Form::new().part("files", Self::part_for(file, &endpoint)?);
        let stored: Vec<MediaFileDto> = self
            .send_json(&endpoint, self.http.post(&endpoint).multipart(form))
            .await?;
        Ok(stored.into_iter().map(|dto| dto.file_url).collect())
    }

    async fn create_applicant(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<Applicant, TransportError> {
        let endpoint = self.endpoint("/api/applications");
        self.send_json(&endpoint, self.http.post(&endpoint).json(payload))
            .await
    }

    async fn upload_document(
        &self,
        id: ApplicantId,
        kind: DocumentKind,
        file: &MediaFile,
    ) -> Result<(), TransportError> {
        let endpoint = self.endpoint(&format!("/api/media/{id}/{}", kind.endpoint()));
        let form = reqwest::multipart::Form::new().part("file", Self::part_for(file, &endpoint)?);
        let response = self
            .sign(
                self.http
                    .post(&endpoint)
                    .query(&[("kind", kind.kind_param())])
                    .multipart(form),
            )?
            .send()
            .await
            .map_err(|source| TransportError::Request {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
