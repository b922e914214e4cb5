use std::sync::Arc;

use tracing::{debug, info};

use super::directory::ApplicantDirectory;
use super::domain::{Applicant, ApplicantId, ApplicantStatus, MediaKind, ReviewAction};
use super::gateway::{DirectoryGateway, MediaFile, TransportError};

/// Reference to a staged file that a view can render as a preview. The
/// underlying bytes stay owned by the session; replacing a staged file of
/// the same kind releases the previous preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    pub kind: MediaKind,
    pub file_name: String,
}

/// Review context for a single applicant. Opening a session resets any
/// previously staged selections.
#[derive(Debug)]
pub struct ReviewSession {
    applicant: Applicant,
    staged_photo: Option<MediaFile>,
    staged_video: Option<MediaFile>,
    staged_video_links: Vec<String>,
    action_in_flight: bool,
}

impl ReviewSession {
    fn new(applicant: Applicant) -> Self {
        Self {
            applicant,
            staged_photo: None,
            staged_video: None,
            staged_video_links: Vec::new(),
            action_in_flight: false,
        }
    }

    pub fn applicant(&self) -> &Applicant {
        &self.applicant
    }

    pub fn action_in_flight(&self) -> bool {
        self.action_in_flight
    }

    /// Stage a file for the next approval commit. Files are validated to be
    /// non-empty, and a file of the same kind replaces (and releases) the
    /// previous selection. No network traffic happens here.
    pub fn stage_media(
        &mut self,
        file: MediaFile,
        kind: MediaKind,
    ) -> Result<PreviewHandle, ReviewError> {
        if file.is_empty() {
            return Err(ReviewError::EmptyMediaFile {
                file_name: file.file_name,
            });
        }

        let handle = PreviewHandle {
            kind,
            file_name: file.file_name.clone(),
        };
        let slot = match kind {
            MediaKind::ShowcasePhoto => &mut self.staged_photo,
            MediaKind::Video => &mut self.staged_video,
        };
        if let Some(previous) = slot.replace(file) {
            debug!(
                kind = kind.label(),
                replaced = %previous.file_name,
                "released previously staged preview"
            );
        }
        Ok(handle)
    }

    /// Stage a hosted video URL in place of an uploaded file. The link is
    /// appended locally and reconciled with the server on commit; it counts
    /// toward the approval precondition immediately.
    pub fn stage_video_link(&mut self, url: &str) -> Result<(), ReviewError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ReviewError::BlankVideoLink);
        }
        self.staged_video_links.push(trimmed.to_string());
        Ok(())
    }

    pub fn staged_video_links(&self) -> &[String] {
        &self.staged_video_links
    }

    fn has_photo_evidence(&self) -> bool {
        self.staged_photo.is_some() || !self.applicant.showcase_photos.is_empty()
    }

    fn has_video_evidence(&self) -> bool {
        self.staged_video.is_some()
            || !self.staged_video_links.is_empty()
            || !self.applicant.videos.is_empty()
    }
}

/// Errors raised by the review workflow. Validation failures are local and
/// never reach the network.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("{action} is not allowed from status {from}")]
    InvalidTransition {
        from: ApplicantStatus,
        action: ReviewAction,
    },
    #[error("approval blocked: no {missing} on file or staged")]
    PreconditionNotMet { missing: MediaKind },
    #[error("staged file '{file_name}' is empty")]
    EmptyMediaFile { file_name: String },
    #[error("video link must not be blank")]
    BlankVideoLink,
    #[error("an action is already in progress for applicant {0}")]
    ActionInProgress(ApplicantId),
    #[error("applicant {0} is not in the working set")]
    UnknownApplicant(ApplicantId),
    #[error("media upload failed: {0}")]
    Upload(#[source] TransportError),
    #[error("transition request failed: {0}")]
    Action(#[source] TransportError),
}

/// Drives status transitions and the upload-then-approve commit, keeping
/// the directory cache reconciled with every authoritative server response.
#[derive(Debug)]
pub struct ReviewEngine<G> {
    gateway: Arc<G>,
}

impl<G> ReviewEngine<G>
where
    G: DirectoryGateway,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Open a review session for an applicant, discarding any selections
    /// staged for a previously reviewed applicant.
    pub fn open(&self, applicant: Applicant) -> ReviewSession {
        ReviewSession::new(applicant)
    }

    /// Upload staged media, then issue the approve transition.
    ///
    /// Uploads run first and independently; any upload failure aborts the
    /// commit before the transition is issued, leaving the status untouched
    /// (media that already uploaded stays uploaded). The approve request is
    /// only sent when the union of staged and persisted media contains at
    /// least one showcase photo and one video or video link.
    pub async fn commit_approval(
        &self,
        session: &mut ReviewSession,
        directory: &mut ApplicantDirectory,
    ) -> Result<Applicant, ReviewError> {
        if session.action_in_flight {
            return Err(ReviewError::ActionInProgress(session.applicant.id));
        }
        if !ReviewAction::Approve.permitted_from(session.applicant.status) {
            return Err(ReviewError::InvalidTransition {
                from: session.applicant.status,
                action: ReviewAction::Approve,
            });
        }
        if !session.has_photo_evidence() {
            return Err(ReviewError::PreconditionNotMet {
                missing: MediaKind::ShowcasePhoto,
            });
        }
        if !session.has_video_evidence() {
            return Err(ReviewError::PreconditionNotMet {
                missing: MediaKind::Video,
            });
        }

        session.action_in_flight = true;
        let result = self.commit_inner(session, directory).await;
        session.action_in_flight = false;
        result
    }

    async fn commit_inner(
        &self,
        session: &mut ReviewSession,
        directory: &mut ApplicantDirectory,
    ) -> Result<Applicant, ReviewError> {
        let id = session.applicant.id;

        if let Some(file) = session.staged_photo.take() {
            match self
                .gateway
                .upload_media(id, MediaKind::ShowcasePhoto, &file)
                .await
            {
                Ok(urls) => {
                    session.applicant.showcase_photos.extend(urls);
                    directory.upsert(session.applicant.clone());
                }
                Err(err) => {
                    // Put the selection back so the user can retry the commit.
                    session.staged_photo = Some(file);
                    return Err(ReviewError::Upload(err));
                }
            }
        }

        if let Some(file) = session.staged_video.take() {
            match self.gateway.upload_media(id, MediaKind::Video, &file).await {
                Ok(urls) => {
                    session.applicant.videos.extend(urls);
                    directory.upsert(session.applicant.clone());
                }
                Err(err) => {
                    session.staged_video = Some(file);
                    return Err(ReviewError::Upload(err));
                }
            }
        }

        let mut updated = self
            .gateway
            .transition(id, ReviewAction::Approve)
            .await
            .map_err(ReviewError::Action)?;

        // Video links never hit the media endpoint; carry any the server
        // does not yet know about into the authoritative record.
        for link in session.staged_video_links.drain(..) {
            if !updated.videos.contains(&link) {
                updated.videos.push(link);
            }
        }

        session.applicant = updated.clone();
        directory.upsert(updated.clone());
        info!(%id, "applicant approved");
        Ok(updated)
    }

    /// Issue a media-free transition (mark-vetted, reject, hire, restore)
    /// and reconcile the response into the directory. Illegal transitions
    /// and the approve media precondition are refused locally without any
    /// network call.
    pub async fn transition(
        &self,
        directory: &mut ApplicantDirectory,
        id: ApplicantId,
        action: ReviewAction,
    ) -> Result<Applicant, ReviewError> {
        let current = directory
            .get(id)
            .ok_or(ReviewError::UnknownApplicant(id))?;

        if !action.permitted_from(current.status) {
            return Err(ReviewError::InvalidTransition {
                from: current.status,
                action,
            });
        }
        if action == ReviewAction::Approve {
            if current.showcase_photos.is_empty() {
                return Err(ReviewError::PreconditionNotMet {
                    missing: MediaKind::ShowcasePhoto,
                });
            }
            if current.videos.is_empty() {
                return Err(ReviewError::PreconditionNotMet {
                    missing: MediaKind::Video,
                });
            }
        }

        let updated = self
            .gateway
            .transition(id, action)
            .await
            .map_err(ReviewError::Action)?;
        directory.upsert(updated.clone());
        info!(%id, action = action.label(), to = updated.status.label(), "transition applied");
        Ok(updated)
    }

    /// Upload a single file outside the approval flow (e.g. adding showcase
    /// photos to an already approved applicant). Always appends to the
    /// applicant's media sequence.
    pub async fn upload_single(
        &self,
        directory: &mut ApplicantDirectory,
        id: ApplicantId,
        file: MediaFile,
        kind: MediaKind,
    ) -> Result<Vec<String>, ReviewError> {
        if file.is_empty() {
            return Err(ReviewError::EmptyMediaFile {
                file_name: file.file_name,
            });
        }
        let mut record = directory
            .get(id)
            .cloned()
            .ok_or(ReviewError::UnknownApplicant(id))?;

        let urls = self
            .gateway
            .upload_media(id, kind, &file)
            .await
            .map_err(ReviewError::Upload)?;

        match kind {
            MediaKind::ShowcasePhoto => record.showcase_photos.extend(urls.iter().cloned()),
            MediaKind::Video => record.videos.extend(urls.iter().cloned()),
        }
        directory.upsert(record);
        Ok(urls)
    }
}
