use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Identifier assigned to an applicant by the agency API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicantId(pub u64);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review pipeline status tracked for every applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicantStatus {
    Pending,
    Vetted,
    Approved,
    Rejected,
    Hired,
}

impl ApplicantStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicantStatus::Pending => "pending",
            ApplicantStatus::Vetted => "vetted",
            ApplicantStatus::Approved => "approved",
            ApplicantStatus::Rejected => "rejected",
            ApplicantStatus::Hired => "hired",
        }
    }
}

impl fmt::Display for ApplicantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Staff actions that advance an applicant through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    MarkVetted,
    Approve,
    Reject,
    Hire,
    Restore,
}

impl ReviewAction {
    /// Path segment the API expects for the PATCH transition call.
    pub const fn endpoint(self) -> &'static str {
        match self {
            ReviewAction::MarkVetted => "vet",
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
            ReviewAction::Hire => "hired",
            ReviewAction::Restore => "restore",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ReviewAction::MarkVetted => "mark-vetted",
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
            ReviewAction::Hire => "hire",
            ReviewAction::Restore => "restore",
        }
    }

    /// The legal transition table. Anything not listed here is refused
    /// locally before a request is issued.
    pub const fn permitted_from(self, status: ApplicantStatus) -> bool {
        matches!(
            (status, self),
            (ApplicantStatus::Pending, ReviewAction::MarkVetted)
                | (ApplicantStatus::Pending, ReviewAction::Reject)
                | (ApplicantStatus::Vetted, ReviewAction::Reject)
                | (ApplicantStatus::Vetted, ReviewAction::Approve)
                | (ApplicantStatus::Approved, ReviewAction::Hire)
                | (ApplicantStatus::Hired, ReviewAction::Restore)
        )
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Curated media attached during review and published once approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    ShowcasePhoto,
    Video,
}

impl MediaKind {
    /// Path segment of the media upload endpoint.
    pub const fn endpoint(self) -> &'static str {
        match self {
            MediaKind::ShowcasePhoto => "showcase",
            MediaKind::Video => "videos",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            MediaKind::ShowcasePhoto => "showcase photo",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Documents collected at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Passport,
    NationalId,
    FullPhoto,
    Resume,
    BirthCertificate,
    GoodConduct,
}

impl DocumentKind {
    /// Value of the `kind` query parameter on the upload endpoint.
    pub const fn kind_param(self) -> &'static str {
        match self {
            DocumentKind::Passport => "PASSPORT",
            DocumentKind::NationalId => "NATIONAL_ID",
            DocumentKind::FullPhoto => "FULL_PHOTO",
            DocumentKind::Resume => "RESUME",
            DocumentKind::BirthCertificate => "BIRTH_CERTIFICATE",
            DocumentKind::GoodConduct => "GOOD_CONDUCT",
        }
    }

    /// Photos and certificates land on different media endpoints.
    pub const fn endpoint(self) -> &'static str {
        match self {
            DocumentKind::Passport | DocumentKind::NationalId | DocumentKind::FullPhoto => "photo",
            DocumentKind::Resume | DocumentKind::BirthCertificate | DocumentKind::GoodConduct => {
                "resume"
            }
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_param())
    }
}

/// Job market an applicant registered interest in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobInterest {
    LocalJobs,
    InternationalJobs,
}

impl JobInterest {
    pub const fn label(self) -> &'static str {
        match self {
            JobInterest::LocalJobs => "Local Jobs",
            JobInterest::InternationalJobs => "International Jobs",
        }
    }
}

/// Applicant record as served by `GET /api/applications`.
///
/// Media collections are ordered sequences of server-relative URLs and only
/// ever grow from this core's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: ApplicantId,
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_interest: Option<JobInterest>,
    pub status: ApplicantStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub has_cat: bool,
    #[serde(default)]
    pub has_dog: bool,
    #[serde(default)]
    pub extra_pay: bool,
    #[serde(default)]
    pub live_out: bool,
    #[serde(default)]
    pub private_room: bool,
    #[serde(default)]
    pub elderly_care: bool,
    #[serde(default)]
    pub special_needs: bool,
    #[serde(default)]
    pub older_than_1: bool,
    #[serde(default)]
    pub younger_than_1: bool,

    #[serde(default)]
    pub passport_photos: Vec<String>,
    #[serde(default)]
    pub full_photos: Vec<String>,
    #[serde(default)]
    pub national_id_photos: Vec<String>,
    #[serde(default)]
    pub resumes: Vec<String>,
    #[serde(default)]
    pub birth_certificates: Vec<String>,
    #[serde(default)]
    pub good_conducts: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub showcase_photos: Vec<String>,
}

impl Applicant {
    /// Lowercased location used for facet bucketing; missing locations fall
    /// into the synthetic "other" bucket.
    pub fn location_bucket(&self) -> String {
        self.current_location
            .as_deref()
            .map(|loc| loc.trim())
            .filter(|loc| !loc.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(|| "other".to_string())
    }
}

/// Location selector on the public directory filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocationFilter {
    #[default]
    All,
    Named(String),
}

impl LocationFilter {
    pub fn named(location: impl Into<String>) -> Self {
        Self::Named(location.into())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, LocationFilter::All)
    }
}

impl Serialize for LocationFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // "all" is a UI sentinel and is omitted from payloads upstream;
            // serialize it literally if it does get this far.
            LocationFilter::All => serializer.serialize_str("all"),
            LocationFilter::Named(location) => serializer.serialize_str(location),
        }
    }
}

/// Structured criteria for the public directory. A set flag means "must be
/// true"; an unset flag places no constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(skip_serializing_if = "is_false")]
    pub has_cat: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub has_dog: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub extra_pay: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub live_out: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub private_room: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub elderly_care: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub special_needs: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub older_than_1: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub younger_than_1: bool,
    #[serde(rename = "currentLocation", skip_serializing_if = "LocationFilter::is_all")]
    pub location: LocationFilter,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl FilterCriteria {
    pub fn matches(&self, applicant: &Applicant) -> bool {
        let flags = [
            (self.has_cat, applicant.has_cat),
            (self.has_dog, applicant.has_dog),
            (self.extra_pay, applicant.extra_pay),
            (self.live_out, applicant.live_out),
            (self.private_room, applicant.private_room),
            (self.elderly_care, applicant.elderly_care),
            (self.special_needs, applicant.special_needs),
            (self.older_than_1, applicant.older_than_1),
            (self.younger_than_1, applicant.younger_than_1),
        ];
        if flags.iter().any(|(required, actual)| *required && !actual) {
            return false;
        }

        match &self.location {
            LocationFilter::All => true,
            LocationFilter::Named(location) => {
                applicant.location_bucket() == location.trim().to_lowercase()
            }
        }
    }
}

/// Registration payload for `POST /api/applications`.
///
/// Enum-like fields arrive from forms in mixed case and are normalized to
/// uppercase before submission; empty optional fields are omitted entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    pub employment_status: String,
    pub job_interest: JobInterest,
    pub has_cat: bool,
    pub has_dog: bool,
    pub extra_pay: bool,
    pub live_out: bool,
    pub private_room: bool,
    pub elderly_care: bool,
    pub special_needs: bool,
    pub older_than_1: bool,
    pub younger_than_1: bool,
}
