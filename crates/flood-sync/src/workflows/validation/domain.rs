use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Map centre used for dashboards and simulated field coordinates (Lagos).
pub const MAP_CENTER: (f64, f64) = (6.5244, 3.3792);

/// Placeholder image attached when a reporter does not supply one.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://via.placeholder.com/150/0000FF/FFFFFF?text=Simulated+Flood";

/// Store-assigned report identifier. Stores may hand out numeric or textual ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl<'de> Deserialize<'de> for ReportId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_flexible_id(deserializer).map(ReportId)
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn deserialize_flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(value) => value,
        RawId::Number(value) => value.to_string(),
    })
}

/// Lifecycle status of a report under peer validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    Pending,
    Validated,
    Rejected,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Validated => "validated",
            ReportStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ReportStatus::Pending)
    }
}

/// Kind of peer vote cast against a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteKind {
    #[serde(alias = "upvote")]
    Up,
    #[serde(alias = "downvote")]
    Down,
}

/// Citizen flood report as persisted by the report store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReportWire", into = "ReportWire")]
pub struct Report {
    pub id: ReportId,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub water_level: f64,
    pub description: String,
    pub image_url: String,
    pub timestamp: DateTime<Utc>,
    pub upvotes: u32,
    pub downvotes: u32,
    pub status: ReportStatus,
}

impl Report {
    pub fn validated(&self) -> bool {
        self.status == ReportStatus::Validated
    }

    pub fn total_votes(&self) -> u32 {
        self.upvotes.saturating_add(self.downvotes)
    }
}

/// A report that has not been stored yet, so it carries no id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "ReportWire")]
pub struct NewReport {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub water_level: f64,
    pub description: String,
    pub image_url: String,
    pub timestamp: DateTime<Utc>,
}

impl NewReport {
    /// Materialize the stored record once the store has picked an id.
    pub fn into_report(self, id: ReportId) -> Report {
        Report {
            id,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            water_level: self.water_level,
            description: self.description,
            image_url: self.image_url,
            timestamp: self.timestamp,
            upvotes: 0,
            downvotes: 0,
            status: ReportStatus::Pending,
        }
    }
}

/// Field report as submitted by a citizen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmission {
    pub location: String,
    pub water_level: f64,
    pub description: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Simulated IoT water level reading shown next to citizen reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    #[serde(deserialize_with = "deserialize_flexible_id")]
    pub id: String,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub current_water_level: f64,
    pub timestamp: DateTime<Utc>,
}

/// Wire shape shared with json-server style stores.
///
/// `validated` is kept for readers that predate `status`; a record without
/// `status` is treated as validated or pending based on that flag alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<ReportId>,
    location: String,
    latitude: f64,
    longitude: f64,
    water_level: f64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image_url: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    upvotes: u32,
    #[serde(default)]
    downvotes: u32,
    #[serde(default)]
    validated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<ReportStatus>,
}

impl TryFrom<ReportWire> for Report {
    type Error = String;

    fn try_from(wire: ReportWire) -> Result<Self, Self::Error> {
        let id = wire
            .id
            .ok_or_else(|| "report record is missing an id".to_string())?;
        // A `validated: true` flag wins over a stale status written by
        // clients that only know the flag.
        let status = match wire.status {
            _ if wire.validated => ReportStatus::Validated,
            Some(status) => status,
            None => ReportStatus::Pending,
        };

        Ok(Report {
            id,
            location: wire.location,
            latitude: wire.latitude,
            longitude: wire.longitude,
            water_level: wire.water_level,
            description: wire.description,
            image_url: wire.image_url,
            timestamp: wire.timestamp,
            upvotes: wire.upvotes,
            downvotes: wire.downvotes,
            status,
        })
    }
}

impl From<Report> for ReportWire {
    fn from(report: Report) -> Self {
        ReportWire {
            validated: report.validated(),
            id: Some(report.id),
            location: report.location,
            latitude: report.latitude,
            longitude: report.longitude,
            water_level: report.water_level,
            description: report.description,
            image_url: report.image_url,
            timestamp: report.timestamp,
            upvotes: report.upvotes,
            downvotes: report.downvotes,
            status: Some(report.status),
        }
    }
}

impl From<NewReport> for ReportWire {
    fn from(report: NewReport) -> Self {
        ReportWire {
            id: None,
            location: report.location,
            latitude: report.latitude,
            longitude: report.longitude,
            water_level: report.water_level,
            description: report.description,
            image_url: report.image_url,
            timestamp: report.timestamp,
            upvotes: 0,
            downvotes: 0,
            validated: false,
            status: Some(ReportStatus::Pending),
        }
    }
}
