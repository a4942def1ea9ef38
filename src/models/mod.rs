use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Characters of content used when a story has no explicit excerpt.
pub const EXCERPT_CHARS: usize = 120;

/// Fixed category set. Anything unrecognized in stored data falls back to
/// `Other` rather than failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum Category {
    #[serde(rename = "Inspirational Stories")]
    InspirationalStories,
    #[serde(rename = "Road Test Tips")]
    RoadTestTips,
    #[serde(rename = "Parking & Maneuvers")]
    ParkingManeuvers,
    #[serde(rename = "Lesson Plans")]
    LessonPlans,
    #[serde(rename = "Checklists")]
    Checklists,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::InspirationalStories,
        Category::RoadTestTips,
        Category::ParkingManeuvers,
        Category::LessonPlans,
        Category::Checklists,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::InspirationalStories => "Inspirational Stories",
            Category::RoadTestTips => "Road Test Tips",
            Category::ParkingManeuvers => "Parking & Maneuvers",
            Category::LessonPlans => "Lesson Plans",
            Category::Checklists => "Checklists",
            Category::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.label() == label)
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(Category::from_label(&label).unwrap_or(Category::Other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Stored records come from several frontend revisions with sloppy timestamp
/// handling; anything that is not a valid RFC 3339 instant decodes as the
/// Unix epoch so recency sorting pushes it to the end.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Instant(DateTime<Utc>),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Instant(t) => t,
        Raw::Text(s) => DateTime::parse_from_rfc3339(&s)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| epoch()),
        Raw::Other(_) => epoch(),
    })
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StoryMetadata {
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default = "epoch", deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub status: StoryStatus,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub external_link: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct Story {
    pub id: String,
    pub metadata: StoryMetadata,
    pub content: String,
}

impl Story {
    /// Explicit excerpt when present, otherwise the first `EXCERPT_CHARS`
    /// characters of the content plus an ellipsis.
    pub fn excerpt(&self) -> String {
        match self.metadata.excerpt.as_deref() {
            Some(e) if !e.trim().is_empty() => e.to_string(),
            _ => {
                if self.content.chars().count() <= EXCERPT_CHARS {
                    self.content.clone()
                } else {
                    let head: String = self.content.chars().take(EXCERPT_CHARS).collect();
                    format!("{}…", head)
                }
            }
        }
    }

    pub fn summary(&self) -> StorySummary {
        StorySummary {
            id: self.id.clone(),
            title: self.metadata.title.clone(),
            excerpt: self.excerpt(),
            views: self.metadata.views,
            likes: self.metadata.likes,
            created_at: self.metadata.created_at,
            category: self.metadata.category,
            status: self.metadata.status,
            image_url: self.metadata.image_url.clone(),
            video_url: self.metadata.video_url.clone(),
            external_link: self.metadata.external_link.clone(),
            free: false,
        }
    }
}

/// Listing view of a story: no content body, excerpt always materialized,
/// plus the free-tier flag filled in by the listing layer.
#[derive(Debug, Serialize, Clone)]
pub struct StorySummary {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub views: u64,
    pub likes: u64,
    pub created_at: DateTime<Utc>,
    pub category: Category,
    pub status: StoryStatus,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub external_link: Option<String>,
    pub free: bool,
}

fn default_button_label() -> String {
    "View Menu".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Advertisement {
    pub id: String,
    pub restaurant_name: String,
    pub content: String,
    pub offer: String,
    pub address: String,
    pub menu_link: String,
    #[serde(default = "default_button_label")]
    pub button_label: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    User,
    Admin,
}

/// The identity a session resolves to. The role is derived from the email at
/// login time and cached in the session cookie, never stored in the database.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Generic JSON message body for error and status responses.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        ApiMessage {
            message: message.into(),
        }
    }
}

pub mod db_operations;
