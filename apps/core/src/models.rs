use serde::{Deserialize, Serialize};

/// One logged chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// The user's message.
    pub user: Option<String>,
    /// The bot's reply.
    pub bot: Option<String>,
    /// Classifier label; `None` for rows written before the column existed.
    pub label: Option<String>,
}

/// A persisted journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub entry: Option<String>,
    /// UTC timestamp, ISO-8601 with microseconds and no offset.
    pub created_at: Option<String>,
}

/// A helpful link, tagged with a stress type or `general`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
}

/// A registered user.
/// Both fields are optional and stored verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A logged user interaction (playlist play, breathing session...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLog {
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// Resource links inserted into an empty `resources` table.
pub const DEFAULT_RESOURCES: &[(&str, &str, &str)] = &[
    (
        "Breathing exercise guide",
        "https://www.healthline.com/health/breathing-exercise",
        "Anxiety",
    ),
    (
        "Pomodoro Technique",
        "https://francescocirillo.com/pages/pomodoro-technique",
        "Work/Academic",
    ),
    (
        "Sleep hygiene tips",
        "https://www.sleepfoundation.org/sleep-hygiene",
        "sleep",
    ),
    (
        "Mental health resources",
        "https://www.mentalhealth.gov/get-help",
        "general",
    ),
    (
        "Suicide prevention (international)",
        "https://www.opencounseling.com/suicide-hotlines",
        "suicidal",
    ),
    (
        "Calmful Spotify playlist",
        "https://open.spotify.com/playlist/37i9dQZF1DX3PIPIT6lEg5",
        "music",
    ),
];
