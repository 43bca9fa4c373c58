//! Wire DTOs exchanged with the feedback backend.
//!
//! DESIGN
//! ======
//! Field names mirror the backend's JSON bodies so serde round-trips stay
//! lossless. Timestamps are kept as the server's ISO-8601 strings; the client
//! only displays them.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// USERS
// =============================================================================

/// Role of a user; gates access to manager-only routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Employee,
}

/// A user as returned by `/users/me` and the other user endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Backend user identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Manager or employee.
    pub role: Role,
    /// Identifier of this user's manager, for employees.
    #[serde(default)]
    pub manager_id: Option<i64>,
    /// Account creation timestamp.
    pub created_at: String,
    /// Embedded manager record, when the backend expands it.
    #[serde(default)]
    pub manager: Option<Box<User>>,
}

impl User {
    #[must_use]
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    #[must_use]
    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}

// =============================================================================
// FEEDBACK
// =============================================================================

/// Overall tone of a feedback record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// A feedback record written by a manager about an employee.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub employee_id: i64,
    pub manager_id: i64,
    pub strengths: String,
    pub areas_to_improve: String,
    pub sentiment: Sentiment,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default)]
    pub acknowledged_at: Option<String>,
    /// Free-form labels. Accepted as a list or a comma-separated string.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub employee_comment: Option<String>,
    #[serde(default)]
    pub employee: Option<User>,
    #[serde(default)]
    pub manager: Option<User>,
}

/// Body for `POST /feedback/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackCreate {
    pub employee_id: i64,
    pub strengths: String,
    pub areas_to_improve: String,
    pub sentiment: Sentiment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_anonymous: Option<bool>,
}

/// Body for `PUT /feedback/{id}`. Absent fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub areas_to_improve: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl FeedbackUpdate {
    /// True when no field would be changed by sending this update.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strengths.is_none()
            && self.areas_to_improve.is_none()
            && self.sentiment.is_none()
            && self.tags.is_none()
    }
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<i64>,
}

impl RegisterData {
    /// Credentials used for the automatic login after registration.
    #[must_use]
    pub fn credentials(&self) -> LoginCredentials {
        LoginCredentials { email: self.email.clone(), password: self.password.clone() }
    }
}

/// Token issued by `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
}

// =============================================================================
// DASHBOARDS
// =============================================================================

/// Counters shared by both dashboard variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_feedback: u64,
    pub positive_feedback: u64,
    pub neutral_feedback: u64,
    pub negative_feedback: u64,
    #[serde(default)]
    pub recent_feedback: Vec<Feedback>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManagerDashboard {
    pub team_size: u64,
    #[serde(default)]
    pub team_members: Vec<User>,
    #[serde(flatten)]
    pub stats: DashboardStats,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDashboard {
    pub unacknowledged_feedback: u64,
    #[serde(flatten)]
    pub stats: DashboardStats,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body returned by the backend on non-success statuses.
///
/// `detail` is a plain string for business errors and a list of
/// `{loc, msg, type}` objects for request validation failures.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ApiErrorBody {
    pub detail: serde_json::Value,
}

impl ApiErrorBody {
    /// Human-readable message carried by the body, if any.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .find(|msg| !msg.trim().is_empty())
                .map(str::to_owned),
            _ => None,
        }
    }
}

// =============================================================================
// SERDE HELPERS
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsRepr {
    List(Vec<String>),
    Joined(String),
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<TagsRepr>::deserialize(deserializer)?;
    let tags = match raw {
        None => Vec::new(),
        Some(TagsRepr::List(items)) => normalize_tags(items.iter().map(String::as_str)),
        Some(TagsRepr::Joined(joined)) => normalize_tags(joined.split(',')),
    };
    Ok(tags)
}

fn normalize_tags<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}
