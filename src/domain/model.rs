use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// 後端的識別碼可能是數字也可能是字串，統一以字串保存
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => EntityId(n.to_string()),
            Raw::Text(s) => EntityId(s),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialStep {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorialDocument {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "durationMinutes")]
    pub duration_minutes: Option<u32>,
    #[serde(default, alias = "videoUrl")]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TutorialChecklist {
    pub document: TutorialDocument,
    pub steps: Vec<TutorialStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: EntityId,
    #[serde(default, alias = "business_name")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clerk {
    pub id: EntityId,
    #[serde(default)]
    pub merchant_id: Option<EntityId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Clerk {
    pub fn has_role(&self, role: &str) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.trim().eq_ignore_ascii_case(role))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginStep1Response {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub merchants: Vec<Merchant>,
    #[serde(default)]
    pub clerks: Vec<Clerk>,
    #[serde(default)]
    pub admin_id: Option<EntityId>,
    #[serde(default, alias = "detail")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginStep2Response {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: serde_json::Value,
}

/// 第一步登入後自動選定的商家與店員
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSelection {
    pub merchant: Merchant,
    pub clerk: Clerk,
    pub admin_id: Option<EntityId>,
}

/// Bearer token. Debug output never shows the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedSession {
    pub access_token: AccessToken,
    pub token_type: String,
    pub merchant_id: EntityId,
    pub clerk_id: EntityId,
    pub admin_id: Option<EntityId>,
    pub user: serde_json::Value,
    pub authenticated_at: DateTime<Utc>,
}
