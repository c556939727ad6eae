use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored short link together with its click history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    pub id: i64,
    #[serde(rename = "shortCode")]
    pub code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    /// 按记录顺序排列，只追加
    #[serde(rename = "clickStats", default)]
    pub clicks: Vec<ClickEvent>,
}

impl ShortLink {
    pub fn click_count(&self) -> usize {
        self.clicks.len()
    }
}

/// One recorded visit to a short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub id: i64,
    /// 所属短链接 ID（仅用于查找，不参与序列化）
    #[serde(skip)]
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    #[serde(rename = "ipAddress")]
    pub client_address: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

/// A link that has not been persisted yet; the store assigns its `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub code: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

/// A click that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClickEvent {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub client_address: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

/// Best-effort client metadata extracted from an inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub address: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}
