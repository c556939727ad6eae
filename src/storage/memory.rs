//! In-process link store
//!
//! Keeps links and clicks behind a single `RwLock`. Used for `memory://`
//! deployments and as the default test double for `LinkService`.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::LinkStore;
use super::models::{ClickEvent, NewClickEvent, NewShortLink, ShortLink};
use crate::errors::{LinkscopeError, Result};

#[derive(Default)]
struct Inner {
    /// 插入顺序即 id 顺序
    links: Vec<ShortLink>,
    by_code: HashMap<String, usize>,
    by_id: HashMap<i64, usize>,
    next_link_id: i64,
    next_click_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of recorded clicks across all links.
    pub fn click_total(&self) -> usize {
        self.inner.read().links.iter().map(|l| l.clicks.len()).sum()
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        let inner = self.inner.read();
        Ok(inner.by_code.get(code).map(|&idx| inner.links[idx].clone()))
    }

    async fn save(&self, link: NewShortLink) -> Result<ShortLink> {
        let mut inner = self.inner.write();

        // 检查与插入在同一把写锁内完成
        if inner.by_code.contains_key(&link.code) {
            return Err(LinkscopeError::code_conflict(format!(
                "Short code '{}' already exists",
                link.code
            )));
        }

        inner.next_link_id += 1;
        let stored = ShortLink {
            id: inner.next_link_id,
            code: link.code,
            original_url: link.original_url,
            created_at: link.created_at,
            clicks: Vec::new(),
        };

        let idx = inner.links.len();
        inner.by_code.insert(stored.code.clone(), idx);
        inner.by_id.insert(stored.id, idx);
        inner.links.push(stored.clone());

        debug!("MemoryStore: saved link {} as id {}", stored.code, stored.id);
        Ok(stored)
    }

    async fn find_all(&self) -> Result<Vec<ShortLink>> {
        Ok(self.inner.read().links.clone())
    }

    async fn save_click(&self, click: NewClickEvent) -> Result<ClickEvent> {
        let mut inner = self.inner.write();

        let Some(&idx) = inner.by_id.get(&click.link_id) else {
            return Err(LinkscopeError::not_found(format!(
                "Link id {} does not exist",
                click.link_id
            )));
        };

        inner.next_click_id += 1;
        let event = ClickEvent {
            id: inner.next_click_id,
            link_id: click.link_id,
            clicked_at: click.clicked_at,
            client_address: click.client_address,
            referrer: click.referrer,
            user_agent: click.user_agent,
        };
        inner.links[idx].clicks.push(event.clone());
        Ok(event)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.inner.read().links.len() as u64)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
