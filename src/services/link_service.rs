//! Link service
//!
//! Creation (generate, check, persist) and resolution (lookup, record
//! click) of short links. Shared by every HTTP handler.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::code_generator::CodeGenerator;
use crate::config::{AnalyticsConfig, ShortCodeConfig};
use crate::errors::{LinkscopeError, Result};
use crate::storage::{ClientMeta, LinkStore, NewClickEvent, NewShortLink, ShortLink};

/// Bounds for the collision loop in `LinkService::create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePolicy {
    /// Starting code length.
    pub length: usize,
    /// Candidates tried at each length before widening.
    pub max_attempts: u32,
    /// Longest code the service will widen to.
    pub max_length: usize,
}

impl Default for CodePolicy {
    fn default() -> Self {
        Self::from(&ShortCodeConfig::default())
    }
}

impl From<&ShortCodeConfig> for CodePolicy {
    fn from(config: &ShortCodeConfig) -> Self {
        Self {
            length: config.length.max(1),
            max_attempts: config.max_attempts.max(1),
            max_length: config.max_length.max(config.length.max(1)),
        }
    }
}

impl CodePolicy {
    pub fn fixed(length: usize, max_attempts: u32) -> Self {
        Self {
            length,
            max_attempts,
            max_length: length,
        }
    }
}

/// Which client metadata fields are kept on recorded clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickCapture {
    pub address: bool,
    pub referrer: bool,
    pub user_agent: bool,
}

impl Default for ClickCapture {
    fn default() -> Self {
        Self {
            address: true,
            referrer: true,
            user_agent: true,
        }
    }
}

impl From<&AnalyticsConfig> for ClickCapture {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            address: config.enable_ip_logging,
            referrer: config.enable_referrer_logging,
            user_agent: config.enable_user_agent_logging,
        }
    }
}

pub struct LinkService {
    store: Arc<dyn LinkStore>,
    generator: Arc<dyn CodeGenerator>,
    policy: CodePolicy,
    capture: ClickCapture,
}

impl LinkService {
    pub fn new(
        store: Arc<dyn LinkStore>,
        generator: Arc<dyn CodeGenerator>,
        policy: CodePolicy,
    ) -> Self {
        Self {
            store,
            generator,
            policy,
            capture: ClickCapture::default(),
        }
    }

    pub fn with_click_capture(mut self, capture: ClickCapture) -> Self {
        self.capture = capture;
        self
    }

    pub fn store(&self) -> &Arc<dyn LinkStore> {
        &self.store
    }

    pub fn policy(&self) -> CodePolicy {
        self.policy
    }

    /// Shorten `original_url`, stored verbatim.
    ///
    /// Candidates already present in the store are skipped, and a save
    /// rejected with `CodeConflict` (a concurrent creator won the race) is
    /// retried with a fresh code. After `max_attempts` misses the code
    /// length grows by one, up to `max_length`.
    pub async fn create(&self, original_url: &str) -> Result<ShortLink> {
        let mut length = self.policy.length;

        loop {
            for attempt in 1..=self.policy.max_attempts {
                let code = self.generator.generate(length);

                if self.store.find_by_code(&code).await?.is_some() {
                    debug!(
                        "Short code collision on '{}' (length {}, attempt {})",
                        code, length, attempt
                    );
                    continue;
                }

                let new_link = NewShortLink {
                    code,
                    original_url: original_url.to_string(),
                    created_at: Utc::now(),
                };

                match self.store.save(new_link).await {
                    Ok(link) => {
                        info!(
                            "LinkService: created '{}' -> '{}'",
                            link.code, link.original_url
                        );
                        return Ok(link);
                    }
                    Err(e) if e.is_code_conflict() => {
                        warn!(
                            "Concurrent save conflict (length {}, attempt {}): {}",
                            length, attempt, e
                        );
                    }
                    Err(e) => return Err(e),
                }
            }

            if length >= self.policy.max_length {
                return Err(LinkscopeError::code_space_exhausted(format!(
                    "No free short code after {} attempts at each length {}..={}",
                    self.policy.max_attempts, self.policy.length, self.policy.max_length
                )));
            }

            length += 1;
            warn!(
                "Short code space congested, widening codes to {} characters",
                length
            );
        }
    }

    /// Look up `code` and record a click against it.
    ///
    /// Returns `Ok(None)` for an unknown code without recording anything.
    /// A failure to record the click is logged and does not change the
    /// result. The returned link does not include the click just recorded.
    pub async fn resolve(&self, code: &str, meta: ClientMeta) -> Result<Option<ShortLink>> {
        let Some(link) = self.store.find_by_code(code).await? else {
            debug!("Resolve miss for code '{}'", code);
            return Ok(None);
        };

        let click = NewClickEvent {
            link_id: link.id,
            clicked_at: Utc::now(),
            client_address: meta.address.filter(|_| self.capture.address),
            referrer: meta.referrer.filter(|_| self.capture.referrer),
            user_agent: meta.user_agent.filter(|_| self.capture.user_agent),
        };

        if let Err(e) = self.store.save_click(click).await {
            warn!("Failed to record click for '{}': {}", link.code, e);
        }

        Ok(Some(link))
    }

    /// Every link in the store, in store order.
    pub async fn get_all(&self) -> Result<Vec<ShortLink>> {
        self.store.find_all().await
    }

    /// Link with its click history. Never records a click.
    pub async fn get_stats(&self, code: &str) -> Result<Option<ShortLink>> {
        self.store.find_by_code(code).await
    }
}
