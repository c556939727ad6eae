//! Write operations for SeaOrmStorage

use sea_orm::{ActiveModelTrait, SqlErr};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{
    model_to_click, model_to_shortlink, new_click_to_active_model, new_link_to_active_model,
};
use crate::errors::{LinkscopeError, Result};
use crate::storage::models::{ClickEvent, NewClickEvent, NewShortLink, ShortLink};

impl SeaOrmStorage {
    pub(super) async fn insert_link(&self, link: NewShortLink) -> Result<ShortLink> {
        let db = &self.db;
        let link_ref = &link;

        let model = self
            .retry
            .run(&format!("save({})", link.code), || async {
                new_link_to_active_model(link_ref).insert(db).await
            })
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => LinkscopeError::code_conflict(
                    format!("Short code '{}' already exists", link.code),
                ),
                _ => LinkscopeError::database_operation(format!(
                    "Failed to save short link '{}': {}",
                    link.code, e
                )),
            })?;

        info!("Short link saved: {} (id {})", model.short_code, model.id);
        Ok(model_to_shortlink(model, Vec::new()))
    }

    pub(super) async fn insert_click(&self, click: NewClickEvent) -> Result<ClickEvent> {
        let db = &self.db;
        let click_ref = &click;

        let model = self
            .retry
            .run(&format!("save_click({})", click.link_id), || async {
                new_click_to_active_model(click_ref).insert(db).await
            })
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => LinkscopeError::not_found(
                    format!("Link id {} does not exist", click.link_id),
                ),
                _ => LinkscopeError::database_operation(format!(
                    "Failed to record click for link id {}: {}",
                    click.link_id, e
                )),
            })?;

        debug!("Click recorded for link id {}", model.short_url_id);
        Ok(model_to_click(model))
    }
}
