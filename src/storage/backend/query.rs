//! Read operations for SeaOrmStorage

use std::collections::HashMap;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::{debug, error};

use super::SeaOrmStorage;
use super::converters::{model_to_click, model_to_shortlink};
use crate::errors::{LinkscopeError, Result};
use crate::storage::models::{ClickEvent, ShortLink};

use migration::entities::{click_stat, short_url};

impl SeaOrmStorage {
    pub(super) async fn query_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        let db = &self.db;

        let model = self
            .retry
            .run(&format!("find_by_code({})", code), || async {
                short_url::Entity::find()
                    .filter(short_url::Column::ShortCode.eq(code))
                    .one(db)
                    .await
            })
            .await
            .map_err(|e| {
                error!("Failed to look up short code '{}': {}", code, e);
                LinkscopeError::from(e)
            })?;

        let Some(model) = model else {
            return Ok(None);
        };

        let clicks = self.query_clicks_for(model.id).await?;
        Ok(Some(model_to_shortlink(model, clicks)))
    }

    async fn query_clicks_for(&self, link_id: i64) -> Result<Vec<ClickEvent>> {
        let db = &self.db;

        let models = self
            .retry
            .run(&format!("clicks_for({})", link_id), || async {
                click_stat::Entity::find()
                    .filter(click_stat::Column::ShortUrlId.eq(link_id))
                    .order_by_asc(click_stat::Column::Id)
                    .all(db)
                    .await
            })
            .await?;

        Ok(models.into_iter().map(model_to_click).collect())
    }

    pub(super) async fn query_all(&self) -> Result<Vec<ShortLink>> {
        let db = &self.db;

        let links = self
            .retry
            .run("find_all(links)", || async {
                short_url::Entity::find()
                    .order_by_asc(short_url::Column::Id)
                    .all(db)
                    .await
            })
            .await?;

        let clicks = self
            .retry
            .run("find_all(clicks)", || async {
                click_stat::Entity::find()
                    .order_by_asc(click_stat::Column::Id)
                    .all(db)
                    .await
            })
            .await?;

        // 两次查询后在内存中按 short_url_id 分组
        let mut grouped: HashMap<i64, Vec<ClickEvent>> = HashMap::new();
        for model in clicks {
            grouped
                .entry(model.short_url_id)
                .or_default()
                .push(model_to_click(model));
        }

        debug!("Loaded {} short links", links.len());
        Ok(links
            .into_iter()
            .map(|model| {
                let clicks = grouped.remove(&model.id).unwrap_or_default();
                model_to_shortlink(model, clicks)
            })
            .collect())
    }

    pub(super) async fn query_count(&self) -> Result<u64> {
        let db = &self.db;

        self.retry
            .run("count", || async { short_url::Entity::find().count(db).await })
            .await
            .map_err(LinkscopeError::from)
    }
}
