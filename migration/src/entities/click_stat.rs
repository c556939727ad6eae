//! Click history entity, one row per resolved redirect

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "click_stats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub short_url_id: i64,
    pub clicked_at: DateTimeUtc,
    pub ip_address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub referrer: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::short_url::Entity",
        from = "Column::ShortUrlId",
        to = "super::short_url::Column::Id",
        on_delete = "Cascade"
    )]
    ShortUrl,
}

impl Related<super::short_url::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShortUrl.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
