use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "short_urls")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub short_code: String,
    #[sea_orm(column_type = "Text")]
    pub original_url: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::click_stat::Entity")]
    ClickStat,
}

impl Related<super::click_stat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClickStat.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
