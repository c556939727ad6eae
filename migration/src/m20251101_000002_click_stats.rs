//! 点击记录表迁移
//!
//! 每次成功跳转写入一行，通过外键关联 short_urls，
//! 删除短链接时级联删除其点击记录。

use sea_orm_migration::prelude::*;

use crate::m20251101_000001_short_urls::ShortUrls;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClickStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClickStats::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClickStats::ShortUrlId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClickStats::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClickStats::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(ClickStats::Referrer).text().null())
                    .col(ColumnDef::new(ClickStats::UserAgent).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_click_stats_short_url")
                            .from(ClickStats::Table, ClickStats::ShortUrlId)
                            .to(ShortUrls::Table, ShortUrls::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_click_stats_short_url_id")
                    .table(ClickStats::Table)
                    .col(ClickStats::ShortUrlId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_click_stats_short_url_id")
                    .table(ClickStats::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ClickStats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClickStats {
    #[sea_orm(iden = "click_stats")]
    Table,
    Id,
    ShortUrlId,
    ClickedAt,
    IpAddress,
    Referrer,
    UserAgent,
}
