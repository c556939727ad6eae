use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShortUrls::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortUrls::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ShortUrls::ShortCode)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShortUrls::OriginalUrl).text().not_null())
                    .col(
                        ColumnDef::new(ShortUrls::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 短码唯一索引，并发创建时由数据库兜底
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_urls_short_code")
                    .table(ShortUrls::Table)
                    .col(ShortUrls::ShortCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_short_urls_short_code")
                    .table(ShortUrls::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(ShortUrls::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum ShortUrls {
    #[sea_orm(iden = "short_urls")]
    Table,
    Id,
    ShortCode,
    OriginalUrl,
    CreatedAt,
}
