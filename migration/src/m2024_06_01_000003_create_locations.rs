//! Migration to create the locations table.
//!
//! Locations are shared, de-duplicated address rows referenced by clients and
//! events through join tables. The (street_number, street_name, city) triple
//! is unique so get-or-create collapses duplicates.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Locations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Locations::StreetNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Locations::StreetName).text().not_null())
                    .col(ColumnDef::new(Locations::City).text().not_null())
                    .col(ColumnDef::new(Locations::ZipCode).text().not_null())
                    .col(ColumnDef::new(Locations::Country).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_locations_address")
                    .table(Locations::Table)
                    .col(Locations::StreetNumber)
                    .col(Locations::StreetName)
                    .col(Locations::City)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_locations_address").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Locations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
    StreetNumber,
    StreetName,
    City,
    ZipCode,
    Country,
}
