//! Migration to create the client_locations join table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClientLocations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ClientLocations::ClientId).uuid().not_null())
                    .col(
                        ColumnDef::new(ClientLocations::LocationId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ClientLocations::ClientId)
                            .col(ClientLocations::LocationId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_locations_client_id")
                            .from(ClientLocations::Table, ClientLocations::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_locations_location_id")
                            .from(ClientLocations::Table, ClientLocations::LocationId)
                            .to(Locations::Table, Locations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClientLocations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClientLocations {
    Table,
    ClientId,
    LocationId,
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
}
