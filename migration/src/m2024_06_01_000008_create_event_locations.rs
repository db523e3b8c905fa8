//! Migration to create the event_locations join table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventLocations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventLocations::EventId).uuid().not_null())
                    .col(
                        ColumnDef::new(EventLocations::LocationId)
                            .uuid()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(EventLocations::EventId)
                            .col(EventLocations::LocationId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_locations_event_id")
                            .from(EventLocations::Table, EventLocations::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_locations_location_id")
                            .from(EventLocations::Table, EventLocations::LocationId)
                            .to(Locations::Table, Locations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventLocations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EventLocations {
    Table,
    EventId,
    LocationId,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
}
