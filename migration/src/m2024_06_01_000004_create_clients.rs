//! Migration to create the clients table.
//!
//! A client belongs to one sales employee (nullable, SET NULL on employee
//! deletion) and carries the contract_requested flag gating contract creation.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Clients::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Clients::CompanyName).text().not_null())
                    .col(ColumnDef::new(Clients::Siren).text().not_null())
                    .col(ColumnDef::new(Clients::FirstName).text().null())
                    .col(ColumnDef::new(Clients::LastName).text().null())
                    .col(ColumnDef::new(Clients::Email).text().null())
                    .col(ColumnDef::new(Clients::PhoneNumber).text().null())
                    .col(
                        ColumnDef::new(Clients::ContractRequested)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Clients::SalesContactId).uuid().null())
                    .col(
                        ColumnDef::new(Clients::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Clients::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clients_sales_contact_id")
                            .from(Clients::Table, Clients::SalesContactId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clients_siren")
                    .table(Clients::Table)
                    .col(Clients::Siren)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_clients_sales_contact_id")
                    .table(Clients::Table)
                    .col(Clients::SalesContactId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_clients_siren").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_clients_sales_contact_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Clients::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    CompanyName,
    Siren,
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    ContractRequested,
    SalesContactId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
}
