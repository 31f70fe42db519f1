use sea_orm_migration::prelude::*;

const ACCOUNT_CLASS: &str = "crm.account";
const ORGANIZATION_INDEX: &str = "idx_account_organization_id";
const ORGANIZATION_FK: &str = "fk_account_organization";

/// Scopes accounts to an organization and records the organization field in
/// the account's ownership metadata.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Account::Table)
                    .add_column(ColumnDef::new(Account::OrganizationId).uuid().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(ORGANIZATION_INDEX)
                    .table(Account::Table)
                    .col(Account::OrganizationId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name(ORGANIZATION_FK)
                    .from(Account::Table, Account::OrganizationId)
                    .to(Organization::Table, Organization::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .on_update(ForeignKeyAction::NoAction)
                    .to_owned(),
            )
            .await?;

        set_organization_fields(manager, Some(("organization", "organization_id"))).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        set_organization_fields(manager, None).await?;

        manager
            .drop_foreign_key(
                ForeignKey::drop()
                    .name(ORGANIZATION_FK)
                    .table(Account::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name(ORGANIZATION_INDEX)
                    .table(Account::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Account::Table)
                    .drop_column(Account::OrganizationId)
                    .to_owned(),
            )
            .await
    }
}

async fn set_organization_fields(
    manager: &SchemaManager<'_>,
    fields: Option<(&str, &str)>,
) -> Result<(), DbErr> {
    let (field_name, column_name) = match fields {
        Some((field, column)) => (Some(field.to_string()), Some(column.to_string())),
        None => (None, None),
    };
    let update = Query::update()
        .table(EntityOwnership::Table)
        .values([
            (EntityOwnership::OrganizationFieldName, field_name.into()),
            (EntityOwnership::OrganizationColumnName, column_name.into()),
        ])
        .and_where(Expr::col(EntityOwnership::EntityClass).eq(ACCOUNT_CLASS))
        .to_owned();
    manager.exec_stmt(update).await
}

#[derive(DeriveIden)]
enum Account {
    Table,
    OrganizationId,
}

#[derive(DeriveIden)]
enum Organization {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum EntityOwnership {
    Table,
    EntityClass,
    OrganizationFieldName,
    OrganizationColumnName,
}
