use sea_orm_migration::prelude::*;

const OPPORTUNITY_CLASS: &str = "crm.sales.opportunity";
const ACCOUNT_CLASS: &str = "crm.account";
const STATUS_ENUM_CODE: &str = "opportunity_status";

/// `(id, name, priority, is_default, probability)`
const STATUS_DEFAULTS: [(&str, &str, i32, bool, f64); 7] = [
    ("in_progress", "Open", 1, true, 0.1),
    ("identification_alignment", "Identification & Alignment", 2, false, 0.3),
    ("needs_analysis", "Needs Analysis", 3, false, 0.2),
    ("solution_development", "Solution Development", 4, false, 0.5),
    ("negotiation", "Negotiation", 5, false, 0.8),
    ("won", "Closed Won", 6, false, 1.0),
    ("lost", "Closed Lost", 7, false, 0.0),
];

const CLOSE_REASONS: [(&str, &str); 3] = [
    ("outsold", "Outsold"),
    ("won", "Won"),
    ("cancelled", "Cancelled"),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organization::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Organization::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Organization::Name).string().not_null())
                    .col(&mut timestamp_col(Organization::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Account::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Account::Name).string().not_null())
                    .col(ColumnDef::new(Account::OwnerId).uuid().null())
                    .col(&mut timestamp_col(Account::CreatedAt))
                    .col(&mut timestamp_col(Account::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DataChannel::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DataChannel::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DataChannel::Name).string().not_null())
                    .col(ColumnDef::new(DataChannel::ChannelType).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(B2bCustomer::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(B2bCustomer::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(B2bCustomer::Name).string().not_null())
                    .col(ColumnDef::new(B2bCustomer::AccountId).uuid().null())
                    .col(ColumnDef::new(B2bCustomer::DataChannelId).uuid().null())
                    .col(ColumnDef::new(B2bCustomer::OrganizationId).uuid().null())
                    .col(ColumnDef::new(B2bCustomer::OwnerId).uuid().null())
                    .col(&mut timestamp_col(B2bCustomer::CreatedAt))
                    .col(&mut timestamp_col(B2bCustomer::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_b2b_customer_account")
                            .from(B2bCustomer::Table, B2bCustomer::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_b2b_customer_data_channel")
                            .from(B2bCustomer::Table, B2bCustomer::DataChannelId)
                            .to(DataChannel::Table, DataChannel::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_b2b_customer_account_id")
                    .table(B2bCustomer::Table)
                    .col(B2bCustomer::AccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Contact::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Contact::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Contact::FirstName).string().not_null())
                    .col(ColumnDef::new(Contact::LastName).string().null())
                    .col(ColumnDef::new(Contact::Email).string().null())
                    .col(&mut timestamp_col(Contact::CreatedAt))
                    .col(&mut timestamp_col(Contact::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContactToAccount::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ContactToAccount::ContactId).uuid().not_null())
                    .col(ColumnDef::new(ContactToAccount::AccountId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(ContactToAccount::ContactId)
                            .col(ContactToAccount::AccountId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_to_account_contact")
                            .from(ContactToAccount::Table, ContactToAccount::ContactId)
                            .to(Contact::Table, Contact::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_to_account_account")
                            .from(ContactToAccount::Table, ContactToAccount::AccountId)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EnumValue::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EnumValue::Code).string().not_null())
                    .col(ColumnDef::new(EnumValue::Id).string().not_null())
                    .col(ColumnDef::new(EnumValue::Name).string().not_null())
                    .col(ColumnDef::new(EnumValue::Priority).integer().not_null())
                    .col(
                        ColumnDef::new(EnumValue::IsDefault)
                            .boolean()
                            .not_null()
                            .default(Expr::value(false)),
                    )
                    .primary_key(Index::create().col(EnumValue::Code).col(EnumValue::Id))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EnumBinding::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EnumBinding::EntityClass).string().not_null())
                    .col(ColumnDef::new(EnumBinding::FieldName).string().not_null())
                    .col(ColumnDef::new(EnumBinding::EnumCode).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(EnumBinding::EntityClass)
                            .col(EnumBinding::FieldName),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OpportunityCloseReason::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OpportunityCloseReason::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OpportunityCloseReason::Label).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OpportunityStatusProbability::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OpportunityStatusProbability::StatusId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OpportunityStatusProbability::Probability)
                            .double()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Opportunity::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Opportunity::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Opportunity::Name).string().not_null())
                    .col(ColumnDef::new(Opportunity::StatusId).string().null())
                    .col(ColumnDef::new(Opportunity::Probability).double().null())
                    .col(ColumnDef::new(Opportunity::CloseReasonName).string().null())
                    .col(ColumnDef::new(Opportunity::ContactId).uuid().null())
                    .col(ColumnDef::new(Opportunity::CustomerId).uuid().null())
                    .col(ColumnDef::new(Opportunity::DataChannelId).uuid().null())
                    .col(ColumnDef::new(Opportunity::OrganizationId).uuid().null())
                    .col(ColumnDef::new(Opportunity::OwnerId).uuid().null())
                    .col(ColumnDef::new(Opportunity::CloseDate).date().null())
                    .col(ColumnDef::new(Opportunity::BudgetAmountCents).big_integer().null())
                    .col(ColumnDef::new(Opportunity::CloseRevenueCents).big_integer().null())
                    .col(ColumnDef::new(Opportunity::CustomerNeed).text().null())
                    .col(ColumnDef::new(Opportunity::ProposedSolution).text().null())
                    .col(ColumnDef::new(Opportunity::Notes).text().null())
                    .col(&mut timestamp_col(Opportunity::CreatedAt))
                    .col(&mut timestamp_col(Opportunity::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opportunity_contact")
                            .from(Opportunity::Table, Opportunity::ContactId)
                            .to(Contact::Table, Contact::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opportunity_customer")
                            .from(Opportunity::Table, Opportunity::CustomerId)
                            .to(B2bCustomer::Table, B2bCustomer::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opportunity_close_reason")
                            .from(Opportunity::Table, Opportunity::CloseReasonName)
                            .to(OpportunityCloseReason::Table, OpportunityCloseReason::Name)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_opportunity_contact_id", Opportunity::ContactId),
            ("idx_opportunity_customer_id", Opportunity::CustomerId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Opportunity::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(EntityOwnership::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntityOwnership::EntityClass)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EntityOwnership::OwnerType).string().not_null())
                    .col(ColumnDef::new(EntityOwnership::OwnerFieldName).string().null())
                    .col(ColumnDef::new(EntityOwnership::OwnerColumnName).string().null())
                    .col(ColumnDef::new(EntityOwnership::OrganizationFieldName).string().null())
                    .col(ColumnDef::new(EntityOwnership::OrganizationColumnName).string().null())
                    .to_owned(),
            )
            .await?;

        seed(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            EntityOwnership::Table.into_iden(),
            Opportunity::Table.into_iden(),
            OpportunityStatusProbability::Table.into_iden(),
            OpportunityCloseReason::Table.into_iden(),
            EnumBinding::Table.into_iden(),
            EnumValue::Table.into_iden(),
            ContactToAccount::Table.into_iden(),
            Contact::Table.into_iden(),
            B2bCustomer::Table.into_iden(),
            DataChannel::Table.into_iden(),
            Account::Table.into_iden(),
            Organization::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn timestamp_col<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

async fn seed(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    for (id, name, priority, is_default, probability) in STATUS_DEFAULTS {
        let value = Query::insert()
            .into_table(EnumValue::Table)
            .columns([
                EnumValue::Code,
                EnumValue::Id,
                EnumValue::Name,
                EnumValue::Priority,
                EnumValue::IsDefault,
            ])
            .values_panic([
                STATUS_ENUM_CODE.into(),
                id.into(),
                name.into(),
                priority.into(),
                is_default.into(),
            ])
            .on_conflict(
                OnConflict::columns([EnumValue::Code, EnumValue::Id])
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();
        manager.exec_stmt(value).await?;

        let probability = Query::insert()
            .into_table(OpportunityStatusProbability::Table)
            .columns([
                OpportunityStatusProbability::StatusId,
                OpportunityStatusProbability::Probability,
            ])
            .values_panic([id.into(), probability.into()])
            .on_conflict(
                OnConflict::column(OpportunityStatusProbability::StatusId)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();
        manager.exec_stmt(probability).await?;
    }

    let binding = Query::insert()
        .into_table(EnumBinding::Table)
        .columns([
            EnumBinding::EntityClass,
            EnumBinding::FieldName,
            EnumBinding::EnumCode,
        ])
        .values_panic([OPPORTUNITY_CLASS.into(), "status".into(), STATUS_ENUM_CODE.into()])
        .on_conflict(
            OnConflict::columns([EnumBinding::EntityClass, EnumBinding::FieldName])
                .do_nothing()
                .to_owned(),
        )
        .to_owned();
    manager.exec_stmt(binding).await?;

    for (name, label) in CLOSE_REASONS {
        let reason = Query::insert()
            .into_table(OpportunityCloseReason::Table)
            .columns([OpportunityCloseReason::Name, OpportunityCloseReason::Label])
            .values_panic([name.into(), label.into()])
            .on_conflict(
                OnConflict::column(OpportunityCloseReason::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();
        manager.exec_stmt(reason).await?;
    }

    let ownership = Query::insert()
        .into_table(EntityOwnership::Table)
        .columns([
            EntityOwnership::EntityClass,
            EntityOwnership::OwnerType,
            EntityOwnership::OwnerFieldName,
            EntityOwnership::OwnerColumnName,
        ])
        .values_panic([
            ACCOUNT_CLASS.into(),
            "USER".into(),
            "owner".into(),
            "owner_id".into(),
        ])
        .on_conflict(
            OnConflict::column(EntityOwnership::EntityClass)
                .do_nothing()
                .to_owned(),
        )
        .to_owned();
    manager.exec_stmt(ownership).await?;

    Ok(())
}

#[derive(DeriveIden)]
enum Organization {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Account {
    Table,
    Id,
    Name,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DataChannel {
    Table,
    Id,
    Name,
    ChannelType,
}

#[derive(DeriveIden)]
enum B2bCustomer {
    Table,
    Id,
    Name,
    AccountId,
    DataChannelId,
    OrganizationId,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Contact {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ContactToAccount {
    Table,
    ContactId,
    AccountId,
}

#[derive(DeriveIden)]
enum EnumValue {
    Table,
    Code,
    Id,
    Name,
    Priority,
    IsDefault,
}

#[derive(DeriveIden)]
enum EnumBinding {
    Table,
    EntityClass,
    FieldName,
    EnumCode,
}

#[derive(DeriveIden)]
enum OpportunityCloseReason {
    Table,
    Name,
    Label,
}

#[derive(DeriveIden)]
enum OpportunityStatusProbability {
    Table,
    StatusId,
    Probability,
}

#[derive(DeriveIden)]
enum Opportunity {
    Table,
    Id,
    Name,
    StatusId,
    Probability,
    CloseReasonName,
    ContactId,
    CustomerId,
    DataChannelId,
    OrganizationId,
    OwnerId,
    CloseDate,
    BudgetAmountCents,
    CloseRevenueCents,
    CustomerNeed,
    ProposedSolution,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EntityOwnership {
    Table,
    EntityClass,
    OwnerType,
    OwnerFieldName,
    OwnerColumnName,
    OrganizationFieldName,
    OrganizationColumnName,
}

#[cfg(test)]
mod tests {
    use sea_orm_migration::sea_orm::sea_query::{PostgresQueryBuilder, SchemaStatementBuilder};

    use super::*;

    #[test]
    fn timestamp_columns_default_to_now() {
        let sql = Table::create()
            .table(Account::Table)
            .col(&mut timestamp_col(Account::CreatedAt))
            .to_owned()
            .to_string(PostgresQueryBuilder);
        assert!(sql.contains("\"created_at\" timestamp with time zone NOT NULL"), "{sql}");
        assert!(sql.contains("DEFAULT CURRENT_TIMESTAMP"), "{sql}");
    }
}
