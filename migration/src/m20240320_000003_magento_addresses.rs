use sea_orm_migration::prelude::*;

const ADDRESS_TYPES: [(&str, &str); 2] = [("billing", "Billing"), ("shipping", "Shipping")];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MagentoCustomer::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MagentoCustomer::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(MagentoCustomer::FirstName).string().null())
                    .col(ColumnDef::new(MagentoCustomer::LastName).string().null())
                    .col(ColumnDef::new(MagentoCustomer::Email).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AddressType::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AddressType::Name).string().not_null().primary_key())
                    .col(ColumnDef::new(AddressType::Label).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MagentoCustomerAddress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MagentoCustomerAddress::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MagentoCustomerAddress::OwnerId).uuid().null())
                    .col(ColumnDef::new(MagentoCustomerAddress::Label).string().null())
                    .col(ColumnDef::new(MagentoCustomerAddress::Street).string().null())
                    .col(ColumnDef::new(MagentoCustomerAddress::City).string().null())
                    .col(ColumnDef::new(MagentoCustomerAddress::PostalCode).string().null())
                    .col(ColumnDef::new(MagentoCustomerAddress::CountryCode).string().null())
                    .col(
                        ColumnDef::new(MagentoCustomerAddress::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(Expr::value(false)),
                    )
                    .col(
                        ColumnDef::new(MagentoCustomerAddress::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MagentoCustomerAddress::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_magento_customer_address_owner")
                            .from(MagentoCustomerAddress::Table, MagentoCustomerAddress::OwnerId)
                            .to(MagentoCustomer::Table, MagentoCustomer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_magento_customer_address_owner_id")
                    .table(MagentoCustomerAddress::Table)
                    .col(MagentoCustomerAddress::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MagentoCustomerAddressToAddressType::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MagentoCustomerAddressToAddressType::ContactAddressId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MagentoCustomerAddressToAddressType::TypeName)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(MagentoCustomerAddressToAddressType::ContactAddressId)
                            .col(MagentoCustomerAddressToAddressType::TypeName),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_magento_address_type_address")
                            .from(
                                MagentoCustomerAddressToAddressType::Table,
                                MagentoCustomerAddressToAddressType::ContactAddressId,
                            )
                            .to(MagentoCustomerAddress::Table, MagentoCustomerAddress::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_magento_address_type_type")
                            .from(
                                MagentoCustomerAddressToAddressType::Table,
                                MagentoCustomerAddressToAddressType::TypeName,
                            )
                            .to(AddressType::Table, AddressType::Name),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, label) in ADDRESS_TYPES {
            let insert = Query::insert()
                .into_table(AddressType::Table)
                .columns([AddressType::Name, AddressType::Label])
                .values_panic([name.into(), label.into()])
                .on_conflict(OnConflict::column(AddressType::Name).do_nothing().to_owned())
                .to_owned();
            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(MagentoCustomerAddressToAddressType::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(MagentoCustomerAddress::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(AddressType::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MagentoCustomer::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MagentoCustomer {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
}

#[derive(DeriveIden)]
enum AddressType {
    Table,
    Name,
    Label,
}

#[derive(DeriveIden)]
enum MagentoCustomerAddress {
    Table,
    Id,
    OwnerId,
    Label,
    Street,
    City,
    PostalCode,
    CountryCode,
    IsPrimary,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MagentoCustomerAddressToAddressType {
    Table,
    ContactAddressId,
    TypeName,
}
