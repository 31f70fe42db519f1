use sea_orm::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "magento_customer_address_to_address_type")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub contact_address_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub type_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::magento_address::Entity",
        from = "Column::ContactAddressId",
        to = "super::magento_address::Column::Id",
        on_delete = "Cascade"
    )]
    Address,
    #[sea_orm(
        belongs_to = "super::address_type::Entity",
        from = "Column::TypeName",
        to = "super::address_type::Column::Name"
    )]
    AddressType,
}

impl ActiveModelBehavior for ActiveModel {}
