use sea_orm::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "address_type")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub label: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::magento_address::Entity> for Entity {
    fn to() -> RelationDef {
        super::magento_address_type::Relation::Address.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::magento_address_type::Relation::AddressType.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
