use sea_orm::prelude::{DateTimeWithTimeZone, *};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "magento_customer_address")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub owner_id: Option<Uuid>,
    pub label: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::magento_customer::Entity",
        from = "Column::OwnerId",
        to = "super::magento_customer::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
}

impl Related<super::magento_customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::address_type::Entity> for Entity {
    fn to() -> RelationDef {
        super::magento_address_type::Relation::AddressType.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::magento_address_type::Relation::Address.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
