use sea_orm::prelude::{DateTimeWithTimeZone, *};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "b2b_customer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(indexed)]
    pub account_id: Option<Uuid>,
    pub data_channel_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "SetNull"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::data_channel::Entity",
        from = "Column::DataChannelId",
        to = "super::data_channel::Column::Id",
        on_delete = "SetNull"
    )]
    DataChannel,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::data_channel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DataChannel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
