use sea_orm::prelude::{DateTimeWithTimeZone, *};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contact")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        super::contact_account::Relation::Account.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::contact_account::Relation::Contact.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
