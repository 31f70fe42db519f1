use sea_orm::prelude::*;

/// Binds an entity field to the enumeration whose values it may hold.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "enum_binding")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub entity_class: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub field_name: String,
    pub enum_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
