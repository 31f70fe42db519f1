use sea_orm::prelude::*;

/// Ownership metadata for an entity class: which fields and columns carry the
/// owner and the organization.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "entity_ownership")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub entity_class: String,
    pub owner_type: String,
    pub owner_field_name: Option<String>,
    pub owner_column_name: Option<String>,
    pub organization_field_name: Option<String>,
    pub organization_column_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
