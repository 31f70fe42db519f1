use sea_orm::prelude::{DateTimeWithTimeZone, *};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "opportunity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Id of a value in the `opportunity_status` enumeration.
    pub status_id: Option<String>,
    pub probability: Option<f64>,
    pub close_reason_name: Option<String>,
    #[sea_orm(indexed)]
    pub contact_id: Option<Uuid>,
    #[sea_orm(indexed)]
    pub customer_id: Option<Uuid>,
    pub data_channel_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub close_date: Option<Date>,
    pub budget_amount_cents: Option<i64>,
    pub close_revenue_cents: Option<i64>,
    pub customer_need: Option<String>,
    pub proposed_solution: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contact::Entity",
        from = "Column::ContactId",
        to = "super::contact::Column::Id",
        on_delete = "SetNull"
    )]
    Contact,
    #[sea_orm(
        belongs_to = "super::b2b_customer::Entity",
        from = "Column::CustomerId",
        to = "super::b2b_customer::Column::Id",
        on_delete = "SetNull"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::opportunity_close_reason::Entity",
        from = "Column::CloseReasonName",
        to = "super::opportunity_close_reason::Column::Name",
        on_delete = "SetNull"
    )]
    CloseReason,
}

impl Related<super::contact::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contact.def()
    }
}

impl Related<super::b2b_customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::opportunity_close_reason::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CloseReason.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
