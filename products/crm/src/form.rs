//! Declarative description of the opportunity form: which fields it shows,
//! with which widget, and which are mandatory. Labels are translation keys.

use serde::Serialize;

use crate::opportunity::{Opportunity, STATUS_ENUM_CODE};

pub const OPPORTUNITY_FORM_NAME: &str = "crm_sales_opportunity";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    /// Select over a translatable lookup table.
    TranslatableEntity {
        class: &'static str,
        property: &'static str,
        placeholder: &'static str,
    },
    ContactSelect {
        allow_create_new: bool,
        new_item_property: &'static str,
        rendered_property: &'static str,
        placeholder: &'static str,
    },
    CustomerSelectOrCreate {
        new_item_property: &'static str,
    },
    ChannelSelect {
        entity: &'static str,
    },
    Text,
    Date,
    Percent,
    Money,
    RichText,
    StatusSelect {
        enum_code: &'static str,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub required: bool,
    /// Value must be present once submitted.
    pub not_null: bool,
}

impl FieldSpec {
    const fn optional(name: &'static str, label: &'static str, widget: Widget) -> Self {
        Self {
            name,
            label,
            widget,
            required: false,
            not_null: false,
        }
    }

    const fn required(name: &'static str, label: &'static str, widget: Widget) -> Self {
        Self {
            name,
            label,
            widget,
            required: true,
            not_null: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormDefinition {
    pub name: &'static str,
    pub data_class: &'static str,
    pub intention: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl FormDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.required)
    }

    /// Names of required fields the bound opportunity leaves empty.
    pub fn missing_required(&self, opportunity: &Opportunity) -> Vec<&'static str> {
        self.required_fields()
            .filter(|field| !is_filled(field.name, opportunity))
            .map(|field| field.name)
            .collect()
    }
}

fn is_filled(field: &str, opportunity: &Opportunity) -> bool {
    match field {
        "name" => !opportunity.name.trim().is_empty(),
        "customer" => opportunity.customer.is_some(),
        "status" => opportunity.status.is_some(),
        "contact" => opportunity.contact.is_some(),
        "closeReason" => opportunity.close_reason.is_some(),
        "probability" => opportunity.probability.is_some(),
        _ => true,
    }
}

pub fn opportunity_form() -> FormDefinition {
    FormDefinition {
        name: OPPORTUNITY_FORM_NAME,
        data_class: crate::opportunity::OPPORTUNITY_CLASS,
        intention: "opportunity",
        fields: vec![
            FieldSpec::optional(
                "closeReason",
                "crm.sales.opportunity.close_reason.label",
                Widget::TranslatableEntity {
                    class: "crm.sales.opportunity_close_reason",
                    property: "label",
                    placeholder: "crm.sales.form.choose_close_rsn",
                },
            ),
            FieldSpec::optional(
                "contact",
                "crm.sales.opportunity.contact.label",
                Widget::ContactSelect {
                    allow_create_new: true,
                    new_item_property: "firstName",
                    rendered_property: "fullName",
                    placeholder: "crm.contact.form.choose_contact",
                },
            ),
            FieldSpec::required(
                "customer",
                "crm.sales.opportunity.customer.label",
                Widget::CustomerSelectOrCreate {
                    new_item_property: "name",
                },
            ),
            FieldSpec::required("name", "crm.sales.opportunity.name.label", Widget::Text),
            FieldSpec::optional(
                "dataChannel",
                "crm.sales.opportunity.data_channel.label",
                Widget::ChannelSelect {
                    entity: crate::opportunity::OPPORTUNITY_CLASS,
                },
            ),
            FieldSpec::optional(
                "closeDate",
                "crm.sales.opportunity.close_date.label",
                Widget::Date,
            ),
            FieldSpec::optional(
                "probability",
                "crm.sales.opportunity.probability.label",
                Widget::Percent,
            ),
            FieldSpec::optional(
                "budgetAmount",
                "crm.sales.opportunity.budget_amount.label",
                Widget::Money,
            ),
            FieldSpec::optional(
                "closeRevenue",
                "crm.sales.opportunity.close_revenue.label",
                Widget::Money,
            ),
            FieldSpec::optional(
                "customerNeed",
                "crm.sales.opportunity.customer_need.label",
                Widget::RichText,
            ),
            FieldSpec::optional(
                "proposedSolution",
                "crm.sales.opportunity.proposed_solution.label",
                Widget::RichText,
            ),
            FieldSpec::optional("notes", "crm.sales.opportunity.notes.label", Widget::RichText),
            FieldSpec {
                not_null: true,
                ..FieldSpec::required(
                    "status",
                    "crm.sales.opportunity.status.label",
                    Widget::StatusSelect {
                        enum_code: STATUS_ENUM_CODE,
                    },
                )
            },
        ],
    }
}
