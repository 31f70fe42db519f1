mod sales;

use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, Object, Result as GqlResult, Schema, SimpleObject,
};
use platform_api::{ApiError, ApiResult};
use platform_db::DbPool;
use products_crm::{
    FormLifecycle, Opportunity, OpportunityFormCoordinator, OpportunityRelationsBuilder,
    opportunity_form,
    store::{
        find_opportunity, load_enum_catalog, load_magento_address, load_probability_table,
        save_opportunity,
    },
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

pub use sales::{MagentoAddressNode, OpportunityForm, OpportunityInput, OpportunityNode};
use sales::{FormField, api_error};

pub type SchemaType = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(pool: DbPool) -> SchemaType {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(pool)
        .finish()
}

/// SDL of the schema; resolvers are not run so no pool is attached.
pub fn schema_sdl() -> String {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .finish()
        .sdl()
}

fn pool<'a>(ctx: &Context<'a>) -> ApiResult<&'a DbPool> {
    ctx.data::<DbPool>()
        .map_err(|err| ApiError::internal(anyhow::anyhow!(err.message)))
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self) -> ApiResult<HealthPayload> {
        Ok(HealthPayload { ok: true })
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> ApiResult<String> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }

    /// Form definition plus the record it presents: the stored opportunity
    /// when `id` is given, a blank one otherwise. New records get their
    /// default probability here.
    #[instrument(name = "graphql.opportunity_form", skip(self, ctx))]
    async fn opportunity_form(
        &self,
        ctx: &Context<'_>,
        id: Option<Uuid>,
    ) -> GqlResult<OpportunityForm> {
        opportunity_form_for(pool(ctx).map_err(|err| err.extend())?, id)
            .await
            .map_err(|err| err.extend())
    }

    #[instrument(name = "graphql.magento_address", skip(self, ctx))]
    async fn magento_address(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> GqlResult<Option<MagentoAddressNode>> {
        let db = pool(ctx).map_err(|err| err.extend())?;
        let address = load_magento_address(db, id)
            .await
            .map_err(|err| api_error(err).extend())?;
        Ok(address.map(MagentoAddressNode::from))
    }
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Binds the submitted values, runs the form pipeline and saves the
    /// opportunity with its customer and contact.
    #[instrument(name = "graphql.submit_opportunity", skip_all)]
    async fn submit_opportunity(
        &self,
        ctx: &Context<'_>,
        input: OpportunityInput,
    ) -> GqlResult<OpportunityNode> {
        submit(pool(ctx).map_err(|err| err.extend())?, input)
            .await
            .map_err(|err| err.extend())
    }
}

async fn opportunity_form_for(db: &DbPool, id: Option<Uuid>) -> ApiResult<OpportunityForm> {
    let catalog = load_enum_catalog(db).await.map_err(api_error)?;
    let probabilities = load_probability_table(db).await.map_err(api_error)?;
    let coordinator =
        OpportunityFormCoordinator::new(&probabilities, &catalog, OpportunityRelationsBuilder);

    let mut opportunity = match id {
        Some(id) => find_opportunity(db, &catalog, id)
            .await
            .map_err(api_error)?
            .ok_or(ApiError::NotFound("opportunity"))?,
        None => Opportunity::default(),
    };
    coordinator
        .prepare(Some(&mut opportunity))
        .map_err(api_error)?;

    let form = opportunity_form();
    Ok(OpportunityForm {
        name: form.name.to_string(),
        fields: form.fields.iter().map(FormField::from).collect(),
        data: opportunity.into(),
    })
}

async fn submit(db: &DbPool, input: OpportunityInput) -> ApiResult<OpportunityNode> {
    let catalog = load_enum_catalog(db).await.map_err(api_error)?;
    let probabilities = load_probability_table(db).await.map_err(api_error)?;
    let coordinator =
        OpportunityFormCoordinator::new(&probabilities, &catalog, OpportunityRelationsBuilder);

    let mut opportunity = match input.id {
        Some(id) => find_opportunity(db, &catalog, id)
            .await
            .map_err(api_error)?
            .ok_or(ApiError::NotFound("opportunity"))?,
        None => Opportunity::default(),
    };
    input.bind(db, &catalog, &mut opportunity).await?;
    coordinator
        .prepare(Some(&mut opportunity))
        .map_err(api_error)?;

    let missing = opportunity_form().missing_required(&opportunity);
    if !missing.is_empty() {
        return Err(ApiError::invalid(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    coordinator.finalize(&mut opportunity).map_err(api_error)?;
    let id = save_opportunity(db, &mut opportunity)
        .await
        .map_err(api_error)?;
    info!(opportunity = %id, "opportunity submitted");
    Ok(opportunity.into())
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_graphql::{Request, Value};
    use entity::{
        account, b2b_customer, contact, contact_account, data_channel, enum_binding, enum_value,
        opportunity as opportunity_entity, opportunity_close_reason,
        opportunity_status_probability, organization,
    };
    use sea_orm::{
        ActiveValue::Set, ConnectionTrait, Database, DbBackend, EntityTrait, Schema as DbSchema,
    };
    use serde_json::json;

    async fn seeded_pool() -> DbPool {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let schema = DbSchema::new(DbBackend::Sqlite);
        let backend = db.get_database_backend();
        let statements = [
            schema.create_table_from_entity(organization::Entity),
            schema.create_table_from_entity(data_channel::Entity),
            schema.create_table_from_entity(account::Entity),
            schema.create_table_from_entity(b2b_customer::Entity),
            schema.create_table_from_entity(contact::Entity),
            schema.create_table_from_entity(contact_account::Entity),
            schema.create_table_from_entity(enum_binding::Entity),
            schema.create_table_from_entity(enum_value::Entity),
            schema.create_table_from_entity(opportunity_close_reason::Entity),
            schema.create_table_from_entity(opportunity_status_probability::Entity),
            schema.create_table_from_entity(opportunity_entity::Entity),
        ];
        for statement in statements {
            db.execute(backend.build(&statement)).await.unwrap();
        }
        for (id, priority, is_default, probability) in
            [("in_progress", 1, true, 0.1), ("negotiation", 5, false, 0.8)]
        {
            enum_value::Entity::insert(enum_value::ActiveModel {
                code: Set("opportunity_status".into()),
                id: Set(id.into()),
                name: Set(id.replace('_', " ")),
                priority: Set(priority),
                is_default: Set(is_default),
            })
            .exec_without_returning(&db)
            .await
            .unwrap();
            opportunity_status_probability::Entity::insert(
                opportunity_status_probability::ActiveModel {
                    status_id: Set(id.into()),
                    probability: Set(probability),
                },
            )
            .exec_without_returning(&db)
            .await
            .unwrap();
        }
        enum_binding::Entity::insert(enum_binding::ActiveModel {
            entity_class: Set("crm.sales.opportunity".into()),
            field_name: Set("status".into()),
            enum_code: Set("opportunity_status".into()),
        })
        .exec_without_returning(&db)
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn health_query_returns_ok() {
        let schema = build_schema(seeded_pool().await);
        let response = schema.execute(Request::new("{ health { ok } }")).await;
        assert!(response.errors.is_empty());
        let body = response.data.into_json().unwrap();
        assert_eq!(body, json!({"health": {"ok": true}}));
    }

    #[tokio::test]
    async fn blank_form_carries_default_probability() {
        let schema = build_schema(seeded_pool().await);
        let response = schema
            .execute(Request::new(
                "{ opportunityForm { name fields { name required } data { id probability } } }",
            ))
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        assert_eq!(body["opportunityForm"]["name"], json!("crm_sales_opportunity"));
        assert_eq!(body["opportunityForm"]["data"]["id"], json!(null));
        assert_eq!(body["opportunityForm"]["data"]["probability"], json!(0.1));
        assert_eq!(body["opportunityForm"]["fields"].as_array().unwrap().len(), 13);
    }

    #[tokio::test]
    async fn submit_saves_customer_account_and_contact_link() {
        let schema = build_schema(seeded_pool().await);
        let mutation = r#"mutation {
            submitOpportunity(input: {
                name: "Warehouse rollout",
                statusId: "negotiation",
                customer: { name: "ACME" },
                contact: { firstName: "Ada" }
            }) {
                id
                probability
                status { id }
                customer { id account { id name } }
                contact { accounts { id } }
            }
        }"#;
        let response = schema.execute(Request::new(mutation)).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        let body = response.data.into_json().unwrap();
        let saved = &body["submitOpportunity"];
        assert!(saved["id"].is_string());
        assert_eq!(saved["probability"], json!(0.8));
        assert_eq!(saved["status"]["id"], json!("negotiation"));
        assert_eq!(saved["customer"]["account"]["name"], json!("ACME"));
        assert_eq!(
            saved["contact"]["accounts"][0]["id"],
            saved["customer"]["account"]["id"]
        );
    }

    #[tokio::test]
    async fn explicit_null_clears_probability_while_omission_keeps_it() {
        let schema = build_schema(seeded_pool().await);
        let created = schema
            .execute(Request::new(
                r#"mutation {
                    submitOpportunity(input: {
                        name: "Renewal",
                        statusId: "negotiation",
                        probability: 0.6,
                        customer: { name: "ACME" }
                    }) { id customer { id } }
                }"#,
            ))
            .await;
        assert!(created.errors.is_empty(), "{:?}", created.errors);
        let body = created.data.into_json().unwrap();
        let id = body["submitOpportunity"]["id"].as_str().unwrap().to_string();
        let customer_id = body["submitOpportunity"]["customer"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let resubmit = |probability: &str| {
            format!(
                r#"mutation {{
                    submitOpportunity(input: {{
                        id: "{id}",
                        name: "Renewal",
                        statusId: "negotiation",
                        {probability}
                        customer: {{ id: "{customer_id}" }}
                    }}) {{ probability }}
                }}"#
            )
        };

        let kept = schema.execute(Request::new(resubmit(""))).await;
        assert!(kept.errors.is_empty(), "{:?}", kept.errors);
        let body = kept.data.into_json().unwrap();
        assert_eq!(body["submitOpportunity"]["probability"], json!(0.6));

        let cleared = schema
            .execute(Request::new(resubmit("probability: null,")))
            .await;
        assert!(cleared.errors.is_empty(), "{:?}", cleared.errors);
        let body = cleared.data.into_json().unwrap();
        assert_eq!(body["submitOpportunity"]["probability"], json!(null));
    }

    #[tokio::test]
    async fn submit_without_customer_is_invalid_input() {
        let schema = build_schema(seeded_pool().await);
        let response = schema
            .execute(Request::new(
                r#"mutation { submitOpportunity(input: { name: "Orphan", statusId: "in_progress" }) { id } }"#,
            ))
            .await;
        let error = response.errors.first().unwrap();
        assert_eq!(error.message, "bad request: missing required fields: customer");
        let code = error
            .extensions
            .as_ref()
            .and_then(|map| map.get("code"))
            .cloned();
        assert_eq!(code, Some(Value::from("INVALID_INPUT")));
    }

    #[tokio::test]
    async fn unknown_opportunity_form_is_not_found() {
        let schema = build_schema(seeded_pool().await);
        let query = format!(r#"{{ opportunityForm(id: "{}") {{ name }} }}"#, Uuid::new_v4());
        let response = schema.execute(Request::new(query)).await;
        assert_eq!(response.errors[0].message, "opportunity not found");
    }

    #[test]
    fn sdl_exposes_form_operations() {
        let sdl = schema_sdl();
        assert!(sdl.contains("opportunityForm"));
        assert!(sdl.contains("submitOpportunity"));
        assert!(sdl.contains("magentoAddress"));
    }
}
