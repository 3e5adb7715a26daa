mod auth;
mod config;
mod employees;
mod error;
mod model;
mod store;

use std::sync::Arc;

use actix_web::web;
use auth::{Authenticator, JwtAuthenticator};
use config::Settings;
use model::{Employee, EmployeeInput, EmployeePatch, Message};
use mongodb::Client;
use shuttle_actix_web::ShuttleActixWeb;
use shuttle_runtime::SecretStore;
use shuttle_runtime::__internals::Context;
use store::{EmployeeStore, MongoEmployeeStore};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        employees::list_employees,
        employees::create_employee,
        employees::get_employee,
        employees::update_employee,
        employees::delete_employee
    ),
    components(schemas(Employee, EmployeeInput, EmployeePatch, Message)),
    modifiers(&BearerAuth),
    tags(
        (name = "employee", description = "Employee records API")
    )
)]
struct ApiDoc;

#[shuttle_runtime::main]
async fn main(
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> ShuttleActixWeb<impl FnOnce(&mut web::ServiceConfig) + Send + Clone + 'static> {
    let settings = Settings::from_secrets(&secrets).context("reading secrets")?;
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .context("connecting to MongoDB")?;

    let mongo = MongoEmployeeStore::new(&client, &settings.database);
    mongo
        .ensure_indexes()
        .await
        .context("creating the email index")?;
    tracing::info!(database = %settings.database, "employee store ready");

    let store: Arc<dyn EmployeeStore> = Arc::new(mongo);
    let authenticator: Arc<dyn Authenticator> =
        Arc::new(JwtAuthenticator::new(&settings.jwt_secret));
    let store_data = web::Data::from(store);
    let auth_data = web::Data::from(authenticator);

    let config = move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(store_data.clone())
            .app_data(auth_data.clone())
            .configure(employees::configure)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            );
    };

    Ok(config.into())
}
