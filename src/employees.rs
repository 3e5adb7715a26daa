use actix_web::middleware::from_fn;
use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::auth::{Identity, require_bearer};
use crate::error::ApiError;
use crate::model::{Employee, EmployeeInput, EmployeePatch, Message};
use crate::store::{EmployeeStore, StoreError};

#[utoipa::path(
    get,
    path = "/employees",
    tag = "employee",
    responses(
        (status = 200, description = "All employees", body = [Employee]),
        (status = 401, description = "Missing or invalid bearer token", body = Message),
        (status = 500, description = "Internal Server Error", body = Message)
    ),
    security(("bearer_auth" = []))
)]
#[get("")]
pub async fn list_employees(store: web::Data<dyn EmployeeStore>) -> Result<HttpResponse, ApiError> {
    let employees = store.find_all().await?;
    Ok(HttpResponse::Ok().json(employees))
}

#[utoipa::path(
    post,
    path = "/employees",
    tag = "employee",
    request_body = EmployeeInput,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Employee already exists", body = Message),
        (status = 401, description = "Missing or invalid bearer token", body = Message),
        (status = 500, description = "Internal Server Error", body = Message)
    ),
    security(("bearer_auth" = []))
)]
#[post("")]
pub async fn create_employee(
    store: web::Data<dyn EmployeeStore>,
    identity: web::ReqData<Identity>,
    input: web::Json<EmployeeInput>,
) -> Result<HttpResponse, ApiError> {
    let employee = input.into_inner().validate()?;
    // The unique index on email decides; there is no separate lookup first.
    let created = store.insert(employee).await.map_err(|err| match err {
        StoreError::Duplicate(_) => ApiError::AlreadyExists,
        other => other.into(),
    })?;

    tracing::info!(id = %created.id, by = %identity.subject, "employee created");
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/employees/{id}",
    tag = "employee",
    params(
        ("id" = String, Path, description = "Employee identifier")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 401, description = "Missing or invalid bearer token", body = Message),
        (status = 404, description = "Employee not found", body = Message),
        (status = 500, description = "Internal Server Error", body = Message)
    ),
    security(("bearer_auth" = []))
)]
#[get("/{id}")]
pub async fn get_employee(
    store: web::Data<dyn EmployeeStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let employee = store.find_by_id(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    put,
    path = "/employees/{id}",
    tag = "employee",
    params(
        ("id" = String, Path, description = "Employee identifier")
    ),
    request_body = EmployeePatch,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 401, description = "Missing or invalid bearer token", body = Message),
        (status = 404, description = "Employee not found", body = Message),
        (status = 500, description = "Internal Server Error", body = Message)
    ),
    security(("bearer_auth" = []))
)]
#[put("/{id}")]
pub async fn update_employee(
    store: web::Data<dyn EmployeeStore>,
    identity: web::ReqData<Identity>,
    id: web::Path<String>,
    patch: web::Json<EmployeePatch>,
) -> Result<HttpResponse, ApiError> {
    let mut employee = store.find_by_id(&id).await?.ok_or(ApiError::NotFound)?;
    patch.into_inner().apply_to(&mut employee)?;
    let updated = store.replace(&employee).await?.ok_or(ApiError::NotFound)?;

    tracing::info!(id = %updated.id, by = %identity.subject, "employee updated");
    Ok(HttpResponse::Ok().json(updated))
}

#[utoipa::path(
    delete,
    path = "/employees/{id}",
    tag = "employee",
    params(
        ("id" = String, Path, description = "Employee identifier")
    ),
    responses(
        (status = 200, description = "Employee deleted", body = Message),
        (status = 401, description = "Missing or invalid bearer token", body = Message),
        (status = 404, description = "Employee not found", body = Message),
        (status = 500, description = "Internal Server Error", body = Message)
    ),
    security(("bearer_auth" = []))
)]
#[delete("/{id}")]
pub async fn delete_employee(
    store: web::Data<dyn EmployeeStore>,
    identity: web::ReqData<Identity>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let removed = store.delete(&id).await?.ok_or(ApiError::NotFound)?;

    tracing::info!(id = %removed.id, by = %identity.subject, "employee deleted");
    Ok(HttpResponse::Ok().json(Message::new("Employee deleted")))
}

/// Registers the `/employees` routes behind the bearer gate. Expects a
/// `Data<dyn EmployeeStore>` and a `Data<dyn Authenticator>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json = web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into());

    cfg.service(
        web::scope("/employees")
            .app_data(json)
            .wrap(from_fn(require_bearer))
            .service(list_employees)
            .service(create_employee)
            .service(get_employee)
            .service(update_employee)
            .service(delete_employee),
    );
}
