//! Roster handlers.
//!
//! ```text
//! GET  /users
//! GET  /users/create
//! POST /users/create        name=Ana&email=a@x.com
//! GET  /users/export-data
//! GET  /users/generate/{id}
//! ```

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{DomainError, NewUser, UserId, UserValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::download::deliver_over_http;
use crate::inbound::http::error::form_error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::PageTemplates;

/// Form body for `POST /users/create`.
///
/// Missing fields deserialize as empty strings so validation reports them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserForm {
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
}

impl TryFrom<CreateUserForm> for NewUser {
    type Error = UserValidationError;

    fn try_from(value: CreateUserForm) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.name, &value.email)
    }
}

fn map_user_validation_error(err: UserValidationError) -> DomainError {
    let (field, code) = match &err {
        UserValidationError::EmptyName => ("name", "empty_name"),
        UserValidationError::EmptyEmail => ("email", "empty_email"),
        UserValidationError::EmptyId | UserValidationError::InvalidId => ("id", "invalid_id"),
        UserValidationError::UnknownStatus { .. } => ("status", "unknown_status"),
    };
    DomainError::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(header::ContentType::html())
        .body(body)
}

/// Roster list page.
///
/// # Errors
/// Store failures map to 503 or 500.
#[get("")]
pub async fn list_users(
    state: web::Data<HttpState>,
    pages: web::Data<PageTemplates>,
) -> ApiResult<HttpResponse> {
    let users = state.roster_query.list_users().await?;
    Ok(html(pages.users_page(&users)))
}

/// Create form page.
#[get("/create")]
pub async fn create_user_form(pages: web::Data<PageTemplates>) -> HttpResponse {
    html(pages.create_user_page().to_owned())
}

/// Validate the form, register the user and redirect to the list.
///
/// # Errors
/// Blank fields give 400 before the store is touched.
#[post("/create")]
pub async fn create_user(
    state: web::Data<HttpState>,
    form: web::Form<CreateUserForm>,
) -> ApiResult<HttpResponse> {
    let new_user = NewUser::try_from(form.into_inner()).map_err(map_user_validation_error)?;
    state.roster.create_user(new_user).await?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/users"))
        .finish())
}

/// Export the roster as a workbook attachment.
///
/// # Errors
/// Store, encoding and disk failures surface as JSON errors.
#[get("/export-data")]
pub async fn export_users(req: HttpRequest, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let artifact = state.export.export_roster().await?;
    deliver_over_http(&req, artifact).await
}

/// Render and download a user's document once.
///
/// # Errors
/// 400 for a malformed id, 404 for an unknown user, 409 once generated.
#[get("/generate/{id}")]
pub async fn generate_document(
    req: HttpRequest,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.into_inner()).map_err(map_user_validation_error)?;
    let artifact = state.documents.generate_document(&id).await?;
    deliver_over_http(&req, artifact).await
}

/// Mount the roster handlers under `/users`.
#[must_use]
pub fn scope() -> actix_web::Scope {
    web::scope("/users")
        .app_data(web::FormConfig::default().error_handler(|err, _req| form_error(&err)))
        .service(list_users)
        .service(create_user_form)
        .service(create_user)
        .service(export_users)
        .service(generate_document)
}
