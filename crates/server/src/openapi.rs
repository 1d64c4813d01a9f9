use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub role: String,
    pub user_type: String,
    pub company_id: Option<Uuid>,
    pub institute_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct ResetPasswordDoc {
    pub id: Uuid,
    pub new_password: String,
}

#[derive(ToSchema)]
pub struct CreateCompanyDoc {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(ToSchema)]
pub struct CreateInstituteDoc {
    pub name: String,
    pub r#type: String,
    pub gender: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub company_id: Uuid,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::refresh_token,
        crate::routes::auth::logout,
        crate::routes::auth::change_password,
        crate::routes::auth::forgot_password,
        crate::routes::auth::reset_password,
        crate::routes::auth::get_profile,
        crate::routes::auth::update_profile,
        crate::routes::company::create,
        crate::routes::company::list,
        crate::routes::company::get,
        crate::routes::company::update,
        crate::routes::company::delete,
        crate::routes::company::statistics,
        crate::routes::institute::create,
        crate::routes::institute::by_company,
        crate::routes::institute::list,
        crate::routes::institute::get,
        crate::routes::institute::update,
        crate::routes::institute::delete,
        crate::routes::institute::statistics,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            ResetPasswordDoc,
            CreateCompanyDoc,
            CreateInstituteDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "companies"),
        (name = "institutes")
    )
)]
pub struct ApiDoc;
