use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::enums::{Gender, UserRole, UserType};
use models::islamic_profile::{self, ProfilePatch};
use models::user;

use crate::views::{CompanySummary, InstituteSummary};

/// Registration input
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub role: UserRole,
    pub user_type: UserType,
    pub company_id: Option<Uuid>,
    pub institute_id: Option<Uuid>,
    #[serde(default)]
    pub islamic_profile: Option<ProfilePatch>,
}

/// Login input
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub old_password: String,
    pub new_password: String,
}

/// Merge-update patch; `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub islamic_profile: Option<ProfilePatch>,
}

impl UpdateProfileInput {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.profile_image.is_none()
            && self.date_of_birth.is_none()
            && self.islamic_profile.is_none()
    }
}

/// Authenticated identity decoded from a verified access token.
/// Reconstructed per request; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub user_type: UserType,
}

impl From<&user::Model> for Principal {
    fn from(user: &user::Model) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            user_type: user.user_type,
        }
    }
}

/// User plus the bounded related records attached to auth responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(flatten)]
    pub user: user::Model,
    pub islamic_profile: Option<islamic_profile::Model>,
    pub company: Option<CompanySummary>,
    pub institute: Option<InstituteSummary>,
}

/// Login/registration result: hydrated user plus both tokens. The server
/// decides transport (body vs cookie).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: UserView,
    pub access_token: String,
    pub refresh_token: String,
}
