//! Bounded projections of related entities attached to hydrated responses.
//! Each summary selects an explicit column subset; listings never fan out
//! into full related rows.

use sea_orm::FromQueryResult;
use serde::Serialize;
use uuid::Uuid;

use models::enums::{InstituteGender, InstituteType, UserRole};

#[derive(Debug, Clone, Serialize, FromQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct InstituteSummary {
    pub id: Uuid,
    pub name: String,
    pub institute_type: InstituteType,
    pub gender: InstituteGender,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
}
