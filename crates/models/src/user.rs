use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::company;
use crate::enums::{Gender, UserRole, UserType};
use crate::errors;
use crate::institute;
use crate::islamic_profile;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    // Never serialized outward; the hash stays inside the storage boundary.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<Date>,
    pub gender: Gender,
    pub role: UserRole,
    pub user_type: UserType,
    pub company_id: Option<Uuid>,
    pub institute_id: Option<Uuid>,
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Company,
    Institute,
    IslamicProfile,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Company => Entity::belongs_to(company::Entity)
                .from(Column::CompanyId)
                .to(company::Column::Id)
                .into(),
            Relation::Institute => Entity::belongs_to(institute::Entity)
                .from(Column::InstituteId)
                .to(institute::Column::Id)
                .into(),
            Relation::IslamicProfile => Entity::has_one(islamic_profile::Entity).into(),
        }
    }
}

impl Related<company::Entity> for Entity {
    fn to() -> RelationDef { Relation::Company.def() }
}

impl Related<institute::Entity> for Entity {
    fn to() -> RelationDef { Relation::Institute.def() }
}

impl Related<islamic_profile::Entity> for Entity {
    fn to() -> RelationDef { Relation::IslamicProfile.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    let ok = email.contains('@') && email.len() <= 255 && !email.starts_with('@') && !email.ends_with('@');
    if !ok {
        return Err(errors::ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() || name.len() > 128 {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    Ok(())
}

pub struct NewUser {
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<Date>,
    pub gender: Gender,
    pub role: UserRole,
    pub user_type: UserType,
    pub company_id: Option<Uuid>,
    pub institute_id: Option<Uuid>,
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewUser) -> Result<Model, errors::ModelError> {
    validate_email(&input.email)?;
    validate_name(&input.first_name)?;
    validate_name(&input.last_name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(input.email),
        phone: Set(input.phone),
        password_hash: Set(input.password_hash),
        first_name: Set(input.first_name),
        last_name: Set(input.last_name),
        date_of_birth: Set(input.date_of_birth),
        gender: Set(input.gender),
        role: Set(input.role),
        user_type: Set(input.user_type),
        company_id: Set(input.company_id),
        institute_id: Set(input.institute_id),
        profile_image: Set(None),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Find an active user by email; inactive accounts are invisible to auth.
pub async fn find_active_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email))
        .filter(Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_active<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id)
        .filter(Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
