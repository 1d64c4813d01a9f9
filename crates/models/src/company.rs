use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;
use crate::institute;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "company")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Institutes,
    Employees,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Institutes => Entity::has_many(institute::Entity).into(),
            Relation::Employees => Entity::has_many(user::Entity).into(),
        }
    }
}

impl Related<institute::Entity> for Entity {
    fn to() -> RelationDef { Relation::Institutes.def() }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Employees.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub struct NewCompany {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewCompany) -> Result<Model, errors::ModelError> {
    if input.name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    if let Some(email) = &input.email {
        user::validate_email(email)?;
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        description: Set(input.description),
        address: Set(input.address),
        phone: Set(input.phone),
        email: Set(input.email),
        is_active: Set(input.is_active),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Find a company only if it has not been deactivated.
pub async fn find_active<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id)
        .filter(Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
