use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::company;
use crate::enums::{InstituteGender, InstituteType};
use crate::errors;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "institute")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub institute_type: InstituteType,
    pub gender: InstituteGender,
    pub description: Option<String>,
    pub address: Option<String>,
    pub company_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Company,
    Students,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Company => Entity::belongs_to(company::Entity)
                .from(Column::CompanyId)
                .to(company::Column::Id)
                .into(),
            Relation::Students => Entity::has_many(user::Entity).into(),
        }
    }
}

impl Related<company::Entity> for Entity {
    fn to() -> RelationDef { Relation::Company.def() }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Students.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub struct NewInstitute {
    pub name: String,
    pub institute_type: InstituteType,
    pub gender: InstituteGender,
    pub description: Option<String>,
    pub address: Option<String>,
    pub company_id: Uuid,
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewInstitute) -> Result<Model, errors::ModelError> {
    if input.name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        institute_type: Set(input.institute_type),
        gender: Set(input.gender),
        description: Set(input.description),
        address: Set(input.address),
        company_id: Set(input.company_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
