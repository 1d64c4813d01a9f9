use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "islamic_profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub islamic_name: Option<String>,
    pub prayer_timings: Option<Json>,
    pub islamic_goals: Json,
    pub favorite_supplications: Json,
    pub behavior_score: i32,
    pub self_development_score: i32,
    pub amal_score: i32,
    pub overall_rating: f64,
    pub total_amal_completed: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Subset of fields a caller may supply at registration or profile update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub islamic_name: Option<String>,
    pub prayer_timings: Option<Json>,
    pub islamic_goals: Option<Vec<String>>,
    pub favorite_supplications: Option<Vec<String>>,
}

/// Create the profile row that accompanies every new user. All counters
/// start at zero.
pub async fn create_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    patch: ProfilePatch,
) -> Result<Model, errors::ModelError> {
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        islamic_name: Set(patch.islamic_name),
        prayer_timings: Set(patch.prayer_timings),
        islamic_goals: Set(Json::from(patch.islamic_goals.unwrap_or_default())),
        favorite_supplications: Set(Json::from(patch.favorite_supplications.unwrap_or_default())),
        behavior_score: Set(0),
        self_development_score: Set(0),
        amal_score: Set(0),
        overall_rating: Set(0.0),
        total_amal_completed: Set(0),
        current_streak: Set(0),
        longest_streak: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
