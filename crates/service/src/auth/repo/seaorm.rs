use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use models::islamic_profile::{self, ProfilePatch};
use models::user::{self, NewUser};
use models::{company, institute};
use sea_orm::JsonValue;

use super::super::domain::{UpdateProfileInput, UserView};
use super::super::repository::AuthRepository;
use crate::errors::ServiceError;
use crate::views::{CompanySummary, InstituteSummary};

/// SeaORM-backed auth repository.
pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_active_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::find_active_by_email(&self.db, email).await?)
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<user::Model>, ServiceError> {
        Ok(user::find_active(&self.db, id).await?)
    }

    async fn email_or_phone_taken(&self, email: &str, phone: Option<&str>) -> Result<bool, ServiceError> {
        let mut cond = Condition::any().add(user::Column::Email.eq(email));
        if let Some(phone) = phone {
            cond = cond.add(user::Column::Phone.eq(phone));
        }
        let existing = user::Entity::find().filter(cond).one(&self.db).await?;
        Ok(existing.is_some())
    }

    async fn company_is_active(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(company::find_active(&self.db, id).await?.is_some())
    }

    async fn institute_exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        let found = institute::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.is_some())
    }

    async fn create_user_with_profile(
        &self,
        input: NewUser,
        profile: ProfilePatch,
    ) -> Result<user::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let created = user::create(&txn, input).await?;
        islamic_profile::create_for_user(&txn, created.id, profile).await?;
        txn.commit().await?;
        Ok(created)
    }

    async fn set_password_hash(&self, user_id: Uuid, hash: String) -> Result<(), ServiceError> {
        let found = user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;
        let mut am: user::ActiveModel = found.into();
        am.password_hash = Set(hash);
        am.updated_at = Set(Utc::now().into());
        am.update(&self.db).await?;
        Ok(())
    }

    async fn load_view(&self, user: &user::Model) -> Result<UserView, ServiceError> {
        let islamic_profile = islamic_profile::find_by_user(&self.db, user.id).await?;
        let company = match user.company_id {
            Some(id) => company::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .map(|c| CompanySummary { id: c.id, name: c.name, description: c.description }),
            None => None,
        };
        let institute = match user.institute_id {
            Some(id) => institute::Entity::find_by_id(id).one(&self.db).await?.map(|i| {
                InstituteSummary {
                    id: i.id,
                    name: i.name,
                    institute_type: i.institute_type,
                    gender: i.gender,
                }
            }),
            None => None,
        };
        Ok(UserView { user: user.clone(), islamic_profile, company, institute })
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        patch: UpdateProfileInput,
    ) -> Result<user::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let found = user::Entity::find_by_id(user_id)
            .filter(user::Column::IsActive.eq(true))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        let mut am: user::ActiveModel = found.into();
        if let Some(v) = patch.first_name {
            am.first_name = Set(v);
        }
        if let Some(v) = patch.last_name {
            am.last_name = Set(v);
        }
        if let Some(v) = patch.phone {
            am.phone = Set(Some(v));
        }
        if let Some(v) = patch.profile_image {
            am.profile_image = Set(Some(v));
        }
        if let Some(v) = patch.date_of_birth {
            am.date_of_birth = Set(Some(v));
        }
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&txn).await?;

        if let Some(nested) = patch.islamic_profile {
            let profile = islamic_profile::find_by_user(&txn, user_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Islamic profile"))?;
            let mut pm: islamic_profile::ActiveModel = profile.into();
            if let Some(v) = nested.islamic_name {
                pm.islamic_name = Set(Some(v));
            }
            if let Some(v) = nested.prayer_timings {
                pm.prayer_timings = Set(Some(v));
            }
            if let Some(v) = nested.islamic_goals {
                pm.islamic_goals = Set(JsonValue::from(v));
            }
            if let Some(v) = nested.favorite_supplications {
                pm.favorite_supplications = Set(JsonValue::from(v));
            }
            pm.updated_at = Set(Utc::now().into());
            pm.update(&txn).await?;
        }

        txn.commit().await?;
        Ok(updated)
    }
}
