use async_trait::async_trait;
use uuid::Uuid;

use models::islamic_profile::ProfilePatch;
use models::user::{self, NewUser};

use super::domain::{UpdateProfileInput, UserView};
use crate::errors::ServiceError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_active_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError>;
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<user::Model>, ServiceError>;

    /// Uniqueness probe across all accounts, active or not.
    async fn email_or_phone_taken(&self, email: &str, phone: Option<&str>) -> Result<bool, ServiceError>;

    async fn company_is_active(&self, id: Uuid) -> Result<bool, ServiceError>;
    async fn institute_exists(&self, id: Uuid) -> Result<bool, ServiceError>;

    /// Create the credential record and its profile atomically: either both
    /// rows exist afterwards or neither does.
    async fn create_user_with_profile(
        &self,
        user: NewUser,
        profile: ProfilePatch,
    ) -> Result<user::Model, ServiceError>;

    async fn set_password_hash(&self, user_id: Uuid, hash: String) -> Result<(), ServiceError>;

    /// Attach the bounded related records (profile, company, institute).
    async fn load_view(&self, user: &user::Model) -> Result<UserView, ServiceError>;

    /// Merge-update base user fields and, when present, nested profile
    /// fields in one transaction.
    async fn update_profile(
        &self,
        user_id: Uuid,
        patch: UpdateProfileInput,
    ) -> Result<user::Model, ServiceError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;
    use models::enums::{InstituteGender, InstituteType};
    use models::islamic_profile;
    use sea_orm::JsonValue;

    use crate::views::{CompanySummary, InstituteSummary};

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, user::Model>>,
        profiles: Mutex<HashMap<Uuid, islamic_profile::Model>>,
        companies: Mutex<HashMap<Uuid, CompanySummary>>,
        institutes: Mutex<HashMap<Uuid, InstituteSummary>>,
    }

    impl MockAuthRepository {
        pub fn add_company(&self, id: Uuid, name: &str) {
            self.companies
                .lock()
                .unwrap()
                .insert(id, CompanySummary { id, name: name.to_string(), description: None });
        }

        pub fn add_institute(&self, id: Uuid, name: &str) {
            self.institutes.lock().unwrap().insert(
                id,
                InstituteSummary {
                    id,
                    name: name.to_string(),
                    institute_type: InstituteType::School,
                    gender: InstituteGender::Mixed,
                },
            );
        }

        pub fn deactivate_user(&self, id: Uuid) {
            if let Some(u) = self.users.lock().unwrap().get_mut(&id) {
                u.is_active = false;
            }
        }

        pub fn stored_hash(&self, id: Uuid) -> Option<String> {
            self.users.lock().unwrap().get(&id).map(|u| u.password_hash.clone())
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_active_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.email == email && u.is_active).cloned())
        }

        async fn find_active_by_id(&self, id: Uuid) -> Result<Option<user::Model>, ServiceError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&id).filter(|u| u.is_active).cloned())
        }

        async fn email_or_phone_taken(&self, email: &str, phone: Option<&str>) -> Result<bool, ServiceError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().any(|u| {
                u.email == email || (phone.is_some() && u.phone.as_deref() == phone)
            }))
        }

        async fn company_is_active(&self, id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.companies.lock().unwrap().contains_key(&id))
        }

        async fn institute_exists(&self, id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.institutes.lock().unwrap().contains_key(&id))
        }

        async fn create_user_with_profile(
            &self,
            input: NewUser,
            profile: ProfilePatch,
        ) -> Result<user::Model, ServiceError> {
            let now = Utc::now();
            let model = user::Model {
                id: Uuid::new_v4(),
                email: input.email,
                phone: input.phone,
                password_hash: input.password_hash,
                first_name: input.first_name,
                last_name: input.last_name,
                date_of_birth: input.date_of_birth,
                gender: input.gender,
                role: input.role,
                user_type: input.user_type,
                company_id: input.company_id,
                institute_id: input.institute_id,
                profile_image: None,
                is_active: true,
                created_at: now.into(),
                updated_at: now.into(),
            };
            let profile_model = islamic_profile::Model {
                id: Uuid::new_v4(),
                user_id: model.id,
                islamic_name: profile.islamic_name,
                prayer_timings: profile.prayer_timings,
                islamic_goals: JsonValue::from(profile.islamic_goals.unwrap_or_default()),
                favorite_supplications: JsonValue::from(profile.favorite_supplications.unwrap_or_default()),
                behavior_score: 0,
                self_development_score: 0,
                amal_score: 0,
                overall_rating: 0.0,
                total_amal_completed: 0,
                current_streak: 0,
                longest_streak: 0,
                created_at: now.into(),
                updated_at: now.into(),
            };
            self.users.lock().unwrap().insert(model.id, model.clone());
            self.profiles.lock().unwrap().insert(model.id, profile_model);
            Ok(model)
        }

        async fn set_password_hash(&self, user_id: Uuid, hash: String) -> Result<(), ServiceError> {
            let mut users = self.users.lock().unwrap();
            let user = users
                .get_mut(&user_id)
                .ok_or_else(|| ServiceError::not_found("User"))?;
            user.password_hash = hash;
            Ok(())
        }

        async fn load_view(&self, user: &user::Model) -> Result<UserView, ServiceError> {
            let islamic_profile = self.profiles.lock().unwrap().get(&user.id).cloned();
            let company = user
                .company_id
                .and_then(|id| self.companies.lock().unwrap().get(&id).cloned());
            let institute = user
                .institute_id
                .and_then(|id| self.institutes.lock().unwrap().get(&id).cloned());
            Ok(UserView { user: user.clone(), islamic_profile, company, institute })
        }

        async fn update_profile(
            &self,
            user_id: Uuid,
            patch: UpdateProfileInput,
        ) -> Result<user::Model, ServiceError> {
            let mut users = self.users.lock().unwrap();
            let user = users
                .get_mut(&user_id)
                .filter(|u| u.is_active)
                .ok_or_else(|| ServiceError::not_found("User"))?;
            if let Some(v) = patch.first_name {
                user.first_name = v;
            }
            if let Some(v) = patch.last_name {
                user.last_name = v;
            }
            if let Some(v) = patch.phone {
                user.phone = Some(v);
            }
            if let Some(v) = patch.profile_image {
                user.profile_image = Some(v);
            }
            if let Some(v) = patch.date_of_birth {
                user.date_of_birth = Some(v);
            }
            user.updated_at = Utc::now().into();
            if let Some(nested) = patch.islamic_profile {
                let mut profiles = self.profiles.lock().unwrap();
                if let Some(profile) = profiles.get_mut(&user_id) {
                    if let Some(v) = nested.islamic_name {
                        profile.islamic_name = Some(v);
                    }
                    if let Some(v) = nested.prayer_timings {
                        profile.prayer_timings = Some(v);
                    }
                    if let Some(v) = nested.islamic_goals {
                        profile.islamic_goals = JsonValue::from(v);
                    }
                    if let Some(v) = nested.favorite_supplications {
                        profile.favorite_supplications = JsonValue::from(v);
                    }
                }
            }
            Ok(user.clone())
        }
    }
}
