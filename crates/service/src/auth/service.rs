use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::user::NewUser;

use super::domain::{
    AuthSession, ChangePasswordInput, LoginInput, Principal, RegisterInput, UpdateProfileInput,
    UserView,
};
use super::mailer::Mailer;
use super::repository::AuthRepository;
use super::token::TokenSigner;
use crate::errors::ServiceError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Result of a successful refresh: a new access token only. The refresh
/// token itself is never rotated.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedSession {
    pub access_token: String,
}

/// Credential and session manager, independent of the web framework.
pub struct AuthService<R: AuthRepository, M: Mailer> {
    repo: Arc<R>,
    mailer: Arc<M>,
    tokens: TokenSigner,
    reset_base_url: String,
}

impl<R: AuthRepository, M: Mailer> AuthService<R, M> {
    pub fn new(repo: Arc<R>, mailer: Arc<M>, tokens: TokenSigner, reset_base_url: String) -> Self {
        Self { repo, mailer, tokens, reset_base_url }
    }

    pub fn tokens(&self) -> &TokenSigner {
        &self.tokens
    }

    /// Register a new user with a hashed password. The credential record and
    /// its profile are created atomically; both tokens are issued on success.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, ServiceError> {
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(ServiceError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.repo.email_or_phone_taken(&input.email, input.phone.as_deref()).await? {
            debug!("registration rejected, identity already in use");
            return Err(ServiceError::Conflict(
                "User already exists with this email or phone!".into(),
            ));
        }
        if let Some(company_id) = input.company_id {
            if !self.repo.company_is_active(company_id).await? {
                return Err(ServiceError::BadRequest("Invalid company ID!".into()));
            }
        }
        if let Some(institute_id) = input.institute_id {
            if !self.repo.institute_exists(institute_id).await? {
                return Err(ServiceError::BadRequest("Invalid institute ID!".into()));
            }
        }

        let password_hash = hash_password(&input.password)?;
        let created = self
            .repo
            .create_user_with_profile(
                NewUser {
                    email: input.email,
                    phone: input.phone,
                    password_hash,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    date_of_birth: input.date_of_birth,
                    gender: input.gender,
                    role: input.role,
                    user_type: input.user_type,
                    company_id: input.company_id,
                    institute_id: input.institute_id,
                },
                input.islamic_profile.unwrap_or_default(),
            )
            .await?;

        let principal = Principal::from(&created);
        let access_token = self.tokens.issue_access(&principal)?;
        let refresh_token = self.tokens.issue_refresh(&principal)?;
        info!(user_id = %created.id, role = ?created.role, "user_registered");

        let user = self.repo.load_view(&created).await?;
        Ok(AuthSession { user, access_token, refresh_token })
    }

    /// Authenticate and issue both tokens.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, ServiceError> {
        let user = self
            .repo
            .find_active_by_email(&input.email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found or inactive!".into()))?;

        verify_password(&input.password, &user.password_hash)
            .map_err(|_| ServiceError::Unauthorized("Password incorrect!".into()))?;

        let principal = Principal::from(&user);
        let access_token = self.tokens.issue_access(&principal)?;
        let refresh_token = self.tokens.issue_refresh(&principal)?;
        info!(user_id = %user.id, "user_logged_in");

        let user = self.repo.load_view(&user).await?;
        Ok(AuthSession { user, access_token, refresh_token })
    }

    /// Mint a new access token from a refresh token. Signature and expiry
    /// are checked first; storage is touched only to confirm the subject is
    /// still active.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedSession, ServiceError> {
        let claims = self
            .tokens
            .verify_refresh(refresh_token)
            .map_err(|_| ServiceError::Unauthorized("You are not authorized!".into()))?;

        // a valid token for a gone or deactivated account is still rejected
        let user = self
            .repo
            .find_active_by_email(&claims.email)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("You are not authorized!".into()))?;

        let access_token = self.tokens.issue_access(&Principal::from(&user))?;
        Ok(RefreshedSession { access_token })
    }

    #[instrument(skip(self, input), fields(user_id = %principal.user_id))]
    pub async fn change_password(
        &self,
        principal: &Principal,
        input: ChangePasswordInput,
    ) -> Result<(), ServiceError> {
        if input.new_password.len() < MIN_PASSWORD_LEN {
            return Err(ServiceError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let user = self
            .repo
            .find_active_by_email(&principal.email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found!".into()))?;

        verify_password(&input.old_password, &user.password_hash)
            .map_err(|_| ServiceError::Unauthorized("Current password is incorrect!".into()))?;

        let hash = hash_password(&input.new_password)?;
        self.repo.set_password_hash(user.id, hash).await?;
        info!(user_id = %user.id, "password_changed");
        Ok(())
    }

    /// Issue a reset token bound to the account's user id and dispatch it
    /// through the mailer. The token never appears in the return value.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), ServiceError> {
        let user = self
            .repo
            .find_active_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found with this email!".into()))?;

        let token = self.tokens.issue_reset(&Principal::from(&user))?;
        let reset_link = format!("{}?userId={}&token={}", self.reset_base_url, user.id, token);
        let body = reset_email_body(&user.first_name, &reset_link);
        self.mailer.send(&user.email, "Password Reset Request", &body).await?;
        info!(user_id = %user.id, "password_reset_dispatched");
        Ok(())
    }

    /// Replace the password hash when a valid reset token matches the target
    /// user. The old password is not required.
    #[instrument(skip(self, token, new_password), fields(user_id = %target_user_id))]
    pub async fn reset_password(
        &self,
        token: &str,
        target_user_id: Uuid,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(ServiceError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let user = self
            .repo
            .find_active_by_id(target_user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found!".into()))?;

        let claims = self
            .tokens
            .verify_reset(token)
            .map_err(|_| ServiceError::Forbidden("Invalid or expired token!".into()))?;
        if claims.user_id != target_user_id {
            return Err(ServiceError::Forbidden("Invalid token!".into()));
        }

        let hash = hash_password(new_password)?;
        self.repo.set_password_hash(user.id, hash).await?;
        info!(user_id = %user.id, "password_reset_completed");
        Ok(())
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserView, ServiceError> {
        let user = self
            .repo
            .find_active_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found!".into()))?;
        self.repo.load_view(&user).await
    }

    #[instrument(skip(self, patch), fields(user_id = %user_id))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        patch: UpdateProfileInput,
    ) -> Result<UserView, ServiceError> {
        let updated = self.repo.update_profile(user_id, patch).await?;
        self.repo.load_view(&updated).await
    }
}

/// One-way, salted, cost-factored hash.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::Hash(e.to_string()))?
        .to_string())
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), ServiceError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| ServiceError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|e| ServiceError::Hash(e.to_string()))
}

fn reset_email_body(first_name: &str, reset_link: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <h2 style="color: #2c5530;">Password Reset Request</h2>
    <p>Assalamu Alaikum {first_name},</p>
    <p>You have requested to reset your password for your Islamic Organization account.</p>
    <p>Please click the button below to reset your password:</p>
    <div style="text-align: center; margin: 30px 0;">
        <a href="{reset_link}" style="background-color: #2c5530; color: white; padding: 12px 24px; text-decoration: none; border-radius: 5px; display: inline-block;">
            Reset Password
        </a>
    </div>
    <p>This link will expire in 10 minutes for security reasons.</p>
    <p>If you did not request this password reset, please ignore this email.</p>
    <p>JazakAllahu Khairan,<br>Islamic Organization Team</p>
</div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use configs::JwtConfig;
    use models::enums::{Gender, UserRole, UserType};

    use super::super::mailer::CapturingMailer;
    use super::super::repository::mock::MockAuthRepository;

    fn signer() -> TokenSigner {
        TokenSigner::new(JwtConfig {
            access_secret: "access".into(),
            refresh_secret: "refresh".into(),
            reset_secret: "reset".into(),
            access_expiry_secs: 3600,
            refresh_expiry_secs: 86400,
            reset_expiry_secs: 600,
        })
    }

    fn service() -> (
        Arc<MockAuthRepository>,
        Arc<CapturingMailer>,
        AuthService<MockAuthRepository, CapturingMailer>,
    ) {
        let repo = Arc::new(MockAuthRepository::default());
        let mailer = Arc::new(CapturingMailer::default());
        let svc = AuthService::new(
            Arc::clone(&repo),
            Arc::clone(&mailer),
            signer(),
            "http://localhost:3000/reset-password".into(),
        );
        (repo, mailer, svc)
    }

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput {
            email: email.into(),
            phone: None,
            password: "secret1".into(),
            first_name: "Aisha".into(),
            last_name: "Rahman".into(),
            date_of_birth: None,
            gender: Gender::Female,
            role: UserRole::Admin,
            user_type: UserType::Employee,
            company_id: None,
            institute_id: None,
            islamic_profile: None,
        }
    }

    #[tokio::test]
    async fn register_then_login_succeeds_with_matching_claims() {
        let (_, _, svc) = service();
        let session = svc.register(register_input("a@x.com")).await.unwrap();
        assert!(session.user.islamic_profile.is_some());

        let login = svc
            .login(LoginInput { email: "a@x.com".into(), password: "secret1".into() })
            .await
            .unwrap();
        let claims = svc.tokens().verify_access(&login.access_token).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.user_id, login.user.user.id);
    }

    #[tokio::test]
    async fn register_duplicate_email_conflicts() {
        let (_, _, svc) = service();
        svc.register(register_input("dup@x.com")).await.unwrap();
        let err = svc.register(register_input("dup@x.com")).await.unwrap_err();
        assert_eq!(err.status(), 409);
    }

    #[tokio::test]
    async fn register_with_unknown_company_is_rejected() {
        let (_, _, svc) = service();
        let mut input = register_input("c@x.com");
        input.company_id = Some(Uuid::new_v4());
        let err = svc.register(input).await.unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[tokio::test]
    async fn register_with_known_company_links_it() {
        let (repo, _, svc) = service();
        let company_id = Uuid::new_v4();
        repo.add_company(company_id, "Al-Noor Holdings");
        let mut input = register_input("linked@x.com");
        input.company_id = Some(company_id);
        let session = svc.register(input).await.unwrap();
        assert_eq!(session.user.company.as_ref().unwrap().name, "Al-Noor Holdings");
    }

    #[tokio::test]
    async fn login_wrong_password_is_unauthorized() {
        let (_, _, svc) = service();
        svc.register(register_input("b@x.com")).await.unwrap();
        let err = svc
            .login(LoginInput { email: "b@x.com".into(), password: "wrong!!".into() })
            .await
            .unwrap_err();
        assert_eq!(err.status(), 401);
    }

    #[tokio::test]
    async fn login_unknown_email_is_not_found() {
        let (_, _, svc) = service();
        let err = svc
            .login(LoginInput { email: "nobody@x.com".into(), password: "secret1".into() })
            .await
            .unwrap_err();
        assert_eq!(err.status(), 404);
    }

    #[tokio::test]
    async fn refresh_issues_access_token_only() {
        let (_, _, svc) = service();
        let session = svc.register(register_input("r@x.com")).await.unwrap();
        let refreshed = svc.refresh(&session.refresh_token).await.unwrap();
        let claims = svc.tokens().verify_access(&refreshed.access_token).unwrap();
        assert_eq!(claims.email, "r@x.com");
    }

    #[tokio::test]
    async fn refresh_rejects_tampered_and_wrong_kind_tokens() {
        let (_, _, svc) = service();
        let session = svc.register(register_input("t@x.com")).await.unwrap();

        let mut tampered = session.refresh_token.clone();
        tampered.push('z');
        assert_eq!(svc.refresh(&tampered).await.unwrap_err().status(), 401);

        // an access token must not pass as a refresh token
        assert_eq!(svc.refresh(&session.access_token).await.unwrap_err().status(), 401);
    }

    #[tokio::test]
    async fn refresh_fails_for_deactivated_subject() {
        let (repo, _, svc) = service();
        let session = svc.register(register_input("gone@x.com")).await.unwrap();
        repo.deactivate_user(session.user.user.id);
        let err = svc.refresh(&session.refresh_token).await.unwrap_err();
        assert_eq!(err.status(), 401);
    }

    #[tokio::test]
    async fn change_password_requires_matching_old_password() {
        let (_, _, svc) = service();
        let session = svc.register(register_input("cp@x.com")).await.unwrap();
        let principal = Principal::from(&session.user.user);

        let err = svc
            .change_password(
                &principal,
                ChangePasswordInput { old_password: "nope!!!".into(), new_password: "newpass1".into() },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), 401);

        svc.change_password(
            &principal,
            ChangePasswordInput { old_password: "secret1".into(), new_password: "newpass1".into() },
        )
        .await
        .unwrap();

        svc.login(LoginInput { email: "cp@x.com".into(), password: "newpass1".into() })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn forgot_password_mails_link_but_not_in_response() {
        let (_, mailer, svc) = service();
        let session = svc.register(register_input("fp@x.com")).await.unwrap();
        svc.forgot_password("fp@x.com").await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (to, _, body) = &sent[0];
        assert_eq!(to, "fp@x.com");
        assert!(body.contains(&format!("userId={}", session.user.user.id)));
    }

    #[tokio::test]
    async fn forgot_password_unknown_email_is_not_found() {
        let (_, _, svc) = service();
        assert_eq!(svc.forgot_password("none@x.com").await.unwrap_err().status(), 404);
    }

    #[tokio::test]
    async fn reset_password_rejects_mismatched_user_id() {
        let (_, _, svc) = service();
        let a = svc.register(register_input("ra@x.com")).await.unwrap();
        let b = svc.register(register_input("rb@x.com")).await.unwrap();

        // token bound to user A applied to user B
        let token = svc.tokens().issue_reset(&Principal::from(&a.user.user)).unwrap();
        let err = svc
            .reset_password(&token, b.user.user.id, "brandnew1")
            .await
            .unwrap_err();
        assert_eq!(err.status(), 403);
    }

    #[tokio::test]
    async fn reset_password_with_bound_token_succeeds() {
        let (_, _, svc) = service();
        let session = svc.register(register_input("rs@x.com")).await.unwrap();
        let user_id = session.user.user.id;
        let token = svc.tokens().issue_reset(&Principal::from(&session.user.user)).unwrap();

        svc.reset_password(&token, user_id, "brandnew1").await.unwrap();
        svc.login(LoginInput { email: "rs@x.com".into(), password: "brandnew1".into() })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reset_password_rejects_wrong_kind_token() {
        let (_, _, svc) = service();
        let session = svc.register(register_input("rk@x.com")).await.unwrap();
        let err = svc
            .reset_password(&session.access_token, session.user.user.id, "brandnew1")
            .await
            .unwrap_err();
        assert_eq!(err.status(), 403);
    }

    #[tokio::test]
    async fn get_profile_is_idempotent() {
        let (_, _, svc) = service();
        let session = svc.register(register_input("gp@x.com")).await.unwrap();
        let id = session.user.user.id;
        let first = svc.get_profile(id).await.unwrap();
        let second = svc.get_profile(id).await.unwrap();
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn update_profile_merges_partial_patch() {
        let (_, _, svc) = service();
        let session = svc.register(register_input("up@x.com")).await.unwrap();
        let id = session.user.user.id;

        let patch = UpdateProfileInput { first_name: Some("Fatima".into()), ..Default::default() };
        let updated = svc.update_profile(id, patch).await.unwrap();
        assert_eq!(updated.user.first_name, "Fatima");
        // unspecified fields keep their values
        assert_eq!(updated.user.last_name, "Rahman");
        assert_eq!(updated.user.email, "up@x.com");
    }

    #[tokio::test]
    async fn update_profile_nested_islamic_fields() {
        let (_, _, svc) = service();
        let session = svc.register(register_input("np@x.com")).await.unwrap();
        let id = session.user.user.id;

        let patch = UpdateProfileInput {
            islamic_profile: Some(models::islamic_profile::ProfilePatch {
                islamic_name: Some("Abdullah".into()),
                islamic_goals: Some(vec!["memorize Juz Amma".into()]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let updated = svc.update_profile(id, patch).await.unwrap();
        let profile = updated.islamic_profile.unwrap();
        assert_eq!(profile.islamic_name.as_deref(), Some("Abdullah"));
        assert_eq!(profile.islamic_goals[0], "memorize Juz Amma");
    }

    #[tokio::test]
    async fn short_password_is_rejected_everywhere() {
        let (_, _, svc) = service();
        let mut input = register_input("sp@x.com");
        input.password = "abc".into();
        assert_eq!(svc.register(input).await.unwrap_err().status(), 400);
    }
}
