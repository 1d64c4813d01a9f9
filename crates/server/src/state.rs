use std::sync::Arc;

use sea_orm::DatabaseConnection;

use service::auth::mailer::TracingMailer;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::AuthService;
use service::auth::token::TokenSigner;

pub type SharedAuthService = Arc<AuthService<SeaOrmAuthRepository, TracingMailer>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub auth: SharedAuthService,
    /// Controls the `Secure` flag on the refresh cookie.
    pub production: bool,
}

impl AppState {
    pub fn new(db: DatabaseConnection, cfg: &configs::AppConfig) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository { db: db.clone() });
        let mailer = Arc::new(TracingMailer);
        let auth = Arc::new(AuthService::new(
            repo,
            mailer,
            TokenSigner::new(cfg.jwt.clone()),
            cfg.app.reset_password_base_url.clone(),
        ));
        Self { db, auth, production: cfg.app.is_production() }
    }
}
