use async_trait::async_trait;
use tracing::info;

use crate::errors::ServiceError;

/// Out-of-band notification channel for password-reset links. Actual
/// delivery is an external collaborator; this seam is what the auth service
/// depends on.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ServiceError>;
}

/// Records outbound mail as structured log events. The reset link itself is
/// not logged.
#[derive(Default)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), ServiceError> {
        info!(to = %to, subject = %subject, "outbound_email_dispatched");
        Ok(())
    }
}

/// Captures outbound mail for assertions in tests.
#[derive(Default)]
pub struct CapturingMailer {
    pub sent: std::sync::Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Mailer for CapturingMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), ServiceError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), html_body.to_string()));
        Ok(())
    }
}
