//! Two-step password reset: verify the email, then set a new password.

use crate::error::Result;
use crate::forms::{ForgotPasswordForm, PasswordResetForm};
use crate::services::api::ApiClient;

/// Where the flow currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetStep {
    AwaitingEmail,
    /// Email verified; holds the reset token issued by the backend.
    AwaitingPassword { token: String },
    Done,
}

/// Password reset flow. A failed step leaves the flow where it was.
pub struct PasswordReset {
    api: ApiClient,
    step: ResetStep,
}

impl PasswordReset {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            step: ResetStep::AwaitingEmail,
        }
    }

    pub fn step(&self) -> &ResetStep {
        &self.step
    }

    /// Request a reset token for `email`. Returns the server's message, if any.
    pub async fn submit_email(&mut self, email: &str) -> Result<Option<String>> {
        ForgotPasswordForm::new(email).check()?;

        let response = self.api.forgot_password(email).await?;
        tracing::info!("Password reset token issued");
        self.step = ResetStep::AwaitingPassword {
            token: response.token,
        };
        Ok(response.message)
    }

    /// Set the new password. Only valid after [`submit_email`](Self::submit_email).
    pub async fn submit_password(&mut self, password: &str, confirmation: &str) -> Result<()> {
        PasswordResetForm::new(password, confirmation).check()?;

        let token = match &self.step {
            ResetStep::AwaitingPassword { token } => token.clone(),
            _ => {
                return Err(crate::error::ClientError::Validation(
                    "Please enter your email.".to_string(),
                ))
            }
        };

        self.api.reset_password(&token, password, confirmation).await?;
        self.step = ResetStep::Done;
        Ok(())
    }

    /// Start over from the email step.
    pub fn restart(&mut self) {
        self.step = ResetStep::AwaitingEmail;
    }
}
