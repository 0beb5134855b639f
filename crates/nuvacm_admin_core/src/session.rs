use std::sync::Arc;

use nuvacm_api::services::AdminIdentity;

use crate::api::{ClientError, ClientResult, CmsApi};
use crate::status::Status;

pub const LOGIN_REQUIRED_FIELDS: &str = "Username and password are required";

/// Login state of the console.
pub struct AdminSession<A: CmsApi> {
    api: Arc<A>,
    user: Option<AdminIdentity>,
    status: Status,
}

impl<A: CmsApi> AdminSession<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            user: None,
            status: Status::default(),
        }
    }

    pub fn user(&self) -> Option<&AdminIdentity> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub async fn login(&mut self, username: &str, password: &str) -> ClientResult<()> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            self.status = Status::error(LOGIN_REQUIRED_FIELDS);
            return Err(ClientError::Validation(LOGIN_REQUIRED_FIELDS.to_string()));
        }

        self.status = Status::loading("Logging in...");
        match self.api.login(username, password).await {
            Ok(credential) => {
                log::info!("Logged in as {}", credential.user.username);
                self.status = Status::success(format!("Logged in as {}", credential.user.username));
                self.user = Some(credential.user);
                Ok(())
            }
            Err(e) => {
                self.status = Status::error(e.to_string());
                Err(e)
            }
        }
    }

    /// Always ends logged out locally; a failing server call is only logged.
    pub async fn logout(&mut self) {
        self.user = None;
        if let Err(e) = self.api.logout().await {
            log::warn!("Logout call failed: {}", e);
        }
        self.status = Status::info("Logged out");
    }
}
