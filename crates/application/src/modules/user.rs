use super::ui::UiModule;
use crate::app::App;
use serde_json::{json, Value};
use std::rc::Rc;
use switchboard_events::event_names::{LOGIN_FAILED, LOGIN_SUCCESS, LOGOUT_SUCCESS};
use switchboard_events::{LoginSucceeded, User};

const PROFILE_PATH: &str = "api/permission/systemuser/profile/";

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Success(User),
    /// Credentials rejected.
    Failed,
    /// Authenticated account without a client; logged out again.
    NoClient,
    /// Status outside the known classes; nothing changed.
    Unexpected(u16),
}

pub struct UserModule {
    app: Rc<App>,
    ui: Rc<UiModule>,
}

impl UserModule {
    pub fn new(app: Rc<App>, ui: Rc<UiModule>) -> Self {
        Self { app, ui }
    }

    /// Authenticate against the API and store the profile.
    pub fn login(&self, username: &str, password: &str) -> anyhow::Result<LoginOutcome> {
        let store = self.app.store();
        store.set("username", json!(username));
        store.set("password", json!(password));

        let res = self.app.api().get(PROFILE_PATH)?;

        if res.is_ok() {
            let mut user: User = serde_json::from_value(res.body)?;
            let Some(client) = user.client.as_deref() else {
                self.logout()?;
                return Ok(LoginOutcome::NoClient);
            };
            user.client_id = Some(client_id(client));
            store.set("user", serde_json::to_value(&user)?);

            tracing::info!(context = %self.app, "login success");
            self.app.emit(
                LOGIN_SUCCESS,
                serde_json::to_value(LoginSucceeded { user: user.clone() })?,
            )?;

            let mut notifications = store
                .get("notifications")
                .filter(Value::is_object)
                .unwrap_or_else(|| json!({}));
            notifications["unauthorized"] = json!(false);
            store.set("notifications", notifications);

            self.ui.refresh_widgets(false)?;
            Ok(LoginOutcome::Success(user))
        } else if res.is_notok() {
            store.remove("username");
            store.remove("password");
            tracing::info!(context = %self.app, status = res.status, "login failed");
            self.app.emit(LOGIN_FAILED, json!({}))?;
            Ok(LoginOutcome::Failed)
        } else {
            tracing::warn!(context = %self.app, status = res.status, "unexpected login response");
            Ok(LoginOutcome::Unexpected(res.status))
        }
    }

    pub fn logout(&self) -> anyhow::Result<()> {
        tracing::info!(context = %self.app, "logout");
        let store = self.app.store();
        store.remove("user");
        self.ui.reset_widget_state()?;
        store.remove("username");
        store.remove("password");
        self.app.emit(LOGOUT_SUCCESS, json!({}))?;
        Ok(())
    }

    pub fn current_user(&self) -> Option<User> {
        self.app
            .store()
            .get("user")
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

/// Numeric client id from a client resource URI.
fn client_id(client: &str) -> String {
    client
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}
