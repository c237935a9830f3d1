//! Shared request state handed to handlers through an `Extension` layer.

use crate::auth::cookies::CookieSettings;
use crate::auth::service::AuthService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(auth: AuthService, cookies: CookieSettings) -> Self {
        Self {
            auth: Arc::new(auth),
            cookies,
        }
    }
}
