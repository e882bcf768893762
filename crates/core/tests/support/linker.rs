use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use keygate_core::UserLinker;
use keygate_domain::OAuthUserInfo;

/// In-memory account store for `UserLinker`.
///
/// Users are keyed by email; created ids are `user-<n>`. Setting
/// `fail` makes every call return an error.
#[derive(Default)]
pub struct MockUserLinker {
    users: Mutex<HashMap<String, String>>,
    links: Mutex<Vec<(String, OAuthUserInfo)>>,
    fail: AtomicBool,
}

impl MockUserLinker {
    pub fn with_user(self, email: &str, user_id: &str) -> Self {
        self.users.lock().unwrap().insert(email.to_string(), user_id.to_string());
        self
    }

    pub fn failing() -> Self {
        let linker = Self::default();
        linker.fail.store(true, Ordering::SeqCst);
        linker
    }

    /// `(user_id, user_info)` for every `link_oauth_account` call
    pub fn links(&self) -> Vec<(String, OAuthUserInfo)> {
        self.links.lock().unwrap().clone()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("user store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl UserLinker for MockUserLinker {
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<String>> {
        self.check()?;
        Ok(self.users.lock().unwrap().get(email).cloned())
    }

    async fn link_oauth_account(
        &self,
        user_id: &str,
        user_info: &OAuthUserInfo,
    ) -> anyhow::Result<()> {
        self.check()?;
        self.links.lock().unwrap().push((user_id.to_string(), user_info.clone()));
        Ok(())
    }

    async fn create_user_from_oauth(&self, user_info: &OAuthUserInfo) -> anyhow::Result<String> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        let user_id = format!("user-{}", users.len() + 1);
        users.insert(user_info.email.clone(), user_id.clone());
        Ok(user_id)
    }
}
