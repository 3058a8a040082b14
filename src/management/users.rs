use std::{collections::HashMap, path::PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    Error, Res,
    types::{User, normalize},
};

/// Persistence collaborator for users and the token each one owns.
///
/// `save` replaces the whole stored record for the user's login.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_login(&self, login: &str) -> Res<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Res<Option<User>>;
    async fn save(&self, user: &User) -> Res<()>;
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users
            .into_iter()
            .map(|u| (normalize(&u.login), u))
            .collect();
        Self {
            users: Mutex::new(users),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_login(&self, login: &str) -> Res<Option<User>> {
        Ok(self.users.lock().await.get(&normalize(login)).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Res<Option<User>> {
        let email = normalize(email);
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn save(&self, user: &User) -> Res<()> {
        self.users
            .lock()
            .await
            .insert(normalize(&user.login), user.clone());
        Ok(())
    }
}

/// JSON file backed store. The whole file is rewritten on every save while the
/// in-process lock is held, so concurrent saves never interleave.
pub struct FileUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileUserStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn load(&self) -> Res<Vec<User>> {
        if !self.path.is_file() {
            return Ok(Vec::new());
        }

        let content = async_fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Store(e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| Error::Store(e.to_string()))
    }

    async fn persist(&self, users: &[User]) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Store(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(users).map_err(|e| Error::Store(e.to_string()))?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| Error::Store(e.to_string()))
    }
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn find_by_login(&self, login: &str) -> Res<Option<User>> {
        let _guard = self.lock.lock().await;
        let login = normalize(login);
        Ok(self.load().await?.into_iter().find(|u| u.login == login))
    }

    async fn find_by_email(&self, email: &str) -> Res<Option<User>> {
        let _guard = self.lock.lock().await;
        let email = normalize(email);
        Ok(self.load().await?.into_iter().find(|u| u.email == email))
    }

    async fn save(&self, user: &User) -> Res<()> {
        let _guard = self.lock.lock().await;
        let mut users = self.load().await?;
        match users.iter_mut().find(|u| u.login == user.login) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        self.persist(&users).await
    }
}
