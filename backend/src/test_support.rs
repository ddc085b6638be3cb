//! In-memory port implementations for tests.
//!
//! These fakes honour the same contracts the Diesel adapters do, so
//! handler and service tests exercise real ordering, conflict, and
//! attempt-counting behaviour without a database. Enabled through the
//! `test-support` feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    CompanyListFilter, CompanyRepository, GuideRepository, LoginService, ObjectKey, ObjectStore,
    ObjectStoreError, PersistenceError, ProductListFilter, ProductRepository, TastingListFilter,
    TastingRepository, UserListFilter, UserRepository, VerificationCodeRepository,
};
use crate::domain::user::UserId;
use crate::domain::verification::MAX_TRIES;
use crate::domain::{
    Company, EmailAddress, Error, Guide, LoginCredentials, PasswordHash, Product, Tasting, User,
    UserStatus, VerificationCode,
};
use pagination::PageRequest;

fn window<T: Clone>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

fn lock<'a, T>(store: &'a Mutex<T>) -> MutexGuard<'a, T> {
    store.lock().expect("test store poisoned")
}

/// In-memory [`UserRepository`] keeping credential hashes alongside users.
#[derive(Default)]
pub struct InMemoryUsers {
    store: Mutex<Vec<(User, PasswordHash)>>,
}

impl InMemoryUsers {
    /// Stored credential hash for an email, used by the login fake.
    pub fn password_hash(&self, email: &EmailAddress) -> Option<PasswordHash> {
        lock(&self.store)
            .iter()
            .find(|(user, _)| user.email() == email)
            .map(|(_, hash)| hash.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, user: &User, password: &PasswordHash) -> Result<(), PersistenceError> {
        let mut guard = lock(&self.store);
        if guard.iter().any(|(existing, _)| existing.email() == user.email()) {
            return Err(PersistenceError::conflict("users_email_key"));
        }
        guard.push((user.clone(), password.clone()));
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<bool, PersistenceError> {
        let mut guard = lock(&self.store);
        match guard.iter_mut().find(|(existing, _)| existing.id() == user.id()) {
            Some((existing, _)) => {
                *existing = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, PersistenceError> {
        Ok(lock(&self.store)
            .iter()
            .find(|(user, _)| user.id() == id)
            .map(|(user, _)| user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, PersistenceError> {
        Ok(lock(&self.store)
            .iter()
            .find(|(user, _)| user.email() == email)
            .map(|(user, _)| user.clone()))
    }

    async fn list(
        &self,
        filter: &UserListFilter,
        page: PageRequest,
    ) -> Result<Vec<User>, PersistenceError> {
        let mut users: Vec<User> = lock(&self.store)
            .iter()
            .map(|(user, _)| user.clone())
            .filter(|user| filter.role.is_none_or(|role| user.role() == role))
            .filter(|user| filter.status.is_none_or(|status| user.status() == status))
            .collect();
        users.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(window(users, page))
    }
}

/// Login fake verifying credentials against [`InMemoryUsers`].
pub struct InMemoryLogin {
    users: Arc<InMemoryUsers>,
}

impl InMemoryLogin {
    /// Wrap a user store so logins resolve against its contents.
    pub fn new(users: Arc<InMemoryUsers>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl LoginService for InMemoryLogin {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let user = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(|err| Error::internal(err.to_string()))?
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?;
        let hash = self
            .users
            .password_hash(credentials.email())
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?;
        if !hash.verify(credentials.password()) {
            return Err(Error::unauthorized("invalid credentials"));
        }
        if user.status() == UserStatus::Archived {
            return Err(Error::unauthorized("invalid credentials"));
        }
        Ok(user)
    }
}

/// In-memory [`CompanyRepository`].
#[derive(Default)]
pub struct InMemoryCompanies {
    store: Mutex<Vec<Company>>,
}

#[async_trait]
impl CompanyRepository for InMemoryCompanies {
    async fn insert(&self, company: &Company) -> Result<(), PersistenceError> {
        let mut guard = lock(&self.store);
        if guard.iter().any(|existing| existing.name == company.name) {
            return Err(PersistenceError::conflict("companies_name_key"));
        }
        guard.push(company.clone());
        Ok(())
    }

    async fn update(&self, company: &Company) -> Result<bool, PersistenceError> {
        let mut guard = lock(&self.store);
        match guard.iter_mut().find(|existing| existing.id == company.id) {
            Some(existing) => {
                *existing = company.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, PersistenceError> {
        Ok(lock(&self.store)
            .iter()
            .find(|company| company.id == id)
            .cloned())
    }

    async fn list(
        &self,
        filter: &CompanyListFilter,
        page: PageRequest,
    ) -> Result<Vec<Company>, PersistenceError> {
        let mut companies: Vec<Company> = lock(&self.store)
            .iter()
            .filter(|company| filter.status.is_none_or(|status| company.status == status))
            .cloned()
            .collect();
        companies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(window(companies, page))
    }
}

/// In-memory [`ProductRepository`].
#[derive(Default)]
pub struct InMemoryProducts {
    store: Mutex<Vec<Product>>,
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn insert(&self, product: &Product) -> Result<(), PersistenceError> {
        lock(&self.store).push(product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, PersistenceError> {
        let mut guard = lock(&self.store);
        match guard.iter_mut().find(|existing| existing.id == product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, PersistenceError> {
        Ok(lock(&self.store)
            .iter()
            .find(|product| product.id == id)
            .cloned())
    }

    async fn list(
        &self,
        filter: &ProductListFilter,
        page: PageRequest,
    ) -> Result<Vec<Product>, PersistenceError> {
        let mut products: Vec<Product> = lock(&self.store)
            .iter()
            .filter(|product| {
                filter
                    .company_id
                    .is_none_or(|company| product.company_id == company)
            })
            .filter(|product| filter.status.is_none_or(|status| product.status == status))
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(window(products, page))
    }
}

/// In-memory [`TastingRepository`].
#[derive(Default)]
pub struct InMemoryTastings {
    store: Mutex<Vec<Tasting>>,
}

#[async_trait]
impl TastingRepository for InMemoryTastings {
    async fn insert(&self, tasting: &Tasting) -> Result<(), PersistenceError> {
        lock(&self.store).push(tasting.clone());
        Ok(())
    }

    async fn update(&self, tasting: &Tasting) -> Result<bool, PersistenceError> {
        let mut guard = lock(&self.store);
        match guard.iter_mut().find(|existing| existing.id == tasting.id) {
            Some(existing) => {
                *existing = tasting.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tasting>, PersistenceError> {
        Ok(lock(&self.store)
            .iter()
            .find(|tasting| tasting.id == id)
            .cloned())
    }

    async fn list(
        &self,
        filter: &TastingListFilter,
        page: PageRequest,
    ) -> Result<Vec<Tasting>, PersistenceError> {
        let mut tastings: Vec<Tasting> = lock(&self.store)
            .iter()
            .filter(|tasting| {
                filter
                    .company_id
                    .is_none_or(|company| tasting.company_id == company)
            })
            .filter(|tasting| {
                filter
                    .promoter_id
                    .is_none_or(|promoter| tasting.promoter_id == Some(promoter))
            })
            .filter(|tasting| filter.status.is_none_or(|status| tasting.status == status))
            .cloned()
            .collect();
        tastings.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
        Ok(window(tastings, page))
    }
}

/// In-memory [`GuideRepository`].
#[derive(Default)]
pub struct InMemoryGuides {
    store: Mutex<Vec<Guide>>,
}

#[async_trait]
impl GuideRepository for InMemoryGuides {
    async fn upsert(&self, guide: &Guide) -> Result<(), PersistenceError> {
        let mut guard = lock(&self.store);
        guard.retain(|existing| existing.tasting_id != guide.tasting_id);
        guard.push(guide.clone());
        Ok(())
    }

    async fn find_by_tasting(
        &self,
        tasting_id: Uuid,
    ) -> Result<Option<Guide>, PersistenceError> {
        Ok(lock(&self.store)
            .iter()
            .find(|guide| guide.tasting_id == tasting_id)
            .cloned())
    }

    async fn delete_by_tasting(&self, tasting_id: Uuid) -> Result<bool, PersistenceError> {
        let mut guard = lock(&self.store);
        let before = guard.len();
        guard.retain(|guide| guide.tasting_id != tasting_id);
        Ok(guard.len() < before)
    }
}

/// In-memory [`VerificationCodeRepository`] with the same conditional
/// attempt counting as the Diesel adapter.
#[derive(Default)]
pub struct InMemoryVerificationCodes {
    store: Mutex<Vec<VerificationCode>>,
}

#[async_trait]
impl VerificationCodeRepository for InMemoryVerificationCodes {
    async fn put(&self, code: &VerificationCode) -> Result<(), PersistenceError> {
        let mut guard = lock(&self.store);
        guard.retain(|existing| existing.email != code.email || existing.consumed_at.is_some());
        guard.push(code.clone());
        Ok(())
    }

    async fn find_latest_unconsumed(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<VerificationCode>, PersistenceError> {
        Ok(lock(&self.store)
            .iter()
            .filter(|code| &code.email == email && code.consumed_at.is_none())
            .max_by_key(|code| code.created_at)
            .cloned())
    }

    async fn record_failed_attempt(&self, id: Uuid) -> Result<Option<i16>, PersistenceError> {
        Ok(lock(&self.store)
            .iter_mut()
            .find(|code| code.id == id && code.consumed_at.is_none() && code.tries < MAX_TRIES)
            .map(|code| {
                code.tries += 1;
                code.tries
            }))
    }

    async fn consume(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, PersistenceError> {
        Ok(lock(&self.store)
            .iter_mut()
            .find(|code| code.id == id && code.consumed_at.is_none() && code.tries < MAX_TRIES)
            .map(|code| {
                code.consumed_at = Some(now);
            })
            .is_some())
    }
}

/// Directory-backed object store rooted in a fresh temp dir, plus the
/// guard keeping the directory alive for the test's duration.
pub fn temp_dir_store() -> (crate::outbound::storage::DirStore, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let dir = cap_std::fs::Dir::open_ambient_dir(tmp.path(), cap_std::ambient_authority())
        .expect("open temp dir");
    (crate::outbound::storage::DirStore::new(dir), tmp)
}

/// In-memory [`ObjectStore`] holding blobs in a map.
#[derive(Default)]
pub struct InMemoryObjects {
    store: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ObjectStore for InMemoryObjects {
    async fn put(&self, key: &ObjectKey, bytes: &[u8]) -> Result<(), ObjectStoreError> {
        lock(&self.store).insert(key.as_str().to_owned(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &ObjectKey) -> Result<Vec<u8>, ObjectStoreError> {
        lock(&self.store)
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| ObjectStoreError::not_found(key.as_str()))
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, ObjectStoreError> {
        Ok(lock(&self.store).remove(key.as_str()).is_some())
    }
}
