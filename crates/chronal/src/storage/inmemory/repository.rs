//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use chronal_core::calendar::{Calendar, CalendarAccess, CalendarRole, User};
use chronal_core::storage::{
    AccessRepository, CalendarRepository, RepositoryError, Result, UserRepository,
};

/// In-memory storage backend.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
///
/// Operations that touch both maps always lock `calendars` before `access`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    calendars: Arc<RwLock<HashMap<Uuid, Calendar>>>,
    access: Arc<RwLock<HashMap<Uuid, CalendarAccess>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_creation<T, F>(mut items: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    items.sort_by_key(|item| created_at(item));
    items
}

/// Whether another calendar of the same owner already uses this title.
fn title_taken(calendars: &HashMap<Uuid, Calendar>, calendar: &Calendar) -> bool {
    let title = calendar.title.trim();
    calendars.values().any(|c| {
        c.owner_id == calendar.owner_id && c.id != calendar.id && c.title.trim() == title
    })
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(sorted_by_creation(
            users.values().cloned().collect(),
            |u| u.created_at,
        ))
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(RepositoryError::already_exists("User", user.id));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::already_exists("User", &user.email));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(RepositoryError::not_found("User", user.id));
        }
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(RepositoryError::already_exists("User", &user.email));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl CalendarRepository for InMemoryRepository {
    async fn get_calendar(&self, id: Uuid) -> Result<Option<Calendar>> {
        let calendars = self.calendars.read().await;
        Ok(calendars.get(&id).cloned())
    }

    async fn list_calendars(&self) -> Result<Vec<Calendar>> {
        let calendars = self.calendars.read().await;
        Ok(sorted_by_creation(
            calendars.values().cloned().collect(),
            |c| c.created_at,
        ))
    }

    async fn get_calendars_by_owner(&self, owner_id: Uuid) -> Result<Vec<Calendar>> {
        let calendars = self.calendars.read().await;
        Ok(sorted_by_creation(
            calendars
                .values()
                .filter(|c| c.owner_id == owner_id)
                .cloned()
                .collect(),
            |c| c.created_at,
        ))
    }

    async fn create_calendar(&self, calendar: &Calendar, owner: &CalendarAccess) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        let mut access = self.access.write().await;

        if calendars.contains_key(&calendar.id) {
            return Err(RepositoryError::already_exists("Calendar", calendar.id));
        }
        if access.contains_key(&owner.id) {
            return Err(RepositoryError::already_exists("CalendarAccess", owner.id));
        }
        if owner.calendar_id != calendar.id {
            return Err(RepositoryError::InvalidData(
                "Owner grant does not belong to the calendar".to_string(),
            ));
        }
        if title_taken(&calendars, calendar) {
            return Err(RepositoryError::already_exists("Calendar", &calendar.title));
        }

        calendars.insert(calendar.id, calendar.clone());
        access.insert(owner.id, owner.clone());
        Ok(())
    }

    async fn update_calendar(&self, calendar: &Calendar) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        if !calendars.contains_key(&calendar.id) {
            return Err(RepositoryError::not_found("Calendar", calendar.id));
        }
        if title_taken(&calendars, calendar) {
            return Err(RepositoryError::already_exists("Calendar", &calendar.title));
        }
        calendars.insert(calendar.id, calendar.clone());
        Ok(())
    }

    async fn delete_calendar(&self, id: Uuid) -> Result<()> {
        let mut calendars = self.calendars.write().await;
        let mut access = self.access.write().await;

        if calendars.remove(&id).is_none() {
            return Err(RepositoryError::not_found("Calendar", id));
        }
        access.retain(|_, a| a.calendar_id != id);
        Ok(())
    }
}

#[async_trait]
impl AccessRepository for InMemoryRepository {
    async fn get_access(&self, id: Uuid) -> Result<Option<CalendarAccess>> {
        let access = self.access.read().await;
        Ok(access.get(&id).cloned())
    }

    async fn get_access_for_user(
        &self,
        calendar_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CalendarAccess>> {
        let access = self.access.read().await;
        Ok(access
            .values()
            .find(|a| a.calendar_id == calendar_id && a.user_id == user_id)
            .cloned())
    }

    async fn list_access(&self) -> Result<Vec<CalendarAccess>> {
        let access = self.access.read().await;
        Ok(sorted_by_creation(
            access.values().cloned().collect(),
            |a| a.created_at,
        ))
    }

    async fn list_access_for_calendar(&self, calendar_id: Uuid) -> Result<Vec<CalendarAccess>> {
        let access = self.access.read().await;
        Ok(sorted_by_creation(
            access
                .values()
                .filter(|a| a.calendar_id == calendar_id)
                .cloned()
                .collect(),
            |a| a.created_at,
        ))
    }

    async fn list_access_for_user(&self, user_id: Uuid) -> Result<Vec<CalendarAccess>> {
        let access = self.access.read().await;
        Ok(sorted_by_creation(
            access
                .values()
                .filter(|a| a.user_id == user_id)
                .cloned()
                .collect(),
            |a| a.created_at,
        ))
    }

    async fn get_calendars_for_user(&self, user_id: Uuid) -> Result<Vec<(Calendar, CalendarRole)>> {
        let calendars = self.calendars.read().await;
        let access = self.access.read().await;

        let mut result: Vec<(Calendar, CalendarRole)> = access
            .values()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| calendars.get(&a.calendar_id).map(|c| (c.clone(), a.role)))
            .collect();
        result.sort_by_key(|(c, _)| c.created_at);
        Ok(result)
    }

    async fn create_access(&self, grant: &CalendarAccess) -> Result<()> {
        let calendars = self.calendars.read().await;
        let mut access = self.access.write().await;

        if !calendars.contains_key(&grant.calendar_id) {
            return Err(RepositoryError::InvalidData(format!(
                "Calendar {} does not exist",
                grant.calendar_id
            )));
        }
        if access.contains_key(&grant.id)
            || access
                .values()
                .any(|a| a.calendar_id == grant.calendar_id && a.user_id == grant.user_id)
        {
            return Err(RepositoryError::already_exists("CalendarAccess", grant.id));
        }
        access.insert(grant.id, grant.clone());
        Ok(())
    }

    async fn update_access(&self, grant: &CalendarAccess) -> Result<()> {
        let mut access = self.access.write().await;
        if !access.contains_key(&grant.id) {
            return Err(RepositoryError::not_found("CalendarAccess", grant.id));
        }
        access.insert(grant.id, grant.clone());
        Ok(())
    }

    async fn delete_access(&self, id: Uuid) -> Result<()> {
        let mut access = self.access.write().await;
        if access.remove(&id).is_none() {
            return Err(RepositoryError::not_found("CalendarAccess", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User::new(email, "test", "hash")
    }

    async fn with_calendar(repo: &InMemoryRepository, owner: &User, title: &str) -> Calendar {
        let calendar = Calendar::new(owner.id, title);
        let access = CalendarAccess::owner(&calendar);
        repo.create_calendar(&calendar, &access).await.unwrap();
        calendar
    }

    #[tokio::test]
    async fn test_user_create_and_get() {
        let repo = InMemoryRepository::new();
        let alice = user("Alice@Example.com");
        repo.create_user(&alice).await.unwrap();

        assert_eq!(repo.get_user(alice.id).await.unwrap(), Some(alice.clone()));
        assert_eq!(
            repo.get_user_by_email("ALICE@example.com").await.unwrap(),
            Some(alice)
        );
    }

    #[tokio::test]
    async fn test_user_duplicate_email_rejected() {
        let repo = InMemoryRepository::new();
        repo.create_user(&user("bob@example.com")).await.unwrap();

        let result = repo.create_user(&user("BOB@example.com")).await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_user_update_nonexistent() {
        let repo = InMemoryRepository::new();
        let result = repo.update_user(&user("carol@example.com")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_calendar_stores_owner_grant() {
        let repo = InMemoryRepository::new();
        let owner = user("dave@example.com");
        let calendar = with_calendar(&repo, &owner, "Work").await;

        let grant = repo
            .get_access_for_user(calendar.id, owner.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(grant.role, CalendarRole::Owner);
        assert_eq!(grant.created_by, Some(owner.id));

        let mine = repo.get_calendars_for_user(owner.id).await.unwrap();
        assert_eq!(mine, vec![(calendar, CalendarRole::Owner)]);
    }

    #[tokio::test]
    async fn test_create_calendar_rejects_mismatched_owner_grant() {
        let repo = InMemoryRepository::new();
        let owner = user("erin@example.com");
        let calendar = Calendar::new(owner.id, "Work");
        let other = Calendar::new(owner.id, "Other");

        let result = repo
            .create_calendar(&calendar, &CalendarAccess::owner(&other))
            .await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
        assert!(repo.get_calendar(calendar.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_calendars_by_owner() {
        let repo = InMemoryRepository::new();
        let frank = user("frank@example.com");
        let grace = user("grace@example.com");
        with_calendar(&repo, &frank, "One").await;
        with_calendar(&repo, &frank, "Two").await;
        with_calendar(&repo, &grace, "Three").await;

        let owned = repo.get_calendars_by_owner(frank.id).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|c| c.owner_id == frank.id));
        assert_eq!(repo.list_calendars().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_calendar_title_unique_per_owner() {
        let repo = InMemoryRepository::new();
        let owner = user("kate@example.com");
        let other = user("liam@example.com");
        with_calendar(&repo, &owner, "Work").await;
        let mut home = with_calendar(&repo, &owner, "Home").await;
        with_calendar(&repo, &other, "Work").await;

        let duplicate = Calendar::new(owner.id, "Work");
        let result = repo
            .create_calendar(&duplicate, &CalendarAccess::owner(&duplicate))
            .await;
        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
        assert!(repo.get_calendar(duplicate.id).await.unwrap().is_none());
        assert!(repo
            .get_access_for_user(duplicate.id, owner.id)
            .await
            .unwrap()
            .is_none());

        home.title = "Work".to_string();
        assert!(matches!(
            repo.update_calendar(&home).await,
            Err(RepositoryError::AlreadyExists { .. })
        ));

        // Keeping its own title is fine.
        home.title = "Home".to_string();
        home.description = Some("Chores".to_string());
        repo.update_calendar(&home).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_creates_keep_titles_unique() {
        let repo = InMemoryRepository::new();
        let owner = user("mona@example.com");

        let attempts = (0..8).map(|_| {
            let repo = repo.clone();
            let calendar = Calendar::new(owner.id, "Race");
            tokio::spawn(async move {
                repo.create_calendar(&calendar, &CalendarAccess::owner(&calendar))
                    .await
            })
        });
        let mut created = 0;
        for attempt in attempts.collect::<Vec<_>>() {
            if attempt.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(repo.get_calendars_by_owner(owner.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_calendar_update_nonexistent() {
        let repo = InMemoryRepository::new();
        let calendar = Calendar::new(Uuid::new_v4(), "Ghost");
        let result = repo.update_calendar(&calendar).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_calendar_cascades_grants() {
        let repo = InMemoryRepository::new();
        let owner = user("heidi@example.com");
        let guest = user("ivan@example.com");
        let calendar = with_calendar(&repo, &owner, "Family").await;
        let kept = with_calendar(&repo, &owner, "Kept").await;
        repo.create_access(&CalendarAccess::new(
            calendar.id,
            guest.id,
            CalendarRole::Guest,
        ))
        .await
        .unwrap();

        repo.delete_calendar(calendar.id).await.unwrap();

        assert!(repo.get_calendar(calendar.id).await.unwrap().is_none());
        assert!(repo
            .list_access_for_calendar(calendar.id)
            .await
            .unwrap()
            .is_empty());
        assert!(repo.list_access_for_user(guest.id).await.unwrap().is_empty());
        assert_eq!(repo.list_access_for_calendar(kept.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_calendar_nonexistent() {
        let repo = InMemoryRepository::new();
        let result = repo.delete_calendar(Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_access_rejects_second_grant_for_user() {
        let repo = InMemoryRepository::new();
        let owner = user("judy@example.com");
        let guest = user("mallory@example.com");
        let calendar = with_calendar(&repo, &owner, "Shared").await;

        repo.create_access(&CalendarAccess::new(
            calendar.id,
            guest.id,
            CalendarRole::Guest,
        ))
        .await
        .unwrap();
        let result = repo
            .create_access(&CalendarAccess::new(
                calendar.id,
                guest.id,
                CalendarRole::Standard,
            ))
            .await;

        assert!(matches!(result, Err(RepositoryError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_create_access_requires_calendar() {
        let repo = InMemoryRepository::new();
        let grant = CalendarAccess::new(Uuid::new_v4(), Uuid::new_v4(), CalendarRole::Guest);
        let result = repo.create_access(&grant).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete_access() {
        let repo = InMemoryRepository::new();
        let owner = user("niaj@example.com");
        let member = user("olivia@example.com");
        let calendar = with_calendar(&repo, &owner, "Team").await;
        let mut grant = CalendarAccess::new(calendar.id, member.id, CalendarRole::Guest);
        repo.create_access(&grant).await.unwrap();

        grant.role = CalendarRole::Moderator;
        repo.update_access(&grant).await.unwrap();
        assert_eq!(
            repo.get_access(grant.id).await.unwrap().unwrap().role,
            CalendarRole::Moderator
        );

        repo.delete_access(grant.id).await.unwrap();
        assert!(repo.get_access(grant.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete_access(grant.id).await,
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
