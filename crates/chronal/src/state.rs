use std::sync::Arc;

use chrono::Utc;
use tokio::{sync::broadcast, task::JoinHandle};

use chronal_auth::{hash_password_blocking, AuthConfig, AuthState};
use chronal_core::auth::{email_to_name, validate_email, AccessTokenRepository};
use chronal_core::calendar::User;
use chronal_core::storage::{AccessRepository, CalendarRepository, UserRepository};

use crate::config::{Config, SuperuserSeed};

// ============================================================================
// Compile-time feature validation
// ============================================================================

#[cfg(all(feature = "sqlite", feature = "inmemory"))]
compile_error!(
    "Cannot enable both 'sqlite' and 'inmemory' storage features. \
    Example: cargo build -p chronal --no-default-features --features sqlite"
);

#[cfg(not(any(feature = "inmemory", feature = "sqlite")))]
compile_error!("Must enable exactly one storage feature: 'inmemory' or 'sqlite'");

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub calendars: Arc<dyn CalendarRepository>,
    pub access: Arc<dyn AccessRepository>,
    pub auth: AuthState,
    pub config: Arc<Config>,
    /// Broadcast channel for graceful shutdown of background tasks.
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

impl AppState {
    /// Wires repositories into a state. The auth layer shares the user repository.
    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        calendars: Arc<dyn CalendarRepository>,
        access: Arc<dyn AccessRepository>,
        tokens: Arc<dyn AccessTokenRepository>,
        config: Config,
        auth_config: AuthConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let auth = AuthState::new(tokens, users.clone(), auth_config);

        Self {
            users,
            calendars,
            access,
            auth,
            config: Arc::new(config),
            shutdown_tx,
        }
    }

    /// Creates the superuser from `seed`, or promotes the existing account
    /// with that email. The password of an existing account is left alone.
    pub async fn seed_superuser(&self, seed: &SuperuserSeed) -> anyhow::Result<User> {
        let email = validate_email(&seed.email)?;

        match self.users.get_user_by_email(&email).await? {
            Some(user) if user.is_superuser => {
                tracing::debug!(user_id = %user.id, "Superuser already present");
                Ok(user)
            }
            Some(mut user) => {
                user.is_superuser = true;
                user.updated_at = Utc::now();
                self.users.update_user(&user).await?;
                tracing::info!(user_id = %user.id, "Promoted existing user to superuser");
                Ok(user)
            }
            None => {
                let password_hash = hash_password_blocking(seed.password.clone()).await?;
                let name = email_to_name(&email);
                let user = User::new(email, name, password_hash).with_superuser(true);
                self.users.create_user(&user).await?;
                tracing::info!(user_id = %user.id, "Created superuser");
                Ok(user)
            }
        }
    }

    /// Spawns the task that deletes expired tokens every
    /// `token_purge_interval`, until shutdown is signalled.
    pub fn spawn_token_purge(&self) -> JoinHandle<()> {
        let tokens = self.auth.tokens.clone();
        let period = self.config.token_purge_interval();
        let mut shutdown_rx = self.subscribe_shutdown();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            tracing::debug!(interval_secs = period.as_secs(), "Token purge task started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match tokens.purge_expired(Utc::now()).await {
                            Ok(0) => {}
                            Ok(purged) => tracing::info!(purged, "Purged expired tokens"),
                            Err(e) => tracing::error!(error = %e, "Failed to purge expired tokens"),
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::debug!("Token purge task shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Subscribe to shutdown signal.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal shutdown to all background tasks.
    pub fn signal_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

// ============================================================================
// Factory functions for each storage backend
// ============================================================================

#[cfg(any(feature = "inmemory", test))]
mod inmemory {
    use super::*;
    use crate::storage::InMemoryRepository;
    use chronal_auth::InMemoryTokenStore;

    impl AppState {
        /// Creates AppState with in-memory storage. Nothing survives a restart.
        #[cfg_attr(not(feature = "inmemory"), allow(dead_code))]
        pub fn in_memory(config: Config, auth_config: AuthConfig) -> Self {
            let repo = Arc::new(InMemoryRepository::new());
            Self::from_parts(
                repo.clone(),
                repo.clone(),
                repo,
                Arc::new(InMemoryTokenStore::new()),
                config,
                auth_config,
            )
        }
    }

    #[cfg(feature = "inmemory")]
    impl AppState {
        pub async fn new(config: Config, auth_config: AuthConfig) -> Result<Self, anyhow::Error> {
            Ok(Self::in_memory(config, auth_config))
        }
    }
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use crate::storage::SqliteRepository;
    use chronal_auth::SqliteTokenStore;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    impl AppState {
        /// Creates AppState with SQLite storage. Repositories and tokens share
        /// the database file at `config.sqlite_path`.
        pub async fn new(config: Config, auth_config: AuthConfig) -> Result<Self, anyhow::Error> {
            let repo = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);

            let pool = SqlitePoolOptions::new()
                .connect_with(
                    SqliteConnectOptions::new()
                        .filename(&config.sqlite_path)
                        .create_if_missing(true),
                )
                .await?;
            let tokens = SqliteTokenStore::new(pool);
            tokens.migrate().await?;

            tracing::info!(path = %config.sqlite_path, "Opened SQLite storage");

            Ok(Self::from_parts(
                repo.clone(),
                repo.clone(),
                repo,
                Arc::new(tokens),
                config,
                auth_config,
            ))
        }
    }
}
