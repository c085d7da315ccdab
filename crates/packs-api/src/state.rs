//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! - **Pack configurations** — named pack size sets, one of which may be the
//!   default used when a calculation request carries no sizes.
//! - **Calculator** — the solver behind a `PackCalculator` trait object.
//! - **Buffer pool** — the solver's scratch table pool, kept here so the
//!   metrics endpoint can report its counters.
//! - **Configuration** — port, optional bearer token, and input limits.
//! - **Readiness** — serving lifecycle reported by `/health/readiness`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use packs_core::{DpBufferPool, Limits, PackCalculator, PackSizeSet, PackSolver};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::middleware::metrics::ApiMetrics;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not `tokio::sync`)
/// because the lock is never held across `.await` points.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Run a closure over every record under a single write lock.
    ///
    /// Used for changes that span records, such as moving the default flag.
    pub fn write_all<R>(&self, f: impl FnOnce(&mut HashMap<Uuid, T>) -> R) -> R {
        f(&mut self.data.write())
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Pack Configurations ------------------------------------------------------

/// Name of the configuration registered at startup.
pub const STANDARD_CONFIGURATION_NAME: &str = "Standard";

/// Pack sizes of the configuration registered at startup.
pub const STANDARD_PACK_SIZES: [u64; 5] = [250, 500, 1000, 2000, 5000];

/// A named, reusable set of pack sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PackConfigurationRecord {
    pub id: Uuid,
    pub name: String,
    /// Ascending, duplicate-free pack sizes.
    pub pack_sizes: Vec<u64>,
    /// At most one active record carries this flag.
    pub is_default: bool,
    /// `false` once soft-deleted.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PackConfigurationRecord {
    /// The record's sizes as a solver input.
    pub fn pack_size_set(&self) -> PackSizeSet {
        PackSizeSet::from_unsigned(&self.pack_sizes)
    }
}

/// Registry failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No active configuration with this ID.
    #[error("pack configuration {0} not found")]
    NotFound(Uuid),

    /// No active configuration is marked as default.
    #[error("no default pack configuration is set")]
    NoDefault,

    /// The default configuration cannot be deleted.
    #[error("cannot delete the default pack configuration {0}")]
    DeleteDefault(Uuid),
}

/// In-memory pack configuration registry with soft deletion.
#[derive(Debug, Clone, Default)]
pub struct PackConfigurations {
    store: Store<PackConfigurationRecord>,
}

impl PackConfigurations {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, non-default configuration.
    pub fn create(&self, name: String, sizes: PackSizeSet) -> PackConfigurationRecord {
        let now = Utc::now();
        let record = PackConfigurationRecord {
            id: Uuid::new_v4(),
            name,
            pack_sizes: sizes.into(),
            is_default: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(record.id, record.clone());
        record
    }

    /// Register the "Standard" configuration as the default.
    pub fn seed_standard(&self) -> Result<PackConfigurationRecord, RegistryError> {
        let record = self.create(
            STANDARD_CONFIGURATION_NAME.to_string(),
            PackSizeSet::from_unsigned(&STANDARD_PACK_SIZES),
        );
        self.set_default(record.id)
    }

    /// Active configurations: the default first, then newest first.
    pub fn list_active(&self) -> Vec<PackConfigurationRecord> {
        let mut records: Vec<_> = self
            .store
            .list()
            .into_iter()
            .filter(|r| r.is_active)
            .collect();
        records.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then(b.created_at.cmp(&a.created_at))
        });
        records
    }

    /// An active configuration by ID.
    pub fn get_active(&self, id: Uuid) -> Result<PackConfigurationRecord, RegistryError> {
        self.store
            .get(&id)
            .filter(|r| r.is_active)
            .ok_or(RegistryError::NotFound(id))
    }

    /// The active default configuration.
    pub fn default_configuration(&self) -> Result<PackConfigurationRecord, RegistryError> {
        self.store
            .list()
            .into_iter()
            .find(|r| r.is_active && r.is_default)
            .ok_or(RegistryError::NoDefault)
    }

    /// Replace name, sizes and default flag. Setting the flag clears it on
    /// every other record.
    pub fn update(
        &self,
        id: Uuid,
        name: String,
        sizes: PackSizeSet,
        is_default: bool,
    ) -> Result<PackConfigurationRecord, RegistryError> {
        self.store.write_all(|records| {
            if !records.get(&id).is_some_and(|r| r.is_active) {
                return Err(RegistryError::NotFound(id));
            }
            let now = Utc::now();
            if is_default {
                clear_default_except(records, id, now);
            }
            let record = records.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
            record.name = name;
            record.pack_sizes = sizes.into();
            record.is_default = is_default;
            record.updated_at = now;
            Ok(record.clone())
        })
    }

    /// Make an active configuration the default.
    pub fn set_default(&self, id: Uuid) -> Result<PackConfigurationRecord, RegistryError> {
        self.store.write_all(|records| {
            if !records.get(&id).is_some_and(|r| r.is_active) {
                return Err(RegistryError::NotFound(id));
            }
            let now = Utc::now();
            clear_default_except(records, id, now);
            let record = records.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
            record.is_default = true;
            record.updated_at = now;
            Ok(record.clone())
        })
    }

    /// Mark a configuration inactive. The default cannot be deleted.
    pub fn soft_delete(&self, id: Uuid) -> Result<(), RegistryError> {
        self.store.write_all(|records| {
            let record = records
                .get_mut(&id)
                .filter(|r| r.is_active)
                .ok_or(RegistryError::NotFound(id))?;
            if record.is_default {
                return Err(RegistryError::DeleteDefault(id));
            }
            record.is_active = false;
            record.updated_at = Utc::now();
            Ok(())
        })
    }
}

fn clear_default_except(
    records: &mut HashMap<Uuid, PackConfigurationRecord>,
    keep: Uuid,
    now: DateTime<Utc>,
) {
    for other in records.values_mut() {
        if other.id != keep && other.is_default {
            other.is_default = false;
            other.updated_at = now;
        }
    }
}

// -- Configuration ------------------------------------------------------------

/// Environment configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that does not parse.
    #[error("{name} must be {expected}, got {value:?}")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// Ceilings on accepted order quantities and pack sizes.
    pub limits: Limits,
    /// Register the "Standard" default configuration on startup.
    pub seed_default: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("limits", &self.limits)
            .field("seed_default", &self.seed_default)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            limits: Limits::default(),
            seed_default: true,
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `AUTH_TOKEN`, `PACKS_MAX_ORDER_QUANTITY`,
    /// `PACKS_MAX_PACK_SIZE` and `PACKS_SEED_DEFAULT` from the process
    /// environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(v) => parse_var("PORT", v, "a port number")?,
            None => defaults.port,
        };
        let auth_token = lookup("AUTH_TOKEN").filter(|t| !t.is_empty());
        let max_order_quantity = match lookup("PACKS_MAX_ORDER_QUANTITY") {
            Some(v) => parse_var("PACKS_MAX_ORDER_QUANTITY", v, "a non-negative integer")?,
            None => defaults.limits.max_order_quantity,
        };
        let max_pack_size = match lookup("PACKS_MAX_PACK_SIZE") {
            Some(v) => parse_var("PACKS_MAX_PACK_SIZE", v, "a non-negative integer")?,
            None => defaults.limits.max_pack_size,
        };
        let seed_default = match lookup("PACKS_SEED_DEFAULT") {
            Some(v) => parse_bool("PACKS_SEED_DEFAULT", v)?,
            None => defaults.seed_default,
        };

        Ok(Self {
            port,
            auth_token,
            limits: Limits {
                max_order_quantity,
                max_pack_size,
            },
            seed_default,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value,
        expected,
    })
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value,
            expected: "a boolean",
        }),
    }
}

// -- Readiness ----------------------------------------------------------------

/// Whether the service should receive traffic.
///
/// Starts not ready, flips to ready once state construction finishes, and
/// back to not ready when shutdown begins.
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    ready: Arc<AtomicBool>,
}

impl Readiness {
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Stop advertising readiness while in-flight requests drain.
    pub fn mark_draining(&self) {
        self.ready.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

// -- AppState -----------------------------------------------------------------

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub configurations: PackConfigurations,
    pub calculator: Arc<dyn PackCalculator>,
    pub pool: Arc<DpBufferPool>,
    pub metrics: ApiMetrics,
    pub readiness: Readiness,
    pub config: AppConfig,
}

impl AppState {
    /// Create application state with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create application state backed by the process-wide buffer pool.
    pub fn with_config(config: AppConfig) -> Self {
        Self::with_pool(config, DpBufferPool::global())
    }

    /// Create application state backed by a dedicated buffer pool.
    pub fn with_pool(config: AppConfig, pool: Arc<DpBufferPool>) -> Self {
        let configurations = PackConfigurations::new();
        if config.seed_default {
            match configurations.seed_standard() {
                Ok(record) => tracing::info!(
                    id = %record.id,
                    sizes = ?record.pack_sizes,
                    "seeded default pack configuration"
                ),
                Err(err) => tracing::warn!(
                    error = %err,
                    "failed to seed default pack configuration"
                ),
            }
        }
        let readiness = Readiness::default();
        readiness.mark_ready();
        Self {
            configurations,
            calculator: Arc::new(PackSolver::with_pool(Arc::clone(&pool))),
            pool,
            metrics: ApiMetrics::new(),
            readiness,
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(raw: &[i64]) -> PackSizeSet {
        PackSizeSet::normalize(raw)
    }

    // ── Store ───────────────────────────────────────────────────

    #[test]
    fn store_insert_get_list() {
        let store: Store<String> = Store::new();
        let id = Uuid::new_v4();
        assert!(store.is_empty());
        assert!(store.insert(id, "a".to_string()).is_none());
        assert_eq!(store.get(&id).as_deref(), Some("a"));
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_clones_share_data() {
        let store: Store<u32> = Store::new();
        let clone = store.clone();
        clone.insert(Uuid::new_v4(), 7);
        assert_eq!(store.len(), 1);
    }

    // ── Registry ────────────────────────────────────────────────

    #[test]
    fn create_stores_normalized_sizes() {
        let registry = PackConfigurations::new();
        let record = registry.create("Small".into(), sizes(&[500, 250, 250]));
        assert_eq!(record.pack_sizes, vec![250, 500]);
        assert!(record.is_active);
        assert!(!record.is_default);
        assert_eq!(registry.get_active(record.id).unwrap().name, "Small");
    }

    #[test]
    fn seed_registers_standard_default() {
        let registry = PackConfigurations::new();
        let seeded = registry.seed_standard().unwrap();
        let default = registry.default_configuration().unwrap();
        assert_eq!(default.id, seeded.id);
        assert_eq!(default.name, STANDARD_CONFIGURATION_NAME);
        assert_eq!(default.pack_sizes, STANDARD_PACK_SIZES.to_vec());
    }

    fn create_after_tick(registry: &PackConfigurations, name: &str) -> PackConfigurationRecord {
        std::thread::sleep(std::time::Duration::from_millis(2));
        registry.create(name.into(), sizes(&[5]))
    }

    #[test]
    fn list_active_puts_default_first_then_newest() {
        let registry = PackConfigurations::new();
        let alpha = create_after_tick(&registry, "Alpha");
        create_after_tick(&registry, "Bravo");
        create_after_tick(&registry, "Charlie");
        registry.set_default(alpha.id).unwrap();

        let names: Vec<_> = registry
            .list_active()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Charlie", "Bravo"]);
    }

    #[test]
    fn list_active_skips_deleted() {
        let registry = PackConfigurations::new();
        let kept = registry.create("Kept".into(), sizes(&[5]));
        let gone = registry.create("Gone".into(), sizes(&[7]));
        registry.soft_delete(gone.id).unwrap();

        let listed = registry.list_active();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, kept.id);
        assert_eq!(
            registry.get_active(gone.id),
            Err(RegistryError::NotFound(gone.id))
        );
    }

    #[test]
    fn update_with_default_moves_flag() {
        let registry = PackConfigurations::new();
        let standard = registry.seed_standard().unwrap();
        let custom = registry.create("Custom".into(), sizes(&[23, 31, 53]));

        let updated = registry
            .update(custom.id, "Edge".into(), sizes(&[53, 31, 23]), true)
            .unwrap();
        assert!(updated.is_default);
        assert_eq!(updated.name, "Edge");
        assert_eq!(updated.pack_sizes, vec![23, 31, 53]);
        assert!(!registry.get_active(standard.id).unwrap().is_default);
        assert_eq!(registry.default_configuration().unwrap().id, custom.id);
    }

    #[test]
    fn update_missing_or_deleted_is_not_found() {
        let registry = PackConfigurations::new();
        let missing = Uuid::new_v4();
        assert_eq!(
            registry.update(missing, "x".into(), sizes(&[1]), false),
            Err(RegistryError::NotFound(missing))
        );
        let gone = registry.create("Gone".into(), sizes(&[1]));
        registry.soft_delete(gone.id).unwrap();
        assert!(registry.update(gone.id, "x".into(), sizes(&[1]), true).is_err());
        assert!(registry.set_default(gone.id).is_err());
    }

    #[test]
    fn default_cannot_be_deleted() {
        let registry = PackConfigurations::new();
        let standard = registry.seed_standard().unwrap();
        assert_eq!(
            registry.soft_delete(standard.id),
            Err(RegistryError::DeleteDefault(standard.id))
        );
        assert!(registry.get_active(standard.id).is_ok());
    }

    #[test]
    fn deleting_twice_is_not_found() {
        let registry = PackConfigurations::new();
        let record = registry.create("Once".into(), sizes(&[1]));
        registry.soft_delete(record.id).unwrap();
        assert_eq!(
            registry.soft_delete(record.id),
            Err(RegistryError::NotFound(record.id))
        );
    }

    #[test]
    fn empty_registry_has_no_default() {
        assert_eq!(
            PackConfigurations::new().default_configuration(),
            Err(RegistryError::NoDefault)
        );
    }

    // ── Configuration ───────────────────────────────────────────

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn config_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.auth_token.is_none());
        assert_eq!(config.limits, Limits::default());
        assert!(config.seed_default);
    }

    #[test]
    fn config_reads_every_variable() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "9090"),
            ("AUTH_TOKEN", "secret"),
            ("PACKS_MAX_ORDER_QUANTITY", "5000"),
            ("PACKS_MAX_PACK_SIZE", "100"),
            ("PACKS_SEED_DEFAULT", "false"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.limits.max_order_quantity, 5000);
        assert_eq!(config.limits.max_pack_size, 100);
        assert!(!config.seed_default);
    }

    #[test]
    fn config_rejects_bad_values() {
        let parse = |vars: &[(&str, &str)]| AppConfig::from_lookup(lookup(vars));
        let err = parse(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(parse(&[("PACKS_SEED_DEFAULT", "maybe")]).is_err());
        assert!(parse(&[("PACKS_MAX_PACK_SIZE", "-1")]).is_err());
    }

    #[test]
    fn empty_auth_token_disables_auth() {
        let config = AppConfig::from_lookup(lookup(&[("AUTH_TOKEN", "")])).unwrap();
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn config_debug_redacts_token() {
        let config = AppConfig {
            auth_token: Some("super-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    // ── AppState ────────────────────────────────────────────────

    #[test]
    fn state_seeds_default_unless_disabled() {
        let seeded = AppState::new();
        assert!(seeded.configurations.default_configuration().is_ok());

        let bare = AppState::with_config(AppConfig {
            seed_default: false,
            ..AppConfig::default()
        });
        assert!(bare.configurations.list_active().is_empty());
    }

    #[test]
    fn state_is_ready_until_draining() {
        let state = AppState::new();
        assert!(state.readiness.is_ready());
        let shared = state.clone();
        shared.readiness.mark_draining();
        assert!(!state.readiness.is_ready());
    }

    #[test]
    fn readiness_starts_not_ready() {
        let readiness = Readiness::default();
        assert!(!readiness.is_ready());
        readiness.mark_ready();
        assert!(readiness.is_ready());
    }
}
