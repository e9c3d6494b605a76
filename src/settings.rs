//! Policy settings: provider abstraction, cached access, and the per-operation
//! policy snapshot

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use crate::types::{CirculationError, CirculationResult};

/// Maximum books a student may have out at once
pub const KEY_MAX_BOOKS_PER_STUDENT: &str = "max_books_per_student";
/// Loan period in days
pub const KEY_BORROWING_PERIOD: &str = "borrowing_period";
/// Fine per chargeable overdue day
pub const KEY_FINE_PER_DAY: &str = "fine_per_day";
/// Days after the due date during which no fine accrues
pub const KEY_GRACE_PERIOD: &str = "grace_period";

const DEFAULT_MAX_BOOKS_PER_STUDENT: u32 = 3;
const DEFAULT_BORROWING_PERIOD_DAYS: i64 = 14;
const DEFAULT_FINE_PER_DAY: &str = "1.00";
const DEFAULT_GRACE_PERIOD_DAYS: i64 = 0;

/// Key-value policy store consumed by the circulation engine
///
/// Backends range from a database settings table to the in-memory
/// [`MemorySettings`] used in tests.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Get a setting value, `None` when the key has never been set
    async fn get(&self, key: &str) -> CirculationResult<Option<String>>;

    /// Set a setting value
    async fn set(&mut self, key: &str, value: &str) -> CirculationResult<()>;
}

/// In-memory settings provider for tests and development
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsProvider for MemorySettings {
    async fn get(&self, key: &str) -> CirculationResult<Option<String>> {
        Ok(self.values.read().unwrap().get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: &str) -> CirculationResult<()> {
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read-through cache over a settings provider
///
/// `set` writes through to the underlying provider and refreshes the cached
/// entry before returning, so a policy change is visible to the very next
/// read; fine and eligibility calculations never observe a stale value.
#[derive(Debug, Clone)]
pub struct CachedSettings<P: SettingsProvider> {
    inner: P,
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl<P: SettingsProvider> CachedSettings<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Drop every cached entry; subsequent reads go to the provider
    pub fn invalidate_all(&self) {
        self.cache.write().unwrap().clear();
    }
}

#[async_trait]
impl<P: SettingsProvider> SettingsProvider for CachedSettings<P> {
    async fn get(&self, key: &str) -> CirculationResult<Option<String>> {
        if let Some(value) = self.cache.read().unwrap().get(key) {
            return Ok(Some(value.clone()));
        }

        let value = self.inner.get(key).await?;
        if let Some(ref v) = value {
            self.cache
                .write()
                .unwrap()
                .insert(key.to_string(), v.clone());
        }
        Ok(value)
    }

    async fn set(&mut self, key: &str, value: &str) -> CirculationResult<()> {
        self.inner.set(key, value).await?;
        // Refresh before returning: the write call must not complete while a
        // stale value is still observable.
        self.cache
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Policy constants for one circulation operation
///
/// Loaded once at the start of an operation so every calculation inside it
/// observes one consistent policy. Missing keys fall back to the centralized
/// defaults; a stored value that fails to parse is a validation error rather
/// than a silent fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CirculationPolicy {
    pub max_books_per_student: u32,
    pub borrowing_period_days: i64,
    pub fine_per_day: BigDecimal,
    pub grace_period_days: i64,
}

impl Default for CirculationPolicy {
    fn default() -> Self {
        Self {
            max_books_per_student: DEFAULT_MAX_BOOKS_PER_STUDENT,
            borrowing_period_days: DEFAULT_BORROWING_PERIOD_DAYS,
            fine_per_day: BigDecimal::from_str(DEFAULT_FINE_PER_DAY)
                .expect("default fine rate is a valid decimal"),
            grace_period_days: DEFAULT_GRACE_PERIOD_DAYS,
        }
    }
}

impl CirculationPolicy {
    /// Load a policy snapshot from the settings provider
    pub async fn load<P: SettingsProvider>(provider: &P) -> CirculationResult<Self> {
        let defaults = Self::default();

        Ok(Self {
            max_books_per_student: parse_or(
                provider.get(KEY_MAX_BOOKS_PER_STUDENT).await?,
                KEY_MAX_BOOKS_PER_STUDENT,
                defaults.max_books_per_student,
            )?,
            borrowing_period_days: parse_or(
                provider.get(KEY_BORROWING_PERIOD).await?,
                KEY_BORROWING_PERIOD,
                defaults.borrowing_period_days,
            )?,
            fine_per_day: parse_or(
                provider.get(KEY_FINE_PER_DAY).await?,
                KEY_FINE_PER_DAY,
                defaults.fine_per_day,
            )?,
            grace_period_days: parse_or(
                provider.get(KEY_GRACE_PERIOD).await?,
                KEY_GRACE_PERIOD,
                defaults.grace_period_days,
            )?,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> CirculationResult<T> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| {
            CirculationError::Validation(format!(
                "Setting '{}' holds unparseable value '{}'",
                key, value
            ))
        }),
    }
}
