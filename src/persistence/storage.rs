//! Storage gateway
//!
//! Every public call is best effort: failures are logged at `warn` and the
//! caller gets a default (or `false`).

use chrono::{NaiveDate, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use super::PersistenceError;
use super::store::KeyValueStore;
use crate::settings::Settings;
use crate::stats::{RunSummary, Stats, StatsPatch};

pub mod keys {
    pub const BEST_SCORE: &str = "stack_crane_best_score";
    pub const SETTINGS: &str = "stack_crane_settings";
    pub const STATS: &str = "stack_crane_stats";
    pub const DAILY_SEED: &str = "stack_crane_daily_seed";

    pub const ALL: [&str; 4] = [BEST_SCORE, SETTINGS, STATS, DAILY_SEED];
}

/// Daily seeds are drawn from `[0, DAILY_SEED_RANGE)`
pub const DAILY_SEED_RANGE: u32 = 1_000_000;

const PROBE_KEY: &str = "stack_crane_probe";

/// Seed shared by every run on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySeed {
    pub date: NaiveDate,
    pub seed: u32,
}

/// Everything the player can carry to another device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBlob {
    #[serde(default)]
    pub best_score: Option<u64>,
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub stats: Option<Stats>,
    /// RFC 3339 timestamp
    #[serde(default)]
    pub export_date: String,
}

pub struct Storage {
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Browser local storage, falling back to a throwaway in-memory store
    #[cfg(target_arch = "wasm32")]
    pub fn browser() -> Self {
        match super::store::LocalStore::open() {
            Ok(store) => Self::new(store),
            Err(e) => {
                log::warn!("Local storage unavailable, progress will not be saved: {}", e);
                Self::new(super::store::MemoryStore::new())
            }
        }
    }

    /// Whether a write/remove round trip currently succeeds
    pub fn is_available(&self) -> bool {
        self.store.set(PROBE_KEY, PROBE_KEY).is_ok() && self.store.remove(PROBE_KEY).is_ok()
    }

    pub fn best_score(&self) -> u64 {
        self.try_best_score()
            .unwrap_or_else(|e| warn_default("read best score", e))
    }

    pub fn set_best_score(&self, score: u64) {
        match self.store.set(keys::BEST_SCORE, &score.to_string()) {
            Ok(()) => log::info!("Best score saved: {}", score),
            Err(e) => log::warn!("Failed to save best score: {}", e),
        }
    }

    /// Stored settings, `None` when nothing has been saved yet
    pub fn settings(&self) -> Option<Settings> {
        self.read_json(keys::SETTINGS)
            .unwrap_or_else(|e| warn_default("read settings", e))
    }

    pub fn set_settings(&self, settings: &Settings) {
        match self.write_json(keys::SETTINGS, settings) {
            Ok(()) => log::info!("Settings saved: {:?}", settings),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }

    pub fn stats(&self) -> Stats {
        self.read_json::<Stats>(keys::STATS)
            .map(Option::unwrap_or_default)
            .unwrap_or_else(|e| warn_default("read stats", e))
    }

    /// Merge a partial update over the stored record; returns the merged record
    pub fn update_stats(&self, patch: StatsPatch) -> Stats {
        let mut stats = self.stats();
        stats.apply(patch);
        if let Err(e) = self.write_json(keys::STATS, &stats) {
            log::warn!("Failed to save stats: {}", e);
        }
        stats
    }

    /// Fold one finished run into the stored stats
    pub fn record_run(&self, run: RunSummary) -> Stats {
        let stats = self.stats().with_run(run);
        self.update_stats(stats.into())
    }

    /// Today's (UTC) seed
    pub fn daily_seed(&self) -> u32 {
        self.daily_seed_on(Utc::now().date_naive())
    }

    /// Seed for `date`: reuses the stored one when it was drawn that day,
    /// otherwise draws, stores and returns a fresh one
    pub fn daily_seed_on(&self, date: NaiveDate) -> u32 {
        match self.read_json::<DailySeed>(keys::DAILY_SEED) {
            Ok(Some(stored)) if stored.date == date => return stored.seed,
            Ok(_) => {}
            Err(e) => log::warn!("Failed to read daily seed: {}", e),
        }

        let seed = rand::rng().random_range(0..DAILY_SEED_RANGE);
        match self.write_json(keys::DAILY_SEED, &DailySeed { date, seed }) {
            Ok(()) => log::info!("New daily seed for {}: {}", date, seed),
            Err(e) => log::warn!("Failed to store daily seed: {}", e),
        }
        seed
    }

    /// Remove every key this game owns
    pub fn clear_all(&self) {
        for key in keys::ALL {
            if let Err(e) = self.store.remove(key) {
                log::warn!("Failed to clear {}: {}", key, e);
            }
        }
        log::info!("Stored data cleared");
    }

    /// Snapshot for transfer; `None` when the store cannot be read
    pub fn export_data(&self) -> Option<ExportBlob> {
        self.try_export()
            .map_err(|e| log::warn!("Export failed: {}", e))
            .ok()
    }

    /// Apply the present parts of a blob; `false` when the store rejected it
    pub fn import_data(&self, blob: &ExportBlob) -> bool {
        match self.try_import(blob) {
            Ok(()) => {
                log::info!("Imported data exported at {}", blob.export_date);
                true
            }
            Err(e) => {
                log::warn!("Import failed: {}", e);
                false
            }
        }
    }

    pub fn export_json(&self) -> Option<String> {
        let blob = self.export_data()?;
        serde_json::to_string(&blob)
            .map_err(|e| log::warn!("Export encoding failed: {}", e))
            .ok()
    }

    pub fn import_json(&self, json: &str) -> bool {
        match serde_json::from_str::<ExportBlob>(json) {
            Ok(blob) => self.import_data(&blob),
            Err(e) => {
                log::warn!("Import rejected, malformed data: {}", e);
                false
            }
        }
    }

    fn try_best_score(&self) -> Result<u64, PersistenceError> {
        match self.store.get(keys::BEST_SCORE)? {
            None => Ok(0),
            Some(text) => text.trim().parse().map_err(|_| PersistenceError::Number {
                key: keys::BEST_SCORE,
                value: text,
            }),
        }
    }

    fn try_export(&self) -> Result<ExportBlob, PersistenceError> {
        Ok(ExportBlob {
            best_score: Some(self.try_best_score()?),
            settings: self.read_json(keys::SETTINGS)?,
            stats: Some(self.read_json::<Stats>(keys::STATS)?.unwrap_or_default()),
            export_date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    fn try_import(&self, blob: &ExportBlob) -> Result<(), PersistenceError> {
        if let Some(score) = blob.best_score {
            self.store.set(keys::BEST_SCORE, &score.to_string())?;
        }
        if let Some(settings) = &blob.settings {
            self.write_json(keys::SETTINGS, settings)?;
        }
        if let Some(stats) = &blob.stats {
            self.write_json(keys::STATS, stats)?;
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(
        &self,
        key: &'static str,
    ) -> Result<Option<T>, PersistenceError> {
        match self.store.get(key)? {
            None => Ok(None),
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|source| PersistenceError::Parse { key, source }),
        }
    }

    fn write_json<T: Serialize>(
        &self,
        key: &'static str,
        value: &T,
    ) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(value)
            .map_err(|source| PersistenceError::Encode { key, source })?;
        self.store.set(key, &json)
    }
}

fn warn_default<T: Default>(what: &str, e: PersistenceError) -> T {
    log::warn!("Failed to {}: {}", what, e);
    T::default()
}
