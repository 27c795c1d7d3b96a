//! # Alias Registry
//!
//! Owns the alias log and publishes immutable [`NicknameStore`] snapshots.
//!
//! ## Concurrency
//!
//! - One writer at a time: every mutation holds the log mutex for the whole
//!   read-plan-append-publish sequence, so concurrent corrections cannot
//!   lose each other's updates.
//! - Readers call [`AliasRegistry::snapshot`] and keep the `Arc` for as long
//!   as they like; a batch sees one consistent alias state throughout.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use scrub_core::{AliasPolicy, DocumentId, RosterEntry, Timestamp};

use crate::correction::{plan_correction, CorrectionRecord};
use crate::error::AliasError;
use crate::log::{AliasEvent, AliasLog};
use crate::seed::missing_seed_events;
use crate::store::NicknameStore;

/// Single-writer front end to the alias log.
#[derive(Debug)]
pub struct AliasRegistry {
    log: Mutex<AliasLog>,
    current: RwLock<Arc<NicknameStore>>,
    policy: AliasPolicy,
}

impl AliasRegistry {
    /// Wrap an already-loaded log.
    pub fn from_log(log: AliasLog, policy: AliasPolicy) -> Self {
        let store = NicknameStore::replay(log.entries());
        tracing::info!(
            aliases = store.len(),
            corrections = store.corrections().len(),
            "alias registry ready"
        );
        Self {
            log: Mutex::new(log),
            current: RwLock::new(Arc::new(store)),
            policy,
        }
    }

    /// A registry whose log is not persisted.
    pub fn in_memory(policy: AliasPolicy) -> Self {
        Self::from_log(AliasLog::in_memory(), policy)
    }

    /// Open (or create on first write) a file-backed registry.
    ///
    /// # Errors
    ///
    /// Propagates [`AliasLog::open`] failures, including a broken chain.
    pub fn open(path: impl Into<PathBuf>, policy: AliasPolicy) -> Result<Self, AliasError> {
        Ok(Self::from_log(AliasLog::open(path)?, policy))
    }

    /// The current alias state.
    pub fn snapshot(&self) -> Arc<NicknameStore> {
        Arc::clone(&self.current.read())
    }

    /// The confidence policy in force.
    pub fn policy(&self) -> &AliasPolicy {
        &self.policy
    }

    /// Append the built-in nickname table entries the store lacks.
    /// Returns how many were added.
    pub fn seed_defaults(&self) -> Result<usize, AliasError> {
        let mut log = self.log.lock();
        let events = missing_seed_events(&self.snapshot(), self.policy.seeded_confidence);
        let added = events.len();
        if added > 0 {
            self.commit(&mut log, events)?;
            tracing::info!(added, "seed aliases appended");
        }
        Ok(added)
    }

    /// Record a reviewer correction.
    ///
    /// # Errors
    ///
    /// [`AliasError::Rejected`] for an invalid correction (nothing is
    /// written), or a log write failure.
    pub fn record_correction(
        &self,
        document_id: &DocumentId,
        roster_entry: &RosterEntry,
        as_written_name: &str,
    ) -> Result<CorrectionRecord, AliasError> {
        let mut log = self.log.lock();
        let snapshot = self.snapshot();
        let plan = match plan_correction(
            &snapshot,
            &self.policy,
            document_id,
            roster_entry,
            as_written_name,
            Timestamp::now(),
        ) {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!(document_id = %document_id, error = %err, "correction rejected");
                return Err(err.into());
            }
        };
        self.commit(&mut log, plan.events)?;
        tracing::info!(document_id = %document_id, "correction recorded");
        Ok(plan.record)
    }

    /// Flag an alias inactive. Deprecating an already deprecated alias is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// [`AliasError::UnknownAlias`] if no such alias exists.
    pub fn deprecate_alias(
        &self,
        canonical_first: &str,
        alias_token: &str,
        reason: &str,
    ) -> Result<(), AliasError> {
        let mut log = self.log.lock();
        let snapshot = self.snapshot();
        let alias = snapshot
            .get(canonical_first, alias_token)
            .ok_or_else(|| AliasError::UnknownAlias {
                canonical_first: canonical_first.to_string(),
                alias_token: alias_token.to_string(),
            })?;
        if !alias.is_active() {
            return Ok(());
        }
        let event = AliasEvent::AliasDeprecated {
            canonical_first: alias.canonical_first.clone(),
            alias_token: alias.alias_token.clone(),
            reason: reason.to_string(),
        };
        self.commit(&mut log, vec![event])?;
        tracing::info!("alias deprecated");
        Ok(())
    }

    /// Re-verify the log's hash chain; returns the number of entries.
    pub fn verify(&self) -> Result<usize, AliasError> {
        let log = self.log.lock();
        log.verify()?;
        Ok(log.len())
    }

    /// Number of log entries.
    pub fn log_len(&self) -> usize {
        self.log.lock().len()
    }

    fn commit(&self, log: &mut AliasLog, events: Vec<AliasEvent>) -> Result<(), AliasError> {
        let appended = log.append(events)?;
        let mut next = NicknameStore::clone(&self.snapshot());
        for entry in appended {
            next.apply(entry);
        }
        *self.current.write() = Arc::new(next);
        Ok(())
    }
}
