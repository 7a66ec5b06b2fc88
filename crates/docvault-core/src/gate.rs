//! Access gate for DocVault.
//!
//! Decides, for a submitted plaintext credential, whether access is granted,
//! while enforcing a cooldown after repeated failures and remembering a
//! successful verification across restarts of the caller.
//!
//! The gate owns two injected state scopes, mirroring the split the portal
//! UI relies on:
//!
//! - a **durable** scope for the attempt counter and lockout instant, which
//!   survive reloads;
//! - a **session** scope for the marker written on success, which lives only
//!   as long as the session store does.
//!
//! Persisted values are plain strings. Malformed values (non-numeric
//! counters, corrupt timestamps) are treated as absent, never as failures.
//!
//! State machine per storage scope: `Idle(0)` → `Failing(1..max-1)` →
//! `LockedOut(until)` → back to `Idle(0)` once the window elapses, with
//! `Authenticated` reachable from `Idle` and `Failing` on a digest match.
//! Attempts made while locked out are rejected before any digest
//! computation and mutate nothing.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use docvault_storage::StateStore;

use crate::digest::{credential_digest, digests_match};
use crate::error::GateError;

/// Session scope key for the marker written on successful verification.
const SESSION_KEY: &str = "gate/session";

/// Durable scope key for the consecutive failed attempt counter.
const ATTEMPTS_KEY: &str = "gate/attempts";

/// Durable scope key for the lockout instant (stringified epoch millis).
const LOCKOUT_KEY: &str = "gate/lockout_until";

/// Gate configuration.
#[derive(Clone)]
pub struct GateConfig {
    /// The 64-hex-character target digest a candidate must hash to.
    pub expected_digest_hex: String,
    /// Failures permitted before lockout engages.
    pub max_attempts: u32,
    /// Lockout length once engaged, in milliseconds.
    pub lockout_duration_ms: i64,
}

impl std::fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateConfig")
            .field("expected_digest_hex", &"[REDACTED]")
            .field("max_attempts", &self.max_attempts)
            .field("lockout_duration_ms", &self.lockout_duration_ms)
            .finish()
    }
}

/// Outcome of a verification attempt.
///
/// There is no error variant here — verification never raises for a
/// well-formed candidate. Storage failures surface as [`GateError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    /// The candidate's digest equals the expected digest. A session marker
    /// has been written and the attempt counter reset.
    Granted,
    /// Digest mismatch. The counter now stands at `attempts_so_far`; when
    /// `just_locked_out` is true this failure crossed the threshold and a
    /// lockout window has been set.
    Denied {
        attempts_so_far: u32,
        just_locked_out: bool,
    },
    /// A lockout window is active. Returned before any digest computation;
    /// the candidate was not evaluated.
    Locked { remaining_seconds: i64 },
}

/// Persisted counter/lockout state as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutState {
    /// Consecutive failed attempts since the last success or lockout expiry.
    pub attempts: u32,
    /// When the gate unlocks again, if a lockout is active.
    pub lockout_until: Option<DateTime<Utc>>,
}

impl LockoutState {
    /// Whole seconds left in the window at `now`, if one is active.
    ///
    /// Uses the same rounding as [`VerifyResult::Locked`], so a caller
    /// surfacing both never shows disagreeing countdowns.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.lockout_until
            .map(|until| remaining_seconds(now, until))
    }
}

/// The access gate: credential check, lockout counting, session restore.
///
/// An internal mutex serializes [`verify`](AccessGate::verify) calls, so at
/// most one in-flight verification mutates the shared counters. Multiple
/// gate instances over one durable store remain best-effort, as the portal
/// has a single writer in every deployment shape.
pub struct AccessGate {
    config: GateConfig,
    durable: Arc<dyn StateStore>,
    session: Arc<dyn StateStore>,
    verify_lock: Mutex<()>,
}

impl AccessGate {
    /// Create a gate over the given durable and session state scopes.
    #[must_use]
    pub fn new(
        config: GateConfig,
        durable: Arc<dyn StateStore>,
        session: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            config,
            durable,
            session,
            verify_lock: Mutex::new(()),
        }
    }

    /// The configured target digest.
    #[must_use]
    pub fn expected_digest(&self) -> &str {
        &self.config.expected_digest_hex
    }

    /// Report whether a prior successful verification is still in effect.
    ///
    /// Read-only. True iff the session marker exists and exactly matches the
    /// expected digest — mere presence of a marker is not enough.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Storage`] if the session store fails.
    pub async fn restore_session(&self) -> Result<bool, GateError> {
        let marker = self.session.get(SESSION_KEY).await?;
        Ok(marker.is_some_and(|m| digests_match(&m, &self.config.expected_digest_hex)))
    }

    /// Read the persisted counter and lockout instant.
    ///
    /// If the persisted lockout instant is not in the future, the lockout is
    /// cleared and the persisted counter reset to 0 as a side effect, and a
    /// clean state is reported.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Storage`] if the durable store fails.
    pub async fn restore_lockout_state(
        &self,
        now: DateTime<Utc>,
    ) -> Result<LockoutState, GateError> {
        let attempts = self.read_attempts().await?;

        match self.read_lockout_until().await? {
            Some(until) if now < until => Ok(LockoutState {
                attempts,
                lockout_until: Some(until),
            }),
            Some(_) => {
                // Window elapsed: clear it and restore the attempt budget.
                self.durable.delete(LOCKOUT_KEY).await?;
                self.durable.put(ATTEMPTS_KEY, "0").await?;
                info!("lockout expired, attempt counter reset");
                Ok(LockoutState {
                    attempts: 0,
                    lockout_until: None,
                })
            }
            None => Ok(LockoutState {
                attempts,
                lockout_until: None,
            }),
        }
    }

    /// Verify a candidate credential at the given instant.
    ///
    /// While a lockout window is active this returns
    /// [`VerifyResult::Locked`] immediately, without hashing or comparing
    /// the candidate, and mutates nothing. An expired window found here is
    /// cleared first, so the call runs with a fresh attempt budget.
    ///
    /// The candidate is treated as opaque bytes — equality is exact-byte
    /// digest equality.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Storage`] if a state store fails. Mismatches and
    /// active lockouts are outcomes, not errors.
    pub async fn verify(
        &self,
        candidate: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyResult, GateError> {
        let _guard = self.verify_lock.lock().await;

        let state = self.restore_lockout_state(now).await?;
        if let Some(until) = state.lockout_until {
            return Ok(VerifyResult::Locked {
                remaining_seconds: remaining_seconds(now, until),
            });
        }

        let candidate_digest = credential_digest(candidate);
        if digests_match(&candidate_digest, &self.config.expected_digest_hex) {
            self.session
                .put(SESSION_KEY, &self.config.expected_digest_hex)
                .await?;
            self.durable.put(ATTEMPTS_KEY, "0").await?;
            self.durable.delete(LOCKOUT_KEY).await?;

            info!("access granted, session marker set");
            return Ok(VerifyResult::Granted);
        }

        let attempts = state.attempts.saturating_add(1);
        self.durable
            .put(ATTEMPTS_KEY, &attempts.to_string())
            .await?;

        let just_locked_out = attempts >= self.config.max_attempts;
        if just_locked_out {
            let until = now + Duration::milliseconds(self.config.lockout_duration_ms);
            self.durable
                .put(LOCKOUT_KEY, &until.timestamp_millis().to_string())
                .await?;
            warn!(attempts, until = %until, "lockout engaged");
        }

        Ok(VerifyResult::Denied {
            attempts_so_far: attempts,
            just_locked_out,
        })
    }

    /// Delete the session marker. Counters and any lockout are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Storage`] if the session store fails.
    pub async fn sign_out(&self) -> Result<(), GateError> {
        self.session.delete(SESSION_KEY).await?;
        info!("session marker cleared");
        Ok(())
    }

    /// Read the persisted counter; malformed values read as 0.
    async fn read_attempts(&self) -> Result<u32, GateError> {
        let attempts = self
            .durable
            .get(ATTEMPTS_KEY)
            .await?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Ok(attempts)
    }

    /// Read the persisted lockout instant; malformed values read as absent.
    async fn read_lockout_until(&self) -> Result<Option<DateTime<Utc>>, GateError> {
        let until = self
            .durable
            .get(LOCKOUT_KEY)
            .await?
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis);
        Ok(until)
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Seconds until `until`, rounded up so a caller never under-reports the
/// wait (1ms remaining is still "1 second").
fn remaining_seconds(now: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    let ms = (until - now).num_milliseconds().max(0);
    ms / 1000 + i64::from(ms % 1000 != 0)
}
