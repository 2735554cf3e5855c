//! Round-robin credential rotation with per-credential cooldown.
//!
//! Grounded on the teacher's `infrastructure::claude::rate_limiter::TokenBucketRateLimiter`
//! (a `Mutex`-guarded shared counter refilled by elapsed time), generalized
//! from a single global bucket to one bucket per credential plus an explicit
//! cooldown applied on `RateLimited` responses, per SPEC_FULL.md §4.2. Steady
//! pacing is delegated to `governor`'s keyed limiter rather than hand-rolled,
//! since the teacher's own `governor` dependency otherwise sits unused.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use governor::{Quota, RateLimiter};
use tokio::sync::Mutex;

type KeyedLimiter = RateLimiter<
    String,
    governor::state::keyed::DefaultKeyedStateStore<String>,
    governor::clock::DefaultClock,
>;

struct CooldownRing {
    credentials: Vec<String>,
    cooldowns: std::collections::HashMap<String, Instant>,
    next: usize,
}

/// Selects credentials round-robin, skipping any still in cooldown from a
/// recent `RateLimited` response, and paces steady-state throughput per
/// credential via `governor`.
pub struct CredentialRotation {
    ring: Mutex<CooldownRing>,
    pacer: KeyedLimiter,
    /// How long a credential is skipped after a `RateLimited` response.
    cooldown: Duration,
}

impl CredentialRotation {
    pub fn new(credentials: Vec<String>, requests_per_second: u32, cooldown: Duration) -> Self {
        assert!(!credentials.is_empty(), "at least one completer credential is required");
        let quota = Quota::per_second(NonZeroU32::new(requests_per_second.max(1)).unwrap());
        Self {
            ring: Mutex::new(CooldownRing {
                credentials,
                cooldowns: std::collections::HashMap::new(),
                next: 0,
            }),
            pacer: RateLimiter::keyed(quota),
            cooldown,
        }
    }

    /// Picks the next credential not currently in cooldown, waiting on the
    /// per-credential pacer before returning it. Wraps around the ring at
    /// most once per call; if every credential is in cooldown, returns the
    /// one with the earliest cooldown expiry anyway (callers still retry).
    pub async fn acquire(&self) -> String {
        let chosen = {
            let mut ring = self.ring.lock().await;
            let len = ring.credentials.len();
            let now = Instant::now();

            let mut candidate = None;
            for offset in 0..len {
                let idx = (ring.next + offset) % len;
                let cred = &ring.credentials[idx];
                let ready = ring.cooldowns.get(cred).is_none_or(|until| now >= *until);
                if ready {
                    candidate = Some((idx, cred.clone()));
                    break;
                }
            }

            let (idx, cred) = candidate.unwrap_or_else(|| {
                let idx = ring
                    .credentials
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, c)| ring.cooldowns.get(*c).copied().unwrap_or(now))
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                (idx, ring.credentials[idx].clone())
            });
            ring.next = (idx + 1) % len;
            cred
        };

        let _ = self.pacer.until_key_ready(&chosen).await;
        chosen
    }

    /// Mark a credential as rate-limited, removing it from rotation for
    /// `self.cooldown`.
    pub async fn mark_rate_limited(&self, credential: &str) {
        let mut ring = self.ring.lock().await;
        ring.cooldowns.insert(credential.to_string(), Instant::now() + self.cooldown);
    }
}

pub type SharedCredentialRotation = Arc<CredentialRotation>;
