//! Onboarding state machine: create a magic phrase or recover from one.
//!
//! ```text
//!            ┌── choose_create_wallet ──► Create ── next (hide) ──► Store ── copy ──┐
//!  Select ───┤                              ▲                                        ▼
//!            └── choose_existing_wallet ─► Retrieve ── next (date ok) ──────────► Verify ── finalize ──► connector
//! ```
//!
//! [`OnboardingState`] is a plain value; [`Onboarding`] owns it together
//! with the secret store, clock and configuration, and only its named
//! transitions mutate it. Each transition returns the next full state.
//!
//! Failed reveals are never errors. They set `invalid` and latch the
//! Verify input gate to [`InputGate::Locked`] until `back` leaves the
//! phase. The only runtime failure that escapes is
//! [`WalletError::WalletNotReady`], raised when a flow needs the stored
//! secret and none exists.

use chrono::NaiveDate;
use fims_crypto_core::{derive_key, hide, reveal, ExtractionFailure, MagicPhrase, Secret};
use serde::{Deserialize, Serialize};

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::platform::{Clipboard, Clock, RecoveredCredential, SystemClock, WalletConnector};
use crate::store::SecretStore;
use crate::validation::{
    date_within_bounds, matches_phrase_pattern, parse_recovery_date, utc_date,
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Workflow phase. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Choose between creating a wallet and recovering one.
    Select,
    /// Enter a cover phrase.
    Create,
    /// Pick the date the magic phrase was created on.
    Retrieve,
    /// Magic phrase ready to copy.
    Store,
    /// Paste the magic phrase back to check it.
    Verify,
}

/// Whether Verify still accepts candidate phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputGate {
    /// Candidates are checked as they are typed.
    #[default]
    Accepting,
    /// A reveal failed in this Verify cycle; every input is rejected.
    Locked,
}

/// Snapshot of the onboarding workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingState {
    phase: Phase,
    phrase: String,
    date: Option<NaiveDate>,
    time_ms: u64,
    magic: Option<MagicPhrase>,
    created_on: Option<NaiveDate>,
    revealed: Option<Secret>,
    invalid: bool,
    gate: InputGate,
    loading: bool,
}

impl Default for OnboardingState {
    fn default() -> Self {
        Self {
            phase: Phase::Select,
            phrase: String::new(),
            date: None,
            time_ms: 0,
            magic: None,
            created_on: None,
            revealed: None,
            invalid: true,
            gate: InputGate::Accepting,
            loading: false,
        }
    }
}

impl OnboardingState {
    /// Active phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current phrase input (cover phrase in Create, candidate in Verify).
    #[must_use]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Recovery date picked in Retrieve.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Recovery timestamp (UTC midnight, ms); `0` on the direct path.
    #[must_use]
    pub const fn time_ms(&self) -> u64 {
        self.time_ms
    }

    /// Magic phrase produced by the Create → Store transition.
    #[must_use]
    pub const fn magic(&self) -> Option<&MagicPhrase> {
        self.magic.as_ref()
    }

    /// UTC date whose key protects [`Self::magic`]; the user must remember it.
    #[must_use]
    pub const fn created_on(&self) -> Option<NaiveDate> {
        self.created_on
    }

    /// `true` when the current input cannot be submitted.
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// Verify input gate.
    #[must_use]
    pub const fn gate(&self) -> InputGate {
        self.gate
    }

    /// `true` while a derive → hide/reveal sequence runs.
    ///
    /// Transitions take `&mut self` and clear the flag on every exit path,
    /// so a snapshot taken between calls always reads `false`. Hosts that
    /// run a transition on a worker thread show their own spinner.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// `true` once Verify has accepted a candidate phrase.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self.phase, Phase::Verify) && !self.invalid && self.revealed.is_some()
    }

    fn reset_verify_cycle(&mut self) {
        self.phrase.clear();
        self.revealed = None;
        self.gate = InputGate::Accepting;
        self.invalid = true;
    }
}

// ---------------------------------------------------------------------------
// Acceptance policy
// ---------------------------------------------------------------------------

/// Decide whether a reveal result unlocks the wallet.
///
/// Accepted iff extraction succeeded with a non-empty secret and, when a
/// stored `reference` secret was consulted, the two are equal.
#[must_use]
pub fn accept_revealed(
    revealed: Result<Secret, ExtractionFailure>,
    reference: Option<&Secret>,
) -> Option<Secret> {
    let secret = revealed.ok().filter(|s| !s.is_empty())?;
    match reference {
        Some(stored) if *stored != secret => None,
        _ => Some(secret),
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// Onboarding workflow driver.
pub struct Onboarding<S, K = SystemClock> {
    state: OnboardingState,
    store: S,
    clock: K,
    config: WalletConfig,
}

impl<S: SecretStore> Onboarding<S, SystemClock> {
    /// Start in [`Phase::Select`] using the wall clock.
    #[must_use]
    pub fn new(store: S, config: WalletConfig) -> Self {
        Self::with_clock(store, SystemClock, config)
    }
}

impl<S: SecretStore, K: Clock> Onboarding<S, K> {
    /// Start in [`Phase::Select`] with an explicit clock.
    #[must_use]
    pub fn with_clock(store: S, clock: K, config: WalletConfig) -> Self {
        Self {
            state: OnboardingState::default(),
            store,
            clock,
            config,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &OnboardingState {
        &self.state
    }

    /// The secret store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &WalletConfig {
        &self.config
    }

    // ── Select ──────────────────────────────────────────────────────

    /// "I already have a wallet": Select → Retrieve.
    ///
    /// # Errors
    ///
    /// [`WalletError::InvalidTransition`] outside Select.
    pub fn choose_existing_wallet(&mut self) -> Result<&OnboardingState, WalletError> {
        self.expect_phase(Phase::Select, "choose_existing_wallet")?;
        self.enter(Phase::Retrieve);
        Ok(&self.state)
    }

    /// "Create wallet": Select → Create.
    ///
    /// # Errors
    ///
    /// [`WalletError::InvalidTransition`] outside Select.
    pub fn choose_create_wallet(&mut self) -> Result<&OnboardingState, WalletError> {
        self.expect_phase(Phase::Select, "choose_create_wallet")?;
        self.enter(Phase::Create);
        Ok(&self.state)
    }

    // ── Inputs ──────────────────────────────────────────────────────

    /// Date picker input in Retrieve (`YYYY-MM-DD`).
    ///
    /// Unparsable input clears the timestamp, which keeps `next` disabled.
    ///
    /// # Errors
    ///
    /// [`WalletError::InvalidTransition`] outside Retrieve.
    pub fn set_recovery_date(&mut self, input: &str) -> Result<&OnboardingState, WalletError> {
        self.expect_phase(Phase::Retrieve, "set_recovery_date")?;
        match parse_recovery_date(input) {
            Some((date, ms)) => {
                self.state.date = Some(date);
                self.state.time_ms = ms;
            }
            None => {
                self.state.date = None;
                self.state.time_ms = 0;
            }
        }
        Ok(&self.state)
    }

    /// Phrase input: the cover phrase in Create, a candidate in Verify.
    ///
    /// In Verify every accepted-shape candidate is revealed immediately.
    ///
    /// # Errors
    ///
    /// - [`WalletError::InvalidTransition`] outside Create and Verify
    /// - [`WalletError::WalletNotReady`] in Verify on the direct path when
    ///   no secret is stored
    pub fn set_phrase(&mut self, input: &str) -> Result<&OnboardingState, WalletError> {
        match self.state.phase {
            Phase::Create => {
                self.state.phrase = input.to_string();
                self.state.invalid = !matches_phrase_pattern(input);
            }
            Phase::Verify => {
                self.state.phrase = input.to_string();
                self.verify_candidate()?;
            }
            phase => {
                return Err(WalletError::InvalidTransition {
                    phase,
                    action: "set_phrase",
                });
            }
        }
        Ok(&self.state)
    }

    // ── Buttons ─────────────────────────────────────────────────────

    /// "Next": Retrieve → Verify, or Create → Store (hides the secret).
    ///
    /// # Errors
    ///
    /// - [`WalletError::GuardRejected`] if the date is out of range or the
    ///   cover phrase does not have two words
    /// - [`WalletError::WalletNotReady`] if Create has no stored secret
    /// - [`WalletError::Crypto`] if key derivation is misconfigured
    /// - [`WalletError::Busy`] / [`WalletError::InvalidTransition`]
    pub fn next(&mut self) -> Result<&OnboardingState, WalletError> {
        self.ensure_idle()?;
        match self.state.phase {
            Phase::Retrieve => {
                let now = self.clock.now_ms();
                if !date_within_bounds(self.state.time_ms, self.config.recency_floor_ms, now) {
                    return Err(WalletError::GuardRejected("recovery date out of range"));
                }
                self.state.reset_verify_cycle();
                self.enter(Phase::Verify);
            }
            Phase::Create => {
                if self.state.invalid || !matches_phrase_pattern(&self.state.phrase) {
                    return Err(WalletError::GuardRejected(
                        "cover phrase needs at least two words",
                    ));
                }
                self.state.loading = true;
                let created = self.create_magic();
                self.state.loading = false;

                let (magic, created_on) = created?;
                self.state.magic = Some(magic);
                self.state.created_on = created_on;
                self.state.invalid = false;
                self.enter(Phase::Store);
            }
            phase => {
                return Err(WalletError::InvalidTransition {
                    phase,
                    action: "next",
                });
            }
        }
        Ok(&self.state)
    }

    /// "Back".
    ///
    /// - Retrieve, Create → Select
    /// - Store → Create
    /// - Verify → Retrieve when a recovery date was used, else Create;
    ///   clears the phrase, date, timestamp and input lockout
    ///
    /// # Errors
    ///
    /// [`WalletError::Busy`] in Store/Verify while loading;
    /// [`WalletError::InvalidTransition`] in Select.
    pub fn back(&mut self) -> Result<&OnboardingState, WalletError> {
        match self.state.phase {
            Phase::Retrieve | Phase::Create => self.enter(Phase::Select),
            Phase::Store => {
                self.ensure_idle()?;
                self.enter(Phase::Create);
            }
            Phase::Verify => {
                self.ensure_idle()?;
                let target = if self.state.time_ms == 0 {
                    Phase::Create
                } else {
                    Phase::Retrieve
                };
                self.state.reset_verify_cycle();
                self.state.date = None;
                self.state.time_ms = 0;
                self.state.magic = None;
                self.state.created_on = None;
                self.enter(target);
            }
            Phase::Select => {
                return Err(WalletError::InvalidTransition {
                    phase: Phase::Select,
                    action: "back",
                });
            }
        }
        Ok(&self.state)
    }

    /// "Copy": write the magic phrase to the clipboard, Store → Verify.
    ///
    /// The clipboard write is fire-and-forget; a failure is logged and the
    /// transition still happens.
    ///
    /// # Errors
    ///
    /// [`WalletError::GuardRejected`] without a magic phrase;
    /// [`WalletError::Busy`] / [`WalletError::InvalidTransition`].
    pub fn copy<C: Clipboard>(
        &mut self,
        clipboard: &mut C,
    ) -> Result<&OnboardingState, WalletError> {
        self.expect_phase(Phase::Store, "copy")?;
        self.ensure_idle()?;
        let magic = match &self.state.magic {
            Some(magic) if !self.state.invalid => magic,
            _ => return Err(WalletError::GuardRejected("no magic phrase to copy")),
        };

        if let Err(e) = clipboard.write_text(magic.as_str()) {
            tracing::warn!("Magic phrase clipboard write failed: {e}");
        }

        self.state.reset_verify_cycle();
        self.state.date = None;
        self.state.time_ms = 0;
        self.enter(Phase::Verify);
        Ok(&self.state)
    }

    /// "Finalize": hand the verified wallet to the connector.
    ///
    /// On the date path the connector receives the revealed secret and the
    /// recovery timestamp; on the direct path it receives `None`.
    ///
    /// # Errors
    ///
    /// [`WalletError::GuardRejected`] if no candidate was accepted, any
    /// error from the connector, [`WalletError::Busy`] /
    /// [`WalletError::InvalidTransition`].
    pub fn finalize<W: WalletConnector>(
        &mut self,
        connector: &mut W,
    ) -> Result<&OnboardingState, WalletError> {
        self.expect_phase(Phase::Verify, "finalize")?;
        self.ensure_idle()?;
        let secret = match &self.state.revealed {
            Some(secret) if !self.state.invalid => secret,
            _ => return Err(WalletError::GuardRejected("magic phrase not verified")),
        };

        let date_based = self.state.time_ms != 0;
        let recovered = date_based.then(|| RecoveredCredential {
            secret: secret.clone(),
            timestamp_ms: self.state.time_ms,
        });
        connector.finish_connecting(recovered)?;

        tracing::info!(date_based, "Wallet onboarding finalized");
        Ok(&self.state)
    }

    // ── Internals ───────────────────────────────────────────────────

    fn expect_phase(&self, phase: Phase, action: &'static str) -> Result<(), WalletError> {
        if self.state.phase == phase {
            Ok(())
        } else {
            Err(WalletError::InvalidTransition {
                phase: self.state.phase,
                action,
            })
        }
    }

    fn ensure_idle(&self) -> Result<(), WalletError> {
        if self.state.loading {
            Err(WalletError::Busy)
        } else {
            Ok(())
        }
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(from = ?self.state.phase, to = ?phase, "Onboarding phase changed");
        self.state.phase = phase;
    }

    /// Key timestamp for the current cycle: the recovery date, or now.
    fn key_timestamp(&self) -> u64 {
        match self.state.time_ms {
            0 => self.clock.now_ms(),
            ts => ts,
        }
    }

    fn create_magic(&self) -> Result<(MagicPhrase, Option<NaiveDate>), WalletError> {
        let secret = self.store.require_secret()?;
        let now = self.clock.now_ms();
        let key = derive_key(Some(now), &self.config.day_key)?;
        let magic = hide(&secret, &key, &self.state.phrase)?;
        tracing::info!(day = key.day(), "Magic phrase created");
        Ok((magic, utc_date(now)))
    }

    fn verify_candidate(&mut self) -> Result<(), WalletError> {
        self.state.revealed = None;
        self.state.invalid = true;

        if self.state.gate == InputGate::Locked || !matches_phrase_pattern(&self.state.phrase) {
            return Ok(());
        }

        self.state.loading = true;
        let outcome = self.reveal_candidate();
        self.state.loading = false;

        if let Some(secret) = outcome? {
            self.state.revealed = Some(secret);
            self.state.invalid = false;
        } else {
            tracing::warn!("Magic phrase rejected; locking input until back");
            self.state.gate = InputGate::Locked;
        }
        Ok(())
    }

    fn reveal_candidate(&self) -> Result<Option<Secret>, WalletError> {
        let reference = if self.state.time_ms == 0 {
            Some(self.store.require_secret()?)
        } else {
            None
        };
        let key = derive_key(Some(self.key_timestamp()), &self.config.day_key)?;
        let revealed = reveal(&self.state.phrase, &key);
        if let Err(failure) = &revealed {
            tracing::debug!(%failure, "Reveal failed");
        }
        Ok(accept_revealed(revealed, reference.as_ref()))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FixedClock;
    use crate::store::MemorySecretStore;
    use fims_crypto_core::{Argon2idParams, DayKeyParams};

    /// 2023-11-14T22:13:20Z
    const NOW: u64 = 1_700_000_000_000;

    fn test_config() -> WalletConfig {
        WalletConfig {
            day_key: DayKeyParams {
                params: Argon2idParams {
                    m_cost: 32,
                    t_cost: 1,
                    p_cost: 1,
                },
                ..DayKeyParams::default()
            },
            ..WalletConfig::default()
        }
    }

    fn machine(store: MemorySecretStore) -> Onboarding<MemorySecretStore, FixedClock> {
        Onboarding::with_clock(store, FixedClock(NOW), test_config())
    }

    #[test]
    fn starts_in_select_with_invalid_input() {
        let m = machine(MemorySecretStore::new());
        assert_eq!(m.state().phase(), Phase::Select);
        assert!(m.state().is_invalid());
        assert!(!m.state().is_loading());
        assert_eq!(m.state().gate(), InputGate::Accepting);
    }

    #[test]
    fn select_branches() {
        let mut m = machine(MemorySecretStore::new());
        assert_eq!(m.choose_create_wallet().unwrap().phase(), Phase::Create);
        assert_eq!(m.back().unwrap().phase(), Phase::Select);
        assert_eq!(m.choose_existing_wallet().unwrap().phase(), Phase::Retrieve);
        assert_eq!(m.back().unwrap().phase(), Phase::Select);
    }

    #[test]
    fn actions_outside_their_phase_are_rejected() {
        let mut m = machine(MemorySecretStore::new());
        assert!(matches!(
            m.next(),
            Err(WalletError::InvalidTransition {
                phase: Phase::Select,
                action: "next"
            })
        ));
        assert!(matches!(m.back(), Err(WalletError::InvalidTransition { .. })));
        assert!(matches!(
            m.set_phrase("a b"),
            Err(WalletError::InvalidTransition { .. })
        ));
        m.choose_create_wallet().unwrap();
        assert!(matches!(
            m.choose_existing_wallet(),
            Err(WalletError::InvalidTransition { .. })
        ));
        assert!(matches!(
            m.set_recovery_date("2023-11-14"),
            Err(WalletError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn create_next_requires_two_words() {
        let mut m = machine(MemorySecretStore::with_secret("abcDEF123secret"));
        m.choose_create_wallet().unwrap();
        assert!(m.set_phrase("coffee").unwrap().is_invalid());
        assert!(matches!(m.next(), Err(WalletError::GuardRejected(_))));
        assert_eq!(m.state().phase(), Phase::Create);

        assert!(!m.set_phrase("buy two coffees").unwrap().is_invalid());
        let state = m.next().unwrap();
        assert_eq!(state.phase(), Phase::Store);
        assert_eq!(state.created_on(), NaiveDate::from_ymd_opt(2023, 11, 14));
        assert_eq!(
            state.magic().unwrap().visible_text(),
            "buy two coffees"
        );
        assert!(!state.is_loading());
    }

    #[test]
    fn create_rejects_cover_of_only_payload_characters() {
        let mut m = machine(MemorySecretStore::with_secret("abcDEF123secret"));
        m.choose_create_wallet().unwrap();
        assert!(m.set_phrase("\u{200C} \u{200D}").unwrap().is_invalid());
        assert!(matches!(m.next(), Err(WalletError::GuardRejected(_))));
        assert_eq!(m.state().phase(), Phase::Create);

        assert!(!m.set_phrase("\u{200C}buy two").unwrap().is_invalid());
        let state = m.next().unwrap();
        assert_eq!(state.phase(), Phase::Store);
        assert_eq!(state.magic().unwrap().visible_text(), "buy two");
    }

    #[test]
    fn create_without_stored_secret_is_not_ready() {
        let mut m = machine(MemorySecretStore::new());
        m.choose_create_wallet().unwrap();
        m.set_phrase("buy two coffees").unwrap();
        assert!(matches!(m.next(), Err(WalletError::WalletNotReady)));
        assert_eq!(m.state().phase(), Phase::Create);
        assert!(m.state().magic().is_none());
        assert!(!m.state().is_loading());
    }

    #[test]
    fn loading_is_cleared_after_every_outcome() {
        let mut m = machine(MemorySecretStore::new());
        m.choose_create_wallet().unwrap();
        m.set_phrase("buy two coffees").unwrap();
        assert!(m.next().is_err());
        assert!(!m.state().is_loading());
        assert!(m.back().is_ok());

        m.choose_existing_wallet().unwrap();
        m.set_recovery_date("2023-11-14").unwrap();
        m.next().unwrap();
        let state = m.set_phrase("buy two coffees").unwrap();
        assert_eq!(state.gate(), InputGate::Locked);
        assert!(!state.is_loading());
        assert_eq!(m.back().unwrap().phase(), Phase::Retrieve);
    }

    #[test]
    fn accept_policy() {
        let s = || Secret::new("abc");
        assert_eq!(accept_revealed(Ok(s()), None), Some(s()));
        assert_eq!(accept_revealed(Ok(s()), Some(&s())), Some(s()));
        assert_eq!(accept_revealed(Ok(s()), Some(&Secret::new("xyz"))), None);
        assert_eq!(accept_revealed(Ok(Secret::new("")), None), None);
        assert_eq!(
            accept_revealed(Err(ExtractionFailure::Authentication), None),
            None
        );
    }

    #[test]
    fn retrieve_date_guard() {
        let mut m = machine(MemorySecretStore::new());
        m.choose_existing_wallet().unwrap();

        assert!(matches!(m.next(), Err(WalletError::GuardRejected(_))));

        m.set_recovery_date("2023-02-28").unwrap();
        assert!(matches!(m.next(), Err(WalletError::GuardRejected(_))));

        m.set_recovery_date("2023-11-15").unwrap();
        assert!(matches!(m.next(), Err(WalletError::GuardRejected(_))));

        m.set_recovery_date("not a date").unwrap();
        assert_eq!(m.state().time_ms(), 0);
        assert!(matches!(m.next(), Err(WalletError::GuardRejected(_))));

        m.set_recovery_date("2023-03-02").unwrap();
        let state = m.next().unwrap();
        assert_eq!(state.phase(), Phase::Verify);
        assert_eq!(state.time_ms(), 1_677_715_200_000);
        assert!(state.phrase().is_empty());
    }

    #[test]
    fn verify_back_returns_to_origin_and_clears_inputs() {
        let mut m = machine(MemorySecretStore::new());
        m.choose_existing_wallet().unwrap();
        m.set_recovery_date("2023-11-14").unwrap();
        m.next().unwrap();
        let state = m.back().unwrap();
        assert_eq!(state.phase(), Phase::Retrieve);
        assert_eq!(state.time_ms(), 0);
        assert!(state.date().is_none());
    }

    #[test]
    fn store_back_returns_to_create() {
        let mut m = machine(MemorySecretStore::with_secret("abcDEF123secret"));
        m.choose_create_wallet().unwrap();
        m.set_phrase("buy two coffees").unwrap();
        m.next().unwrap();
        assert_eq!(m.back().unwrap().phase(), Phase::Create);
    }
}
