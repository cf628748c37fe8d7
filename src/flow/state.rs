//! Flow state.
//!
//! [`FlowState`] is the single source of truth for an in-progress
//! authentication attempt. It is created fresh when the flow mounts, mutated
//! by every user action and timer tick through the reducer, and discarded
//! once authentication succeeds or the user navigates away.

use serde::{Deserialize, Serialize};

/// How long a dispatched OTP stays valid, in milliseconds. The resend
/// cooldown shares this duration and boundary.
pub const OTP_WINDOW_MS: u64 = 600_000;

/// Length of a complete one-time passcode.
pub const OTP_CODE_LEN: usize = 6;

/// Which channel the user is authenticating through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    Email,
    Phone,
}

/// Whether the user wants to sign in to an existing identity or create one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Login,
    SignUp,
}

/// Sub-state of the attempt within the active credential mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Initial stage for every (mode, intent) pair.
    EnteringDetails,
    /// Phone mode only: an OTP has been dispatched and awaits entry.
    AwaitingOtp,
    /// Email sign-up only: a confirmation email is out-of-band.
    AwaitingEmailConfirmation,
}

/// Raw user input. All fields start empty; validity beyond presence is
/// judged by the identity provider at submission.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub username: String,
    /// Local-format digits as entered; the country calling code is prefixed
    /// only when a provider call is issued.
    pub phone_number: String,
    pub otp_code: String,
}

/// OTP validity window in epoch milliseconds.
///
/// `expires_at_ms` is always exactly `issued_at_ms + OTP_WINDOW_MS`; both
/// fields are set atomically when an OTP is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpWindow {
    pub issued_at_ms: u64,
    pub expires_at_ms: u64,
}

impl OtpWindow {
    /// Opens a fresh window at `now_ms`.
    pub fn open_at(now_ms: u64) -> Self {
        Self {
            issued_at_ms: now_ms,
            expires_at_ms: now_ms + OTP_WINDOW_MS,
        }
    }

    /// Remaining validity in whole seconds, rounded up, clamped at zero.
    pub fn remaining_secs(&self, now_ms: u64) -> u64 {
        self.expires_at_ms.saturating_sub(now_ms).div_ceil(1000)
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

/// Settings the reducer needs when issuing provider calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    /// Country calling code prefixed to phone numbers before provider calls.
    pub country_code: String,
    /// Where the provider redirects after email confirmation, password
    /// reset, or federated login.
    pub redirect_url: String,
    /// Federated identity provider name passed to the authorize endpoint.
    pub federated_provider: String,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            country_code: "+91".to_string(),
            redirect_url: "http://localhost:3000".to_string(),
            federated_provider: "google".to_string(),
        }
    }
}

/// The in-progress authentication attempt.
pub struct FlowState {
    pub credential_mode: CredentialMode,
    pub intent: Intent,
    pub stage: Stage,
    pub credentials: Credentials,
    /// Present only while an OTP is valid.
    pub otp_window: Option<OtpWindow>,
    /// True for the same 600 s as the OTP window; never diverges from it.
    pub resend_lock: bool,
    /// At most one provider call may be in flight.
    pub submission_in_flight: bool,
    /// Most recent failure message, rendered verbatim by the presentation
    /// layer.
    pub last_error: Option<String>,
    /// Password field visibility toggle.
    pub show_password: bool,
    /// Set when the provider confirms a password sign-in or OTP
    /// verification; the owner discards the flow afterwards.
    pub authenticated: bool,
    /// Stale-result guard: bumped on every mode/intent switch, compared at
    /// call-issue vs. call-resolution time.
    pub generation: u64,
    pub settings: FlowSettings,
}

impl FlowState {
    /// Creates a fresh flow: email mode, login intent, entering details.
    pub fn new(settings: FlowSettings) -> Self {
        Self {
            credential_mode: CredentialMode::Email,
            intent: Intent::Login,
            stage: Stage::EnteringDetails,
            credentials: Credentials::default(),
            otp_window: None,
            resend_lock: false,
            submission_in_flight: false,
            last_error: None,
            show_password: false,
            authenticated: false,
            generation: 0,
            settings,
        }
    }

    /// Centralized reset applied on every mode/intent switch.
    ///
    /// Clears the stage, OTP window, resend lock, and error unconditionally,
    /// and bumps the generation so a result from any in-flight call is
    /// discarded on arrival. The in-flight flag is cleared for the same
    /// reason: the superseded call can no longer resolve into this flow.
    pub(crate) fn reset_for_switch(&mut self) {
        self.stage = Stage::EnteringDetails;
        self.otp_window = None;
        self.resend_lock = false;
        self.last_error = None;
        self.submission_in_flight = false;
        self.generation += 1;
    }

    /// Whether the entered OTP has the full six characters.
    pub fn otp_code_complete(&self) -> bool {
        self.credentials.otp_code.chars().count() == OTP_CODE_LEN
    }

    /// The entered phone number with the configured country calling code
    /// prefixed.
    pub fn normalized_phone(&self) -> String {
        format!("{}{}", self.settings.country_code, self.credentials.phone_number)
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new(FlowSettings::default())
    }
}
