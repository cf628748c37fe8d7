//! Flow event types.
//!
//! All inputs to the flow are converted to [`FlowEvent`] before processing:
//! discrete user actions, timer ticks carrying a synthetic timestamp, and
//! asynchronous provider results arriving through the runtime inbox.

use crate::flow::effects::ProviderCallKind;
use crate::flow::state::{CredentialMode, Intent};
use crate::provider::ProviderError;

/// Editable credential fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
    Username,
    PhoneNumber,
    OtpCode,
}

/// Unified event enum for the auth flow.
///
/// The reducer pattern-matches on these to produce the next state plus at
/// most one outbound provider call.
#[derive(Debug)]
pub enum FlowEvent {
    /// Switch between email and phone credential modes.
    SetCredentialMode(CredentialMode),

    /// Switch between login and sign-up (meaningful in email mode).
    SetIntent(Intent),

    /// Toggle login/sign-up; a no-op in phone mode.
    ToggleIntent,

    /// Pure field mutation; no validation, no side effects.
    UpdateField { field: Field, value: String },

    /// Submit the active form. Dispatches on (mode, intent, stage).
    Submit,

    /// Re-dispatch the OTP; rejected while the resend cooldown holds.
    ResendOtp,

    /// Initiate a password reset for the entered email address.
    RequestPasswordReset,

    /// Hand control to the federated identity provider (full redirect).
    FederatedLoginRequested,

    /// Flip password field visibility.
    TogglePasswordVisibility,

    /// Return from the email-confirmation notice to the login form.
    BackToLogin,

    /// Timer tick while an OTP window is open. `now_ms` is wall-clock epoch
    /// milliseconds; tests pass synthetic values.
    Tick { now_ms: u64 },

    /// An asynchronous provider call completed.
    ProviderResult {
        /// Generation at call-issue time; mismatches are discarded.
        generation: u64,
        /// Which operation completed.
        call: ProviderCallKind,
        result: Result<(), ProviderError>,
        /// Completion wall-clock time; OTP windows open at this instant.
        now_ms: u64,
    },
}
