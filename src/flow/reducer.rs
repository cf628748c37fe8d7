//! Flow reducer (update function).
//!
//! All state transitions happen here. The runtime calls
//! `update(state, event)` and executes the returned effect, if any.
//!
//! This is the single source of truth for how events modify the flow:
//! the submit dispatch table, resend throttling, OTP expiry, and the
//! stale-result guard all live in this module.

use tracing::debug;

use crate::flow::effects::{FlowEffect, ProviderCall, ProviderCallKind};
use crate::flow::events::{Field, FlowEvent};
use crate::flow::state::{CredentialMode, FlowState, Intent, OtpWindow, Stage};
use crate::provider::ProviderError;

/// Shown when a password reset is requested without an email address.
const RESET_NEEDS_EMAIL: &str = "Please enter your email address to reset your password.";

/// Shown when the OTP form is submitted with an incomplete code.
const OTP_INCOMPLETE: &str = "Enter the 6-digit code sent to your phone.";

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns at most
/// one outbound provider call for the runtime to execute.
pub fn update(state: &mut FlowState, event: FlowEvent) -> Option<FlowEffect> {
    match event {
        FlowEvent::SetCredentialMode(mode) => {
            set_credential_mode(state, mode);
            None
        }
        FlowEvent::SetIntent(intent) => {
            set_intent(state, intent);
            None
        }
        FlowEvent::ToggleIntent => {
            toggle_intent(state);
            None
        }
        FlowEvent::UpdateField { field, value } => {
            update_field(state, field, value);
            None
        }
        FlowEvent::Submit => submit(state),
        FlowEvent::ResendOtp => resend_otp(state),
        FlowEvent::RequestPasswordReset => request_password_reset(state),
        FlowEvent::FederatedLoginRequested => federated_login(state),
        FlowEvent::TogglePasswordVisibility => {
            state.show_password = !state.show_password;
            None
        }
        FlowEvent::BackToLogin => {
            back_to_login(state);
            None
        }
        FlowEvent::Tick { now_ms } => {
            tick(state, now_ms);
            None
        }
        FlowEvent::ProviderResult {
            generation,
            call,
            result,
            now_ms,
        } => {
            handle_provider_result(state, generation, call, result, now_ms);
            None
        }
    }
}

// ============================================================================
// Mode / intent switches
// ============================================================================

fn set_credential_mode(state: &mut FlowState, mode: CredentialMode) {
    state.credential_mode = mode;
    // The OTP code is transient to phone mode; it never survives a switch.
    state.credentials.otp_code.clear();
    state.reset_for_switch();
}

fn set_intent(state: &mut FlowState, intent: Intent) {
    // Intent only exists on the email form; in phone mode this is a no-op.
    if state.credential_mode != CredentialMode::Email {
        return;
    }
    state.intent = intent;
    state.reset_for_switch();
}

fn toggle_intent(state: &mut FlowState) {
    let next = match state.intent {
        Intent::Login => Intent::SignUp,
        Intent::SignUp => Intent::Login,
    };
    set_intent(state, next);
}

fn back_to_login(state: &mut FlowState) {
    state.intent = Intent::Login;
    state.reset_for_switch();
}

fn update_field(state: &mut FlowState, field: Field, value: String) {
    let slot = match field {
        Field::Email => &mut state.credentials.email,
        Field::Password => &mut state.credentials.password,
        Field::Username => &mut state.credentials.username,
        Field::PhoneNumber => &mut state.credentials.phone_number,
        Field::OtpCode => &mut state.credentials.otp_code,
    };
    *slot = value;
}

// ============================================================================
// Submit-class operations
// ============================================================================

fn submit(state: &mut FlowState) -> Option<FlowEffect> {
    if state.submission_in_flight {
        return None;
    }

    let call = match (state.credential_mode, state.intent, state.stage) {
        (CredentialMode::Email, Intent::Login, Stage::EnteringDetails) => {
            ProviderCall::SignInWithPassword {
                email: state.credentials.email.clone(),
                password: state.credentials.password.clone(),
            }
        }
        (CredentialMode::Email, Intent::SignUp, Stage::EnteringDetails) => ProviderCall::SignUp {
            email: state.credentials.email.clone(),
            password: state.credentials.password.clone(),
            username: state.credentials.username.clone(),
        },
        (CredentialMode::Phone, _, Stage::EnteringDetails) => ProviderCall::SendOtp {
            phone_e164: state.normalized_phone(),
        },
        (CredentialMode::Phone, _, Stage::AwaitingOtp) => {
            if !state.otp_code_complete() {
                state.last_error = Some(OTP_INCOMPLETE.to_string());
                return None;
            }
            ProviderCall::VerifyOtp {
                phone_e164: state.normalized_phone(),
                code: state.credentials.otp_code.clone(),
            }
        }
        // No submit action in the remaining (mode, stage) combinations.
        _ => return None,
    };

    Some(begin_call(state, call))
}

fn resend_otp(state: &mut FlowState) -> Option<FlowEffect> {
    if state.submission_in_flight || state.resend_lock {
        return None;
    }
    if state.credential_mode != CredentialMode::Phone || state.stage != Stage::AwaitingOtp {
        return None;
    }
    Some(begin_call(
        state,
        ProviderCall::SendOtp {
            phone_e164: state.normalized_phone(),
        },
    ))
}

fn request_password_reset(state: &mut FlowState) -> Option<FlowEffect> {
    if state.submission_in_flight {
        return None;
    }
    if state.credentials.email.is_empty() {
        state.last_error = Some(RESET_NEEDS_EMAIL.to_string());
        return None;
    }
    Some(begin_call(
        state,
        ProviderCall::ResetPassword {
            email: state.credentials.email.clone(),
            redirect_url: state.settings.redirect_url.clone(),
        },
    ))
}

fn federated_login(state: &mut FlowState) -> Option<FlowEffect> {
    if state.submission_in_flight {
        return None;
    }
    Some(begin_call(
        state,
        ProviderCall::FederatedSignIn {
            provider: state.settings.federated_provider.clone(),
            redirect_url: state.settings.redirect_url.clone(),
        },
    ))
}

/// Marks a call in flight and stamps it with the current generation.
///
/// Every submit-class operation clears the previous error here.
fn begin_call(state: &mut FlowState, call: ProviderCall) -> FlowEffect {
    state.last_error = None;
    state.submission_in_flight = true;
    FlowEffect {
        generation: state.generation,
        call,
    }
}

// ============================================================================
// Time
// ============================================================================

fn tick(state: &mut FlowState, now_ms: u64) {
    // Stale ticks after the window is gone are no-ops, not errors.
    let Some(window) = state.otp_window else {
        return;
    };
    if window.is_expired(now_ms) {
        // OTP validity and the resend cooldown share the same 600 s
        // boundary: both clear in this same call. The entered code is
        // invalidated with the window.
        state.otp_window = None;
        state.resend_lock = false;
        state.credentials.otp_code.clear();
    }
}

// ============================================================================
// Provider results
// ============================================================================

fn handle_provider_result(
    state: &mut FlowState,
    generation: u64,
    call: ProviderCallKind,
    result: Result<(), ProviderError>,
    now_ms: u64,
) {
    if generation != state.generation {
        debug!(
            stale = generation,
            current = state.generation,
            call = ?call,
            "discarding provider result from a superseded call"
        );
        return;
    }

    state.submission_in_flight = false;
    match result {
        Ok(()) => {
            state.last_error = None;
            apply_success(state, call, now_ms);
        }
        Err(err) => {
            // Surfaced verbatim; the stage does not advance.
            state.last_error = Some(err.message);
        }
    }
}

fn apply_success(state: &mut FlowState, call: ProviderCallKind, now_ms: u64) {
    match call {
        ProviderCallKind::PasswordSignIn | ProviderCallKind::OtpVerify => {
            // Terminal for this flow; session propagation is external.
            state.authenticated = true;
        }
        ProviderCallKind::SignUp => {
            state.stage = Stage::AwaitingEmailConfirmation;
        }
        ProviderCallKind::OtpDispatch => {
            // Covers both the first dispatch and a resend: the window and
            // lock open together, atomically.
            state.stage = Stage::AwaitingOtp;
            state.otp_window = Some(OtpWindow::open_at(now_ms));
            state.resend_lock = true;
        }
        // Reset confirmation is out-of-band; federated control already left.
        ProviderCallKind::PasswordReset | ProviderCallKind::FederatedSignIn => {}
    }
}
