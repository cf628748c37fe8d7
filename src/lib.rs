//! Authentication flow state machine.
//!
//! A user-facing authentication flow supporting two credential modes
//! (email/password, phone/OTP) and two intents (login, sign-up), with a
//! time-bounded OTP challenge, resend throttling, and password-reset
//! initiation.
//!
//! The flow itself never validates a credential. It is a pure reducer:
//! [`flow::update`] takes the current [`flow::FlowState`] and a
//! [`flow::FlowEvent`] and returns at most one outbound
//! [`flow::FlowEffect`]. The [`runtime::AuthRuntime`] executes effects
//! against an [`provider::IdentityProvider`] and feeds results back through
//! its event inbox, alongside a once-per-second tick while an OTP window is
//! open.

pub mod config;
pub mod flow;
pub mod provider;
pub mod runtime;
