//! The auth flow state machine: state, events, effects, and the reducer.

pub mod effects;
pub mod events;
pub mod reducer;
pub mod state;

pub use effects::{FlowEffect, ProviderCall, ProviderCallKind};
pub use events::{Field, FlowEvent};
pub use reducer::update;
pub use state::{
    CredentialMode, Credentials, FlowSettings, FlowState, Intent, OtpWindow, Stage, OTP_CODE_LEN,
    OTP_WINDOW_MS,
};
