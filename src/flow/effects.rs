//! Flow effect types.
//!
//! Effects are the outbound calls returned by the reducer for the runtime to
//! execute. This keeps the reducer pure: it only mutates state and returns
//! at most one provider call per event, never performing I/O itself.

/// A provider call with its request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    /// Create an account; triggers an out-of-band confirmation email.
    SignUp {
        email: String,
        password: String,
        username: String,
    },

    /// Email/password sign-in.
    SignInWithPassword { email: String, password: String },

    /// Dispatch a 6-digit code to a phone number in E.164 form.
    SendOtp { phone_e164: String },

    /// Verify an entered code against the dispatched OTP.
    VerifyOtp { phone_e164: String, code: String },

    /// Initiate a password reset email.
    ResetPassword { email: String, redirect_url: String },

    /// Redirect to a federated identity provider; control leaves the flow.
    FederatedSignIn {
        provider: String,
        redirect_url: String,
    },
}

impl ProviderCall {
    /// The payload-free kind, echoed back with the call's result.
    pub fn kind(&self) -> ProviderCallKind {
        match self {
            ProviderCall::SignUp { .. } => ProviderCallKind::SignUp,
            ProviderCall::SignInWithPassword { .. } => ProviderCallKind::PasswordSignIn,
            ProviderCall::SendOtp { .. } => ProviderCallKind::OtpDispatch,
            ProviderCall::VerifyOtp { .. } => ProviderCallKind::OtpVerify,
            ProviderCall::ResetPassword { .. } => ProviderCallKind::PasswordReset,
            ProviderCall::FederatedSignIn { .. } => ProviderCallKind::FederatedSignIn,
        }
    }
}

/// Which provider operation a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCallKind {
    SignUp,
    PasswordSignIn,
    OtpDispatch,
    OtpVerify,
    PasswordReset,
    FederatedSignIn,
}

/// The zero-or-one outbound action produced by an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEffect {
    /// Generation at issue time; results from older generations are
    /// discarded on arrival.
    pub generation: u64,
    pub call: ProviderCall,
}
