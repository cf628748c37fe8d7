//! Flow runtime.
//!
//! Owns the flow state and the identity provider, executes reducer effects
//! by spawning provider calls, and feeds their results back through an event
//! inbox. The clock lives here: the reducer only ever sees `Tick` events
//! with explicit timestamps, so the whole state machine is testable with
//! synthetic time.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::flow::state::FlowSettings;
use crate::flow::{update, FlowEffect, FlowEvent, FlowState, ProviderCall};
use crate::provider::IdentityProvider;

/// Sender for the runtime's event inbox.
pub type FlowEventSender = mpsc::UnboundedSender<FlowEvent>;

/// Receiver for the runtime's event inbox.
pub type FlowEventReceiver = mpsc::UnboundedReceiver<FlowEvent>;

/// Drives a [`FlowState`] against an identity provider.
///
/// All state mutation goes through the reducer; the runtime's only jobs are
/// executing effects, pumping the inbox, and ticking once per second while
/// an OTP window is open.
pub struct AuthRuntime<P> {
    state: FlowState,
    provider: Arc<P>,
    tx: FlowEventSender,
    rx: FlowEventReceiver,
}

impl<P: IdentityProvider + 'static> AuthRuntime<P> {
    pub fn new(provider: P, settings: FlowSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: FlowState::new(settings),
            provider: Arc::new(provider),
            tx,
            rx,
        }
    }

    /// The current flow state, for the presentation layer to render.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// A sender for injecting user events from outside the run loop.
    pub fn sender(&self) -> FlowEventSender {
        self.tx.clone()
    }

    /// The identity provider backing this runtime.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Applies one event and spawns its outbound call, if any.
    ///
    /// Must be called within a tokio runtime context.
    pub fn dispatch(&mut self, event: FlowEvent) {
        if let Some(effect) = update(&mut self.state, event) {
            self.execute(effect);
        }
    }

    /// Receives the next inbox event (provider results, injected user
    /// actions). Embedding frontends call this from their event loop.
    pub async fn next_event(&mut self) -> Option<FlowEvent> {
        self.rx.recv().await
    }

    /// Pumps inbox events until no call is in flight.
    pub async fn settle(&mut self) {
        while self.state.submission_in_flight {
            match self.rx.recv().await {
                Some(event) => self.dispatch(event),
                None => break,
            }
        }
    }

    /// Runs until authentication succeeds, returning the final state.
    ///
    /// Ticks once per second while an OTP window is open; all other events
    /// arrive through the inbox.
    pub async fn run(mut self) -> FlowState {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.state.otp_window.is_some() {
                        self.dispatch(FlowEvent::Tick { now_ms: now_ms() });
                    }
                }
                event = self.rx.recv() => {
                    match event {
                        Some(event) => self.dispatch(event),
                        None => break,
                    }
                }
            }
            if self.state.authenticated {
                break;
            }
        }
        self.state
    }

    fn execute(&self, effect: FlowEffect) {
        let FlowEffect { generation, call } = effect;
        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let event = run_call(provider.as_ref(), generation, call).await;
            if tx.send(event).is_err() {
                debug!("flow inbox closed before the provider result arrived");
            }
        });
    }
}

/// Performs one provider call and wraps the outcome as an inbox event.
async fn run_call<P: IdentityProvider>(
    provider: &P,
    generation: u64,
    call: ProviderCall,
) -> FlowEvent {
    let kind = call.kind();
    let result = match call {
        ProviderCall::SignUp {
            email,
            password,
            username,
        } => provider.sign_up(&email, &password, &username).await,
        ProviderCall::SignInWithPassword { email, password } => {
            provider.sign_in_with_password(&email, &password).await
        }
        ProviderCall::SendOtp { phone_e164 } => provider.send_otp(&phone_e164).await,
        ProviderCall::VerifyOtp { phone_e164, code } => {
            provider.verify_otp(&phone_e164, &code).await
        }
        ProviderCall::ResetPassword {
            email,
            redirect_url,
        } => provider.reset_password(&email, &redirect_url).await,
        ProviderCall::FederatedSignIn {
            provider: name,
            redirect_url,
        } => provider.federated_sign_in(&name, &redirect_url).await,
    };

    if let Err(err) = &result {
        warn!(%err, call = ?kind, "provider call failed");
    }

    FlowEvent::ProviderResult {
        generation,
        call: kind,
        result,
        now_ms: now_ms(),
    }
}

/// Current wall-clock time in epoch milliseconds.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
