use std::sync::{Arc, Mutex};

use fixit_config::Config;
use fixit_core::Resolver;
use fixit_types::CaptureState;

pub struct AppState {
    pub config: Config,
    pub resolver: Resolver,
    pub capture: Arc<CaptureGate>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let resolver = Resolver::from_config(&config);
        Self::with_resolver(config, resolver)
    }

    pub fn with_resolver(config: Config, resolver: Resolver) -> Self {
        Self {
            config,
            resolver,
            capture: Arc::new(CaptureGate::default()),
        }
    }
}

/// Lets one capture run at a time; triggers while busy are dropped
#[derive(Default)]
pub struct CaptureGate {
    state: Mutex<CaptureState>,
}

impl CaptureGate {
    pub fn state(&self) -> CaptureState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Move to `Capturing`, or `None` if a capture is already running
    pub fn try_begin(self: &Arc<Self>) -> Option<CaptureTicket> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == CaptureState::Capturing {
            return None;
        }

        *state = CaptureState::Capturing;
        Some(CaptureTicket {
            gate: Arc::clone(self),
        })
    }
}

/// Held for the duration of a capture; returns the gate to `Idle` on drop
pub struct CaptureTicket {
    gate: Arc<CaptureGate>,
}

impl Drop for CaptureTicket {
    fn drop(&mut self) {
        *self.gate.state.lock().unwrap_or_else(|e| e.into_inner()) = CaptureState::Idle;
    }
}
