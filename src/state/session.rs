// SPDX-License-Identifier: MPL-2.0

use crate::api::{Credentials, Login};
use std::sync::{Arc, RwLock};

/// Anything that makes authenticated calls and holds its own copy of the token.
pub trait TokenSink: Send + Sync {
    fn set_credentials(&self, credentials: Option<Credentials>);

    fn has_credentials(&self) -> bool;
}

/// Tracks the current login and pushes its token into every registered sink.
///
/// There is no shared auth context: each sink keeps its own field, and this
/// hub is what keeps them in step on login, restore and logout.
#[derive(Default)]
pub struct SessionHub {
    current: RwLock<Option<Login>>,
    sinks: RwLock<Vec<Arc<dyn TokenSink>>>,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink; it immediately receives the active credentials, if any
    pub fn register(&self, sink: Arc<dyn TokenSink>) {
        // Lock order everywhere: sinks, then current
        let mut sinks = self.sinks.write().expect("session lock poisoned");
        let credentials = self.current().as_ref().map(Credentials::from);
        sink.set_credentials(credentials);
        sinks.push(sink);
    }

    pub fn current(&self) -> Option<Login> {
        self.current.read().expect("session lock poisoned").clone()
    }

    /// Make `login` the active session and hand its token to every sink
    pub fn activate(&self, login: Login) {
        let credentials = Credentials::from(&login);
        let sinks = self.sinks.write().expect("session lock poisoned");
        *self.current.write().expect("session lock poisoned") = Some(login);

        for sink in sinks.iter() {
            sink.set_credentials(Some(credentials.clone()));
        }
        tracing::debug!("session token propagated to {} sinks", sinks.len());
    }

    /// Drop the active session and retract the token from every sink
    pub fn clear(&self) {
        let sinks = self.sinks.write().expect("session lock poisoned");
        *self.current.write().expect("session lock poisoned") = None;

        for sink in sinks.iter() {
            sink.set_credentials(None);
        }
    }
}
