#![forbid(unsafe_code)]

//! Host-to-tour action channel.
//!
//! [`ActionBridge`] is the handle the host keeps. It holds a single slot:
//! whichever controller registered last receives every reported action.
//! Re-registration replaces the previous receiver, it never queues behind it.
//!
//! The bridge does no filtering. It hands names to the registered
//! [`ActionMailbox`], and the controller decides what they mean for the step
//! that is current when it drains them.
//!
//! # Example
//!
//! ```
//! use waypoint_tour::bridge::ActionBridge;
//!
//! let bridge = ActionBridge::new();
//! assert!(!bridge.report_action("ignored"));
//!
//! let mailbox = bridge.install();
//! assert!(bridge.report_action("modal-opened"));
//! assert_eq!(mailbox.drain(), vec!["modal-opened".to_string()]);
//! ```

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct Registration {
    id: u64,
    sender: Sender<String>,
}

#[derive(Debug, Default)]
struct Slot {
    next_id: u64,
    current: Option<Registration>,
}

/// Cloneable host-side handle for reporting actions.
#[derive(Clone, Default)]
pub struct ActionBridge {
    slot: Arc<Mutex<Slot>>,
}

impl fmt::Debug for ActionBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionBridge")
            .field("registered", &self.is_registered())
            .finish()
    }
}

impl ActionBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a semantic host event.
    ///
    /// Returns `false` when no receiver is installed; the action is dropped.
    pub fn report_action(&self, name: impl Into<String>) -> bool {
        let name = name.into();
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        let Some(registration) = slot.current.as_ref() else {
            tracing::debug!(action = %name, "action reported with no handler installed");
            return false;
        };
        if registration.sender.send(name).is_err() {
            // Receiver dropped without unregistering.
            slot.current = None;
            return false;
        }
        true
    }

    /// Whether a receiver is currently installed.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .current
            .is_some()
    }

    /// Install a fresh receiver, replacing any previous one.
    pub fn install(&self) -> ActionMailbox {
        let (sender, receiver) = mpsc::channel();
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        let id = slot.next_id;
        slot.next_id += 1;
        if slot.current.is_some() {
            tracing::debug!(registration = id, "action handler replaced");
        }
        slot.current = Some(Registration { id, sender });
        ActionMailbox {
            id,
            slot: Arc::clone(&self.slot),
            receiver,
        }
    }
}

/// Receiving end owned by a controller.
pub struct ActionMailbox {
    id: u64,
    slot: Arc<Mutex<Slot>>,
    receiver: Receiver<String>,
}

impl fmt::Debug for ActionMailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionMailbox")
            .field("id", &self.id)
            .field("installed", &self.is_installed())
            .finish()
    }
}

impl ActionMailbox {
    /// Take every action reported so far, in report order.
    #[must_use]
    pub fn drain(&self) -> Vec<String> {
        self.receiver.try_iter().collect()
    }

    /// Whether this mailbox still occupies the bridge's slot.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .current
            .as_ref()
            .is_some_and(|r| r.id == self.id)
    }

    /// Vacate the slot if this mailbox still holds it.
    ///
    /// A newer registration is left alone. Returns whether the slot was
    /// cleared.
    pub fn unregister(self) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if slot.current.as_ref().is_some_and(|r| r.id == self.id) {
            slot.current = None;
            true
        } else {
            false
        }
    }
}
