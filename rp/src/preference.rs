//! Persisted display-direction preference

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::Storage;

/// Storage key for the direction flag; present with "true" only in RTL mode
pub const RTL_KEY: &str = "rtlMode";

/// Text direction for the whole interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayDirection {
    #[default]
    Ltr,
    Rtl,
}

impl DisplayDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ltr => Self::Rtl,
            Self::Rtl => Self::Ltr,
        }
    }

    pub fn is_rtl(self) -> bool {
        self == Self::Rtl
    }
}

impl std::fmt::Display for DisplayDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ltr => f.write_str("ltr"),
            Self::Rtl => f.write_str("rtl"),
        }
    }
}

/// Direction flag backed by durable storage, independent of the selection
pub struct DisplayPreference {
    direction: DisplayDirection,
    storage: Arc<dyn Storage>,
}

impl DisplayPreference {
    /// Read the stored flag; absence or a read failure means LTR
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let direction = match storage.get(RTL_KEY) {
            Ok(Some(value)) if value == "true" => DisplayDirection::Rtl,
            Ok(_) => DisplayDirection::Ltr,
            Err(e) => {
                warn!(error = %e, "Failed to read direction preference, using LTR");
                DisplayDirection::Ltr
            }
        };
        debug!(%direction, "DisplayPreference::load: loaded");
        Self { direction, storage }
    }

    pub fn direction(&self) -> DisplayDirection {
        self.direction
    }

    /// Set and persist the direction
    pub fn set(&mut self, direction: DisplayDirection) {
        debug!(%direction, "DisplayPreference::set: called");
        self.direction = direction;
        let result = match direction {
            DisplayDirection::Rtl => self.storage.set(RTL_KEY, "true"),
            DisplayDirection::Ltr => self.storage.remove(RTL_KEY),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist direction preference");
        }
    }

    /// Flip the direction; returns the new value
    pub fn toggle(&mut self) -> DisplayDirection {
        let next = self.direction.flipped();
        self.set(next);
        next
    }
}
