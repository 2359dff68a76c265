use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::error::StoreError;

pub const DEFAULT_NOTICE_MESSAGE: &str =
    "⚠️ The restaurant is currently closed. Orders are only accepted during opening hours.";
pub const DEFAULT_CHECKOUT_MESSAGE: &str =
    "❌ Sorry, the restaurant is closed. Please place your order during opening hours.";
pub const SAVED_MESSAGE: &str = "Schedule saved.";

/// Session storage key the storefront uses to remember a dismissed banner.
pub const NOTICE_DISMISS_KEY: &str = "restaurantScheduleNoticeDismissed";

/// Banner shown on the storefront while the restaurant is closed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub dismiss_key: String,
}

impl Notice {
    pub fn closed(message: &str) -> Self {
        Self {
            message: message.to_string(),
            dismiss_key: NOTICE_DISMISS_KEY.to_string(),
        }
    }
}

/// User facing texts, configurable per deployment.
#[derive(Clone, Debug)]
pub struct Messages {
    pub notice: String,
    pub checkout: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            notice: DEFAULT_NOTICE_MESSAGE.to_string(),
            checkout: DEFAULT_CHECKOUT_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Carries the rejection message shown to the customer.
    #[error("{0}")]
    Closed(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
