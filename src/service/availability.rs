use std::sync::Arc;

use log::{debug, info};
use serde_json::Value;

use crate::{
    database::{error::StoreError, sqlite::ScheduleStore},
    sanitizer::schedule::sanitize_schedule,
    timing::{clock::Clock, schedule::Schedule},
};

use super::notice::{CheckoutError, Messages, Notice};

/// Everything the host integration needs from the schedule.
///
/// Three ports: `handle_submit` for the admin form, `is_open` / `render_notice`
/// for the storefront banner and `validate_checkout` as the gate before an order
/// goes through. The service knows nothing about HTTP; the caller decides how the
/// answers are delivered.
#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn ScheduleStore>,
    clock: Arc<dyn Clock>,
    messages: Messages,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn ScheduleStore>, clock: Arc<dyn Clock>, messages: Messages) -> Self {
        Self {
            store,
            clock,
            messages,
        }
    }

    /// Sanitizes a submitted schedule and stores it in place of the current one.
    ///
    /// `raw` is the whole submission, the schedule itself sits under `schedule`.
    /// A submission without one clears the schedule. Returns what was stored.
    pub fn handle_submit(&self, raw: &Value) -> Result<Schedule, StoreError> {
        let schedule = match raw.get("schedule") {
            Some(submitted) => sanitize_schedule(submitted),
            None => Schedule::new(),
        };
        self.store.save(&schedule)?;
        info!("Schedule replaced by admin submission");
        Ok(schedule)
    }

    pub fn schedule(&self) -> Result<Schedule, StoreError> {
        self.store.load()
    }

    pub fn is_open(&self) -> Result<bool, StoreError> {
        let schedule = self.store.load()?;
        let now = self.clock.now();
        let open = schedule.is_open(&now);
        debug!(
            "Open check at {} {} minute {}: {}",
            now.date(),
            now.weekday(),
            now.minutes(),
            open
        );
        Ok(open)
    }

    /// The closed banner, or `None` while open.
    pub fn render_notice(&self) -> Result<Option<Notice>, StoreError> {
        if self.is_open()? {
            return Ok(None);
        }
        Ok(Some(Notice::closed(&self.messages.notice)))
    }

    pub fn validate_checkout(&self) -> Result<(), CheckoutError> {
        if self.is_open()? {
            return Ok(());
        }
        info!("Checkout rejected, restaurant closed");
        Err(CheckoutError::Closed(self.messages.checkout.clone()))
    }
}
