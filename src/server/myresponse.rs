use serde::{Deserialize, Serialize};

use crate::{service::notice::Notice, timing::schedule::Schedule};

/// Body of `/api/status`.
///
/// `notice` is only present while the restaurant is closed.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StatusResponse {
    pub open: bool,
    pub notice: Option<Notice>,
}

impl StatusResponse {
    pub fn new(notice: Option<Notice>) -> Self {
        Self {
            open: notice.is_none(),
            notice,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SubmitResponse {
    pub message: String,
    pub schedule: Schedule,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NonceResponse {
    pub nonce: String,
}
