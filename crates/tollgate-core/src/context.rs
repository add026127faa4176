use serde::{Deserialize, Serialize};

/// Authenticated caller attached to every inbound request
///
/// The real authentication layer lives in front of the gateway; by the
/// time a request reaches a handler it carries this identity as a request
/// extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier
    pub id_user: i64,
}

impl Identity {
    pub const fn new(id_user: i64) -> Self {
        Self { id_user }
    }
}
