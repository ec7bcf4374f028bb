//! Gate behaviour knobs.

use rexpro_session::DEFAULT_GRAPH_OBJECT_NAME;
use serde::{Deserialize, Serialize};

/// What to do after a session request fails metadata validation.
///
/// Either way an `INVALID_MESSAGE_ERROR` response is written first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataPolicy {
    /// Stop after the error response.
    #[default]
    Strict,
    /// Carry on with the kill/create logic using whatever metadata is
    /// readable. Older clients rely on this; it can yield two responses.
    Lenient,
}

impl std::str::FromStr for MetadataPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unknown metadata policy: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub metadata_policy: MetadataPolicy,
    /// How many identifiers to mint before giving up on a create request.
    pub max_mint_attempts: u32,
    /// Variable name for a bound graph when the request names none.
    pub default_graph_obj_name: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            metadata_policy: MetadataPolicy::Strict,
            max_mint_attempts: 3,
            default_graph_obj_name: DEFAULT_GRAPH_OBJECT_NAME.to_owned(),
        }
    }
}
