use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh, time-ordered identifier. Never the nil value.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(SessionId);
uuid_id!(RequestId);

impl SessionId {
    /// Reserved value meaning "no session applies". Minting never yields it.
    pub const EMPTY: Self = Self(Uuid::nil());

    pub fn is_empty(&self) -> bool {
        self.0.is_nil()
    }
}

impl RequestId {
    /// Echoed when a frame is too malformed to recover its request id.
    pub const UNKNOWN: Self = Self(Uuid::nil());
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn minted_session_is_never_empty() {
        for _ in 0..1000 {
            assert!(!SessionId::new().is_empty());
        }
    }

    #[test]
    fn empty_sentinel_is_nil() {
        assert!(SessionId::EMPTY.is_empty());
        assert!(SessionId::EMPTY.as_uuid().is_nil());
        assert_eq!(SessionId::EMPTY.to_string(), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn monotonic_ordering() {
        let ids: Vec<RequestId> = (0..100).map(|_| RequestId::new()).collect();
        for w in ids.windows(2) {
            assert!(w[0] < w[1], "not monotonic: {} >= {}", w[0], w[1]);
        }
    }

    #[test]
    fn from_str_rejects_garbage() {
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }

    #[test]
    fn serializes_as_plain_uuid_string() {
        let id: SessionId = "6f1c2a8e-0d4b-4a39-9d55-2a0e6c1f7b10".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"6f1c2a8e-0d4b-4a39-9d55-2a0e6c1f7b10\"");
    }

    proptest! {
        #[test]
        fn display_parses_back(bytes in any::<[u8; 16]>()) {
            let id = SessionId::from_uuid(Uuid::from_bytes(bytes));
            let parsed: SessionId = id.to_string().parse().unwrap();
            prop_assert_eq!(id, parsed);
            prop_assert_eq!(parsed.is_empty(), bytes == [0u8; 16]);
        }
    }
}
