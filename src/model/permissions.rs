//! Capability sets granted to the bot on a tenant.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{MonitorError, Result};

/// A set of capabilities, stored as a bit mask.
///
/// Bit values follow the Discord permission layout so a raw permission
/// integer from the platform can be wrapped directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Permissions(u64);

impl Permissions {
    pub const ADMINISTRATOR: Self = Self(1 << 3);
    pub const VIEW_CHANNEL: Self = Self(1 << 10);
    pub const SEND_MESSAGES: Self = Self(1 << 11);
    pub const EMBED_LINKS: Self = Self(1 << 14);
    pub const READ_MESSAGE_HISTORY: Self = Self(1 << 16);
    pub const MENTION_EVERYONE: Self = Self(1 << 17);
    pub const MANAGE_WEBHOOKS: Self = Self(1 << 29);

    const NAMED: [(&'static str, Permissions); 7] = [
        ("ADMINISTRATOR", Self::ADMINISTRATOR),
        ("VIEW_CHANNEL", Self::VIEW_CHANNEL),
        ("SEND_MESSAGES", Self::SEND_MESSAGES),
        ("EMBED_LINKS", Self::EMBED_LINKS),
        ("READ_MESSAGE_HISTORY", Self::READ_MESSAGE_HISTORY),
        ("MENTION_EVERYONE", Self::MENTION_EVERYONE),
        ("MANAGE_WEBHOOKS", Self::MANAGE_WEBHOOKS),
    ];

    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Wrap a raw bit mask.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw bit mask.
    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check whether every capability in `required` is granted.
    ///
    /// `ADMINISTRATOR` satisfies any requirement.
    pub fn contains(self, required: Self) -> bool {
        if self.0 & Self::ADMINISTRATOR.0 != 0 {
            return true;
        }
        self.0 & required.0 == required.0
    }

    /// Look up a single capability by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_uppercase();
        Self::NAMED
            .iter()
            .find(|(n, _)| *n == upper)
            .map(|(_, p)| *p)
    }

    /// Build a set from capability names.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().try_fold(Self::empty(), |acc, name| {
            let name = name.as_ref();
            Self::from_name(name)
                .map(|p| acc.union(p))
                .ok_or_else(|| MonitorError::Config(format!("unknown permission: {}", name)))
        })
    }

    /// Names of the capabilities in this set.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(_, p)| self.0 & p.0 != 0)
            .map(|(n, _)| *n)
            .collect()
    }
}

impl std::ops::BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(" | "))
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.names().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Self::from_names(&names).map_err(serde::de::Error::custom)
    }
}
