//! Policy flags ("events")
//!
//! Each region carries a set of independently toggleable behaviors. The set
//! is stored as a bitmask and persisted as a list of flag names.

use std::fmt;
use std::str::FromStr;

use serde::de::{Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// One toggleable region behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Event {
    /// Send a message when a participant enters
    EnterMsg,
    /// Send a message when a participant leaves
    LeaveMsg,
    /// Repeat an ambient message while occupied
    Message,
    /// Apply a temporary permission group while inside
    TempGroup,
    /// Kill participants on entry
    Kill,
    /// Grant invulnerability while inside
    Godmode,
    /// Force PvP on
    Pvp,
    /// Force PvP off
    NoPvp,
    /// Lock the PvP toggle
    InvariantPvp,
    /// Deny entry and return to spawn
    Private,
    /// Enforce the projectile ban list
    Projban,
    /// Enforce the item ban list
    Itemban,
    /// Enforce the tile ban list
    Tileban,
    /// Grant the temporary permission list
    TempPerm,
}

impl Event {
    /// Every flag, in display order.
    pub const ALL: [Self; 14] = [
        Self::EnterMsg,
        Self::LeaveMsg,
        Self::Message,
        Self::TempGroup,
        Self::Kill,
        Self::Godmode,
        Self::Pvp,
        Self::NoPvp,
        Self::InvariantPvp,
        Self::Private,
        Self::Projban,
        Self::Itemban,
        Self::Tileban,
        Self::TempPerm,
    ];

    /// Canonical lower-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EnterMsg => "entermsg",
            Self::LeaveMsg => "leavemsg",
            Self::Message => "message",
            Self::TempGroup => "tempgroup",
            Self::Kill => "kill",
            Self::Godmode => "godmode",
            Self::Pvp => "pvp",
            Self::NoPvp => "nopvp",
            Self::InvariantPvp => "invariantpvp",
            Self::Private => "private",
            Self::Projban => "projban",
            Self::Itemban => "itemban",
            Self::Tileban => "tileban",
            Self::TempPerm => "tempperm",
        }
    }

    /// One-line description shown in the command help.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::EnterMsg => "Sends players a message when they enter the region",
            Self::LeaveMsg => "Sends players a message when they leave the region",
            Self::Message => "Sends players a message at the configured interval while inside",
            Self::TempGroup => "Changes a player's group while inside the region",
            Self::Kill => "Kills players on entry",
            Self::Godmode => "Turns on godmode while inside the region",
            Self::Pvp => "Forces PvP on while inside the region",
            Self::NoPvp => "Forces PvP off while inside the region",
            Self::InvariantPvp => "Prevents players from toggling PvP while inside",
            Self::Private => "Keeps players without permission out of the region",
            Self::Projban => "Bans the listed projectiles inside the region",
            Self::Itemban => "Bans the listed items inside the region",
            Self::Tileban => "Bans placing the listed tiles inside the region",
            Self::TempPerm => "Grants the listed permissions while inside the region",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Returns the closest flag name for typo correction.
    ///
    /// Only names within a Damerau-Levenshtein distance of 3 are suggested.
    #[must_use]
    pub fn suggest(input: &str) -> Option<&'static str> {
        let input = input.to_ascii_lowercase();
        Self::ALL
            .iter()
            .map(|e| (e.name(), strsim::damerau_levenshtein(&input, e.name())))
            .filter(|(_, dist)| *dist <= 3)
            .min_by_key(|(_, dist)| *dist)
            .map(|(name, _)| name)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Event {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let found = match lowered.as_str() {
            "entermessage" => Some(Self::EnterMsg),
            "leavemessage" => Some(Self::LeaveMsg),
            "inpvp" => Some(Self::InvariantPvp),
            "temppermission" => Some(Self::TempPerm),
            other => Self::ALL.into_iter().find(|e| e.name() == other),
        };
        found.ok_or_else(|| SchemaError::UnknownEvent {
            name: s.trim().to_string(),
            suggestion: Self::suggest(&lowered).map(str::to_string),
        })
    }
}

/// A set of [`Event`] flags stored as a bitmask.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EventSet(u16);

impl EventSet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns whether `event` is in the set.
    #[must_use]
    pub const fn contains(self, event: Event) -> bool {
        self.0 & event.bit() != 0
    }

    /// Returns whether any flag of `other` is in the set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Adds a flag. Adding a present flag is a no-op.
    pub const fn insert(&mut self, event: Event) {
        self.0 |= event.bit();
    }

    /// Removes a flag. Removing an absent flag is a no-op.
    pub const fn remove(&mut self, event: Event) {
        self.0 &= !event.bit();
    }

    /// Bitwise OR.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Bitwise AND-NOT.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Returns whether the set has no flags.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of flags in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the flags in display order.
    pub fn iter(self) -> impl Iterator<Item = Event> {
        Event::ALL.into_iter().filter(move |e| self.contains(*e))
    }

    /// Parses a comma and/or whitespace separated list of flag names.
    ///
    /// Known names are collected into the returned set; each unknown token
    /// produces one [`SchemaError::UnknownEvent`]. Parsing never stops early.
    #[must_use]
    pub fn parse_list(input: &str) -> (Self, Vec<SchemaError>) {
        let mut set = Self::empty();
        let mut invalid = Vec::new();
        for token in input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            match token.parse::<Event>() {
                Ok(event) => set.insert(event),
                Err(err) => invalid.push(err),
            }
        }
        (set, invalid)
    }
}

impl FromIterator<Event> for EventSet {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        let mut set = Self::empty();
        for event in iter {
            set.insert(event);
        }
        set
    }
}

impl fmt::Debug for EventSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for EventSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        for (i, event) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(event.name())?;
        }
        Ok(())
    }
}

impl Serialize for EventSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for event in self.iter() {
            seq.serialize_element(&event)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for EventSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EventSetVisitor;

        impl<'de> Visitor<'de> for EventSetVisitor {
            type Value = EventSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of event names")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut set = EventSet::empty();
                while let Some(event) = seq.next_element::<Event>()? {
                    set.insert(event);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(EventSetVisitor)
    }
}
