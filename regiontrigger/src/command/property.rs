//! Property alias table for `set-<prop>` commands.

use std::fmt;

/// A settable region property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Policy flags
    Event,
    /// Projectile ban list
    Projban,
    /// Item ban list
    Itemban,
    /// Tile ban list
    Tileban,
    /// Enter message text
    EnterMsg,
    /// Leave message text
    LeaveMsg,
    /// Ambient message text
    Message,
    /// Ambient message interval
    MsgInterval,
    /// Temporary group
    TempGroup,
    /// Temporary permissions
    TempPerm,
}

impl Property {
    /// Every property, in help order.
    pub const ALL: [Self; 10] = [
        Self::Event,
        Self::Projban,
        Self::Itemban,
        Self::Tileban,
        Self::EnterMsg,
        Self::LeaveMsg,
        Self::Message,
        Self::MsgInterval,
        Self::TempGroup,
        Self::TempPerm,
    ];

    /// Accepted spellings; the first one is the short form.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Event => &["e", "event"],
            Self::Projban => &["pb", "proj", "projban"],
            Self::Itemban => &["ib", "item", "itemban"],
            Self::Tileban => &["tb", "tile", "tileban"],
            Self::EnterMsg => &["em", "entermsg"],
            Self::LeaveMsg => &["lm", "leavemsg"],
            Self::Message => &["msg", "message"],
            Self::MsgInterval => &["mi", "msgitv", "msginterval", "messageinterval"],
            Self::TempGroup => &["tg", "tempgroup"],
            Self::TempPerm => &["tp", "perm", "tempperm", "temppermission"],
        }
    }

    /// The short form used in usage messages.
    #[must_use]
    pub const fn short(self) -> &'static str {
        self.aliases()[0]
    }

    /// The long canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Projban => "projban",
            Self::Itemban => "itemban",
            Self::Tileban => "tileban",
            Self::EnterMsg => "entermsg",
            Self::LeaveMsg => "leavemsg",
            Self::Message => "message",
            Self::MsgInterval => "msginterval",
            Self::TempGroup => "tempgroup",
            Self::TempPerm => "tempperm",
        }
    }

    /// Resolves a case-insensitive alias.
    #[must_use]
    pub fn from_alias(alias: &str) -> Option<Self> {
        let alias = alias.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.aliases().contains(&alias.as_str()))
    }

    /// Whether `--del` may be given without a value.
    #[must_use]
    pub const fn allows_bare_delete(self) -> bool {
        matches!(
            self,
            Self::EnterMsg | Self::LeaveMsg | Self::Message | Self::MsgInterval | Self::TempGroup
        )
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve() {
        assert_eq!(Property::from_alias("TB"), Some(Property::Tileban));
        assert_eq!(Property::from_alias("tile"), Some(Property::Tileban));
        assert_eq!(Property::from_alias("messageinterval"), Some(Property::MsgInterval));
        assert_eq!(Property::from_alias("temppermission"), Some(Property::TempPerm));
        assert_eq!(Property::from_alias("bogus"), None);
    }

    #[test]
    fn aliases_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for property in Property::ALL {
            for alias in property.aliases() {
                assert!(seen.insert(*alias), "duplicate alias {alias}");
            }
        }
    }

    #[test]
    fn bare_delete_properties() {
        let allowed: Vec<_> = Property::ALL
            .into_iter()
            .filter(|p| p.allows_bare_delete())
            .map(Property::short)
            .collect();
        assert_eq!(allowed, vec!["em", "lm", "msg", "mi", "tg"]);
    }
}
