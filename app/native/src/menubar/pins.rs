//! Persisted always-hidden pins.
//!
//! A pin is stored as a single string and parsed once into a
//! [`PinnedIdentifier`]. Encodings:
//!
//! | Variant       | Encoding                     |
//! |---------------|------------------------------|
//! | `MenuExtra`   | `menuextra:<key>`            |
//! | `AxId`        | `<owner>::axid:<id>`         |
//! | `StatusIndex` | `<owner>::statusItem:<n>`    |
//! | `BareOwner`   | `<owner>`                    |

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::icon::{HostedIcon, IconIdentity};

const MENU_EXTRA_PREFIX: &str = "menuextra:";
const AX_ID_SEPARATOR: &str = "::axid:";
const STATUS_INDEX_SEPARATOR: &str = "::statusItem:";

/// Why a stored pin string could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PinParseError {
    #[error("empty pin")]
    Empty,
    #[error("missing owner in `{0}`")]
    MissingOwner(String),
    #[error("missing identifier in `{0}`")]
    MissingIdentifier(String),
    #[error("invalid status item index in `{0}`")]
    InvalidIndex(String),
    #[error("malformed pin `{0}`")]
    Malformed(String),
}

/// A parsed pin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PinnedIdentifier {
    /// Stable system menu-extra key.
    MenuExtra(String),
    /// Owner plus the accessibility identifier the host set.
    AxId { owner: String, id: String },
    /// Owner plus position among its icons.
    StatusIndex { owner: String, index: usize },
    /// Owner only; resolves when the owner hosts exactly one icon.
    BareOwner(String),
}

impl PinnedIdentifier {
    /// The most specific pin for an icon.
    #[must_use]
    pub fn for_icon(identity: &IconIdentity) -> Self {
        if let Some(key) = &identity.menu_extra_id {
            return Self::MenuExtra(key.clone());
        }
        if let Some(id) = &identity.ax_id {
            return Self::AxId { owner: identity.owner_id.clone(), id: id.clone() };
        }
        if let Some(index) = identity.status_index {
            return Self::StatusIndex { owner: identity.owner_id.clone(), index };
        }
        Self::BareOwner(identity.owner_id.clone())
    }

    /// Owner encoded in the pin, if it carries one.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        match self {
            Self::MenuExtra(_) => None,
            Self::AxId { owner, .. } | Self::StatusIndex { owner, .. } | Self::BareOwner(owner) => {
                Some(owner)
            }
        }
    }

    /// Whether this pin designates `identity`.
    #[must_use]
    pub fn matches(&self, identity: &IconIdentity) -> bool {
        match self {
            Self::MenuExtra(key) => identity.menu_extra_id.as_deref() == Some(key.as_str()),
            Self::AxId { owner, id } => {
                &identity.owner_id == owner && identity.ax_id.as_deref() == Some(id.as_str())
            }
            Self::StatusIndex { owner, index } => {
                &identity.owner_id == owner && identity.status_index == Some(*index)
            }
            Self::BareOwner(owner) => &identity.owner_id == owner,
        }
    }

    /// Resolves the pin against the icons currently hosted.
    ///
    /// Exact stable key first, then exact sub-identifier, then the owner's
    /// only icon. `None` means the icon is not running, which is not an error.
    #[must_use]
    pub fn resolve<'a>(&self, icons: &'a [HostedIcon]) -> Option<&'a HostedIcon> {
        if let Self::MenuExtra(key) = self {
            return icons
                .iter()
                .find(|icon| icon.identity.menu_extra_id.as_deref() == Some(key.as_str()));
        }

        let exact = match self {
            Self::BareOwner(_) => None,
            _ => icons.iter().find(|icon| self.matches(&icon.identity)),
        };
        if exact.is_some() {
            return exact;
        }

        let owner = self.owner()?;
        let mut owned = icons.iter().filter(|icon| icon.identity.owner_id == owner);
        match (owned.next(), owned.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }
}

impl fmt::Display for PinnedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MenuExtra(key) => write!(f, "{MENU_EXTRA_PREFIX}{key}"),
            Self::AxId { owner, id } => write!(f, "{owner}{AX_ID_SEPARATOR}{id}"),
            Self::StatusIndex { owner, index } => write!(f, "{owner}{STATUS_INDEX_SEPARATOR}{index}"),
            Self::BareOwner(owner) => f.write_str(owner),
        }
    }
}

impl FromStr for PinnedIdentifier {
    type Err = PinParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() {
            return Err(PinParseError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(PinParseError::Malformed(raw.to_string()));
        }

        if let Some(key) = raw.strip_prefix(MENU_EXTRA_PREFIX) {
            if key.is_empty() {
                return Err(PinParseError::MissingIdentifier(raw.to_string()));
            }
            return Ok(Self::MenuExtra(key.to_string()));
        }

        if let Some((owner, id)) = raw.split_once(AX_ID_SEPARATOR) {
            let owner = valid_owner(owner, raw)?;
            if id.is_empty() {
                return Err(PinParseError::MissingIdentifier(raw.to_string()));
            }
            return Ok(Self::AxId { owner, id: id.to_string() });
        }

        if let Some((owner, index)) = raw.split_once(STATUS_INDEX_SEPARATOR) {
            let owner = valid_owner(owner, raw)?;
            let index = index.parse().map_err(|_| PinParseError::InvalidIndex(raw.to_string()))?;
            return Ok(Self::StatusIndex { owner, index });
        }

        Ok(Self::BareOwner(valid_owner(raw, raw)?))
    }
}

fn valid_owner(owner: &str, raw: &str) -> Result<String, PinParseError> {
    if owner.is_empty() {
        return Err(PinParseError::MissingOwner(raw.to_string()));
    }
    if owner.contains("::") {
        return Err(PinParseError::Malformed(raw.to_string()));
    }
    Ok(owner.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon(identity: IconIdentity, x: f64) -> HostedIcon { HostedIcon::new(identity, x, 22.0) }

    fn with_ax(owner: &str, id: &str) -> IconIdentity {
        IconIdentity { ax_id: Some(id.to_string()), ..IconIdentity::owner(owner) }
    }

    fn with_index(owner: &str, index: usize) -> IconIdentity {
        IconIdentity { status_index: Some(index), ..IconIdentity::owner(owner) }
    }

    #[test]
    fn test_parse_each_encoding() {
        assert_eq!(
            "menuextra:com.apple.menuextra.battery".parse(),
            Ok(PinnedIdentifier::MenuExtra("com.apple.menuextra.battery".to_string()))
        );
        assert_eq!(
            "com.example.app::axid:sync-status".parse(),
            Ok(PinnedIdentifier::AxId {
                owner: "com.example.app".to_string(),
                id: "sync-status".to_string()
            })
        );
        assert_eq!(
            "com.example.app::statusItem:2".parse(),
            Ok(PinnedIdentifier::StatusIndex { owner: "com.example.app".to_string(), index: 2 })
        );
        assert_eq!(
            "com.example.app".parse(),
            Ok(PinnedIdentifier::BareOwner("com.example.app".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<PinnedIdentifier>(), Err(PinParseError::Empty));
        assert!(matches!("menuextra:".parse::<PinnedIdentifier>(), Err(PinParseError::MissingIdentifier(_))));
        assert!(matches!("::axid:x".parse::<PinnedIdentifier>(), Err(PinParseError::MissingOwner(_))));
        assert!(matches!(
            "com.example.app::statusItem:two".parse::<PinnedIdentifier>(),
            Err(PinParseError::InvalidIndex(_))
        ));
        assert!(matches!("com example".parse::<PinnedIdentifier>(), Err(PinParseError::Malformed(_))));
        for padded in [
            " com.example.app ",
            "com.example.app\n",
            "menuextra:com.apple clock",
            "com.example.app::axid:sync status",
            "\t",
        ] {
            assert!(
                matches!(padded.parse::<PinnedIdentifier>(), Err(PinParseError::Malformed(_))),
                "{padded:?} should not parse"
            );
        }
    }

    #[test]
    fn test_display_matches_encoding() {
        for raw in [
            "menuextra:com.apple.menuextra.clock",
            "com.example.app::axid:sync-status",
            "com.example.app::statusItem:1",
            "com.example.app",
        ] {
            assert_eq!(raw.parse::<PinnedIdentifier>().unwrap().to_string(), raw);
        }
    }

    #[test]
    fn test_for_icon_prefers_most_specific() {
        let mut identity = with_ax("com.example.app", "sync");
        identity.status_index = Some(1);
        assert!(matches!(PinnedIdentifier::for_icon(&identity), PinnedIdentifier::AxId { .. }));

        identity.menu_extra_id = Some("com.example.extra".to_string());
        assert!(matches!(PinnedIdentifier::for_icon(&identity), PinnedIdentifier::MenuExtra(_)));
    }

    #[test]
    fn test_resolve_exact_sub_identifier() {
        let icons = [
            icon(with_ax("com.example.app", "a"), 400.0),
            icon(with_ax("com.example.app", "b"), 450.0),
        ];
        let pin = PinnedIdentifier::AxId { owner: "com.example.app".to_string(), id: "b".to_string() };
        assert_eq!(pin.resolve(&icons).unwrap().x, 450.0);
    }

    #[test]
    fn test_resolve_falls_back_to_lone_owner_icon() {
        let icons = [icon(with_index("com.example.app", 0), 400.0), icon(IconIdentity::owner("other"), 500.0)];
        let pin = PinnedIdentifier::StatusIndex { owner: "com.example.app".to_string(), index: 3 };
        assert_eq!(pin.resolve(&icons).unwrap().x, 400.0);
    }

    #[test]
    fn test_resolve_ambiguous_owner_is_unresolved() {
        let icons = [icon(with_index("com.example.app", 0), 400.0), icon(with_index("com.example.app", 1), 450.0)];
        assert!(PinnedIdentifier::BareOwner("com.example.app".to_string()).resolve(&icons).is_none());
    }

    #[test]
    fn test_resolve_missing_owner_is_unresolved() {
        let icons = [icon(IconIdentity::owner("other"), 500.0)];
        assert!(PinnedIdentifier::BareOwner("com.example.app".to_string()).resolve(&icons).is_none());
    }

    #[test]
    fn test_menu_extra_never_falls_back() {
        let mut identity = IconIdentity::owner("com.apple.controlcenter");
        identity.menu_extra_id = Some("com.apple.menuextra.wifi".to_string());
        let icons = [icon(identity, 800.0)];

        let pin = PinnedIdentifier::MenuExtra("com.apple.menuextra.battery".to_string());
        assert!(pin.resolve(&icons).is_none());
    }
}
