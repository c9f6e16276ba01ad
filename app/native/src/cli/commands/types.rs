//! Shared types for CLI commands.

use crate::menubar::Zone;

/// Zone argument accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliZone {
    /// Right of the separator.
    Visible,
    /// Between the separators.
    Hidden,
    /// Left of the always-hidden separator.
    #[value(name = "always-hidden")]
    AlwaysHidden,
}

impl From<CliZone> for Zone {
    fn from(zone: CliZone) -> Self {
        match zone {
            CliZone::Visible => Self::Visible,
            CliZone::Hidden => Self::Hidden,
            CliZone::AlwaysHidden => Self::AlwaysHidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::ValueEnum;

    use super::*;

    #[test]
    fn test_cli_zone_parses_kebab_case() {
        assert_eq!(CliZone::from_str("always-hidden", false), Ok(CliZone::AlwaysHidden));
        assert_eq!(Zone::from(CliZone::Visible), Zone::Visible);
    }
}
