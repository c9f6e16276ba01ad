//! Zone classification.
//!
//! An icon's zone is derived from its midpoint against the marker positions,
//! never stored. The margin grows with icon width so that narrow icons (8px
//! status dots) are not misread by a fixed pixel tolerance, and positions
//! inside the margin resolve toward [`Zone::Hidden`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::icon::HostedIcon;

/// Minimum classification margin in points.
pub const MIN_MARGIN: f64 = 4.0;

/// Share of the icon width used as margin.
pub const MARGIN_WIDTH_RATIO: f64 = 0.3;

/// Where an icon currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Zone {
    /// Right of the separator; always shown.
    Visible,
    /// Between the two separators; shown only while expanded.
    Hidden,
    /// Left of the always-hidden separator; never shown by a normal reveal.
    AlwaysHidden,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::AlwaysHidden => "always-hidden",
        })
    }
}

/// Marker positions used to classify icons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneBoundaries {
    /// Separator left edge.
    pub separator_x: f64,
    /// Always-hidden separator left edge, when that zone exists.
    pub always_hidden_x: Option<f64>,
}

impl ZoneBoundaries {
    /// Classifies an icon.
    #[must_use]
    pub fn classify(&self, icon: &HostedIcon) -> Zone { self.classify_span(icon.x, icon.width) }

    /// Classifies a span starting at `x` with `width`.
    #[must_use]
    pub fn classify_span(&self, x: f64, width: f64) -> Zone {
        let midpoint = x + width / 2.0;
        let margin = classification_margin(width);

        if midpoint > self.separator_x + margin {
            return Zone::Visible;
        }

        match self.always_hidden_x {
            Some(always_hidden_x) if midpoint <= always_hidden_x - margin => Zone::AlwaysHidden,
            _ => Zone::Hidden,
        }
    }
}

/// `max(4, 0.3 * width)`.
#[must_use]
pub fn classification_margin(width: f64) -> f64 { (width * MARGIN_WIDTH_RATIO).max(MIN_MARGIN) }
