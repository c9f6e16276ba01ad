//! Boundary markers hosted by the status shell.
//!
//! Three markers partition the status bar: `Main` (rightmost, always
//! visible), `Separator` (hide/show boundary) and the optional
//! `AlwaysHiddenSeparator` left of it. A marker expanded to
//! [`BLOCKING_LENGTH`] pushes every icon on its left off screen, and its own
//! position stops being queryable until it shrinks back.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Oversized length used to push icons off screen.
pub const BLOCKING_LENGTH: f64 = 10_000.0;

/// Any length above this is treated as blocking.
pub const BLOCKING_THRESHOLD: f64 = 1_000.0;

/// Returns whether a marker at `length` is in blocking mode.
#[must_use]
pub fn is_blocking(length: f64) -> bool { length > BLOCKING_THRESHOLD }

/// Identity of a boundary marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    /// Primary click target, always visible.
    Main,
    /// Boundary between the visible and hidden zones.
    Separator,
    /// Boundary between the hidden and always-hidden zones.
    AlwaysHiddenSeparator,
}

impl MarkerKind {
    /// All markers, left to right as they are installed.
    pub const ALL: [Self; 3] = [Self::AlwaysHiddenSeparator, Self::Separator, Self::Main];

    /// Stable name the shell uses to remember the marker's position.
    #[must_use]
    pub const fn autosave_name(self) -> &'static str {
        match self {
            Self::Main => "veil_main",
            Self::Separator => "veil_separator",
            Self::AlwaysHiddenSeparator => "veil_always_hidden",
        }
    }

    /// Length of the marker when drawn at visual size.
    #[must_use]
    pub const fn visual_length(self) -> f64 {
        match self {
            Self::Main => 22.0,
            Self::Separator | Self::AlwaysHiddenSeparator => 20.0,
        }
    }

    /// Whether this marker collapses icons when hidden.
    #[must_use]
    pub const fn is_boundary(self) -> bool { !matches!(self, Self::Main) }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Main => "main",
            Self::Separator => "separator",
            Self::AlwaysHiddenSeparator => "always-hidden separator",
        })
    }
}

/// A marker's host window frame along the bar axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerFrame {
    /// Left edge.
    pub x: f64,
    /// Width of the host window.
    pub width: f64,
}

impl MarkerFrame {
    /// Creates a frame.
    #[must_use]
    pub const fn new(x: f64, width: f64) -> Self { Self { x, width } }

    /// Right edge.
    #[must_use]
    pub fn right_edge(&self) -> f64 { self.x + self.width }

    /// A live reading is only trusted when it is finite and on screen.
    #[must_use]
    pub fn is_valid(&self) -> bool { self.x.is_finite() && self.x > 0.0 }
}

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

/// Installed markers and the length each one currently has.
#[derive(Debug, Default, Clone)]
pub struct MarkerSet {
    lengths: HashMap<MarkerKind, f64>,
}

impl MarkerSet {
    /// Records a newly created marker.
    pub fn insert(&mut self, kind: MarkerKind, length: f64) { self.lengths.insert(kind, length); }

    /// Forgets a removed marker.
    pub fn remove(&mut self, kind: MarkerKind) { self.lengths.remove(&kind); }

    /// Whether the marker is installed.
    #[must_use]
    pub fn contains(&self, kind: MarkerKind) -> bool { self.lengths.contains_key(&kind) }

    /// Current length of an installed marker.
    #[must_use]
    pub fn length(&self, kind: MarkerKind) -> Option<f64> { self.lengths.get(&kind).copied() }

    /// Updates the length of an installed marker. Unknown markers are ignored.
    pub fn set_length(&mut self, kind: MarkerKind, length: f64) {
        if let Some(current) = self.lengths.get_mut(&kind) {
            *current = length;
        }
    }

    /// Installed markers in left-to-right order.
    pub fn installed(&self) -> impl Iterator<Item = MarkerKind> + '_ {
        MarkerKind::ALL.into_iter().filter(|kind| self.contains(*kind))
    }
}
