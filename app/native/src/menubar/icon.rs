//! Third-party status items and drag plans.

use serde::{Deserialize, Serialize};

/// Stable identity of a hosted icon.
///
/// `owner_id` is the process/bundle identity. Hosts that publish several
/// icons are told apart by `ax_id` when the host sets one, otherwise by
/// `status_index` (position among the owner's icons). System menu extras carry
/// a `menu_extra_id` that is stable on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconIdentity {
    /// Owning process or bundle identifier.
    pub owner_id: String,
    /// Stable system menu-extra key, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_extra_id: Option<String>,
    /// Accessibility identifier set by the host, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ax_id: Option<String>,
    /// Position among the owner's icons when nothing else disambiguates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_index: Option<usize>,
}

impl IconIdentity {
    /// Identity with only an owner.
    #[must_use]
    pub fn owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            menu_extra_id: None,
            ax_id: None,
            status_index: None,
        }
    }
}

/// A third-party status item as reported by the accessibility collaborator.
///
/// Read-only: the engine only ever changes its position through simulated
/// drags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedIcon {
    /// Stable identity.
    pub identity: IconIdentity,
    /// Left edge.
    pub x: f64,
    /// Width.
    pub width: f64,
}

impl HostedIcon {
    /// Creates an icon.
    #[must_use]
    pub const fn new(identity: IconIdentity, x: f64, width: f64) -> Self {
        Self { identity, x, width }
    }

    /// Horizontal midpoint.
    #[must_use]
    pub fn midpoint(&self) -> f64 { self.x + self.width / 2.0 }

    /// Whether `other` is the same icon, possibly at another position.
    #[must_use]
    pub fn is_same_icon(&self, other: &Self) -> bool { self.identity == other.identity }
}

/// Target and clamp for one simulated drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPlan {
    /// Where the icon should be dropped.
    pub target_x: f64,
    /// Drops left of this X are pulled back (don't overshoot an inner boundary).
    pub min_x: Option<f64>,
    /// Drops right of this X are pulled back (don't pass the main marker).
    pub max_x: Option<f64>,
}

impl DragPlan {
    /// A plan without clamps.
    #[must_use]
    pub const fn to(target_x: f64) -> Self { Self { target_x, min_x: None, max_x: None } }

    /// Adds a lower clamp.
    #[must_use]
    pub const fn not_left_of(mut self, min_x: f64) -> Self {
        self.min_x = Some(min_x);
        self
    }

    /// Adds an upper clamp.
    #[must_use]
    pub const fn not_right_of(mut self, max_x: f64) -> Self {
        self.max_x = Some(max_x);
        self
    }

    /// The drop X after applying both clamps.
    #[must_use]
    pub fn clamped_target(&self) -> f64 {
        let mut x = self.target_x;
        if let Some(min_x) = self.min_x {
            x = x.max(min_x);
        }
        if let Some(max_x) = self.max_x {
            x = x.min(max_x);
        }
        x
    }
}
