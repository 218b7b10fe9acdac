//! Screen identifiers, one per managed resource.

use std::fmt;

use portico_core::ResourceKind;

/// Identifies each screen, navigable by number keys 1-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Announcements, // 1
    Documents,  // 2
    Galleries,  // 3
    News,       // 4
    Violations, // 5
    Roles,      // 6
    Users,      // 7
}

impl ScreenId {
    /// All screens in tab-bar order.
    pub const ALL: [ScreenId; 7] = [
        Self::Announcements,
        Self::Documents,
        Self::Galleries,
        Self::News,
        Self::Violations,
        Self::Roles,
        Self::Users,
    ];

    pub fn kind(self) -> ResourceKind {
        match self {
            Self::Announcements => ResourceKind::Announcements,
            Self::Documents => ResourceKind::Documents,
            Self::Galleries => ResourceKind::Galleries,
            Self::News => ResourceKind::News,
            Self::Violations => ResourceKind::Violations,
            Self::Roles => ResourceKind::Roles,
            Self::Users => ResourceKind::Users,
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }

    /// Numeric key (1-7) for this screen.
    pub fn number(self) -> usize {
        self.position() + 1
    }

    /// Screen from a numeric key. `None` when out of range.
    pub fn from_number(n: usize) -> Option<Self> {
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    /// Previous screen in tab order (wraps around).
    pub fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        self.kind().label()
    }
}

impl From<ResourceKind> for ScreenId {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Announcements => Self::Announcements,
            ResourceKind::Documents => Self::Documents,
            ResourceKind::Galleries => Self::Galleries,
            ResourceKind::News => Self::News,
            ResourceKind::Violations => Self::Violations,
            ResourceKind::Roles => Self::Roles,
            ResourceKind::Users => Self::Users,
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_round_trip() {
        for id in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(id.number()), Some(id));
        }
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(8), None);
    }

    #[test]
    fn tab_order_wraps() {
        assert_eq!(ScreenId::Users.next(), ScreenId::Announcements);
        assert_eq!(ScreenId::Announcements.prev(), ScreenId::Users);
        assert_eq!(ScreenId::News.next(), ScreenId::Violations);
    }

    #[test]
    fn kinds_map_both_ways() {
        for id in ScreenId::ALL {
            assert_eq!(ScreenId::from(id.kind()), id);
        }
    }
}
