//! Anchor resolution: entity rect + dock position → container-relative point.

use crate::error::{Error, Result};
use crate::geom::{EntityRect, Point, point};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

pub const DEFAULT_PADDING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DockPosition {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    TopCenter,
    BottomCenter,
    LeftCenter,
    RightCenter,
    North,
    South,
    West,
    East,
}

impl DockPosition {
    pub const ALL: [DockPosition; 17] = [
        Self::Top,
        Self::Bottom,
        Self::Left,
        Self::Right,
        Self::Center,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
        Self::TopCenter,
        Self::BottomCenter,
        Self::LeftCenter,
        Self::RightCenter,
        Self::North,
        Self::South,
        Self::West,
        Self::East,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::TopCenter => "top-center",
            Self::BottomCenter => "bottom-center",
            Self::LeftCenter => "left-center",
            Self::RightCenter => "right-center",
            Self::North => "north",
            Self::South => "south",
            Self::West => "west",
            Self::East => "east",
        }
    }

    /// Collapses the compass aliases onto their edge docks.
    pub fn canonical(self) -> Self {
        match self {
            Self::North => Self::Top,
            Self::South => Self::Bottom,
            Self::West => Self::Left,
            Self::East => Self::Right,
            other => other,
        }
    }

    /// Fractional position inside the rect plus the outward unit normal scaled by padding.
    fn table(self) -> (f64, f64, f64, f64) {
        match self {
            Self::Top | Self::North => (0.5, 0.0, 0.0, -1.0),
            Self::Bottom | Self::South => (0.5, 1.0, 0.0, 1.0),
            Self::Left | Self::West => (0.0, 0.5, -1.0, 0.0),
            Self::Right | Self::East => (1.0, 0.5, 1.0, 0.0),
            Self::Center => (0.5, 0.5, 0.0, 0.0),
            Self::TopLeft => (0.0, 0.0, 0.0, 0.0),
            Self::TopRight => (1.0, 0.0, 0.0, 0.0),
            Self::BottomLeft => (0.0, 1.0, 0.0, 0.0),
            Self::BottomRight => (1.0, 1.0, 0.0, 0.0),
            Self::TopCenter => (0.5, 0.0, 0.0, 0.0),
            Self::BottomCenter => (0.5, 1.0, 0.0, 0.0),
            Self::LeftCenter => (0.0, 0.5, 0.0, 0.0),
            Self::RightCenter => (1.0, 0.5, 0.0, 0.0),
        }
    }
}

impl FromStr for DockPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == key)
            .ok_or(Error::UnknownDock { name: key })
    }
}

impl Serialize for DockPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DockPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Resolves the anchor for `dock` on `rect`.
///
/// A missing rect (no entity, no container) yields the origin. Callers decide whether the origin
/// means "unresolved".
pub fn resolve(rect: Option<&EntityRect>, dock: DockPosition, padding: f64) -> Point {
    let Some(rect) = rect else {
        return point(0.0, 0.0);
    };
    let (fx, fy, nx, ny) = dock.table();
    point(
        rect.x + rect.width * fx + nx * padding,
        rect.y + rect.height * fy + ny * padding,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_dock_sits_padding_above_edge() {
        let r = EntityRect::new(10.0, 10.0, 20.0, 10.0);
        assert_eq!(resolve(Some(&r), DockPosition::Top, DEFAULT_PADDING), point(20.0, 5.0));
    }

    #[test]
    fn missing_rect_resolves_to_origin() {
        assert_eq!(resolve(None, DockPosition::Right, 5.0), point(0.0, 0.0));
    }

    #[test]
    fn aliases_match_edge_docks() {
        let r = EntityRect::new(-3.0, 7.5, 41.0, 13.0);
        for (alias, edge) in [
            (DockPosition::North, DockPosition::Top),
            (DockPosition::South, DockPosition::Bottom),
            (DockPosition::West, DockPosition::Left),
            (DockPosition::East, DockPosition::Right),
        ] {
            assert_eq!(alias.canonical(), edge);
            assert_eq!(resolve(Some(&r), alias, 5.0), resolve(Some(&r), edge, 5.0));
        }
    }

    #[test]
    fn dock_names_parse_case_insensitively() {
        assert_eq!("Top-Left".parse::<DockPosition>().ok(), Some(DockPosition::TopLeft));
        assert!("middle".parse::<DockPosition>().is_err());
        for d in DockPosition::ALL {
            assert_eq!(d.as_str().parse::<DockPosition>().ok(), Some(d));
        }
    }
}
