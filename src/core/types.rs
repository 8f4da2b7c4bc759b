use serde::{Deserialize, Serialize};

/// Docking side of an axis relative to the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
    /// Horizontal axis drawn across the plot area at `axis_center_position`.
    CenterHor,
    /// Vertical axis drawn across the plot area at `axis_center_position`.
    CenterVer,
}

impl Side {
    pub const ALL: [Side; 6] = [
        Side::Left,
        Side::Right,
        Side::Top,
        Side::Bottom,
        Side::CenterHor,
        Side::CenterVer,
    ];

    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom | Self::CenterHor)
    }

    #[must_use]
    pub const fn is_vertical(self) -> bool {
        !self.is_horizontal()
    }

    #[must_use]
    pub const fn is_center(self) -> bool {
        matches!(self, Self::CenterHor | Self::CenterVer)
    }

    #[must_use]
    pub const fn orientation(self) -> Orientation {
        if self.is_horizontal() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// Shrinks the rectangle by `insets`, never producing negative sizes.
    #[must_use]
    pub fn inset(self, insets: Insets) -> Self {
        Self {
            x: self.x + insets.left,
            y: self.y + insets.top,
            width: (self.width - insets.left - insets.right).max(0.0),
            height: (self.height - insets.top - insets.bottom).max(0.0),
        }
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Stable handle of an axis attached to a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AxisId(u32);

impl AxisId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::{Insets, Rect, Side};

    #[test]
    fn side_orientation_is_exhaustive() {
        let horizontal: Vec<Side> = Side::ALL
            .into_iter()
            .filter(|side| side.is_horizontal())
            .collect();
        assert_eq!(horizontal, vec![Side::Top, Side::Bottom, Side::CenterHor]);
        assert!(Side::ALL.iter().all(|s| s.is_horizontal() != s.is_vertical()));
    }

    #[test]
    fn inset_never_goes_negative() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0).inset(Insets::uniform(8.0));
        assert_eq!(rect.width, 0.0);
        assert_eq!(rect.height, 0.0);
        assert_eq!(rect.x, 8.0);
    }
}
