//! Arena geometry for the burger-war field, in centimetres.
//!
//! The field is a square rotated 45°: its edges are the four lines
//! `y = ±x ± 170`, so a point is on the field when `|x| + |y| <= 170`.
//! Five boxes stand on it (one in the centre, four around it) and the robot
//! starts at `(0, -150)` facing `+y`.

use std::f32::consts::FRAC_PI_2;
use std::fmt;

pub const HALF_EXTENT_CM: f32 = 170.0;
const CENTER_BOX_CM: (f32, f32) = (35.0, 35.0);
const SIDE_BOX_CM: (f32, f32) = (20.0, 15.0);
const SIDE_BOX_OFFSET_CM: f32 = 53.0;

/// Upright rectangle given by its centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRect {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
}

impl FieldRect {
    /// Lower-left corner.
    pub fn origin(&self) -> (f32, f32) {
        (
            self.center_x - self.width / 2.0,
            self.center_y - self.height / 2.0,
        )
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        (x - self.center_x).abs() <= self.width / 2.0
            && (y - self.center_y).abs() <= self.height / 2.0
    }
}

/// `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryLine {
    pub slope: f32,
    pub intercept: f32,
}

impl BoundaryLine {
    pub fn y_at(&self, x: f32) -> f32 {
        self.slope * x + self.intercept
    }
}

/// Robot pose marker: a circle with a heading arrow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotMarker {
    pub x: f32,
    pub y: f32,
    pub heading_rad: f32,
    pub radius: f32,
    pub arrow_length: f32,
}

impl RobotMarker {
    pub fn arrow_tip(&self) -> (f32, f32) {
        (
            self.x + self.heading_rad.cos() * self.arrow_length,
            self.y + self.heading_rad.sin() * self.arrow_length,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
    half_extent: f32,
    obstacles: Vec<FieldRect>,
    marker: RobotMarker,
}

impl FieldMap {
    pub fn burger_war() -> Self {
        let (cw, ch) = CENTER_BOX_CM;
        let (sw, sh) = SIDE_BOX_CM;
        let d = SIDE_BOX_OFFSET_CM;
        let side = |cx: f32, cy: f32| FieldRect {
            center_x: cx,
            center_y: cy,
            width: sw,
            height: sh,
        };
        Self {
            half_extent: HALF_EXTENT_CM,
            obstacles: vec![
                FieldRect {
                    center_x: 0.0,
                    center_y: 0.0,
                    width: cw,
                    height: ch,
                },
                side(-d, -d),
                side(d, -d),
                side(-d, d),
                side(d, d),
            ],
            marker: RobotMarker {
                x: 0.0,
                y: -150.0,
                heading_rad: FRAC_PI_2,
                radius: 6.0,
                arrow_length: 15.0,
            },
        }
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    /// Centre box first, then the four side boxes.
    pub fn obstacles(&self) -> &[FieldRect] {
        &self.obstacles
    }

    pub fn boundary_lines(&self) -> [BoundaryLine; 4] {
        let e = self.half_extent;
        [
            BoundaryLine {
                slope: 1.0,
                intercept: e,
            },
            BoundaryLine {
                slope: 1.0,
                intercept: -e,
            },
            BoundaryLine {
                slope: -1.0,
                intercept: e,
            },
            BoundaryLine {
                slope: -1.0,
                intercept: -e,
            },
        ]
    }

    pub fn robot_marker(&self) -> RobotMarker {
        self.marker
    }

    /// Whether `(x, y)` lies on the field (edges included).
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x.abs() + y.abs() <= self.half_extent
    }

    /// Whether `(x, y)` is inside any obstacle box.
    pub fn blocked(&self, x: f32, y: f32) -> bool {
        self.obstacles.iter().any(|o| o.contains(x, y))
    }
}

impl fmt::Display for FieldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field ±{} cm, {} boxes, start ({}, {}) heading {:.0}°",
            self.half_extent,
            self.obstacles.len(),
            self.marker.x,
            self.marker.y,
            self.marker.heading_rad.to_degrees()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_boxes_with_expected_extents() {
        let map = FieldMap::burger_war();
        let obstacles = map.obstacles();
        assert_eq!(obstacles.len(), 5);
        assert_eq!(obstacles[0].origin(), (-17.5, -17.5));
        assert_eq!(obstacles[1].origin(), (-63.0, -60.5));
        assert_eq!(obstacles[4].origin(), (43.0, 45.5));
    }

    #[test]
    fn boundary_is_a_diamond() {
        let map = FieldMap::burger_war();
        assert!(map.contains(0.0, 0.0));
        assert!(map.contains(0.0, -170.0));
        assert!(map.contains(85.0, 85.0));
        assert!(!map.contains(100.0, 100.0));
        assert!(!map.contains(-171.0, 0.0));
    }

    #[test]
    fn boundary_lines_pass_through_corners() {
        let lines = FieldMap::burger_war().boundary_lines();
        // (0, 170) is on y = x + 170 and y = -x + 170.
        assert_eq!(lines[0].y_at(0.0), 170.0);
        assert_eq!(lines[2].y_at(0.0), 170.0);
        // (170, 0) is on y = x - 170 and y = -x + 170.
        assert_eq!(lines[1].y_at(170.0), 0.0);
        assert_eq!(lines[2].y_at(170.0), 0.0);
        assert_eq!(lines[3].y_at(-170.0), 0.0);
    }

    #[test]
    fn robot_starts_facing_the_centre() {
        let map = FieldMap::burger_war();
        let marker = map.robot_marker();
        assert!(map.contains(marker.x, marker.y));
        assert!(!map.blocked(marker.x, marker.y));
        let (tx, ty) = marker.arrow_tip();
        assert!(tx.abs() < 1e-4);
        assert!((ty + 135.0).abs() < 1e-4);
    }

    #[test]
    fn centre_is_blocked() {
        let map = FieldMap::burger_war();
        assert!(map.blocked(0.0, 0.0));
        assert!(map.blocked(53.0, -53.0));
        assert!(!map.blocked(30.0, 0.0));
    }

    #[test]
    fn display_summarises_the_field() {
        let text = FieldMap::burger_war().to_string();
        assert_eq!(text, "field ±170 cm, 5 boxes, start (0, -150) heading 90°");
    }
}
