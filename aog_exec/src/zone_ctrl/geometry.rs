//! Corridor geometry and containment test

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths::clamp;

use super::{CorridorConfig, FAR_Y_MAX_RATIO, NEAR_SHIFT_FRACTION, NEAR_Y_MIN_RATIO};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point in frame pixel coordinates, x to the right and y down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// An axis aligned rectangle in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// The corridor for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Corridor {
    pub near_left: Point,
    pub near_right: Point,
    pub far_left: Point,
    pub far_right: Point,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidian distance to the point `(x, y)`.
    pub fn dist_to(&self, x: i32, y: i32) -> f64 {
        util::maths::norm(
            &[self.x as f64, self.y as f64],
            &[x as f64, y as f64]
        ).unwrap_or(std::f64::INFINITY)
    }
}

impl Rect {
    /// Whether `(x, y)` lies inside the rectangle, edges included.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x <= self.x.saturating_add(self.w)
            && y >= self.y && y <= self.y.saturating_add(self.h)
    }
}

impl Corridor {
    /// The corners as a closed polygon: near-left, far-left, far-right,
    /// near-right.
    pub fn quad(&self) -> [Point; 4] {
        [self.near_left, self.far_left, self.far_right, self.near_right]
    }

    /// Whether `(x, y)` lies inside the corridor, edges included.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        point_in_quad(x, y, &self.quad())
    }
}

impl CorridorConfig {
    /// Compute the corridor for the configured frame size.
    pub fn corridor(&self, steering_angle_deg: f64) -> Corridor {
        compute_corridor(self, steering_angle_deg, self.frame_width, self.frame_height)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the corridor corners from the configuration and the current
/// steering angle.
///
/// The near edge is kept in the lower part of the frame, the far edge in the
/// upper part, at least `min_height_px` above the near edge. The far edge
/// shifts laterally towards the turn, the near edge by a tenth as much. All
/// corners are clamped into the frame.
///
/// Vertical positions and half widths are rounded to the nearest pixel; the
/// shifts are truncated towards zero so left and right turns are symmetric.
pub fn compute_corridor(
    config: &CorridorConfig,
    steering_angle_deg: f64,
    frame_w: u32,
    frame_h: u32
) -> Corridor {
    let w = frame_w as f64;
    let h = frame_h as f64;
    let max_x = (frame_w as i32 - 1).max(0);
    let max_y = (frame_h as i32 - 1).max(0);

    // ---- VERTICAL ----

    // Bounds first, then the minimum height, otherwise the bounds could undo
    // the height floor.
    let y_near = clamp(
        &px(h, config.bottom_y_ratio),
        &px(h, NEAR_Y_MIN_RATIO),
        &max_y
    );
    let mut y_far = clamp(
        &px(h, config.top_y_ratio),
        &0,
        &px(h, FAR_Y_MAX_RATIO)
    );
    if y_near - y_far < config.min_height_px {
        y_far = (y_near - config.min_height_px).max(0);
    }

    // ---- HALF WIDTHS ----

    let min_half = px(w, config.min_half_ratio);
    let max_half = px(w, config.max_half_ratio);
    let near_half = clamp(&px(w, config.near_half_width_ratio), &min_half, &max_half);
    let far_half = clamp(&px(w, config.far_half_width_ratio), &min_half, &max_half);

    // ---- STEERING SHIFT ----

    let s = steer_norm(steering_angle_deg, config.max_steering_for_full_shift_deg);
    let shift_far = (s * w * config.max_shift_ratio * config.shift_far_coefficient) as i32;
    let shift_near = (NEAR_SHIFT_FRACTION * shift_far as f64) as i32;

    // ---- CORNERS ----

    let cx = (frame_w / 2) as i32;
    let corner = |x: i32, y: i32| Point::new(
        clamp(&x, &0, &max_x),
        clamp(&y, &0, &max_y)
    );

    Corridor {
        near_left: corner(cx - near_half + shift_near, y_near),
        near_right: corner(cx + near_half + shift_near, y_near),
        far_left: corner(cx - far_half + shift_far, y_far),
        far_right: corner(cx + far_half + shift_far, y_far),
    }
}

/// Whether the point `(px, py)` lies inside the convex quadrilateral `quad`.
///
/// The corners may be given in either winding order. Points on an edge count
/// as inside.
pub fn point_in_quad(px: i32, py: i32, quad: &[Point; 4]) -> bool {
    let mut any_pos = false;
    let mut any_neg = false;

    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];

        let c = cross(a, b, px, py);
        if c > 0 {
            any_pos = true;
        }
        if c < 0 {
            any_neg = true;
        }
    }

    !(any_pos && any_neg)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Ratio of a frame dimension, rounded to the nearest pixel.
fn px(dim: f64, ratio: f64) -> i32 {
    (dim * ratio).round() as i32
}

/// Normalised steering in `[-1, 1]`. Non-finite angles count as straight
/// ahead.
fn steer_norm(steering_angle_deg: f64, max_steering_deg: f64) -> f64 {
    let s = steering_angle_deg / max_steering_deg;
    if s.is_finite() {
        clamp(&s, &-1.0, &1.0)
    }
    else if s.is_nan() {
        0.0
    }
    else {
        s.signum()
    }
}

/// Z component of `(b - a) x (p - a)`.
fn cross(a: Point, b: Point, px: i32, py: i32) -> i128 {
    let (ax, ay) = (a.x as i128, a.y as i128);
    let (bx, by) = (b.x as i128, b.y as i128);
    let (px, py) = (px as i128, py as i128);

    (bx - ax) * (py - ay) - (by - ay) * (px - ax)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::zone_ctrl::{Params, ZoneCtrlError};

    fn config_640x480() -> CorridorConfig {
        CorridorConfig::new(&Params::default(), 640, 480).unwrap()
    }

    #[test]
    fn test_straight_corridor() {
        let cfg = config_640x480();
        let c = cfg.corridor(0.0);

        assert_eq!(c.near_left, Point::new(128, 432));
        assert_eq!(c.near_right, Point::new(512, 432));
        assert_eq!(c.far_left, Point::new(230, 134));
        assert_eq!(c.far_right, Point::new(410, 134));

        // Half widths measured from the centre column
        assert_eq!(320 - c.near_left.x, 192);
        assert_eq!(c.far_right.x - 320, 90);
    }

    #[test]
    fn test_full_right_steering() {
        let cfg = config_640x480();
        let straight = cfg.corridor(0.0);
        let c = cfg.corridor(30.0);

        // Far edge shifts 256 px, the right corner is clamped to the frame
        assert_eq!(c.far_left.x - straight.far_left.x, 256);
        assert_eq!(c.far_right, Point::new(639, 134));

        // Near edge shifts 25 px
        assert_eq!(c.near_left.x - straight.near_left.x, 25);
        assert_eq!(c.near_right.x - straight.near_right.x, 25);

        // Beyond full steering nothing changes
        assert_eq!(cfg.corridor(90.0), c);
    }

    #[test]
    fn test_left_steering_is_mirrored() {
        let cfg = config_640x480();
        let straight = cfg.corridor(0.0);
        let c = cfg.corridor(-15.0);

        assert_eq!(c.far_left.x - straight.far_left.x, -128);
        assert_eq!(c.near_left.x - straight.near_left.x, -12);
    }

    #[test]
    fn test_corridor_invariants() {
        let params = Params::default();
        let ratios = [0.0, 0.1, 0.3, 0.5, 0.55, 0.8, 0.95, 1.0];

        for &bottom in ratios.iter() {
            for &top in ratios.iter() {
                for &half in ratios.iter() {
                    let mut cfg = CorridorConfig::new(&params, 640, 480).unwrap();
                    cfg.bottom_y_ratio = bottom;
                    cfg.top_y_ratio = top;
                    cfg.near_half_width_ratio = half;
                    cfg.far_half_width_ratio = 1.0 - half;

                    let mut angle = -180.0;
                    while angle <= 180.0 {
                        let c = compute_corridor(&cfg, angle, 640, 480);

                        for p in c.quad().iter() {
                            assert!(p.x >= 0 && p.x < 640, "{:?} out of frame", p);
                            assert!(p.y >= 0 && p.y < 480, "{:?} out of frame", p);
                        }
                        assert!(c.far_left.y < c.near_left.y);
                        assert!(c.near_left.y - c.far_left.y >= params.min_height_px);
                        assert_eq!(c.near_left.y, c.near_right.y);
                        assert_eq!(c.far_left.y, c.far_right.y);

                        angle += 7.5;
                    }
                }
            }
        }
    }

    #[test]
    fn test_corridor_invariants_on_small_frames() {
        // Too short for the default minimum height below the near edge limit
        assert!(matches!(
            CorridorConfig::new(&Params::default(), 640, 48),
            Err(ZoneCtrlError::InvalidFrameSize(640, 48))
        ));
        assert!(CorridorConfig::new(&Params::default(), 640, 1).is_err());

        // Smallest accepted heights for a few minimum heights
        for &(min_height_px, frame_h) in [(1, 2), (10, 18), (40, 73), (40, 480)].iter() {
            let params = Params { min_height_px, ..Default::default() };
            let mut cfg = CorridorConfig::new(&params, 64, frame_h).unwrap();

            for &(bottom, top) in [(0.55, 0.80), (0.0, 1.0), (1.0, 0.0), (0.6, 0.6)].iter() {
                cfg.bottom_y_ratio = bottom;
                cfg.top_y_ratio = top;

                for &angle in [-45.0, 0.0, 12.0, 45.0].iter() {
                    let c = compute_corridor(&cfg, angle, 64, frame_h);

                    assert!(c.far_left.y >= 0);
                    assert!(c.near_left.y < frame_h as i32);
                    assert!(c.far_left.y < c.near_left.y, "{:?} at {}px", c, frame_h);
                    assert!(c.near_left.y - c.far_left.y >= min_height_px);
                }
            }
        }

        // One pixel short of the minimum height
        let params = Params { min_height_px: 41, ..Default::default() };
        assert!(CorridorConfig::new(&params, 64, 73).is_err());
    }

    #[test]
    fn test_corridor_is_pure() {
        let cfg = config_640x480();
        assert_eq!(cfg.corridor(12.3), cfg.corridor(12.3));
        assert_eq!(
            compute_corridor(&cfg, -4.0, 320, 240),
            compute_corridor(&cfg, -4.0, 320, 240)
        );
    }

    #[test]
    fn test_non_finite_steering() {
        let cfg = config_640x480();
        assert_eq!(cfg.corridor(std::f64::NAN), cfg.corridor(0.0));
        assert_eq!(cfg.corridor(std::f64::INFINITY), cfg.corridor(30.0));
        assert_eq!(cfg.corridor(std::f64::NEG_INFINITY), cfg.corridor(-30.0));
    }

    #[test]
    fn test_point_in_quad_winding_and_edges() {
        let cw = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        let mut ccw = cw;
        ccw.reverse();

        for quad in [cw, ccw].iter() {
            assert!(point_in_quad(5, 5, quad));
            assert!(point_in_quad(0, 5, quad));
            assert!(point_in_quad(10, 10, quad));
            assert!(!point_in_quad(11, 5, quad));
            assert!(!point_in_quad(5, -1, quad));
        }
    }

    #[test]
    fn test_point_in_quad_translation_invariant() {
        let c = config_640x480().corridor(10.0);
        let quad = c.quad();
        let offsets = [(0, 0), (17, -3), (-250, 400), (1000, 1000)];
        let probes = [(320, 300), (100, 432), (128, 432), (300, 100), (600, 200)];

        for &(dx, dy) in offsets.iter() {
            let mut moved = quad;
            for p in moved.iter_mut() {
                p.x += dx;
                p.y += dy;
            }

            for &(x, y) in probes.iter() {
                assert_eq!(
                    point_in_quad(x, y, &quad),
                    point_in_quad(x + dx, y + dy, &moved)
                );
            }
        }
    }

    #[test]
    fn test_point_in_quad_extreme_coords() {
        let (min, max) = (i32::MIN, i32::MAX);
        let quad = [
            Point::new(min, min),
            Point::new(max, min),
            Point::new(max, max),
            Point::new(min, max),
        ];

        assert!(point_in_quad(max, max, &quad));
        assert!(point_in_quad(min, 0, &quad));
        assert!(point_in_quad(0, 0, &quad));

        let rect = Rect { x: max - 1, y: 0, w: 10, h: 10 };
        assert!(rect.contains(max, 5));
        assert!(!rect.contains(0, 5));
    }

    #[test]
    fn test_corridor_contains() {
        let c = config_640x480().corridor(0.0);

        assert!(c.contains(320, 300));
        assert!(c.contains(128, 432));
        assert!(!c.contains(320, 450));
        assert!(!c.contains(140, 140));
    }
}
