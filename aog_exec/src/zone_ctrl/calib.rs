//! Touch calibration of the corridor
//!
//! While viewing, only the two buttons react to touch. In edit mode a press
//! selects the nearest of the two left-hand handles (if close enough) and any
//! following sample, pressed or not, drags the selected handle. Some
//! digitizers report continuous motion as not pressed, so a selection is only
//! dropped by a press away from both handles or by leaving edit mode.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use log::{debug, info};
use util::maths::clamp;

use super::*;
use crate::touch::TouchEvent;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CorridorConfig {
    /// Process one touch sample.
    ///
    /// Returns `true` if the sample changed the mode, the detection flag, the
    /// selected handle or the corridor shape.
    pub fn handle_touch(
        &mut self,
        touch: &TouchEvent,
        steering_angle_deg: f64,
        now: DateTime<Utc>
    ) -> bool {
        // ---- DEBOUNCE ----

        // A clock which stepped backwards re-anchors the cooldown rather than
        // blocking touch until it catches up.
        if let Some(last) = self.last_touch_timestamp {
            let elapsed_ms = util::time::millis_between(&last, &now);
            if elapsed_ms >= 0 && elapsed_ms < self.touch_cooldown_ms {
                return false;
            }
        }
        self.last_touch_timestamp = Some(now);

        let (x, y) = (touch.x, touch.y);

        // ---- BUTTONS ----

        if touch.pressed {
            if self.edit_button().contains(x, y) {
                match self.mode {
                    Mode::Viewing => {
                        self.mode = Mode::Editing;
                        self.selected_handle = None;
                        info!("Corridor edit mode entered");
                    },
                    Mode::Editing => {
                        self.mode = Mode::Viewing;
                        self.selected_handle = None;
                        info!(
                            "Corridor saved: bottom_y {:.3}, top_y {:.3}, near_half {:.3}, far_half {:.3}",
                            self.bottom_y_ratio,
                            self.top_y_ratio,
                            self.near_half_width_ratio,
                            self.far_half_width_ratio
                        );
                    }
                }
                return true;
            }

            if self.detect_button().contains(x, y) {
                self.toggle_detection();
                return true;
            }
        }

        if self.mode == Mode::Viewing {
            return false;
        }

        // ---- HANDLE SELECTION ----

        if touch.pressed {
            let (nearest, dist) = self.nearest_handle(x, y, steering_angle_deg);

            if dist < self.touch_threshold_px {
                if self.selected_handle != Some(nearest) {
                    debug!("Selected {:?} handle ({:.1} px away)", nearest, dist);
                }
                self.selected_handle = Some(nearest);
            }
            else {
                self.selected_handle = None;
                return false;
            }
        }

        // ---- DRAG ----

        match self.selected_handle {
            Some(Handle::Near) => {
                self.near_half_width_ratio = self.half_ratio_from_x(x);
                self.bottom_y_ratio = self.near_y_ratio_from_y(y);
                debug!(
                    "Near edge: half width ratio {:.3}, y ratio {:.3}",
                    self.near_half_width_ratio,
                    self.bottom_y_ratio
                );
                true
            },
            Some(Handle::Far) => {
                self.far_half_width_ratio = self.half_ratio_from_x(x);
                self.top_y_ratio = self.far_y_ratio_from_y(y);
                debug!(
                    "Far edge: half width ratio {:.3}, y ratio {:.3}",
                    self.far_half_width_ratio,
                    self.top_y_ratio
                );
                true
            },
            None => false
        }
    }

    /// Flip the detection flag, returning the new value.
    pub fn toggle_detection(&mut self) -> bool {
        self.detection_enabled = !self.detection_enabled;
        info!(
            "Obstacle detection {}",
            if self.detection_enabled { "enabled" } else { "disabled" }
        );
        self.detection_enabled
    }

    /// Current positions of the draggable handles.
    ///
    /// The near handle is the near-left corner, the far handle the far-left
    /// corner of the corridor at the given steering angle.
    pub fn handles(&self, steering_angle_deg: f64) -> [(Handle, Point); 2] {
        let c = self.corridor(steering_angle_deg);
        [(Handle::Near, c.near_left), (Handle::Far, c.far_left)]
    }

    /// Nearest handle to `(x, y)` and its distance in pixels.
    fn nearest_handle(&self, x: i32, y: i32, steering_angle_deg: f64) -> (Handle, f64) {
        let [(near, near_pos), (far, far_pos)] = self.handles(steering_angle_deg);

        let near_dist = near_pos.dist_to(x, y);
        let far_dist = far_pos.dist_to(x, y);

        // Ties go to the near handle
        if far_dist < near_dist {
            (far, far_dist)
        }
        else {
            (near, near_dist)
        }
    }

    /// Half width ratio for a handle dragged to column `x`.
    fn half_ratio_from_x(&self, x: i32) -> f64 {
        let w = self.frame_width as f64;
        let cx = (self.frame_width / 2) as f64;
        let half = (x as f64 - cx).abs();

        clamp(&(half / w), &self.min_half_ratio, &self.max_half_ratio)
    }

    /// Near edge ratio for a handle dragged to row `y`.
    fn near_y_ratio_from_y(&self, y: i32) -> f64 {
        let h = self.frame_height as f64;
        let min_y = (h * NEAR_Y_MIN_RATIO).round();
        let y = clamp(&(y as f64), &min_y, &(h - 1.0));

        y / h
    }

    /// Far edge ratio for a handle dragged to row `y`.
    fn far_y_ratio_from_y(&self, y: i32) -> f64 {
        let h = self.frame_height as f64;
        let max_y = (h * FAR_Y_MAX_RATIO).round();
        let y = clamp(&(y as f64), &0.0, &max_y);

        y / h
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;

    /// Touch samples spaced well outside the cooldown.
    struct Toucher {
        cfg: CorridorConfig,
        now: DateTime<Utc>,
    }

    impl Toucher {
        fn new() -> Self {
            Self {
                cfg: CorridorConfig::new(&Params::default(), 640, 480).unwrap(),
                now: Utc::now(),
            }
        }

        fn touch(&mut self, x: i32, y: i32, pressed: bool) -> bool {
            self.now = self.now + Duration::milliseconds(100);
            self.cfg.handle_touch(&TouchEvent { x, y, pressed }, 0.0, self.now)
        }
    }

    #[test]
    fn test_edit_toggle() {
        let mut t = Toucher::new();
        assert_eq!(t.cfg.mode(), Mode::Viewing);

        // Not pressed does nothing in viewing mode
        assert!(!t.touch(10, 10, false));
        assert_eq!(t.cfg.mode(), Mode::Viewing);

        assert!(t.touch(10, 10, true));
        assert_eq!(t.cfg.mode(), Mode::Editing);
        assert_eq!(t.cfg.selected_handle(), None);

        // Select the near handle then save
        assert!(t.touch(130, 430, true));
        assert_eq!(t.cfg.selected_handle(), Some(Handle::Near));
        assert!(t.touch(120, 32, true));
        assert_eq!(t.cfg.mode(), Mode::Viewing);
        assert_eq!(t.cfg.selected_handle(), None);
    }

    #[test]
    fn test_detection_toggle() {
        let mut t = Toucher::new();
        assert!(t.cfg.detection_enabled);

        // Button right edge is inclusive
        assert!(t.touch(639, 0, true));
        assert!(!t.cfg.detection_enabled);
        assert_eq!(t.cfg.mode(), Mode::Viewing);

        // Toggling in edit mode keeps the mode
        assert!(t.touch(0, 0, true));
        assert!(t.touch(520, 32, true));
        assert!(t.cfg.detection_enabled);
        assert_eq!(t.cfg.mode(), Mode::Editing);
    }

    #[test]
    fn test_viewing_ignores_handles() {
        let mut t = Toucher::new();
        let before = t.cfg.corridor(0.0);

        assert!(!t.touch(128, 432, true));
        assert!(!t.touch(300, 440, false));
        assert_eq!(t.cfg.corridor(0.0), before);
        assert_eq!(t.cfg.selected_handle(), None);
    }

    #[test]
    fn test_debounce() {
        let mut cfg = CorridorConfig::new(&Params::default(), 640, 480).unwrap();
        let t0 = Utc::now();
        let press = TouchEvent { x: 10, y: 10, pressed: true };

        assert!(cfg.handle_touch(&press, 0.0, t0));
        assert!(!cfg.handle_touch(&press, 0.0, t0 + Duration::milliseconds(69)));
        assert_eq!(cfg.mode(), Mode::Editing);

        assert!(cfg.handle_touch(&press, 0.0, t0 + Duration::milliseconds(70)));
        assert_eq!(cfg.mode(), Mode::Viewing);

        // A clock step backwards doesn't lock touch out
        assert!(cfg.handle_touch(&press, 0.0, t0 - Duration::seconds(10)));
        assert_eq!(cfg.mode(), Mode::Editing);
    }

    #[test]
    fn test_rejected_press_restarts_cooldown() {
        let mut cfg = CorridorConfig::new(&Params::default(), 640, 480).unwrap();
        let t0 = Utc::now();

        // Rejected by the viewing mode, but past the debounce check
        assert!(!cfg.handle_touch(&TouchEvent { x: 320, y: 240, pressed: true }, 0.0, t0));
        assert!(!cfg.handle_touch(
            &TouchEvent { x: 10, y: 10, pressed: true },
            0.0,
            t0 + Duration::milliseconds(50)
        ));
        assert_eq!(cfg.mode(), Mode::Viewing);
    }

    #[test]
    fn test_near_handle_drag() {
        let mut t = Toucher::new();
        t.touch(0, 0, true);

        // Select near handle at (128, 432)
        assert!(t.touch(140, 420, true));
        assert_eq!(t.cfg.selected_handle(), Some(Handle::Near));

        // Drag while the digitizer reports not pressed
        assert!(t.touch(96, 450, false));
        assert!((t.cfg.near_half_width_ratio - 224.0 / 640.0).abs() < 1e-12);
        assert!((t.cfg.bottom_y_ratio - 450.0 / 480.0).abs() < 1e-12);

        let c = t.cfg.corridor(0.0);
        assert_eq!(c.near_left, Point::new(96, 450));
        assert_eq!(c.near_right, Point::new(544, 450));
    }

    #[test]
    fn test_drag_to_centre_keeps_min_width() {
        let mut t = Toucher::new();
        t.touch(0, 0, true);
        t.touch(128, 432, true);

        assert!(t.touch(320, 432, false));
        assert_eq!(t.cfg.near_half_width_ratio, t.cfg.min_half_ratio);

        let c = t.cfg.corridor(0.0);
        assert_eq!(320 - c.near_left.x, 38);
        assert!(c.near_right.x > c.near_left.x);
    }

    #[test]
    fn test_drag_far_outside_frame() {
        let mut t = Toucher::new();
        t.touch(0, 0, true);
        t.touch(128, 432, true);

        assert!(t.touch(i32::MIN, i32::MAX, false));
        assert_eq!(t.cfg.near_half_width_ratio, t.cfg.max_half_ratio);
        assert!((t.cfg.bottom_y_ratio - 479.0 / 480.0).abs() < 1e-12);

        assert!(t.touch(i32::MAX, i32::MIN, false));
        assert_eq!(t.cfg.near_half_width_ratio, t.cfg.max_half_ratio);
        assert!((t.cfg.bottom_y_ratio - 264.0 / 480.0).abs() < 1e-12);
    }

    #[test]
    fn test_far_handle_drag_is_clamped() {
        let mut t = Toucher::new();
        t.touch(0, 0, true);

        // Select far handle at (230, 134)
        assert!(t.touch(225, 140, true));
        assert_eq!(t.cfg.selected_handle(), Some(Handle::Far));

        // Dragged past the frame edge and below the far edge limit
        assert!(t.touch(-50, 470, false));
        assert_eq!(t.cfg.far_half_width_ratio, t.cfg.max_half_ratio);
        assert!((t.cfg.top_y_ratio - 0.8).abs() < 1e-12);

        // Near edge didn't move
        let c = t.cfg.corridor(0.0);
        assert_eq!(c.near_left, Point::new(128, 432));
        assert!(c.near_left.y - c.far_left.y >= 40);
    }

    #[test]
    fn test_press_away_deselects() {
        let mut t = Toucher::new();
        t.touch(0, 0, true);
        t.touch(128, 432, true);
        assert_eq!(t.cfg.selected_handle(), Some(Handle::Near));

        let before = t.cfg.clone();
        assert!(!t.touch(400, 300, true));
        assert_eq!(t.cfg.selected_handle(), None);
        assert_eq!(t.cfg.near_half_width_ratio, before.near_half_width_ratio);
        assert_eq!(t.cfg.bottom_y_ratio, before.bottom_y_ratio);

        // Motion without a selection does nothing
        assert!(!t.touch(130, 430, false));
        assert_eq!(t.cfg.selected_handle(), None);
    }

    #[test]
    fn test_handles_follow_steering() {
        let cfg = CorridorConfig::new(&Params::default(), 640, 480).unwrap();
        let [(_, near), (_, far)] = cfg.handles(30.0);

        assert_eq!(near, Point::new(153, 432));
        assert_eq!(far, Point::new(486, 134));
    }
}
