//! Parameters structure for ZoneCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::ZoneCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for zone control.
///
/// All shape parameters are ratios of the frame width or height so the
/// corridor does not depend on the camera resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- DEFAULT SHAPE ----

    /// Initial vertical position of the near (bottom) edge.
    ///
    /// Units: fraction of frame height
    pub bottom_y_ratio: f64,

    /// Initial vertical position of the far (top) edge.
    ///
    /// Units: fraction of frame height
    pub top_y_ratio: f64,

    /// Initial half width of the near edge, measured from the centre column.
    ///
    /// Units: fraction of frame width
    pub near_half_width_ratio: f64,

    /// Initial half width of the far edge, measured from the centre column.
    ///
    /// Units: fraction of frame width
    pub far_half_width_ratio: f64,

    // ---- STEERING REACTION ----

    /// Lateral shift of the far edge at full steering.
    ///
    /// Units: fraction of frame width
    pub max_shift_ratio: f64,

    /// Steering angle magnitude at which the full shift is reached.
    ///
    /// Units: degrees
    pub max_steering_for_full_shift_deg: f64,

    /// Scale applied to the far edge shift.
    pub shift_far_coefficient: f64,

    // ---- LIMITS ----

    /// Minimum half width of either edge.
    ///
    /// Units: fraction of frame width
    pub min_half_ratio: f64,

    /// Maximum half width of either edge.
    ///
    /// Units: fraction of frame width
    pub max_half_ratio: f64,

    /// Minimum vertical distance between the near and far edges.
    ///
    /// Units: pixels
    pub min_height_px: i32,

    // ---- TOUCH ----

    /// A press selects the nearest handle if it is closer than this.
    ///
    /// Units: pixels
    pub touch_threshold_px: f64,

    /// Touch samples arriving sooner than this after the last accepted one
    /// are ignored.
    ///
    /// Units: milliseconds
    pub touch_cooldown_ms: i64,

    /// Width of the edit/save and detection toggle buttons.
    ///
    /// Units: pixels
    pub button_width_px: i32,

    /// Height of the edit/save and detection toggle buttons.
    ///
    /// Units: pixels
    pub button_height_px: i32,

    /// Whether obstacle detection is enabled at startup.
    pub detection_enabled: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters describe a valid corridor.
    pub fn validate(&self) -> Result<(), ZoneCtrlError> {
        let unit_ratios = [
            ("bottom_y_ratio", self.bottom_y_ratio),
            ("top_y_ratio", self.top_y_ratio),
            ("near_half_width_ratio", self.near_half_width_ratio),
            ("far_half_width_ratio", self.far_half_width_ratio),
            ("max_shift_ratio", self.max_shift_ratio),
            ("min_half_ratio", self.min_half_ratio),
            ("max_half_ratio", self.max_half_ratio),
        ];

        for (name, value) in unit_ratios.iter() {
            if !(0.0..=1.0).contains(value) {
                return Err(ZoneCtrlError::InvalidParam(
                    *name,
                    format!("{} is outside [0, 1]", value)
                ));
            }
        }

        if self.min_half_ratio > self.max_half_ratio {
            return Err(ZoneCtrlError::InvalidParam(
                "min_half_ratio",
                format!("{} is larger than max_half_ratio ({})", self.min_half_ratio, self.max_half_ratio)
            ));
        }

        if !(self.max_steering_for_full_shift_deg > 0.0) {
            return Err(ZoneCtrlError::InvalidParam(
                "max_steering_for_full_shift_deg",
                format!("{} must be positive", self.max_steering_for_full_shift_deg)
            ));
        }

        if !self.shift_far_coefficient.is_finite() {
            return Err(ZoneCtrlError::InvalidParam(
                "shift_far_coefficient",
                format!("{} is not finite", self.shift_far_coefficient)
            ));
        }

        if self.min_height_px < 1 {
            return Err(ZoneCtrlError::InvalidParam(
                "min_height_px",
                format!("{} must be at least 1", self.min_height_px)
            ));
        }

        if self.button_width_px <= 0 || self.button_height_px <= 0 {
            return Err(ZoneCtrlError::InvalidParam(
                "button_width_px",
                format!("{}x{} button is empty", self.button_width_px, self.button_height_px)
            ));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            bottom_y_ratio: 0.90,
            top_y_ratio: 0.28,
            near_half_width_ratio: 0.30,
            far_half_width_ratio: 0.14,
            max_shift_ratio: 0.4,
            max_steering_for_full_shift_deg: 30.0,
            shift_far_coefficient: 1.0,
            min_half_ratio: 0.06,
            max_half_ratio: 0.49,
            min_height_px: 40,
            touch_threshold_px: 60.0,
            touch_cooldown_ms: 70,
            button_width_px: 120,
            button_height_px: 32,
            detection_enabled: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_param_validation() {
        assert!(Params::default().validate().is_ok());

        let p = Params { top_y_ratio: 1.2, ..Default::default() };
        assert!(matches!(p.validate(), Err(ZoneCtrlError::InvalidParam("top_y_ratio", _))));

        let p = Params { min_half_ratio: 0.5, max_half_ratio: 0.4, ..Default::default() };
        assert!(p.validate().is_err());

        let p = Params { max_steering_for_full_shift_deg: 0.0, ..Default::default() };
        assert!(p.validate().is_err());

        // The far edge must stay strictly above the near edge
        let p = Params { min_height_px: 0, ..Default::default() };
        assert!(matches!(p.validate(), Err(ZoneCtrlError::InvalidParam("min_height_px", _))));
    }

    #[test]
    fn test_params_from_toml() {
        let p: Params = util::params::from_str(r#"
            bottom_y_ratio = 0.9
            top_y_ratio = 0.28
            near_half_width_ratio = 0.3
            far_half_width_ratio = 0.14
            max_shift_ratio = 0.4
            max_steering_for_full_shift_deg = 30.0
            shift_far_coefficient = 1.0
            min_half_ratio = 0.06
            max_half_ratio = 0.49
            min_height_px = 40
            touch_threshold_px = 60.0
            touch_cooldown_ms = 70
            button_width_px = 120
            button_height_px = 32
            detection_enabled = true
        "#).unwrap();

        assert_eq!(p.min_height_px, 40);
        assert!(p.validate().is_ok());
    }
}
