//! # Obstacle classifier
//!
//! Decides whether any recognised object stands inside the corridor.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::zone_ctrl::Corridor;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A detector bounding box in frame pixels, `(x, y)` being the top left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// A single detector output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Raw class index of the detector model.
    pub class_id: i32,

    pub bbox: BBox,

    /// Detector confidence in `[0, 1]`.
    pub score: f32,
}

/// Result of classifying one frame's detections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// True if detection is enabled and at least one recognised object lies
    /// inside the corridor.
    pub has_obstacle: bool,

    /// Recognised detections whose centre lies inside the corridor,
    /// regardless of whether detection is enabled.
    pub offending: Vec<Detection>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Object classes which count as obstacles.
///
/// Discriminants are the class indices of the detector model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectClass {
    Person = 0,
    Bicycle = 1,
    Car = 2,
    Motorbike = 3,
    Truck = 7,
    Horse = 17,
    Sheep = 18,
    Cow = 19,
}

/// Broad grouping of the object classes, used for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassGroup {
    Person,
    Vehicle,
    Animal,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ObjectClass {
    /// All recognised classes, in class index order.
    pub const ALL: [ObjectClass; 8] = [
        ObjectClass::Person,
        ObjectClass::Bicycle,
        ObjectClass::Car,
        ObjectClass::Motorbike,
        ObjectClass::Truck,
        ObjectClass::Horse,
        ObjectClass::Sheep,
        ObjectClass::Cow,
    ];

    /// Resolve a detector class index, `None` if the class is not recognised.
    pub fn from_class_id(class_id: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| *c as i32 == class_id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ObjectClass::Person => "Person",
            ObjectClass::Bicycle => "Bicycle",
            ObjectClass::Car => "Car",
            ObjectClass::Motorbike => "Motorbike",
            ObjectClass::Truck => "Truck",
            ObjectClass::Horse => "Horse",
            ObjectClass::Sheep => "Sheep",
            ObjectClass::Cow => "Cow",
        }
    }

    pub fn group(&self) -> ClassGroup {
        match self {
            ObjectClass::Person => ClassGroup::Person,
            ObjectClass::Bicycle
            | ObjectClass::Car
            | ObjectClass::Motorbike
            | ObjectClass::Truck => ClassGroup::Vehicle,
            ObjectClass::Horse | ObjectClass::Sheep | ObjectClass::Cow => ClassGroup::Animal,
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl BBox {
    /// Centre of the box, rounded down.
    pub fn center(&self) -> (i32, i32) {
        (self.x.saturating_add(self.w / 2), self.y.saturating_add(self.h / 2))
    }
}

impl Detection {
    /// The recognised class of this detection, if any.
    pub fn class(&self) -> Option<ObjectClass> {
        ObjectClass::from_class_id(self.class_id)
    }
}

impl Classification {
    /// Number of offending detections of each recognised class, in class
    /// index order, omitting classes with none.
    pub fn class_counts(&self) -> Vec<(ObjectClass, usize)> {
        ObjectClass::ALL
            .iter()
            .map(|c| {
                let n = self.offending
                    .iter()
                    .filter(|d| d.class() == Some(*c))
                    .count();
                (*c, n)
            })
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    /// Human readable per class summary, e.g. `"Person:2, Car:1"`.
    pub fn summary(&self) -> String {
        self.class_counts()
            .iter()
            .map(|(c, n)| format!("{}:{}", c, n))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Only the detections of a recognised class.
pub fn recognised(detections: &[Detection]) -> impl Iterator<Item = &Detection> {
    detections.iter().filter(|d| d.class().is_some())
}

/// Classify the detections of one frame against the corridor.
///
/// A recognised detection offends if the centre of its box lies inside the
/// corridor (edges included).
pub fn classify(
    detections: &[Detection],
    corridor: &Corridor,
    detection_enabled: bool
) -> Classification {
    let offending: Vec<Detection> = recognised(detections)
        .filter(|d| {
            let (cx, cy) = d.bbox.center();
            corridor.contains(cx, cy)
        })
        .copied()
        .collect();

    Classification {
        has_obstacle: detection_enabled && !offending.is_empty(),
        offending,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::zone_ctrl::{CorridorConfig, Params};

    fn det(class_id: i32, x: i32, y: i32, w: i32, h: i32) -> Detection {
        Detection {
            class_id,
            bbox: BBox { x, y, w, h },
            score: 0.8,
        }
    }

    fn straight_corridor() -> Corridor {
        CorridorConfig::new(&Params::default(), 640, 480)
            .unwrap()
            .corridor(0.0)
    }

    #[test]
    fn test_class_ids() {
        assert_eq!(ObjectClass::from_class_id(0), Some(ObjectClass::Person));
        assert_eq!(ObjectClass::from_class_id(7), Some(ObjectClass::Truck));
        assert_eq!(ObjectClass::from_class_id(19), Some(ObjectClass::Cow));
        assert_eq!(ObjectClass::from_class_id(5), None);
        assert_eq!(ObjectClass::from_class_id(-1), None);

        assert_eq!(ObjectClass::Motorbike.group(), ClassGroup::Vehicle);
        assert_eq!(ObjectClass::Sheep.group(), ClassGroup::Animal);
    }

    #[test]
    fn test_center_rounds_down() {
        assert_eq!(BBox { x: 10, y: 20, w: 5, h: 7 }.center(), (12, 23));
        assert_eq!(BBox { x: -10, y: 0, w: 5, h: 1 }.center(), (-8, 0));

        // Boxes reaching past the coordinate range stop at its edge
        let b = BBox { x: i32::MAX - 4, y: 0, w: 100, h: i32::MAX };
        assert_eq!(b.center(), (i32::MAX, i32::MAX / 2));
    }

    #[test]
    fn test_classify() {
        let c = straight_corridor();
        let dets = [
            // Person centred in the corridor
            det(0, 300, 250, 40, 100),
            // Car well to the left
            det(2, 0, 300, 60, 60),
            // Bus (not recognised) centred in the corridor
            det(5, 300, 250, 40, 100),
            // Cow with its centre on the near edge
            det(19, 300, 412, 40, 40),
        ];

        let cls = classify(&dets, &c, true);
        assert!(cls.has_obstacle);
        assert_eq!(cls.offending.len(), 2);
        assert_eq!(cls.offending[0].class_id, 0);
        assert_eq!(cls.offending[1].class_id, 19);
        assert_eq!(cls.summary(), "Person:1, Cow:1");
    }

    #[test]
    fn test_disabled_never_has_obstacle() {
        let c = straight_corridor();
        let dets = [det(0, 300, 250, 40, 100), det(3, 310, 300, 20, 20)];

        let cls = classify(&dets, &c, false);
        assert!(!cls.has_obstacle);
        assert_eq!(cls.offending.len(), 2);

        assert!(!classify(&[], &c, false).has_obstacle);
    }

    #[test]
    fn test_empty_frame() {
        let cls = classify(&[], &straight_corridor(), true);
        assert!(!cls.has_obstacle);
        assert!(cls.offending.is_empty());
        assert_eq!(cls.summary(), "");
    }
}
