//! # Overlay
//!
//! Builds the list of draw primitives shown over each frame. Rendering them
//! (fonts, line drawing) is left to the display.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use crate::{
    obstacle::{self, ClassGroup, Detection},
    zone_ctrl::{CorridorConfig, Handle, Mode, OutputData, Point, Rect},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Half size of the outline drawn around a handle.
const HANDLE_OUTLINE_HALF_PX: i32 = 20;

/// Half size of the filled handle marker.
const HANDLE_FILL_HALF_PX: i32 = 16;

/// Approximate advance of one status line character at its text scale.
const STATUS_CHAR_WIDTH_PX: i32 = 6;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Colour {
    Red,
    Green,
    Blue,
    Yellow,
    Gray,
    White,
    Black,
}

/// A single draw primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCmd {
    /// Rectangle outline.
    Rect {
        rect: Rect,
        colour: Colour,
        thickness: u32,
    },

    FilledRect {
        rect: Rect,
        colour: Colour,
    },

    Line {
        from: Point,
        to: Point,
        colour: Colour,
        thickness: u32,
    },

    /// Text with its top left corner at `pos`.
    Text {
        pos: Point,
        text: String,
        colour: Colour,
        scale: f32,
    },
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the overlay for one frame.
///
/// `link_connected` is whether the status link is up, which decides the
/// SENT/LINK ERR text under the obstacle banner.
pub fn build_overlay(
    config: &CorridorConfig,
    zone: &OutputData,
    detections: &[Detection],
    steering_angle_deg: f64,
    link_connected: bool
) -> Vec<DrawCmd> {
    let mut cmds = Vec::new();
    let (frame_w, frame_h) = config.frame_size();
    let cx = (frame_w / 2) as i32;

    // ---- DETECTIONS ----

    let mut num_recognised = 0;
    for d in obstacle::recognised(detections) {
        num_recognised += 1;

        let class = match d.class() {
            Some(c) => c,
            None => continue,
        };
        let colour = match class.group() {
            ClassGroup::Person => Colour::Green,
            ClassGroup::Vehicle => Colour::Blue,
            ClassGroup::Animal => Colour::Yellow,
        };

        cmds.push(DrawCmd::Rect {
            rect: Rect { x: d.bbox.x, y: d.bbox.y, w: d.bbox.w, h: d.bbox.h },
            colour,
            thickness: 2,
        });
        cmds.push(DrawCmd::Text {
            pos: Point::new(d.bbox.x, (d.bbox.y - 15).max(0)),
            text: format!("{}:{:.2}", class, d.score),
            colour,
            scale: 1.2,
        });
    }

    // ---- CORRIDOR ----

    let zone_colour = match (zone.detection_enabled, zone.mode) {
        (false, _) => Colour::Gray,
        (true, Mode::Editing) => Colour::Green,
        (true, Mode::Viewing) if zone.classification.has_obstacle => Colour::Red,
        (true, Mode::Viewing) => Colour::Green,
    };

    let quad = zone.corridor.quad();
    for i in 0..quad.len() {
        cmds.push(DrawCmd::Line {
            from: quad[i],
            to: quad[(i + 1) % quad.len()],
            colour: zone_colour,
            thickness: 3,
        });
    }

    // ---- HANDLES ----

    if zone.mode == Mode::Editing {
        for (handle, p) in config.handles(steering_angle_deg).iter() {
            let colour = if zone.selected_handle == Some(*handle) {
                Colour::Red
            }
            else {
                Colour::Yellow
            };

            cmds.push(DrawCmd::Rect {
                rect: centred_square(*p, HANDLE_OUTLINE_HALF_PX),
                colour,
                thickness: 2,
            });
            cmds.push(DrawCmd::FilledRect {
                rect: centred_square(*p, HANDLE_FILL_HALF_PX),
                colour,
            });
            cmds.push(DrawCmd::Text {
                pos: Point::new(p.x + HANDLE_OUTLINE_HALF_PX + 2, p.y - HANDLE_OUTLINE_HALF_PX + 2),
                text: match handle {
                    Handle::Near => "near",
                    Handle::Far => "far",
                }.to_string(),
                colour: Colour::White,
                scale: 1.1,
            });
        }
    }

    // ---- BUTTONS ----

    let (edit_text, edit_colour) = match zone.mode {
        Mode::Viewing => ("EDIT", Colour::Blue),
        Mode::Editing => ("SAVE", Colour::Green),
    };
    let edit = config.edit_button();
    cmds.push(DrawCmd::Rect { rect: edit, colour: edit_colour, thickness: 3 });
    cmds.push(DrawCmd::Text {
        pos: Point::new(edit.x + 12, edit.y + 9),
        text: edit_text.to_string(),
        colour: edit_colour,
        scale: 0.9,
    });

    let (detect_text, detect_colour) = if zone.detection_enabled {
        ("DETECT ON", Colour::Green)
    }
    else {
        ("DETECT OFF", Colour::Red)
    };
    let detect = config.detect_button();
    cmds.push(DrawCmd::Rect { rect: detect, colour: detect_colour, thickness: 3 });
    cmds.push(DrawCmd::Text {
        pos: Point::new(detect.x + 6, detect.y + 9),
        text: detect_text.to_string(),
        colour: detect_colour,
        scale: 0.7,
    });

    // ---- STATUS LINE ----

    let status = format!(
        "Obj:{} In:{} Ang:{:.1} {} {}",
        num_recognised,
        zone.classification.offending.len(),
        steering_angle_deg,
        if link_connected { "Link:ON" } else { "Link:OFF" },
        if zone.detection_enabled { "DET:ON" } else { "DET:OFF" }
    );
    let status_y = frame_h as i32 - 14;
    cmds.push(DrawCmd::FilledRect {
        rect: Rect {
            x: 0,
            y: status_y - 2,
            w: status.len() as i32 * STATUS_CHAR_WIDTH_PX + 14,
            h: 18,
        },
        colour: Colour::Black,
    });
    cmds.push(DrawCmd::Text {
        pos: Point::new(4, status_y),
        text: status,
        colour: Colour::White,
        scale: 0.7,
    });

    // ---- BANNERS ----

    if zone.detection_enabled && zone.classification.has_obstacle {
        cmds.push(DrawCmd::FilledRect {
            rect: Rect { x: cx - 110, y: 45, w: 220, h: 28 },
            colour: Colour::Red,
        });
        cmds.push(DrawCmd::Text {
            pos: Point::new(cx - 100, 52),
            text: String::from("OBSTACLE!"),
            colour: Colour::White,
            scale: 0.9,
        });

        let (sent_text, sent_colour) = if link_connected {
            ("SENT", Colour::Green)
        }
        else {
            ("LINK ERR", Colour::Red)
        };
        cmds.push(DrawCmd::Text {
            pos: Point::new(cx - 35, 76),
            text: sent_text.to_string(),
            colour: sent_colour,
            scale: 0.8,
        });
    }

    if !zone.detection_enabled {
        cmds.push(DrawCmd::FilledRect {
            rect: Rect { x: cx - 150, y: 45, w: 300, h: 28 },
            colour: Colour::Gray,
        });
        cmds.push(DrawCmd::Text {
            pos: Point::new(cx - 140, 52),
            text: String::from("DETECTION DISABLED"),
            colour: Colour::White,
            scale: 0.8,
        });
    }

    cmds
}

fn centred_square(centre: Point, half: i32) -> Rect {
    Rect {
        x: centre.x - half,
        y: centre.y - half,
        w: 2 * half,
        h: 2 * half,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
