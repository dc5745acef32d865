//! Layouts place parts on a canvas for one device orientation.

use crate::geometry::{Pos, Rect, Rotation, Size};
use crate::image::{Blend, SkinImage};
use crate::part::{Part, PartId};
use crate::{BuildContext, SkinError};
use log::{debug, warn};
use serde::Serialize;
use skin_config::{ConfigNode, parse_c_long};

/// Index of a layout inside its [`SkinFile`](crate::SkinFile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LayoutId(pub usize);

/// Linux input event type for switches.
pub const EV_SW: u32 = 0x05;

pub const DEFAULT_LAYOUT_COLOR: u32 = 0xff80_8080;
const DEFAULT_LAYOUT_SIZE: i32 = 400;
const DEFAULT_ONION_ALPHA: i32 = 50;

const EVENT_NAMES: &[(&str, u32)] = &[("EV_SW", EV_SW)];

/// Placement of a part inside a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub part: PartId,
    pub anchor: Pos,
    pub rotation: Rotation,
}

impl Location {
    fn from_config(node: &ConfigNode, parts: &[Part]) -> Option<Self> {
        let Some(name) = node.str("name") else {
            warn!("Ignoring part location '{}' without 'name' element", node.name);
            return None;
        };
        let Some(index) = parts.iter().position(|p| p.name == name) else {
            warn!("Ignoring part location with unknown name '{name}'");
            return None;
        };
        Some(Self {
            part: PartId(index),
            anchor: Pos::new(node.int("x", 0), node.int("y", 0)),
            rotation: Rotation::from_quarter_turns(node.int("rotation", 0)),
        })
    }

    /// `rect`, given in part coordinates, in layout coordinates.
    pub fn place(&self, rect: Rect) -> Rect {
        rect.rotate(self.rotation).translate(self.anchor)
    }
}

/// The host input event that makes the window leave a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LayoutEvent {
    pub kind: u32,
    pub code: i32,
    pub value: i32,
}

impl LayoutEvent {
    /// `EV_SW:0:1`, the keyboard-closed switch.
    pub const KEYBOARD_CLOSED: LayoutEvent = LayoutEvent {
        kind: EV_SW,
        code: 0,
        value: 1,
    };

    /// Decode `<TYPE>:<CODE>:<VALUE>`. Code and value use C integer syntax.
    pub fn decode(text: &str) -> Option<Self> {
        let mut fields = text.splitn(3, ':');
        let (Some(name), Some(code), Some(value)) = (fields.next(), fields.next(), fields.next())
        else {
            warn!(
                "Invalid skin layout event format: '{text}', should be '<TYPE>:<CODE>:<VALUE>'"
            );
            return None;
        };
        let Some(&(_, kind)) = EVENT_NAMES.iter().find(|(n, _)| *n == name) else {
            warn!("Unrecognized skin layout event name: {name}");
            return None;
        };
        Some(Self {
            kind,
            code: parse_c_long(code).unwrap_or(0) as i32,
            value: parse_c_long(value).unwrap_or(0) as i32,
        })
    }
}

/// A translucent reference image drawn over the display.
#[derive(Debug, Clone)]
pub struct Onion {
    pub image: SkinImage,
    pub rotation: Rotation,
    pub alpha: Blend,
}

#[derive(Debug, Clone)]
pub struct Layout {
    /// Empty for the layouts of display-only skins.
    pub name: String,
    pub event: LayoutEvent,
    /// ARGB, always opaque.
    pub color: u32,
    pub size: Size,
    pub locations: Vec<Location>,
    pub onion: Option<Onion>,
    pub dpad_rotation: Option<Rotation>,
    pub orientation: Rotation,
}

impl Layout {
    /// Build a layout from its config block, resolving `part*` entries
    /// against `parts` by name.
    pub(crate) fn from_config(
        node: &ConfigNode,
        parts: &[Part],
        ctx: &mut BuildContext<'_>,
    ) -> Result<Self, SkinError> {
        let event = match node.str("event") {
            Some(text) => LayoutEvent::decode(text).unwrap_or_default(),
            None => LayoutEvent::KEYBOARD_CLOSED,
        };

        let dpad_rotation = node
            .find("dpad-rotation")
            .map(|_| Rotation::from_quarter_turns(node.int("dpad-rotation", 0)));

        let onion = node.find("onion").and_then(|n| {
            let file = n.str("image")?;
            let image = ctx.store.find_in(ctx.basepath, file);
            if image.is_none() {
                warn!("Ignoring onion with missing image '{file}'");
                return None;
            }
            Some(Onion {
                image,
                rotation: Rotation::from_quarter_turns(n.int("rotation", 0)),
                alpha: Blend::from_percent(n.int("alpha", DEFAULT_ONION_ALPHA)),
            })
        });

        let locations: Vec<Location> = node
            .children()
            .iter()
            .filter(|child| child.name.starts_with("part"))
            .filter_map(|child| Location::from_config(child, parts))
            .collect();
        if locations.is_empty() {
            return Err(SkinError::EmptyLayout(node.name.clone()));
        }

        Ok(Self {
            name: node.name.clone(),
            event,
            color: node.unsigned("color", 0x80_8080) | 0xff00_0000,
            size: Size::new(
                node.int("width", DEFAULT_LAYOUT_SIZE),
                node.int("height", DEFAULT_LAYOUT_SIZE),
            ),
            locations,
            onion,
            dpad_rotation,
            orientation: Rotation::Deg0,
        })
    }

    /// The four layouts of a skin made of the single part `part`, one per
    /// orientation, each turning the whole part around the canvas origin.
    pub(crate) fn display_only(part: PartId, part_size: Size) -> Vec<Layout> {
        let Size { w, h } = part_size;
        let anchors = [
            Pos::new(0, 0),
            Pos::new(h, 0),
            Pos::new(w, h),
            Pos::new(0, w),
        ];
        Rotation::ALL
            .iter()
            .zip(anchors)
            .map(|(&rotation, anchor)| Layout {
                name: String::new(),
                event: LayoutEvent {
                    value: 0,
                    ..LayoutEvent::KEYBOARD_CLOSED
                },
                color: DEFAULT_LAYOUT_COLOR,
                size: part_size.rotate(rotation),
                locations: vec![Location {
                    part,
                    anchor,
                    rotation,
                }],
                onion: None,
                dpad_rotation: None,
                orientation: rotation,
            })
            .collect()
    }

    /// Derive a copy of this layout turned by `by`.
    ///
    /// Every location gets a freshly rotated copy of its part, appended to
    /// `parts`. On failure the parts appended so far are removed again.
    pub(crate) fn rotated(&self, parts: &mut Vec<Part>, by: Rotation) -> Result<Self, SkinError> {
        let start = parts.len();
        let result = self.rotate_into(parts, by);
        if result.is_err() {
            parts.truncate(start);
        }
        result
    }

    fn rotate_into(&self, parts: &mut Vec<Part>, by: Rotation) -> Result<Self, SkinError> {
        let size = self.size.rotate(by);

        let mut locations = Vec::with_capacity(self.locations.len());
        for loc in &self.locations {
            let source = &parts[loc.part.0];
            let rotated = source.rotated(loc.part, by)?;

            let anchor_size = match (&rotated.display(), source.display(), &source.background) {
                (Some(_), Some(display), _) => display.rect.size,
                (_, _, Some(bg)) => bg.rect.size,
                _ => Size::default(),
            };
            let anchor = Rect {
                pos: loc.anchor,
                size: anchor_size,
            }
            .rotate_in_parent(size, by)
            .pos;

            parts.push(rotated);
            locations.push(Location {
                part: PartId(parts.len() - 1),
                anchor,
                rotation: loc.rotation,
            });
        }

        let onion = match &self.onion {
            Some(onion) => {
                // The image is turned a second time by its own new rotation.
                let once = onion.image.clone_rotated(by);
                let twice = once.clone_rotated(once.rotation().rotate(by));
                if once.is_none() || twice.is_none() {
                    return Err(SkinError::ImageRotation(format!("{} onion", self.name)));
                }
                Some(Onion {
                    image: twice,
                    rotation: onion.rotation.rotate(by),
                    alpha: onion.alpha,
                })
            }
            None => None,
        };

        debug!(
            "Derived layout from '{}' turned {by} ({} locations)",
            self.name,
            locations.len()
        );
        Ok(Self {
            name: self.name.clone(),
            event: self.event,
            color: self.color,
            size,
            locations,
            onion,
            dpad_rotation: Some(by),
            orientation: self.orientation.rotate(by),
        })
    }

    /// Whether a host input event is the one that leaves this layout.
    pub fn matches_event(&self, kind: u32, code: i32, value: i32) -> bool {
        self.event
            == LayoutEvent {
                kind,
                code,
                value,
            }
    }

    /// The canvas as a rectangle at the origin.
    pub fn frame(&self) -> Rect {
        Rect {
            pos: Pos::default(),
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::KeyCode;
    use crate::part::{Button, Display};

    #[test]
    fn decode_events() {
        assert_eq!(
            LayoutEvent::decode("EV_SW:0:1"),
            Some(LayoutEvent::KEYBOARD_CLOSED)
        );
        assert_eq!(
            LayoutEvent::decode("EV_SW:0x10:-1"),
            Some(LayoutEvent {
                kind: EV_SW,
                code: 16,
                value: -1
            })
        );
        assert_eq!(LayoutEvent::decode("EV_KEY:0:1"), None);
        assert_eq!(LayoutEvent::decode("EV_SW:0"), None);
    }

    #[test]
    fn display_only_layouts() {
        let layouts = Layout::display_only(PartId(0), Size::new(320, 480));
        let sizes: Vec<_> = layouts.iter().map(|l| l.size).collect();
        assert_eq!(
            sizes,
            [
                Size::new(320, 480),
                Size::new(480, 320),
                Size::new(320, 480),
                Size::new(480, 320)
            ]
        );

        // Each placement covers the full canvas.
        for layout in &layouts {
            let loc = layout.locations[0];
            assert_eq!(loc.rotation, layout.orientation);
            assert_eq!(loc.place(Rect::new(0, 0, 320, 480)), layout.frame());
            assert_eq!(layout.event.value, 0);
            assert!(layout.name.is_empty());
        }
    }

    fn display_part() -> Part {
        Part::from_display(Display::new(Rect::new(0, 0, 40, 60), Rotation::Deg0, 16))
    }

    #[test]
    fn failed_rotation_removes_appended_parts() {
        let mut broken = display_part();
        broken.name = "keys".into();
        broken.buttons.push(Button {
            name: "home".into(),
            rect: Rect::new(0, 0, 10, 10),
            keycode: KeyCode::NONE,
            image: SkinImage::none(),
        });
        let mut parts = vec![display_part(), broken];

        let mut layout = Layout::display_only(PartId(0), Size::new(40, 60)).remove(0);
        layout.locations.push(Location {
            part: PartId(1),
            anchor: Pos::new(40, 0),
            rotation: Rotation::Deg0,
        });
        let err = layout.rotated(&mut parts, Rotation::Deg90).unwrap_err();
        assert!(matches!(err, SkinError::ImageRotation(ref name) if name == "keys"));
        assert_eq!(parts.len(), 2);

        // Every location rotates fine, then the onion fails.
        layout.locations.truncate(1);
        layout.name = "portrait".into();
        layout.onion = Some(Onion {
            image: SkinImage::none(),
            rotation: Rotation::Deg0,
            alpha: Blend::HALF,
        });
        let err = layout.rotated(&mut parts, Rotation::Deg180).unwrap_err();
        assert!(matches!(err, SkinError::ImageRotation(ref name) if name == "portrait onion"));
        assert_eq!(parts.len(), 2);

        layout.onion = None;
        let derived = layout.rotated(&mut parts, Rotation::Deg180).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(derived.locations[0].part, PartId(2));
    }

    #[test]
    fn matches_event_triple() {
        let layout = &Layout::display_only(PartId(0), Size::new(10, 10))[0];
        assert!(layout.matches_event(EV_SW, 0, 0));
        assert!(!layout.matches_event(EV_SW, 0, 1));
    }
}
