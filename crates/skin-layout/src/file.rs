//! A loaded skin: every part and every layout built from one skin description.

use crate::framebuffer::{Framebuffer, FramebufferFactory};
use crate::geometry::{Pos, Rect, Rotation, Size};
use crate::image::{Blend, ImageStore, SkinImage};
use crate::keycode::KeyCode;
use crate::layout::{Layout, LayoutId, Location};
use crate::part::{Display, FramebufferSlot, Part, PartId};
use crate::{BuildContext, LoadOptions, SkinError};
use log::{debug, info};
use serde::Serialize;
use skin_config::ConfigNode;
use std::fs;
use std::path::Path;

/// Names of the layouts derived from the authored one, in derivation order.
const AUTO_LAYOUT_NAMES: [&str; 3] = ["reverse_landscape", "reverse_portrait", "landscape"];

#[derive(Debug)]
pub struct SkinFile {
    version: i32,
    parts: Vec<Part>,
    layouts: Vec<Layout>,
}

/// A display in layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlacedDisplay {
    pub part: PartId,
    /// Display rectangle clipped to the layout canvas.
    pub rect: Rect,
    /// Location rotation composed with the display's own rotation.
    pub rotation: Rotation,
    /// Canvas position of the framebuffer's first pixel.
    pub origin: Pos,
    /// Size of the framebuffer content.
    pub data_size: Size,
    pub bpp: u32,
}

/// A button hit rectangle in layout coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedButton {
    pub part: PartId,
    pub name: String,
    pub keycode: KeyCode,
    pub rect: Rect,
}

/// The onion overlay of a layout, ready to be drawn over its display.
#[derive(Debug, Clone)]
pub struct OnionPlacement {
    /// The overlay image turned to the display rotation and attenuated.
    pub image: SkinImage,
    pub rect: Rect,
    pub rotation: Rotation,
    pub alpha: Blend,
}

impl SkinFile {
    /// Build a skin from a parsed skin description.
    ///
    /// Files with a `parts` section use the multi-part format: the first
    /// entry of `layouts` is the authored portrait layout and three more are
    /// derived from it by rotation. Other files describe a single part whose
    /// four layouts are computed directly.
    pub fn load<'a>(
        root: &ConfigNode,
        basepath: &'a Path,
        store: &'a mut ImageStore,
        framebuffers: Option<&'a mut dyn FramebufferFactory>,
        options: &'a LoadOptions,
    ) -> Result<Self, SkinError> {
        let mut ctx = BuildContext {
            store,
            basepath,
            framebuffers,
            options,
        };

        let file = if root.find("parts").is_some() {
            let mut file = Self::load_multi_part(root, &mut ctx)?;
            file.version = root.int("version", 2);
            if file.version <= 0 {
                return Err(SkinError::InvalidVersion(file.version));
            }
            file
        } else {
            Self::load_single_part(root, &mut ctx)?
        };

        info!(
            "Loaded skin v{} with {} parts and {} layouts",
            file.version,
            file.parts.len(),
            file.layouts.len()
        );
        Ok(file)
    }

    /// Read and load `<dir>/layout`, resolving images relative to `dir`.
    pub fn load_from_dir<'a>(
        dir: &'a Path,
        store: &'a mut ImageStore,
        framebuffers: Option<&'a mut dyn FramebufferFactory>,
        options: &'a LoadOptions,
    ) -> Result<Self, SkinError> {
        let path = dir.join("layout");
        let text = fs::read_to_string(&path).map_err(|source| SkinError::Io {
            path: path.clone(),
            source,
        })?;
        let root = skin_config::parse(&text).map_err(|source| SkinError::Parse { path, source })?;
        Self::load(&root, dir, store, framebuffers, options)
    }

    /// A single-part skin made of nothing but `display`.
    pub fn from_display(display: Display) -> Self {
        let part = Part::from_display(display);
        let layouts = Layout::display_only(PartId(0), part.rect.size);
        Self {
            version: 1,
            parts: vec![part],
            layouts,
        }
    }

    fn load_single_part(root: &ConfigNode, ctx: &mut BuildContext<'_>) -> Result<Self, SkinError> {
        let part = Part::from_config(root, "button", ctx)?;
        let layouts = Layout::display_only(PartId(0), part.rect.size);
        Ok(Self {
            version: 1,
            parts: vec![part],
            layouts,
        })
    }

    fn load_multi_part(root: &ConfigNode, ctx: &mut BuildContext<'_>) -> Result<Self, SkinError> {
        let parts_node = root.find("parts").ok_or(SkinError::MissingSection("parts"))?;
        let mut parts = parts_node
            .children()
            .iter()
            .map(|node| Part::from_config(node, "buttons", ctx))
            .collect::<Result<Vec<_>, _>>()?;
        if parts.is_empty() {
            return Err(SkinError::NoParts);
        }

        let first = root
            .find("layouts")
            .and_then(|n| n.children().first())
            .ok_or(SkinError::MissingSection("layouts"))?;
        let mut base = Layout::from_config(first, &parts, ctx)?;
        base.orientation = Rotation::Deg0;

        // Derived rotations start from the authored dpad rotation.
        let dpad = base.dpad_rotation.unwrap_or_default();
        let mut layouts = vec![base];
        for (step, name) in (1..).zip(AUTO_LAYOUT_NAMES) {
            let by = dpad.rotate(Rotation::from_quarter_turns(step));
            let mut layout = layouts[0].rotated(&mut parts, by)?;
            layout.name = name.to_string();
            layouts.push(layout);
        }

        Ok(Self {
            version: 2,
            parts,
            layouts,
        })
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id.0)
    }

    pub fn layout(&self, id: LayoutId) -> Option<&Layout> {
        self.layouts.get(id.0)
    }

    pub fn layout_ids(&self) -> impl Iterator<Item = LayoutId> + '_ {
        (0..self.layouts.len()).map(LayoutId)
    }

    /// The head of the layout list, the authored portrait layout.
    pub fn first_layout(&self) -> LayoutId {
        LayoutId(0)
    }

    /// The first layout called `name`, else the first layout.
    pub fn layout_by_name(&self, name: &str) -> LayoutId {
        self.layouts
            .iter()
            .position(|l| !l.name.is_empty() && l.name == name)
            .map_or(self.first_layout(), LayoutId)
    }

    /// The first layout with the given orientation.
    pub fn layout_by_orientation(&self, orientation: Rotation) -> Option<LayoutId> {
        self.layouts
            .iter()
            .position(|l| l.orientation == orientation)
            .map(LayoutId)
    }

    /// The layout after `id`, wrapping to the first.
    pub fn next_layout(&self, id: LayoutId) -> LayoutId {
        LayoutId((id.0 + 1) % self.layouts.len())
    }

    /// The layout before `id`, wrapping to the last.
    pub fn prev_layout(&self, id: LayoutId) -> LayoutId {
        let len = self.layouts.len();
        LayoutId((id.0 % len + len - 1) % len)
    }

    fn display_location(&self, id: LayoutId) -> Option<(&Location, &Display)> {
        self.layout(id)?
            .locations
            .iter()
            .find_map(|loc| Some((loc, self.parts[loc.part.0].display()?)))
    }

    /// The first valid display met while scanning the layout's locations.
    pub fn layout_display(&self, id: LayoutId) -> Option<&Display> {
        self.display_location(id).map(|(_, display)| display)
    }

    /// Rotation to apply to directional input in this layout.
    ///
    /// An explicit `dpad-rotation` wins. Otherwise the rotation of the
    /// location whose part carries a `dpad-up` button is used.
    pub fn layout_dpad_rotation(&self, id: LayoutId) -> Rotation {
        let Some(layout) = self.layout(id) else {
            return Rotation::Deg0;
        };
        if let Some(rotation) = layout.dpad_rotation {
            return rotation;
        }
        layout
            .locations
            .iter()
            .find(|loc| self.parts[loc.part.0].has_key(KeyCode::DPAD_UP))
            .map_or(Rotation::Deg0, |loc| loc.rotation)
    }

    /// The framebuffer backing `display`, following shared framebuffers back
    /// to the part that owns it.
    pub fn display_framebuffer<'a>(&'a self, display: &'a Display) -> Option<&'a dyn Framebuffer> {
        let mut current = display;
        for _ in 0..=self.parts.len() {
            match &current.framebuffer {
                FramebufferSlot::Owned(fb) => return Some(&**fb),
                FramebufferSlot::None => return None,
                FramebufferSlot::Shared(owner) => current = self.part(*owner)?.display.as_ref()?,
            }
        }
        None
    }

    pub fn placed_display(&self, id: LayoutId) -> Option<PlacedDisplay> {
        let layout = self.layout(id)?;
        let (loc, display) = self.display_location(id)?;

        let full = loc.place(display.rect);
        let rotation = loc.rotation.rotate(display.rotation);
        let origin = match rotation {
            Rotation::Deg0 => full.pos,
            Rotation::Deg90 => Pos::new(full.right(), full.pos.y),
            Rotation::Deg180 => Pos::new(full.right(), full.bottom()),
            Rotation::Deg270 => Pos::new(full.pos.x, full.bottom()),
        };

        Some(PlacedDisplay {
            part: loc.part,
            rect: full.intersect(&layout.frame()).unwrap_or_default(),
            rotation,
            origin,
            data_size: display.framebuffer_size(),
            bpp: display.bpp,
        })
    }

    /// Every button of the layout, in location order and then authoring order.
    pub fn placed_buttons(&self, id: LayoutId) -> Vec<PlacedButton> {
        let Some(layout) = self.layout(id) else {
            return Vec::new();
        };
        layout
            .locations
            .iter()
            .flat_map(|loc| {
                self.parts[loc.part.0].buttons.iter().map(move |b| PlacedButton {
                    part: loc.part,
                    name: b.name.clone(),
                    keycode: b.keycode,
                    rect: loc.place(b.rect),
                })
            })
            .collect()
    }

    /// The topmost button under `pos`.
    pub fn button_at(&self, id: LayoutId, pos: Pos) -> Option<PlacedButton> {
        self.placed_buttons(id)
            .into_iter()
            .rev()
            .find(|b| b.rect.contains(pos))
    }

    /// Where and how to draw the layout's onion overlay, if it has one and a
    /// display to draw it on.
    pub fn onion_placement(&self, id: LayoutId) -> Option<OnionPlacement> {
        let onion = self.layout(id)?.onion.as_ref()?;
        let display = self.placed_display(id)?;

        let rotation = onion.rotation.rotate(display.rotation);
        let image = onion.image.clone_full(rotation, onion.alpha);
        let size = image.size();
        let r = display.rect;
        let pos = match rotation {
            Rotation::Deg0 => r.pos,
            Rotation::Deg90 => Pos::new(r.right().saturating_sub(size.w), r.pos.y),
            Rotation::Deg180 => Pos::new(
                r.right().saturating_sub(size.w),
                r.bottom().saturating_sub(size.h),
            ),
            Rotation::Deg270 => Pos::new(r.pos.x, r.bottom().saturating_sub(size.h)),
        };
        debug!("Onion for layout {} at {pos:?} turned {rotation}", id.0);

        Some(OnionPlacement {
            image,
            rect: Rect { pos, size },
            rotation,
            alpha: onion.alpha,
        })
    }
}
