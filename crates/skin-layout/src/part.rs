//! Skin parts: a background, an optional display and a set of buttons.

use crate::framebuffer::Framebuffer;
use crate::geometry::{BoundingBox, Rect, Rotation, Size};
use crate::image::SkinImage;
use crate::keycode::KeyCode;
use crate::{BuildContext, SkinError};
use log::{debug, warn};
use serde::Serialize;
use skin_config::ConfigNode;

/// Index of a part inside its [`SkinFile`](crate::SkinFile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PartId(pub usize);

#[derive(Debug, Clone)]
pub struct Background {
    pub image: SkinImage,
    pub rect: Rect,
}

impl Background {
    fn from_config(node: &ConfigNode, ctx: &mut BuildContext<'_>) -> Option<Self> {
        let file = node.str("image")?;
        let image = ctx.store.find_in(ctx.basepath, file);
        if image.is_none() {
            warn!("Ignoring background with missing image '{file}'");
            return None;
        }
        let size = image.size();
        Some(Self {
            rect: Rect::new(node.int("x", 0), node.int("y", 0), size.w, size.h),
            image,
        })
    }
}

/// Where a display's framebuffer lives.
#[derive(Debug, Default)]
pub enum FramebufferSlot {
    /// No framebuffer was requested or the factory refused one.
    #[default]
    None,
    Owned(Box<dyn Framebuffer>),
    /// Rotated copies reuse the framebuffer of the part they were derived from.
    Shared(PartId),
}

#[derive(Debug)]
pub struct Display {
    pub rect: Rect,
    pub rotation: Rotation,
    pub bpp: u32,
    pub framebuffer: FramebufferSlot,
}

impl Display {
    pub fn new(rect: Rect, rotation: Rotation, bpp: u32) -> Self {
        Self {
            rect,
            rotation,
            bpp,
            framebuffer: FramebufferSlot::None,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.rect.is_empty()
    }

    pub fn owns_framebuffer(&self) -> bool {
        matches!(self.framebuffer, FramebufferSlot::Owned(_))
    }

    /// Size of the framebuffer content, i.e. the display before its rotation.
    pub fn framebuffer_size(&self) -> Size {
        self.rect.size.rotate(self.rotation.inverse())
    }

    fn from_config(node: &ConfigNode, ctx: &mut BuildContext<'_>) -> Option<Self> {
        let rect = Rect::new(
            node.int("x", 0),
            node.int("y", 0),
            node.int("width", 0),
            node.int("height", 0),
        );
        let rotation = Rotation::from_quarter_turns(node.unsigned("rotation", 0) as i32);
        let bpp = node.int("bpp", ctx.options.default_bpp as i32) as u32;

        let mut display = Display::new(rect, rotation, bpp);
        if !display.is_valid() {
            debug!("Ignoring display with empty size {}", rect.size);
            return None;
        }

        if let Some(factory) = ctx.framebuffers.as_deref_mut() {
            let size = display.framebuffer_size();
            let fb = factory.create_framebuffer(size.w as u32, size.h as u32, bpp);
            display.framebuffer = match fb {
                Some(fb) => FramebufferSlot::Owned(fb),
                None => {
                    warn!("Could not create {size}x{bpp} framebuffer for display");
                    FramebufferSlot::None
                }
            };
        }
        Some(display)
    }

    /// Copy of this display for a part rotated by `by`. The copy keeps its
    /// position, swaps its size as needed and shares the framebuffer.
    fn rotated(&self, source: PartId, by: Rotation) -> Self {
        let framebuffer = match self.framebuffer {
            FramebufferSlot::Shared(owner) => FramebufferSlot::Shared(owner),
            _ => FramebufferSlot::Shared(source),
        };
        Self {
            rect: Rect {
                pos: self.rect.pos,
                size: self.rect.size.rotate(by),
            },
            rotation: self.rotation.rotate(by),
            bpp: self.bpp,
            framebuffer,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Button {
    pub name: String,
    pub rect: Rect,
    pub keycode: KeyCode,
    pub image: SkinImage,
}

impl Button {
    fn from_config(node: &ConfigNode, ctx: &mut BuildContext<'_>) -> Option<Self> {
        let Some(file) = node.str("image") else {
            warn!("Ignoring button '{}' without image", node.name);
            return None;
        };
        let image = ctx.store.find_in(ctx.basepath, file);
        if image.is_none() {
            warn!("Ignoring button '{}' with missing image '{file}'", node.name);
            return None;
        }

        let keycode = KeyCode::from_button_name(&node.name).unwrap_or_else(|| {
            warn!("Skin file button uses unknown key name '{}'", node.name);
            KeyCode::NONE
        });

        let size = image.size();
        Some(Self {
            name: node.name.clone(),
            rect: Rect::new(node.int("x", 0), node.int("y", 0), size.w, size.h),
            keycode,
            image,
        })
    }
}

#[derive(Debug)]
pub struct Part {
    pub name: String,
    pub background: Option<Background>,
    pub display: Option<Display>,
    /// Buttons in authoring order.
    pub buttons: Vec<Button>,
    /// Union of the background, display and button rectangles.
    pub rect: Rect,
    derived_from: Option<PartId>,
}

impl Part {
    /// Build a part from its config block. `buttons_key` names the child
    /// holding the buttons (`button` in v1 files, `buttons` in v2).
    pub(crate) fn from_config(
        node: &ConfigNode,
        buttons_key: &str,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Self, SkinError> {
        let background = node
            .find("background")
            .and_then(|n| Background::from_config(n, ctx));
        let display = node
            .find("display")
            .and_then(|n| Display::from_config(n, ctx));
        let buttons = node
            .find(buttons_key)
            .map(|n| {
                n.children()
                    .iter()
                    .filter_map(|b| Button::from_config(b, ctx))
                    .collect()
            })
            .unwrap_or_default();

        let mut part = Part {
            name: node.name.clone(),
            background,
            display,
            buttons,
            rect: Rect::default(),
            derived_from: None,
        };
        part.rect = part
            .bounds()
            .ok_or_else(|| SkinError::EmptyPart(part.name.clone()))?;

        debug!(
            "Built part '{}' {} ({} buttons)",
            part.name,
            part.rect,
            part.buttons.len()
        );
        Ok(part)
    }

    /// A part holding nothing but `display`.
    pub fn from_display(display: Display) -> Self {
        Self {
            name: String::new(),
            rect: display.rect,
            background: None,
            display: Some(display),
            buttons: Vec::new(),
            derived_from: None,
        }
    }

    /// The part this one was rotated from, if any.
    pub fn derived_from(&self) -> Option<PartId> {
        self.derived_from
    }

    pub fn display(&self) -> Option<&Display> {
        self.display.as_ref().filter(|d| d.is_valid())
    }

    pub fn has_key(&self, keycode: KeyCode) -> bool {
        self.buttons.iter().any(|b| b.keycode == keycode)
    }

    fn bounds(&self) -> Option<Rect> {
        let mut bbox = BoundingBox::new();
        if let Some(bg) = &self.background {
            bbox.update(&bg.rect);
        }
        if let Some(display) = self.display() {
            bbox.update(&display.rect);
        }
        for button in &self.buttons {
            bbox.update(&button.rect);
        }
        bbox.to_rect()
    }

    /// Size the buttons are laid out against: the background when there is
    /// one, else the extent of the part from its origin.
    fn button_frame(&self) -> Size {
        match &self.background {
            Some(bg) => bg.rect.size,
            None => Size::new(self.rect.right(), self.rect.bottom()),
        }
    }

    /// A new part holding this one's contents rotated by `by`.
    ///
    /// Images are rotated into uncached clones, buttons are re-anchored against
    /// the rotated background, and the display shares the framebuffer of `id`.
    pub(crate) fn rotated(&self, id: PartId, by: Rotation) -> Result<Self, SkinError> {
        let background = match &self.background {
            Some(bg) => {
                let image = bg.image.clone_rotated(by);
                if image.is_none() {
                    return Err(SkinError::ImageRotation(self.name.clone()));
                }
                Some(Background {
                    image,
                    rect: Rect {
                        pos: bg.rect.pos,
                        size: bg.rect.size.rotate(by),
                    },
                })
            }
            None => None,
        };

        let frame = self.button_frame().rotate(by);
        let buttons = self
            .buttons
            .iter()
            .map(|b| {
                let image = b.image.clone_rotated(by);
                if image.is_none() {
                    return Err(SkinError::ImageRotation(self.name.clone()));
                }
                Ok(Button {
                    name: b.name.clone(),
                    rect: b.rect.rotate_in_parent(frame, by),
                    keycode: b.keycode,
                    image,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut part = Part {
            name: self.name.clone(),
            background,
            display: self.display().map(|d| d.rotated(id, by)),
            buttons,
            rect: Rect::default(),
            derived_from: Some(id),
        };
        part.rect = part
            .bounds()
            .ok_or_else(|| SkinError::EmptyPart(part.name.clone()))?;
        Ok(part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LoadOptions;
    use crate::framebuffer::MemoryFramebufferFactory;
    use crate::image::ImageStore;
    use skin_config::parse;
    use std::io::Cursor;
    use std::path::Path;

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([1, 2, 3, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn store() -> ImageStore {
        let mut store = ImageStore::default();
        store.register_resource(":bg.png", png(100, 200));
        store.register_resource(":key.png", png(10, 20));
        store
    }

    fn build(
        text: &str,
        store: &mut ImageStore,
        fb: &mut MemoryFramebufferFactory,
    ) -> Result<Part, SkinError> {
        let root = parse(text).unwrap();
        let options = LoadOptions::default();
        let mut ctx = BuildContext {
            store,
            basepath: Path::new(":"),
            framebuffers: Some(fb),
            options: &options,
        };
        Part::from_config(&root.children()[0], "buttons", &mut ctx)
    }

    const PHONE: &str = "
phone {
    background {
        image bg.png
    }
    display {
        x 10
        y 20
        width 80
        height 60
        rotation 1
    }
    buttons {
        home {
            image key.png
            x 5
            y 150
        }
        mystery {
            image key.png
            x 40
            y 150
        }
        back {
            image missing.png
        }
    }
}
";

    #[test]
    fn part_from_config() {
        let mut store = store();
        let mut fb = MemoryFramebufferFactory::new();
        let part = build(PHONE, &mut store, &mut fb).unwrap();

        assert_eq!(part.name, "phone");
        assert_eq!(part.rect, Rect::new(0, 0, 100, 200));
        assert_eq!(part.buttons.len(), 2);
        assert_eq!(part.buttons[0].keycode, KeyCode::HOME);
        assert_eq!(part.buttons[1].keycode, KeyCode::NONE);
        assert_eq!(part.buttons[0].rect, Rect::new(5, 150, 10, 20));

        let display = part.display().unwrap();
        assert_eq!(display.bpp, 16);
        assert!(display.owns_framebuffer());
        // Framebuffer is the display rect turned back by the display rotation.
        assert_eq!(fb.created(), &[(60, 80, 16)]);
    }

    #[test]
    fn empty_part_is_rejected() {
        let mut store = store();
        let mut fb = MemoryFramebufferFactory::new();
        let err = build("hole {\n    background {\n        x 4\n    }\n}\n", &mut store, &mut fb)
            .unwrap_err();
        assert!(matches!(err, SkinError::EmptyPart(name) if name == "hole"));
    }

    #[test]
    fn rotated_part() {
        let mut store = store();
        let mut fb = MemoryFramebufferFactory::new();
        let part = build(PHONE, &mut store, &mut fb).unwrap();
        let rotated = part.rotated(PartId(0), Rotation::Deg90).unwrap();

        assert_eq!(rotated.derived_from(), Some(PartId(0)));
        let bg = rotated.background.as_ref().unwrap();
        assert_eq!(bg.rect.size, Size::new(200, 100));
        assert_eq!(bg.image.size(), Size::new(200, 100));
        assert!(!bg.image.is_cached());

        // (5, 150, 10x20) in a 200x100 frame after a quarter turn.
        assert_eq!(rotated.buttons[0].rect, Rect::new(200 - 150 - 20, 5, 20, 10));

        let display = rotated.display().unwrap();
        assert_eq!(display.rect, Rect::new(10, 20, 60, 80));
        assert_eq!(display.rotation, Rotation::Deg180);
        assert!(matches!(display.framebuffer, FramebufferSlot::Shared(PartId(0))));
        assert_eq!(rotated.rect, Rect::new(0, 0, 200, 100));
    }
}
