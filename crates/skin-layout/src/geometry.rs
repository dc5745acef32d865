//! Integer geometry used by skin layouts: positions, sizes, rectangles and
//! quarter-turn rotations.

use serde::Serialize;
use std::fmt;

/// A rotation by a multiple of 90 degrees, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Build a rotation from a count of quarter turns, reduced mod 4.
    pub fn from_quarter_turns(turns: i32) -> Self {
        Self::ALL[turns.rem_euclid(4) as usize]
    }

    pub fn quarter_turns(self) -> i32 {
        self as i32
    }

    pub fn degrees(self) -> u32 {
        self as u32 * 90
    }

    /// Compose two rotations.
    pub fn rotate(self, by: Rotation) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + by.quarter_turns())
    }

    pub fn inverse(self) -> Self {
        Self::from_quarter_turns(-self.quarter_turns())
    }

    /// Odd rotations swap the horizontal and vertical axes.
    pub fn is_odd(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

impl Size {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    pub fn rotate(self, by: Rotation) -> Self {
        if by.is_odd() {
            Self::new(self.h, self.w)
        } else {
            self
        }
    }

    pub fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Rect {
    pub pos: Pos,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            pos: Pos::new(x, y),
            size: Size::new(w, h),
        }
    }

    pub fn right(&self) -> i32 {
        self.pos.x.saturating_add(self.size.w)
    }

    pub fn bottom(&self) -> i32 {
        self.pos.y.saturating_add(self.size.h)
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    pub fn contains(&self, p: Pos) -> bool {
        p.x >= self.pos.x && p.x < self.right() && p.y >= self.pos.y && p.y < self.bottom()
    }

    pub fn translate(self, by: Pos) -> Self {
        Self {
            pos: Pos::new(self.pos.x.saturating_add(by.x), self.pos.y.saturating_add(by.y)),
            size: self.size,
        }
    }

    /// Overlap of two rectangles, `None` when they do not intersect.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.pos.x.max(other.pos.x);
        let y0 = self.pos.y.max(other.pos.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        (x1 > x0 && y1 > y0)
            .then(|| Rect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0)))
    }

    /// Rotate around the origin of the coordinate space.
    pub fn rotate(self, by: Rotation) -> Self {
        let Rect {
            pos: Pos { x, y },
            size: Size { w, h },
        } = self;
        let left = self.right().saturating_neg();
        let top = self.bottom().saturating_neg();
        match by {
            Rotation::Deg0 => self,
            Rotation::Deg90 => Rect::new(top, x, h, w),
            Rotation::Deg180 => Rect::new(left, top, w, h),
            Rotation::Deg270 => Rect::new(y, left, h, w),
        }
    }

    /// Map a child rectangle into the coordinate space of its rotated parent.
    ///
    /// `parent_size` is the size of the parent *after* rotation, so the child
    /// keeps its place relative to the parent's edges.
    pub fn rotate_in_parent(self, parent_size: Size, by: Rotation) -> Self {
        let Pos { x, y } = self.pos;
        let size = self.size.rotate(by);
        let from_right = |offset: i32| parent_size.w.saturating_sub(offset).saturating_sub(size.w);
        let from_bottom = |offset: i32| parent_size.h.saturating_sub(offset).saturating_sub(size.h);
        let pos = match by {
            Rotation::Deg0 => self.pos,
            Rotation::Deg90 => Pos::new(from_right(y), x),
            Rotation::Deg180 => Pos::new(from_right(x), from_bottom(y)),
            Rotation::Deg270 => Pos::new(y, from_bottom(x)),
        };
        Rect { pos, size }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.size.w, self.size.h, self.pos.x, self.pos.y
        )
    }
}

/// Accumulates the min/max extent of a set of rectangles.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingBox {
    extent: Option<(i32, i32, i32, i32)>,
}

impl BoundingBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, r: &Rect) {
        let (x0, y0, x1, y1) = (r.pos.x, r.pos.y, r.right(), r.bottom());
        self.extent = Some(match self.extent {
            None => (x0, y0, x1, y1),
            Some((a0, b0, a1, b1)) => (a0.min(x0), b0.min(y0), a1.max(x1), b1.max(y1)),
        });
    }

    /// The union rectangle, `None` if nothing was added or it has no area.
    pub fn to_rect(&self) -> Option<Rect> {
        let (x0, y0, x1, y1) = self.extent?;
        let rect = Rect::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0));
        (!rect.is_empty()).then_some(rect)
    }
}
