//! Per-pixel collision masks
//!
//! Sprites carry transparent padding, so bounding boxes alone report hits
//! that never touch. A mask marks the solid pixels of one frame.

use glam::IVec2;

/// A boolean bitmap the size of a sprite frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Empty mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width * height) as usize],
        }
    }

    /// Every pixel solid
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width * height) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, solid: bool) {
        let idx = (y * self.width + x) as usize;
        self.bits[idx] = solid;
    }

    /// Number of solid pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// Keep only the bottom `height` rows
    pub fn crop_bottom(&self, height: u32) -> Mask {
        let height = height.min(self.height);
        let skip = ((self.height - height) * self.width) as usize;
        Mask {
            width: self.width,
            height,
            bits: self.bits[skip..].to_vec(),
        }
    }

    /// Do any solid pixels coincide when `other` sits at `offset` from self?
    pub fn overlap(&self, other: &Mask, offset: IVec2) -> bool {
        // Intersection of the two frames in self's coordinates
        let x0 = offset.x.max(0);
        let y0 = offset.y.max(0);
        let x1 = (offset.x + other.width as i32).min(self.width as i32);
        let y1 = (offset.y + other.height as i32).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return false;
        }

        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x as u32, y as u32)
                    && other.get((x - offset.x) as u32, (y - offset.y) as u32)
                {
                    return true;
                }
            }
        }
        false
    }
}
