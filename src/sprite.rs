//! Decoded images, sprite sheets and the loader seam
//!
//! File decoding belongs to the host: it hands over RGBA pixels through
//! [`ImageLoader`]. Everything after that (slicing sheets into frames,
//! building collision masks, rotating broken obstacles) happens here.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;
use image::{Rgba, RgbaImage, imageops};
use serde::{Deserialize, Serialize};

use crate::error::{AssetError, GeometryError};
use crate::sim::mask::Mask;

/// Alpha above this is solid for collision purposes
pub const MASK_ALPHA_THRESHOLD: u8 = 127;

/// Image filled with one colour
pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

/// Solid image with a transparent border of `margin` pixels
pub fn framed(width: u32, height: u32, margin: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let inside = x >= margin
            && y >= margin
            && x < width.saturating_sub(margin)
            && y < height.saturating_sub(margin);
        if inside { Rgba(rgba) } else { Rgba([0; 4]) }
    })
}

/// Wrap a tightly packed RGBA8 buffer
pub fn from_rgba(width: u32, height: u32, bytes: Vec<u8>) -> Result<RgbaImage, AssetError> {
    let expected = width as usize * height as usize * 4;
    let len = bytes.len();
    let bad_buffer = AssetError::BadBuffer {
        width,
        height,
        len,
        expected,
    };
    if len != expected {
        return Err(bad_buffer);
    }
    RgbaImage::from_raw(width, height, bytes).ok_or(bad_buffer)
}

/// Image dimensions as a vector
#[inline]
pub fn image_size(image: &RgbaImage) -> Vec2 {
    let (w, h) = image.dimensions();
    Vec2::new(w as f32, h as f32)
}

/// Cut a sheet into `columns x rows` equally sized frames, row by row
pub fn slice_sheet(sheet: &RgbaImage, columns: u32, rows: u32) -> Result<Vec<RgbaImage>, AssetError> {
    let (width, height) = sheet.dimensions();
    let bad_grid = || AssetError::BadGrid {
        width,
        height,
        columns,
        rows,
    };
    if columns == 0 || rows == 0 {
        return Err(bad_grid());
    }
    let frame_w = width / columns;
    let frame_h = height / rows;
    if frame_w == 0 || frame_h == 0 {
        return Err(bad_grid());
    }

    let mut frames = Vec::with_capacity((columns * rows) as usize);
    for j in 0..rows {
        for i in 0..columns {
            frames.push(imageops::crop_imm(sheet, frame_w * i, frame_h * j, frame_w, frame_h).to_image());
        }
    }
    Ok(frames)
}

/// Rotate counter-clockwise about the centre, keeping the original size
///
/// Nearest-neighbour sampling; corners that rotate out of the frame are cut
/// off.
pub fn rotate_center(image: &RgbaImage, degrees: f32) -> Result<RgbaImage, GeometryError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(GeometryError::Empty { width, height });
    }
    if !degrees.is_finite() {
        return Err(GeometryError::NonFiniteAngle(degrees));
    }

    let (sin, cos) = degrees.to_radians().sin_cos();
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let mut out = RgbaImage::new(width, height);

    for (dx, dy, pixel) in out.enumerate_pixels_mut() {
        // Inverse-map the destination pixel centre (y grows downward)
        let px = dx as f32 + 0.5 - cx;
        let py = dy as f32 + 0.5 - cy;
        let sx = (px * cos - py * sin + cx).floor();
        let sy = (px * sin + py * cos + cy).floor();
        if sx >= 0.0 && sy >= 0.0 && sx < width as f32 && sy < height as f32 {
            *pixel = *image.get_pixel(sx as u32, sy as u32);
        }
    }
    Ok(out)
}

/// Collision mask from the alpha channel
pub fn alpha_mask(image: &RgbaImage) -> Mask {
    let (width, height) = image.dimensions();
    let mut mask = Mask::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] > MASK_ALPHA_THRESHOLD {
            mask.set(x, y, true);
        }
    }
    mask
}

/// Source of decoded images, provided by the host
///
/// A filesystem host can hand `image::open(path)?.to_rgba8()` straight
/// through.
pub trait ImageLoader {
    fn load(&mut self, path: &str) -> Result<RgbaImage, AssetError>;
}

/// In-memory loader keyed by path
impl ImageLoader for HashMap<String, RgbaImage> {
    fn load(&mut self, path: &str) -> Result<RgbaImage, AssetError> {
        self.get(path)
            .cloned()
            .ok_or_else(|| AssetError::Missing(path.to_string()))
    }
}

/// Where a sheet lives and how it is cut
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSpec {
    pub path: String,
    #[serde(default = "one")]
    pub columns: u32,
    #[serde(default = "one")]
    pub rows: u32,
}

fn one() -> u32 {
    1
}

impl SheetSpec {
    pub fn new(path: &str, columns: u32, rows: u32) -> Self {
        Self {
            path: path.to_string(),
            columns,
            rows,
        }
    }

    pub fn single(path: &str) -> Self {
        Self::new(path, 1, 1)
    }
}

/// Every sprite the simulation needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteManifest {
    pub player: SheetSpec,
    pub cacti: Vec<SheetSpec>,
    pub bird: SheetSpec,
    pub tornado: SheetSpec,
    pub decorations: Vec<SheetSpec>,
    pub power_up: SheetSpec,
}

impl Default for SpriteManifest {
    fn default() -> Self {
        Self {
            player: SheetSpec::new("character/fox.png", 5, 1),
            cacti: (1..=3)
                .map(|i| SheetSpec::single(&format!("enemy/{i}.png")))
                .collect(),
            bird: SheetSpec::new("enemy/bird.png", 2, 1),
            tornado: SheetSpec::new("enemy/tornado.png", 4, 1),
            decorations: (1..=2)
                .map(|i| SheetSpec::single(&format!("decoration/sky_{i}.png")))
                .collect(),
            power_up: SheetSpec::single("power_up/star.png"),
        }
    }
}

/// One animation pose and its collision mask
#[derive(Debug, Clone)]
pub struct SpriteFrame {
    pub image: Arc<RgbaImage>,
    pub mask: Arc<Mask>,
}

impl SpriteFrame {
    pub fn new(image: RgbaImage) -> Self {
        let mask = alpha_mask(&image);
        Self {
            image: Arc::new(image),
            mask: Arc::new(mask),
        }
    }
}

/// A sliced sprite sheet (never empty)
#[derive(Debug, Clone)]
pub struct Sheet {
    frames: Vec<SpriteFrame>,
}

impl Sheet {
    pub fn from_image(image: &RgbaImage, columns: u32, rows: u32) -> Result<Self, AssetError> {
        let frames = slice_sheet(image, columns, rows)?
            .into_iter()
            .map(SpriteFrame::new)
            .collect();
        Ok(Self { frames })
    }

    /// Sheet of identical bordered frames, for headless runs and tests
    pub fn placeholder(width: u32, height: u32, frames: usize, rgba: [u8; 4]) -> Self {
        let frame = SpriteFrame::new(framed(width, height, 1, rgba));
        Self {
            frames: vec![frame; frames.max(1)],
        }
    }

    /// Frame by index (wraps)
    pub fn frame(&self, index: usize) -> &SpriteFrame {
        &self.frames[index % self.frames.len()]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Size of one frame
    pub fn size(&self) -> Vec2 {
        image_size(&self.frames[0].image)
    }
}

/// All sheets used by a session, shared cheaply across restarts
#[derive(Debug, Clone)]
pub struct SpriteCatalog {
    pub player: Sheet,
    pub cacti: Vec<Sheet>,
    pub bird: Sheet,
    pub tornado: Sheet,
    pub decorations: Vec<Sheet>,
    pub power_up: Sheet,
}

impl SpriteCatalog {
    /// Load and slice every sheet named in the manifest
    pub fn load<L: ImageLoader + ?Sized>(
        loader: &mut L,
        manifest: &SpriteManifest,
    ) -> Result<Self, AssetError> {
        let mut sheet = |spec: &SheetSpec| -> Result<Sheet, AssetError> {
            let image = loader.load(&spec.path)?;
            Sheet::from_image(&image, spec.columns, spec.rows)
        };

        let player = sheet(&manifest.player)?;
        let cacti = manifest.cacti.iter().map(&mut sheet).collect::<Result<Vec<_>, _>>()?;
        let bird = sheet(&manifest.bird)?;
        let tornado = sheet(&manifest.tornado)?;
        let decorations = manifest
            .decorations
            .iter()
            .map(&mut sheet)
            .collect::<Result<Vec<_>, _>>()?;
        let power_up = sheet(&manifest.power_up)?;

        let catalog = Self {
            player,
            cacti,
            bird,
            tornado,
            decorations,
            power_up,
        };
        catalog.validate()?;

        log::info!(
            "Loaded sprites: {} cacti, {} decorations, player {}x{}",
            catalog.cacti.len(),
            catalog.decorations.len(),
            catalog.player.size().x,
            catalog.player.size().y
        );
        Ok(catalog)
    }

    /// Every group the spawner draws from must be non-empty
    pub fn validate(&self) -> Result<(), AssetError> {
        if self.cacti.is_empty() {
            return Err(AssetError::EmptyGroup("cacti"));
        }
        if self.decorations.is_empty() {
            return Err(AssetError::EmptyGroup("decorations"));
        }
        Ok(())
    }

    /// Solid placeholder art with the proportions of the real sprites
    pub fn placeholder() -> Self {
        Self {
            player: Sheet::placeholder(44, 48, 5, [230, 120, 40, 255]),
            cacti: vec![
                Sheet::placeholder(24, 48, 1, [40, 160, 60, 255]),
                Sheet::placeholder(34, 52, 1, [40, 160, 60, 255]),
                Sheet::placeholder(50, 40, 1, [40, 160, 60, 255]),
            ],
            bird: Sheet::placeholder(46, 32, 2, [90, 90, 90, 255]),
            tornado: Sheet::placeholder(60, 96, 4, [160, 160, 190, 255]),
            decorations: vec![
                Sheet::placeholder(64, 24, 1, [250, 250, 250, 255]),
                Sheet::placeholder(80, 30, 1, [250, 250, 250, 255]),
            ],
            power_up: Sheet::placeholder(24, 24, 1, [250, 210, 40, 255]),
        }
    }
}
