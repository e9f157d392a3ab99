//! Typed two-class land/sky mask.
//!
//! A [`BinaryMask`] stores one [`Region`] per pixel rather than raw 0/1
//! values, so the meaning of each pixel cannot silently flip between
//! pipeline stages. Raster conversion happens only at the boundaries
//! where `imageproc` operators need a grey image: Land is rendered as
//! 255 (foreground) and Sky as 0.

use std::borrow::Cow;

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::types::Dimensions;

/// Pixel class of a [`BinaryMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Sky.
    Sky,
    /// Land or sea surface.
    Land,
}

impl Region {
    /// The other class.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Sky => Self::Land,
            Self::Land => Self::Sky,
        }
    }
}

/// Raster value used for Land when a mask is converted to a grey image.
pub const LAND_VALUE: u8 = 255;

/// Raster value used for Sky when a mask is converted to a grey image.
pub const SKY_VALUE: u8 = 0;

/// A per-pixel land/sky classification of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    regions: Vec<Region>,
}

impl BinaryMask {
    /// Build a mask by classifying every pixel with `f(x, y)`.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Region) -> Self {
        let mut regions = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                regions.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            regions,
        }
    }

    /// A mask where every pixel is `region`.
    #[must_use]
    pub fn filled(width: u32, height: u32, region: Region) -> Self {
        Self {
            width,
            height,
            regions: vec![region; width as usize * height as usize],
        }
    }

    /// Interpret a grey raster as a land mask: non-zero pixels are Land.
    #[must_use]
    pub fn from_land_raster(raster: &GrayImage) -> Self {
        Self {
            width: raster.width(),
            height: raster.height(),
            regions: raster
                .pixels()
                .map(|p| if p.0[0] > 0 { Region::Land } else { Region::Sky })
                .collect(),
        }
    }

    /// Render the mask as a grey raster ([`LAND_VALUE`] / [`SKY_VALUE`]).
    #[must_use]
    pub fn to_land_raster(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([match self.region(x, y) {
                Region::Land => LAND_VALUE,
                Region::Sky => SKY_VALUE,
            }])
        })
    }

    /// Mask width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Mask dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Class of the pixel at `(x, y)`.
    ///
    /// Coordinates must lie inside the mask.
    #[must_use]
    pub fn region(&self, x: u32, y: u32) -> Region {
        self.regions[y as usize * self.width as usize + x as usize]
    }

    /// All pixel classes in row-major order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Number of pixels classified as `region`.
    #[must_use]
    pub fn count(&self, region: Region) -> u64 {
        self.regions.iter().filter(|&&r| r == region).count() as u64
    }

    /// Returns `true` when every pixel has the same class.
    ///
    /// Segmentation of a featureless frame ends up here; downstream
    /// stages then have no boundary to work with.
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        self.regions.windows(2).all(|w| w[0] == w[1])
    }

    /// The class holding a strict majority of the top `rows` rows, or
    /// `None` on a tie or an empty mask.
    #[must_use]
    pub fn top_rows_majority(&self, rows: u32) -> Option<Region> {
        let rows = rows.min(self.height) as usize;
        let top = &self.regions[..rows * self.width as usize];
        let land = top.iter().filter(|&&r| r == Region::Land).count();
        let sky = top.len() - land;
        match land.cmp(&sky) {
            std::cmp::Ordering::Greater => Some(Region::Land),
            std::cmp::Ordering::Less => Some(Region::Sky),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The mask with both classes swapped.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            regions: self.regions.iter().map(|r| r.opposite()).collect(),
        }
    }

    /// Normalise polarity so that the top of the frame is sky.
    ///
    /// Thresholding does not guarantee which class ends up on top (bright
    /// water under a dark sky flips it). When Land holds the majority of
    /// the top `rows` rows the classes are swapped; otherwise the mask is
    /// returned unchanged.
    #[must_use]
    pub fn sky_on_top(&self, rows: u32) -> Cow<'_, Self> {
        if self.top_rows_majority(rows) == Some(Region::Land) {
            log::debug!("land dominates the top {rows} rows, inverting mask polarity");
            Cow::Owned(self.inverted())
        } else {
            Cow::Borrowed(self)
        }
    }
}
