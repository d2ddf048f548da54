//! # Tile Image Surface
//!
//! The in-memory bitmap of the rendered map, updated incrementally as chunk
//! snapshots flow through the background tasks. The trait is what the update
//! task talks to; [`MapTileImage`] is the crate's own `image`-backed
//! implementation, covering one dimension with a fixed pixel window.

use crate::core::MtResource;
use image::{Rgba, RgbaImage};
use log::trace;
use std::io::{Seek, Write};

use super::region::RegionStore;

/// An incrementally updated pixel surface showing the rendered map.
///
/// Shared between all worker threads; implementations synchronize
/// internally. Updates re-query the region store rather than carrying pixel
/// data, so the store stays the single source of rendered truth.
pub trait TileImageSurface: Send + Sync {
    /// Re-renders the given pixel rectangle by re-reading it from `store`,
    /// scoped to `dimension`. Rectangles outside the surface's window (or in
    /// another dimension) are ignored or clipped; this is never an error.
    fn update_area(
        &self,
        store: &dyn RegionStore,
        pixel_x: i32,
        pixel_z: i32,
        width: u32,
        height: u32,
        dimension: i32,
    );
}

/// An RGBA bitmap window onto one dimension's map.
///
/// The window spans `width x height` pixels starting at `origin` in map
/// pixel space (one map pixel per block column). Update rectangles are
/// clipped to the window; pixels arrive as 0xAARRGGBB from the store and are
/// unpacked into RGBA.
pub struct MapTileImage {
    dimension: i32,
    origin: (i32, i32),
    pixels: MtResource<RgbaImage>,
}

impl MapTileImage {
    /// Creates a black, fully transparent window of `width x height` pixels
    /// whose top-left corner sits at `origin` in map pixel space.
    pub fn new(dimension: i32, origin: (i32, i32), width: u32, height: u32) -> Self {
        Self {
            dimension,
            origin,
            pixels: MtResource::new(RgbaImage::new(width, height)),
        }
    }

    /// The dimension this window renders.
    pub fn dimension(&self) -> i32 {
        self.dimension
    }

    /// The pixel at window-relative coordinates, as stored.
    pub fn pixel(&self, x: u32, z: u32) -> [u8; 4] {
        self.pixels.get().get_pixel(x, z).0
    }

    /// Encodes the current window contents as PNG.
    pub fn write_png<W: Write + Seek>(&self, writer: &mut W) -> image::ImageResult<()> {
        self.pixels.get().write_to(writer, image::ImageFormat::Png)
    }
}

fn unpack_argb(pixel: u32) -> Rgba<u8> {
    let [a, r, g, b] = pixel.to_be_bytes();
    Rgba([r, g, b, a])
}

impl TileImageSurface for MapTileImage {
    fn update_area(
        &self,
        store: &dyn RegionStore,
        pixel_x: i32,
        pixel_z: i32,
        width: u32,
        height: u32,
        dimension: i32,
    ) {
        if dimension != self.dimension {
            return;
        }

        let fetched = store.read_pixels(dimension, pixel_x, pixel_z, width, height);
        if fetched.len() != (width as usize) * (height as usize) {
            trace!(
                "region store returned {} pixels for a {}x{} area, skipping redraw",
                fetched.len(),
                width,
                height
            );
            return;
        }

        let mut pixels = self.pixels.get_mut();
        for row in 0..height {
            for col in 0..width {
                let image_x = i64::from(pixel_x) + i64::from(col) - i64::from(self.origin.0);
                let image_z = i64::from(pixel_z) + i64::from(row) - i64::from(self.origin.1);
                if image_x < 0
                    || image_z < 0
                    || image_x >= i64::from(pixels.width())
                    || image_z >= i64::from(pixels.height())
                {
                    continue;
                }
                let source = fetched[row as usize * width as usize + col as usize];
                pixels.put_pixel(image_x as u32, image_z as u32, unpack_argb(source));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_state::test_util::MemoryRegionStore;

    #[test]
    fn update_area_writes_exactly_the_requested_rectangle() {
        let store = MemoryRegionStore::with_fill(0xff11_2233);
        let tile = MapTileImage::new(0, (0, 0), 64, 64);

        tile.update_area(&store, 16, 16, 16, 16, 0);

        // Inside the rectangle: unpacked ARGB -> RGBA.
        assert_eq!(tile.pixel(16, 16), [0x11, 0x22, 0x33, 0xff]);
        assert_eq!(tile.pixel(31, 31), [0x11, 0x22, 0x33, 0xff]);
        // Outside: untouched.
        assert_eq!(tile.pixel(15, 16), [0, 0, 0, 0]);
        assert_eq!(tile.pixel(32, 16), [0, 0, 0, 0]);
    }

    #[test]
    fn update_area_clips_to_the_window() {
        let store = MemoryRegionStore::with_fill(0xffff_ffff);
        let tile = MapTileImage::new(0, (0, 0), 16, 16);

        // A rectangle entirely left of the window writes nothing.
        tile.update_area(&store, -16, 0, 16, 16, 0);
        assert_eq!(tile.pixel(0, 0), [0, 0, 0, 0]);

        // A rectangle overhanging the bottom-right corner clips cleanly.
        tile.update_area(&store, 8, 8, 16, 16, 0);
        assert_eq!(tile.pixel(8, 8), [0xff, 0xff, 0xff, 0xff]);
        assert_eq!(tile.pixel(15, 15), [0xff, 0xff, 0xff, 0xff]);
        assert_eq!(tile.pixel(7, 7), [0, 0, 0, 0]);
    }

    #[test]
    fn update_area_ignores_other_dimensions() {
        let store = MemoryRegionStore::with_fill(0xffff_ffff);
        let tile = MapTileImage::new(0, (0, 0), 16, 16);

        tile.update_area(&store, 0, 0, 16, 16, -1);
        assert_eq!(tile.pixel(0, 0), [0, 0, 0, 0]);
    }
}
