//! Splitting an image into independently coded square tiles.

use crate::view::Rect;

/// Iterator over the tiles of an image, row by row. Tiles on the right and bottom edges
/// are clipped to the image.
#[derive(Debug, Clone)]
pub struct Tiles {
    width: usize,
    height: usize,
    size: usize,
    x: usize,
    y: usize,
}

/// Tiles of a `width` x `height` image. Without a region size the whole image is a single
/// tile. An empty image has no tiles.
pub fn split(width: usize, height: usize, region_size: Option<usize>) -> Tiles {
    let size = region_size.unwrap_or(width.max(height)).max(1);
    Tiles {
        width,
        height,
        size,
        x: 0,
        y: 0,
    }
}

impl Iterator for Tiles {
    type Item = Rect;

    fn next(&mut self) -> Option<Self::Item> {
        if self.width == 0 || self.y >= self.height {
            return None;
        }

        let tile = Rect::full(self.width, self.height).block(
            self.x,
            self.y,
            self.size.min(self.width - self.x),
            self.size.min(self.height - self.y),
        );

        self.x += self.size;
        if self.x >= self.width {
            self.x = 0;
            self.y += self.size;
        }

        Some(tile)
    }
}
