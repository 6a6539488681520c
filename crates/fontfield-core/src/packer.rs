//! Guillotine rectangle packing into a square atlas.

use crate::error::{FontError, Result};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    fn fits(&self, width: u32, height: u32) -> bool {
        width <= self.width && height <= self.height
    }
}

/// One rectangle to place, tagged with the glyph it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackItem {
    pub glyph: u16,
    pub width: u32,
    pub height: u32,
}

/// Result of a successful pack. `placements[i]` belongs to item `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packing {
    pub size: u32,
    pub placements: Vec<Rectangle>,
}

#[derive(Clone, Copy, Debug)]
pub struct GuillotinePacker {
    growth_step: u32,
    max_size: u32,
}

impl GuillotinePacker {
    pub fn new(growth_step: u32, max_size: u32) -> Self {
        Self {
            growth_step: growth_step.max(1),
            max_size,
        }
    }

    /// Pack `items` into the smallest square this growth schedule reaches.
    ///
    /// Starts from the square root of the total area and grows by the step
    /// until one pass places everything. Growth stops at the size that would
    /// fit every item side by side, or `max_size`, whichever is smaller.
    pub fn pack(&self, items: &[PackItem]) -> Result<Packing> {
        for item in items {
            if item.width > self.max_size || item.height > self.max_size {
                return Err(FontError::GlyphTooLarge {
                    glyph: item.glyph,
                    width: item.width,
                    height: item.height,
                    max_size: self.max_size,
                });
            }
        }

        let total_area: u64 = items
            .iter()
            .map(|i| u64::from(i.width) * u64::from(i.height))
            .sum();
        let sum_width: u64 = items.iter().map(|i| u64::from(i.width)).sum();
        let sum_height: u64 = items.iter().map(|i| u64::from(i.height)).sum();
        let limit = (sum_width.max(sum_height) + u64::from(self.growth_step))
            .min(u64::from(self.max_size)) as u32;

        let mut size = (ceil_sqrt(total_area) as u32).clamp(1, limit.max(1));
        loop {
            if let Some(placements) = pack_pass(size, items) {
                log::debug!("packed {} rectangle(s) into {size}x{size}", items.len());
                return Ok(Packing { size, placements });
            }
            if size >= limit {
                return Err(FontError::AtlasOverflow {
                    glyphs: items.len(),
                    max_size: self.max_size,
                });
            }
            log::trace!("{size}x{size} too small, growing");
            size = size.saturating_add(self.growth_step).min(limit);
        }
    }
}

fn ceil_sqrt(n: u64) -> u64 {
    let mut root = (n as f64).sqrt() as u64;
    while root * root < n {
        root += 1;
    }
    while root > 0 && (root - 1) * (root - 1) >= n {
        root -= 1;
    }
    root
}

/// One attempt at a fixed size. `None` when something did not fit.
fn pack_pass(size: u32, items: &[PackItem]) -> Option<Vec<Rectangle>> {
    let mut free = vec![Rectangle::new(0, 0, size, size)];
    let mut placements = vec![Rectangle::default(); items.len()];
    let mut remaining: Vec<usize> = (0..items.len()).collect();

    while !remaining.is_empty() {
        let (space_index, slot) = best_fit(&free, items, &remaining)?;
        let space = free.remove(space_index);
        let item_index = remaining.remove(slot);
        let item = items[item_index];
        placements[item_index] = Rectangle::new(space.x, space.y, item.width, item.height);
        free.extend(split(space, item.width, item.height));
    }
    Some(placements)
}

/// Free space and remaining-slot of the best fitting pair. An exact fit ends
/// the search, otherwise the smallest short-side leftover wins.
fn best_fit(free: &[Rectangle], items: &[PackItem], remaining: &[usize]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, u32)> = None;
    for (space_index, space) in free.iter().enumerate() {
        for (slot, &item_index) in remaining.iter().enumerate() {
            let item = items[item_index];
            if !space.fits(item.width, item.height) {
                continue;
            }
            let dw = space.width - item.width;
            let dh = space.height - item.height;
            if dw == 0 && dh == 0 {
                return Some((space_index, slot));
            }
            let score = dw.min(dh);
            if best.is_none_or(|(_, _, s)| score < s) {
                best = Some((space_index, slot, score));
            }
        }
    }
    best.map(|(space_index, slot, _)| (space_index, slot))
}

/// Cut the leftover of `space` along the axis with more room, keeping that
/// remainder whole.
fn split(space: Rectangle, width: u32, height: u32) -> impl Iterator<Item = Rectangle> {
    let right_left = space.width - width;
    let bottom_left = space.height - height;
    let (right, bottom) = if right_left > bottom_left {
        (
            Rectangle::new(space.x + width, space.y, right_left, space.height),
            Rectangle::new(space.x, space.y + height, width, bottom_left),
        )
    } else {
        (
            Rectangle::new(space.x + width, space.y, right_left, height),
            Rectangle::new(space.x, space.y + height, space.width, bottom_left),
        )
    };
    [right, bottom].into_iter().filter(|r| r.area() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(sizes: &[(u32, u32)]) -> Vec<PackItem> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &(width, height))| PackItem {
                glyph: i as u16,
                width,
                height,
            })
            .collect()
    }

    fn assert_valid(packing: &Packing, items: &[PackItem]) {
        assert_eq!(packing.placements.len(), items.len());
        for (rect, item) in packing.placements.iter().zip(items) {
            assert_eq!((rect.width, rect.height), (item.width, item.height));
            assert!(rect.right() <= packing.size && rect.bottom() <= packing.size);
        }
        for (i, a) in packing.placements.iter().enumerate() {
            for b in &packing.placements[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn single_exact_fit() {
        let items = items(&[(10, 10)]);
        let packing = GuillotinePacker::new(16, 8192).pack(&items).unwrap();
        assert_eq!(packing.size, 10);
        assert_eq!(packing.placements[0], Rectangle::new(0, 0, 10, 10));
    }

    #[test]
    fn grows_until_everything_fits() {
        let items = items(&[(10, 10), (10, 10)]);
        // 15x15 holds only one of them; 20x20 holds both
        let packing = GuillotinePacker::new(1, 8192).pack(&items).unwrap();
        assert_eq!(packing.size, 20);
        assert_valid(&packing, &items);
    }

    #[test]
    fn mixed_sizes_do_not_overlap() {
        let sizes: Vec<(u32, u32)> = (0..60u32)
            .map(|i| (8 + (i * 7) % 23, 10 + (i * 11) % 17))
            .collect();
        let items = items(&sizes);
        let packing = GuillotinePacker::new(16, 8192).pack(&items).unwrap();
        assert_valid(&packing, &items);

        let area: u64 = packing.placements.iter().map(Rectangle::area).sum();
        assert!(u64::from(packing.size).pow(2) >= area);
    }

    #[test]
    fn split_keeps_the_larger_leftover_whole() {
        let space = Rectangle::new(0, 0, 30, 12);
        let parts: Vec<_> = split(space, 10, 10).collect();
        assert_eq!(
            parts,
            vec![Rectangle::new(10, 0, 20, 12), Rectangle::new(0, 10, 10, 2)]
        );

        let space = Rectangle::new(0, 0, 12, 30);
        let parts: Vec<_> = split(space, 10, 10).collect();
        assert_eq!(
            parts,
            vec![Rectangle::new(10, 0, 2, 10), Rectangle::new(0, 10, 12, 20)]
        );

        assert_eq!(split(Rectangle::new(0, 0, 10, 10), 10, 10).count(), 0);
    }

    #[test]
    fn oversized_glyph_fails_fast() {
        let items = items(&[(4, 4), (40, 4)]);
        assert!(matches!(
            GuillotinePacker::new(16, 32).pack(&items),
            Err(FontError::GlyphTooLarge { glyph: 1, width: 40, .. })
        ));
    }

    #[test]
    fn atlas_overflow_is_bounded() {
        let items = items(&[(20, 20), (20, 20), (20, 20)]);
        assert!(matches!(
            GuillotinePacker::new(16, 32).pack(&items),
            Err(FontError::AtlasOverflow { glyphs: 3, max_size: 32 })
        ));
    }

    #[test]
    fn nothing_to_pack() {
        let packing = GuillotinePacker::new(16, 8192).pack(&[]).unwrap();
        assert_eq!(packing.size, 1);
        assert!(packing.placements.is_empty());
    }

    #[test]
    fn ceil_sqrt_values() {
        assert_eq!(ceil_sqrt(0), 0);
        assert_eq!(ceil_sqrt(1), 1);
        assert_eq!(ceil_sqrt(200), 15);
        assert_eq!(ceil_sqrt(225), 15);
        assert_eq!(ceil_sqrt(226), 16);
    }
}
