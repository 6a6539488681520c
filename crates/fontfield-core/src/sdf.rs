//! Multi-channel true signed distance field rasterization.
//!
//! Channels R, G and B hold the pseudo-distance to the nearest edge carrying
//! that channel, A holds the true distance. Every value is divided by the
//! distance range in design units and biased by 0.5, so an edge sits at 0.5
//! and inside the glyph is above it.

use crate::contour::Contour;
use crate::edge::{EdgeColour, EdgeSegment, SignedDistance};
use crate::error::{FontError, Result};
use crate::glyph::Glyph;
use crate::packer::Rectangle;
use glam::DVec2;

/// Nearest edge seen so far for one colour channel.
#[derive(Clone, Copy, Debug, Default)]
struct Channel<'a> {
    min_distance: SignedDistance,
    near_edge: Option<&'a EdgeSegment>,
    near_param: f64,
}

impl<'a> Channel<'a> {
    fn offer(&mut self, edge: &'a EdgeSegment, distance: SignedDistance, param: f64) {
        if distance.is_closer_than(&self.min_distance) {
            self.min_distance = distance;
            self.near_edge = Some(edge);
            self.near_param = param;
        }
    }

    fn pseudo_distance(mut self, origin: DVec2) -> f64 {
        if let Some(edge) = self.near_edge {
            edge.distance_to_pseudo_distance(&mut self.min_distance, origin, self.near_param);
        }
        self.min_distance.distance
    }
}

/// Raw signed distances at one point, in design units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MultiDistance {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    /// True distance, without pseudo-distance correction.
    pub a: f64,
}

impl MultiDistance {
    /// Median of the colour channels, which is what a shader reconstructs.
    pub fn median(&self) -> f64 {
        self.r.min(self.g).max(self.r.max(self.g).min(self.b))
    }

    /// Normalise by `range` (design units) and bias to the 0.5 edge value.
    pub fn to_pixel(&self, range: f64) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|d| (d / range + 0.5) as f32)
    }
}

/// Scan every edge of `contours` for the nearest per-channel and overall
/// distance to `origin`.
pub fn sample(contours: &[Contour], origin: DVec2) -> MultiDistance {
    let mut r = Channel::default();
    let mut g = Channel::default();
    let mut b = Channel::default();
    let mut true_min = SignedDistance::INFINITE;

    for edge in contours.iter().flat_map(|c| &c.edges) {
        let (distance, param) = edge.signed_distance(origin);
        if distance.is_closer_than(&true_min) {
            true_min = distance;
        }
        let colour = edge.colour();
        if colour.contains(EdgeColour::RED) {
            r.offer(edge, distance, param);
        }
        if colour.contains(EdgeColour::GREEN) {
            g.offer(edge, distance, param);
        }
        if colour.contains(EdgeColour::BLUE) {
            b.offer(edge, distance, param);
        }
    }

    MultiDistance {
        r: r.pseudo_distance(origin),
        g: g.pseudo_distance(origin),
        b: b.pseudo_distance(origin),
        a: true_min.distance,
    }
}

/// Mapping from a glyph's atlas cell to design space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellTransform {
    /// Pixels per design unit.
    pub scale: f64,
    /// Empty pixels around the glyph on every side.
    pub padding: u32,
    /// Distance range in pixels.
    pub px_range: f64,
    /// Design-space left edge of the glyph.
    pub x_min: f64,
    /// Design-space top edge of the glyph.
    pub y_max: f64,
}

impl CellTransform {
    pub fn for_glyph(glyph: &Glyph, scale: f64, px_range: u32) -> Self {
        Self {
            scale,
            padding: px_range,
            px_range: f64::from(px_range),
            x_min: f64::from(glyph.x_min),
            y_max: f64::from(glyph.y_max),
        }
    }

    /// Design-space centre of cell pixel `(px, py)`, rows counted from the top.
    pub fn design_point(&self, px: u32, py: u32) -> DVec2 {
        let padding = f64::from(self.padding);
        DVec2::new(
            (f64::from(px) + 0.5 - padding) / self.scale + self.x_min,
            self.y_max - (f64::from(py) + 0.5 - padding) / self.scale,
        )
    }

    /// Distance range in design units.
    pub fn range(&self) -> f64 {
        self.px_range / self.scale
    }
}

/// Write the field for `glyph` into `rect` of a row-major, top-down atlas
/// `atlas_width` pixels wide. `rect` must lie inside the buffer.
pub fn rasterize_glyph(
    glyph: &Glyph,
    rect: Rectangle,
    transform: &CellTransform,
    pixels: &mut [[f32; 4]],
    atlas_width: u32,
) -> Result<()> {
    let rows = if atlas_width == 0 {
        0
    } else {
        pixels.len() / atlas_width as usize
    };
    if u64::from(rect.x) + u64::from(rect.width) > u64::from(atlas_width)
        || u64::from(rect.y) + u64::from(rect.height) > rows as u64
    {
        return Err(FontError::CellOutOfBounds {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            atlas_width,
            pixels: pixels.len(),
        });
    }

    let range = transform.range();
    for py in 0..rect.height {
        let row = (rect.y + py) as usize * atlas_width as usize;
        for px in 0..rect.width {
            let distance = sample(&glyph.contours, transform.design_point(px, py));
            pixels[row + (rect.x + px) as usize] = distance.to_pixel(range);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colouring::{DEFAULT_ANGLE_THRESHOLD, colour_glyph};
    use crate::contour::build_contours;
    use crate::glyph::Point;

    /// Clockwise 100 unit square from the origin.
    fn square() -> Glyph {
        let mut g = Glyph {
            number_of_contours: 1,
            x_max: 100,
            y_max: 100,
            contour_ends: vec![3],
            points: [(0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0)]
                .iter()
                .map(|&(x, y)| Point::new(x, y, true))
                .collect(),
            ..Glyph::default()
        };
        build_contours(&mut g);
        colour_glyph(&mut g, DEFAULT_ANGLE_THRESHOLD);
        g
    }

    #[test]
    fn centre_distance_is_half_the_side() {
        let g = square();
        let d = sample(&g.contours, DVec2::new(50.0, 50.0));
        for channel in [d.r, d.g, d.b, d.a] {
            assert!((channel - 50.0).abs() < 1e-9, "got {channel}");
        }
        assert!((d.median() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn outside_is_negative() {
        let g = square();
        let d = sample(&g.contours, DVec2::new(130.0, 50.0));
        assert!((d.a + 30.0).abs() < 1e-9);
        assert!(d.median() < 0.0);
    }

    #[test]
    fn corner_pseudo_distance_keeps_the_corner_sharp() {
        let g = square();
        // diagonally past the top right corner
        let origin = DVec2::new(110.0, 110.0);
        let d = sample(&g.contours, origin);
        assert!((d.a + 200f64.sqrt()).abs() < 1e-9);
        // every channel extends one of the two edges, both 10 away
        for channel in [d.r, d.g, d.b] {
            assert!((channel + 10.0).abs() < 1e-9, "got {channel}");
        }
    }

    #[test]
    fn rasterized_cell_is_biased_around_half() {
        let g = square();
        // 0.1 px per unit gives a 10x10 glyph in an 18x18 cell
        let transform = CellTransform::for_glyph(&g, 0.1, 4);
        let rect = Rectangle::new(0, 0, 18, 18);
        let mut pixels = vec![[0.0f32; 4]; 18 * 18];
        rasterize_glyph(&g, rect, &transform, &mut pixels, 18).unwrap();

        let centre = pixels[9 * 18 + 9];
        assert!(centre.iter().all(|&v| v > 0.5));
        let corner = pixels[0];
        assert!(corner.iter().all(|&v| v < 0.5));

        // first column past the padding is half a pixel inside the left edge
        let edge = transform.design_point(4, 9);
        assert!((edge.x - 5.0).abs() < 1e-9);
        assert!((edge.y - 45.0).abs() < 1e-9);
    }

    #[test]
    fn cell_past_the_buffer_is_rejected() {
        let g = square();
        let transform = CellTransform::for_glyph(&g, 0.1, 4);
        let mut pixels = vec![[0.25f32; 4]; 18 * 18];

        // one column too far right would wrap into the next row
        let err = rasterize_glyph(&g, Rectangle::new(1, 0, 18, 18), &transform, &mut pixels, 18)
            .unwrap_err();
        assert!(matches!(err, FontError::CellOutOfBounds { x: 1, .. }));

        let err = rasterize_glyph(&g, Rectangle::new(0, 1, 18, 18), &transform, &mut pixels, 18)
            .unwrap_err();
        assert!(matches!(err, FontError::CellOutOfBounds { y: 1, .. }));

        // nothing was written before the check failed
        assert!(pixels.iter().all(|p| *p == [0.25; 4]));
    }

    #[test]
    fn empty_glyph_samples_infinitely_far() {
        let d = sample(&[], DVec2::ZERO);
        assert_eq!(d.a, SignedDistance::INFINITE.distance);
    }
}
