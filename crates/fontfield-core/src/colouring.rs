//! Corner-aware edge colouring.
//!
//! Edges meeting at a sharp corner must differ in at least one channel so the
//! median of the three channels reconstructs the corner. Edges meeting at a
//! smooth vertex keep the same colour.

use crate::contour::Contour;
use crate::edge::{EdgeColour, EdgeSegment};
use crate::glyph::Glyph;
use glam::DVec2;

/// Default corner angle threshold in radians.
pub const DEFAULT_ANGLE_THRESHOLD: f64 = 3.0;

/// A vertex is a corner when the tangents turn back on themselves or the
/// sine of the turn exceeds `cross_threshold`.
fn is_corner(a: DVec2, b: DVec2, cross_threshold: f64) -> bool {
    a.dot(b) <= 0.0 || a.perp_dot(b).abs() > cross_threshold
}

/// Next colour in the cycle, avoiding `banned` where possible.
pub fn switch_colour(colour: EdgeColour, banned: EdgeColour) -> EdgeColour {
    let combined = colour & banned;
    if combined.is_single_channel() {
        return combined ^ EdgeColour::WHITE;
    }
    if colour == EdgeColour::BLACK || colour == EdgeColour::WHITE {
        return EdgeColour::CYAN;
    }
    let shifted = colour.bits() << 1;
    EdgeColour::from_bits_truncate(shifted | shifted >> 3)
}

/// Indices of edges whose start vertex is a corner.
pub fn find_corners(edges: &[EdgeSegment], angle_threshold: f64) -> Vec<usize> {
    let Some(last) = edges.last() else {
        return Vec::new();
    };
    let cross_threshold = angle_threshold.sin();
    let mut corners = Vec::new();
    let mut prev_direction = last.direction(1.0);
    for (index, edge) in edges.iter().enumerate() {
        if is_corner(
            prev_direction.normalize_or_zero(),
            edge.direction(0.0).normalize_or_zero(),
            cross_threshold,
        ) {
            corners.push(index);
        }
        prev_direction = edge.direction(1.0);
    }
    corners
}

/// Colour every contour of `glyph`.
pub fn colour_glyph(glyph: &mut Glyph, angle_threshold: f64) {
    for contour in &mut glyph.contours {
        colour_contour(contour, angle_threshold);
    }
}

/// Colour one contour. A single-corner contour with fewer than three edges
/// has its edge list replaced by split edges.
pub fn colour_contour(contour: &mut Contour, angle_threshold: f64) {
    let corners = find_corners(&contour.edges, angle_threshold);
    match corners.as_slice() {
        [] => {
            for edge in &mut contour.edges {
                edge.set_colour(EdgeColour::WHITE);
            }
        }
        &[corner] => {
            if let Some(split) = colour_teardrop(&mut contour.edges, corner) {
                contour.edges = split;
            }
        }
        _ => colour_spans(&mut contour.edges, &corners),
    }
}

/// One corner: three spans around the loop, coloured in place when there
/// are enough edges, otherwise returned as a new, split edge list.
fn colour_teardrop(edges: &mut [EdgeSegment], corner: usize) -> Option<Vec<EdgeSegment>> {
    let first = switch_colour(EdgeColour::WHITE, EdgeColour::BLACK);
    let colours = [
        first,
        EdgeColour::WHITE,
        switch_colour(first, EdgeColour::BLACK),
    ];

    let m = edges.len();
    if m >= 3 {
        for i in 0..m {
            let span = (3.0 + 2.875 * i as f64 / (m - 1) as f64 - 1.4375 + 0.5) as usize - 2;
            edges[(corner + i) % m].set_colour(colours[span]);
        }
        return None;
    }

    let mut parts: Vec<EdgeSegment> = Vec::with_capacity(6);
    match *edges {
        [only] => {
            let thirds = only.split_in_thirds();
            for (part, colour) in thirds.into_iter().zip(colours) {
                parts.push(part.with_colour(colour));
            }
        }
        [a, b] => {
            // the corner edge's thirds come first
            let (first_edge, second_edge) = if corner == 0 { (a, b) } else { (b, a) };
            let pieces = first_edge
                .split_in_thirds()
                .into_iter()
                .chain(second_edge.split_in_thirds());
            for (i, part) in pieces.enumerate() {
                parts.push(part.with_colour(colours[i / 2]));
            }
        }
        _ => return None,
    }
    Some(parts)
}

/// Two or more corners: switch colour at every corner, the final span also
/// avoiding the first span's colour since the two meet around the loop.
fn colour_spans(edges: &mut [EdgeSegment], corners: &[usize]) {
    let m = edges.len();
    let start = corners[0];
    let mut spline = 0;
    let mut colour = switch_colour(EdgeColour::WHITE, EdgeColour::BLACK);
    let initial = colour;
    for i in 0..m {
        let index = (start + i) % m;
        if spline + 1 < corners.len() && corners[spline + 1] == index {
            spline += 1;
            let banned = if spline == corners.len() - 1 {
                initial
            } else {
                EdgeColour::BLACK
            };
            colour = switch_colour(colour, banned);
        }
        edges[index].set_colour(colour);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::build_contours;
    use crate::glyph::Point;

    fn contour_of(points: &[(f64, f64, bool)]) -> Contour {
        let mut g = Glyph::default();
        g.points = points.iter().map(|&(x, y, on)| Point::new(x, y, on)).collect();
        g.contour_ends = vec![points.len() - 1];
        build_contours(&mut g);
        g.contours.remove(0)
    }

    fn assert_corners_differ(contour: &Contour, threshold: f64) {
        let corners = find_corners(&contour.edges, threshold);
        let m = contour.edges.len();
        for i in 0..m {
            let prev = contour.edges[(i + m - 1) % m].colour();
            let here = contour.edges[i].colour();
            if corners.contains(&i) {
                assert_ne!(prev, here, "corner at edge {i} shares a colour");
            } else {
                assert_eq!(prev, here, "smooth vertex at edge {i} changes colour");
            }
        }
    }

    #[test]
    fn switch_colour_cycle() {
        let c = switch_colour(EdgeColour::WHITE, EdgeColour::BLACK);
        assert_eq!(c, EdgeColour::CYAN);
        let c = switch_colour(c, EdgeColour::BLACK);
        assert_eq!(c, EdgeColour::MAGENTA);
        let c = switch_colour(c, EdgeColour::BLACK);
        assert_eq!(c, EdgeColour::YELLOW);
        assert_eq!(switch_colour(c, EdgeColour::BLACK), EdgeColour::CYAN);
        // yellow banned from cyan shares only green, so green is dropped
        assert_eq!(
            switch_colour(EdgeColour::YELLOW, EdgeColour::CYAN),
            EdgeColour::MAGENTA
        );
    }

    #[test]
    fn square_corners_use_only_secondary_colours() {
        let mut c = contour_of(&[
            (0.0, 0.0, true),
            (0.0, 10.0, true),
            (10.0, 10.0, true),
            (10.0, 0.0, true),
        ]);
        colour_contour(&mut c, DEFAULT_ANGLE_THRESHOLD);

        assert_eq!(find_corners(&c.edges, DEFAULT_ANGLE_THRESHOLD).len(), 4);
        let secondary = [EdgeColour::CYAN, EdgeColour::MAGENTA, EdgeColour::YELLOW];
        assert!(c.edges.iter().all(|e| secondary.contains(&e.colour())));
        assert_corners_differ(&c, DEFAULT_ANGLE_THRESHOLD);
    }

    #[test]
    fn triangle_last_span_avoids_first_colour() {
        let mut c = contour_of(&[(0.0, 0.0, true), (5.0, 10.0, true), (10.0, 0.0, true)]);
        colour_contour(&mut c, DEFAULT_ANGLE_THRESHOLD);
        let colours: Vec<_> = c.edges.iter().map(|e| e.colour()).collect();
        assert_eq!(
            colours,
            vec![EdgeColour::CYAN, EdgeColour::MAGENTA, EdgeColour::YELLOW]
        );
    }

    #[test]
    fn smooth_vertices_keep_span_colour() {
        // A square whose top is a curve split into two smooth quadratics.
        let mut c = contour_of(&[
            (0.0, 0.0, true),
            (0.0, 10.0, true),
            (2.5, 13.0, false),
            (7.5, 13.0, false),
            (10.0, 10.0, true),
            (10.0, 0.0, true),
        ]);
        colour_contour(&mut c, DEFAULT_ANGLE_THRESHOLD);
        assert_eq!(c.edges.len(), 5);
        assert_eq!(find_corners(&c.edges, DEFAULT_ANGLE_THRESHOLD).len(), 4);
        assert_eq!(c.edges[1].colour(), c.edges[2].colour());
        assert_corners_differ(&c, DEFAULT_ANGLE_THRESHOLD);
    }

    #[test]
    fn circle_without_corners_is_white() {
        let mut c = contour_of(&[
            (0.0, 10.0, false),
            (10.0, 10.0, false),
            (10.0, 0.0, false),
            (0.0, 0.0, false),
        ]);
        colour_contour(&mut c, DEFAULT_ANGLE_THRESHOLD);
        assert!(find_corners(&c.edges, DEFAULT_ANGLE_THRESHOLD).is_empty());
        assert!(c.edges.iter().all(|e| e.colour() == EdgeColour::WHITE));
    }

    #[test]
    fn teardrop_with_two_edges_is_split_into_six() {
        // A straight base closed by one curve: corners at both ends would be
        // two, so make the curve leave tangentially at one end.
        let mut c = Contour {
            edges: vec![
                EdgeSegment::quadratic(
                    DVec2::new(0.0, 0.0),
                    DVec2::new(10.0, 0.0),
                    DVec2::new(10.0, 10.0),
                ),
                EdgeSegment::quadratic(
                    DVec2::new(10.0, 10.0),
                    DVec2::new(10.0, 20.0),
                    DVec2::new(0.0, 0.0),
                ),
            ],
        };
        let corners = find_corners(&c.edges, DEFAULT_ANGLE_THRESHOLD);
        assert_eq!(corners, vec![0]);

        colour_contour(&mut c, DEFAULT_ANGLE_THRESHOLD);
        assert_eq!(c.edges.len(), 6);
        assert!(c.is_closed());
        let colours: Vec<_> = c.edges.iter().map(|e| e.colour()).collect();
        assert_eq!(
            colours,
            vec![
                EdgeColour::CYAN,
                EdgeColour::CYAN,
                EdgeColour::WHITE,
                EdgeColour::WHITE,
                EdgeColour::MAGENTA,
                EdgeColour::MAGENTA,
            ]
        );
    }

    #[test]
    fn teardrop_with_many_edges_spans_three_colours() {
        let mut c = Contour {
            edges: vec![
                EdgeSegment::linear(DVec2::new(0.0, 0.0), DVec2::new(10.0, 10.0)),
                EdgeSegment::quadratic(
                    DVec2::new(10.0, 10.0),
                    DVec2::new(12.0, 12.0),
                    DVec2::new(12.0, 15.0),
                ),
                EdgeSegment::quadratic(
                    DVec2::new(12.0, 15.0),
                    DVec2::new(12.0, 18.0),
                    DVec2::new(9.0, 18.0),
                ),
                EdgeSegment::quadratic(
                    DVec2::new(9.0, 18.0),
                    DVec2::new(6.0, 18.0),
                    DVec2::new(0.0, 0.0),
                ),
            ],
        };
        assert_eq!(find_corners(&c.edges, DEFAULT_ANGLE_THRESHOLD), vec![0]);
        colour_contour(&mut c, DEFAULT_ANGLE_THRESHOLD);
        let colours: Vec<_> = c.edges.iter().map(|e| e.colour()).collect();
        assert_eq!(colours[0], EdgeColour::CYAN);
        assert_eq!(colours[3], EdgeColour::MAGENTA);
        assert_ne!(colours[3], colours[0]);
    }
}
