//! Turns raw glyph points into closed loops of edge segments.

use crate::edge::EdgeSegment;
use crate::glyph::{Glyph, Point};
use glam::DVec2;

/// A closed loop of edges. The last edge ends where the first one starts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contour {
    pub edges: Vec<EdgeSegment>,
}

impl Contour {
    pub fn is_closed(&self) -> bool {
        match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) => first.start() == last.end(),
            _ => true,
        }
    }

    /// Twice the signed area enclosed by the edge endpoints. Negative for the
    /// clockwise outer contours TrueType uses.
    pub fn winding(&self) -> f64 {
        self.edges
            .iter()
            .map(|e| e.start().perp_dot(e.end()))
            .sum()
    }
}

/// Build one [`Contour`] per entry of `glyph.contour_ends`, replacing any
/// contours already present.
pub fn build_contours(glyph: &mut Glyph) {
    let mut contours = Vec::with_capacity(glyph.contour_ends.len());
    let mut start = 0;
    for &end in &glyph.contour_ends {
        let Some(points) = glyph.points.get(start..=end) else {
            break;
        };
        contours.push(build_contour(points));
        start = end + 1;
    }
    log::trace!(
        "glyph {}: {} contour(s), {} edge(s)",
        glyph.id,
        contours.len(),
        contours.iter().map(|c| c.edges.len()).sum::<usize>()
    );
    glyph.contours = contours;
}

/// Insert the implied on-curve midpoint between every pair of consecutive
/// off-curve points, including the pair that wraps from last to first.
fn expand_implied_points(points: &[Point]) -> Vec<Point> {
    let mut expanded = Vec::with_capacity(points.len() * 2);
    for (i, &p) in points.iter().enumerate() {
        expanded.push(p);
        let next = points[(i + 1) % points.len()];
        if !p.on_curve && !next.on_curve {
            expanded.push(Point::new((p.x + next.x) / 2.0, (p.y + next.y) / 2.0, true));
        }
    }
    expanded
}

fn build_contour(points: &[Point]) -> Contour {
    if points.len() < 2 {
        return Contour::default();
    }

    let expanded = expand_implied_points(points);
    // After expansion an all off-curve contour alternates with midpoints.
    let Some(first) = expanded.iter().position(|p| p.on_curve) else {
        return Contour::default();
    };

    let to_vec = |p: &Point| DVec2::new(p.x, p.y);
    let origin = to_vec(&expanded[first]);
    let mut cursor = origin;
    let mut control: Option<DVec2> = None;
    let mut edges = Vec::with_capacity(expanded.len());

    let rest = expanded[first + 1..].iter().chain(&expanded[..first]);
    for p in rest.chain(std::iter::once(&expanded[first])) {
        let v = to_vec(p);
        if !p.on_curve {
            control = Some(v);
            continue;
        }
        let edge = match control.take() {
            Some(c) => EdgeSegment::quadratic(cursor, c, v),
            None => EdgeSegment::linear(cursor, v),
        };
        if matches!(edge, EdgeSegment::Linear { p0, p1, .. } if p0 == p1) {
            continue;
        }
        edges.push(edge);
        cursor = v;
    }

    Contour { edges }
}
