//! Edge segments and their signed distance.
//!
//! Sign convention: TrueType outer contours run clockwise with y up, which
//! makes distances positive inside the glyph and negative outside.

use glam::DVec2;
use std::f64::consts::PI;

bitflags::bitflags! {
    /// Which distance channels an edge contributes to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EdgeColour: u8 {
        const RED = 0b001;
        const GREEN = 0b010;
        const BLUE = 0b100;
        const YELLOW = Self::RED.bits() | Self::GREEN.bits();
        const MAGENTA = Self::RED.bits() | Self::BLUE.bits();
        const CYAN = Self::GREEN.bits() | Self::BLUE.bits();
        const WHITE = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits();
    }
}

impl EdgeColour {
    pub const BLACK: Self = Self::empty();

    /// True for exactly one of red, green or blue.
    pub fn is_single_channel(self) -> bool {
        self.bits().count_ones() == 1
    }
}

impl Default for EdgeColour {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Distance from a point to an edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignedDistance {
    pub distance: f64,
    /// Orthogonality of the nearest point: 1 when the query projects onto the
    /// segment interior, approaching 0 as it lines up with an end tangent.
    pub dot: f64,
}

impl SignedDistance {
    pub const INFINITE: Self = Self {
        distance: -f64::MAX,
        dot: 0.0,
    };

    pub fn new(distance: f64, dot: f64) -> Self {
        Self { distance, dot }
    }

    /// Smaller magnitude wins; equal magnitudes go to the larger `dot`.
    pub fn is_closer_than(&self, other: &Self) -> bool {
        let (a, b) = (self.distance.abs(), other.distance.abs());
        a < b || (a == b && self.dot > other.dot)
    }
}

impl Default for SignedDistance {
    fn default() -> Self {
        Self::INFINITE
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgeSegment {
    Linear {
        p0: DVec2,
        p1: DVec2,
        colour: EdgeColour,
    },
    Quadratic {
        p0: DVec2,
        p1: DVec2,
        p2: DVec2,
        colour: EdgeColour,
    },
}

fn non_zero_sign(v: f64) -> f64 {
    if v > 0.0 { 1.0 } else { -1.0 }
}

impl EdgeSegment {
    pub fn linear(p0: DVec2, p1: DVec2) -> Self {
        Self::Linear {
            p0,
            p1,
            colour: EdgeColour::WHITE,
        }
    }

    /// A quadratic through `control`; degenerates to a line when the control
    /// point coincides with an endpoint.
    pub fn quadratic(p0: DVec2, control: DVec2, p2: DVec2) -> Self {
        if control == p0 || control == p2 {
            return Self::linear(p0, p2);
        }
        Self::Quadratic {
            p0,
            p1: control,
            p2,
            colour: EdgeColour::WHITE,
        }
    }

    pub fn colour(&self) -> EdgeColour {
        match self {
            Self::Linear { colour, .. } | Self::Quadratic { colour, .. } => *colour,
        }
    }

    pub fn set_colour(&mut self, value: EdgeColour) {
        match self {
            Self::Linear { colour, .. } | Self::Quadratic { colour, .. } => *colour = value,
        }
    }

    pub fn with_colour(mut self, colour: EdgeColour) -> Self {
        self.set_colour(colour);
        self
    }

    pub fn start(&self) -> DVec2 {
        match self {
            Self::Linear { p0, .. } | Self::Quadratic { p0, .. } => *p0,
        }
    }

    pub fn end(&self) -> DVec2 {
        match self {
            Self::Linear { p1, .. } => *p1,
            Self::Quadratic { p2, .. } => *p2,
        }
    }

    pub fn point(&self, t: f64) -> DVec2 {
        match *self {
            Self::Linear { p0, p1, .. } => p0.lerp(p1, t),
            Self::Quadratic { p0, p1, p2, .. } => p0.lerp(p1, t).lerp(p1.lerp(p2, t), t),
        }
    }

    /// Tangent at parameter `t` (only 0 and 1 are used by callers).
    pub fn direction(&self, t: f64) -> DVec2 {
        match *self {
            Self::Linear { p0, p1, .. } => p1 - p0,
            Self::Quadratic { p0, p1, p2, .. } => {
                let tangent = (p1 - p0).lerp(p2 - p1, t);
                if tangent == DVec2::ZERO {
                    p2 - p0
                } else {
                    tangent
                }
            }
        }
    }

    /// Signed distance to `origin` and the curve parameter of the nearest
    /// point (outside `0..=1` when an endpoint is nearest from beyond it).
    pub fn signed_distance(&self, origin: DVec2) -> (SignedDistance, f64) {
        match *self {
            Self::Linear { p0, p1, .. } => {
                let aq = origin - p0;
                let ab = p1 - p0;
                let param = aq.dot(ab) / ab.dot(ab);
                let eq = if param > 0.5 { p1 } else { p0 } - origin;
                let endpoint_distance = eq.length();
                if param > 0.0 && param < 1.0 {
                    let ortho_distance = DVec2::new(ab.y, -ab.x).normalize_or_zero().dot(aq);
                    if ortho_distance.abs() < endpoint_distance {
                        return (SignedDistance::new(ortho_distance, 1.0), param);
                    }
                }
                let cos = ab.normalize_or_zero().dot(eq.normalize_or_zero()).abs();
                (
                    SignedDistance::new(non_zero_sign(aq.perp_dot(ab)) * endpoint_distance, 1.0 - cos),
                    param,
                )
            }
            Self::Quadratic { p0, p1, p2, .. } => {
                let qa = p0 - origin;
                let ab = p1 - p0;
                let br = p2 - p1 - ab;
                let a = br.dot(br);
                let b = 3.0 * ab.dot(br);
                let c = 2.0 * ab.dot(ab) + qa.dot(br);
                let d = qa.dot(ab);
                let (count, roots) = solve_cubic(a, b, c, d);

                let mut ep_dir = self.direction(0.0);
                let mut min_distance = non_zero_sign(ep_dir.perp_dot(qa)) * qa.length();
                let mut param = -qa.dot(ep_dir) / ep_dir.dot(ep_dir);
                {
                    ep_dir = self.direction(1.0);
                    let distance = (p2 - origin).length();
                    if distance < min_distance.abs() {
                        min_distance = non_zero_sign(ep_dir.perp_dot(p2 - origin)) * distance;
                        param = (origin - p1).dot(ep_dir) / ep_dir.dot(ep_dir);
                    }
                }
                for &t in &roots[..count] {
                    if t > 0.0 && t < 1.0 {
                        let qe = qa + 2.0 * t * ab + t * t * br;
                        let distance = qe.length();
                        if distance <= min_distance.abs() {
                            min_distance = non_zero_sign((ab + t * br).perp_dot(qe)) * distance;
                            param = t;
                        }
                    }
                }

                let dot = if (0.0..=1.0).contains(&param) {
                    1.0
                } else if param < 0.5 {
                    1.0 - self
                        .direction(0.0)
                        .normalize_or_zero()
                        .dot(qa.normalize_or_zero())
                        .abs()
                } else {
                    1.0 - self
                        .direction(1.0)
                        .normalize_or_zero()
                        .dot((p2 - origin).normalize_or_zero())
                        .abs()
                };
                (SignedDistance::new(min_distance, dot), param)
            }
        }
    }

    /// Extend the edge along its end tangents: when the nearest point lies
    /// beyond an endpoint, replace the distance with the perpendicular
    /// distance to the tangent line if that is not larger.
    pub fn distance_to_pseudo_distance(
        &self,
        distance: &mut SignedDistance,
        origin: DVec2,
        param: f64,
    ) {
        if param < 0.0 {
            let dir = self.direction(0.0).normalize_or_zero();
            let aq = origin - self.start();
            if aq.dot(dir) < 0.0 {
                let pseudo = aq.perp_dot(dir);
                if pseudo.abs() <= distance.distance.abs() {
                    *distance = SignedDistance::new(pseudo, 1.0);
                }
            }
        } else if param > 1.0 {
            let dir = self.direction(1.0).normalize_or_zero();
            let bq = origin - self.end();
            if bq.dot(dir) > 0.0 {
                let pseudo = bq.perp_dot(dir);
                if pseudo.abs() <= distance.distance.abs() {
                    *distance = SignedDistance::new(pseudo, 1.0);
                }
            }
        }
    }

    /// Three edges covering the same curve, each keeping this edge's colour.
    pub fn split_in_thirds(&self) -> [EdgeSegment; 3] {
        let colour = self.colour();
        let third = self.point(1.0 / 3.0);
        let two_thirds = self.point(2.0 / 3.0);
        match *self {
            Self::Linear { p0, p1, .. } => [
                Self::Linear { p0, p1: third, colour },
                Self::Linear { p0: third, p1: two_thirds, colour },
                Self::Linear { p0: two_thirds, p1, colour },
            ],
            Self::Quadratic { p0, p1, p2, .. } => [
                Self::Quadratic {
                    p0,
                    p1: p0.lerp(p1, 1.0 / 3.0),
                    p2: third,
                    colour,
                },
                Self::Quadratic {
                    p0: third,
                    p1: p0.lerp(p1, 5.0 / 9.0).lerp(p1.lerp(p2, 4.0 / 9.0), 0.5),
                    p2: two_thirds,
                    colour,
                },
                Self::Quadratic {
                    p0: two_thirds,
                    p1: p1.lerp(p2, 2.0 / 3.0),
                    p2,
                    colour,
                },
            ],
        }
    }

    /// Axis-aligned bounds, including the curve's extremum.
    pub fn bounds(&self) -> (DVec2, DVec2) {
        let mut lo = self.start().min(self.end());
        let mut hi = self.start().max(self.end());
        if let Self::Quadratic { p0, p1, p2, .. } = *self {
            let denom = p0 - 2.0 * p1 + p2;
            for axis in 0..2 {
                if denom[axis] != 0.0 {
                    let t = (p0[axis] - p1[axis]) / denom[axis];
                    if t > 0.0 && t < 1.0 {
                        let p = self.point(t);
                        lo = lo.min(p);
                        hi = hi.max(p);
                    }
                }
            }
        }
        (lo, hi)
    }
}

/// Real roots of `a x^2 + b x + c`. Degenerate equations have no roots.
fn solve_quadratic(a: f64, b: f64, c: f64) -> (usize, [f64; 3]) {
    let mut x = [0.0; 3];
    if a == 0.0 || b.abs() > 1e12 * a.abs() {
        if b == 0.0 {
            return (0, x);
        }
        x[0] = -c / b;
        return (1, x);
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant > 0.0 {
        let s = discriminant.sqrt();
        x[0] = (-b + s) / (2.0 * a);
        x[1] = (-b - s) / (2.0 * a);
        (2, x)
    } else if discriminant == 0.0 {
        x[0] = -b / (2.0 * a);
        (1, x)
    } else {
        (0, x)
    }
}

/// Roots of `x^3 + a x^2 + b x + c`.
fn solve_cubic_normed(a: f64, b: f64, c: f64) -> (usize, [f64; 3]) {
    let mut x = [0.0; 3];
    let a2 = a * a;
    let mut q = (a2 - 3.0 * b) / 9.0;
    let r = (a * (2.0 * a2 - 9.0 * b) + 27.0 * c) / 54.0;
    let r2 = r * r;
    let q3 = q * q * q;
    let a = a / 3.0;
    if r2 < q3 {
        let t = (r / q3.sqrt()).clamp(-1.0, 1.0).acos();
        q = -2.0 * q.sqrt();
        x[0] = q * (t / 3.0).cos() - a;
        x[1] = q * ((t + 2.0 * PI) / 3.0).cos() - a;
        x[2] = q * ((t - 2.0 * PI) / 3.0).cos() - a;
        (3, x)
    } else {
        let u = if r < 0.0 { 1.0 } else { -1.0 } * (r.abs() + (r2 - q3).sqrt()).powf(1.0 / 3.0);
        let v = if u == 0.0 { 0.0 } else { q / u };
        x[0] = (u + v) - a;
        if u == v || (u - v).abs() < 1e-12 * (u + v).abs() {
            x[1] = -0.5 * (u + v) - a;
            return (2, x);
        }
        (1, x)
    }
}

/// Real roots of `a x^3 + b x^2 + c x + d`.
fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> (usize, [f64; 3]) {
    if a != 0.0 {
        let bn = b / a;
        // past this ratio treating a as zero loses less precision
        if bn.abs() < 1e6 {
            return solve_cubic_normed(bn, c / a, d / a);
        }
    }
    solve_quadratic(b, c, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    #[test]
    fn colour_channels() {
        assert_eq!(EdgeColour::default(), EdgeColour::WHITE);
        assert!(EdgeColour::CYAN.contains(EdgeColour::GREEN));
        assert!(!EdgeColour::CYAN.contains(EdgeColour::RED));
        assert!((EdgeColour::CYAN & EdgeColour::MAGENTA).is_single_channel());
        assert!(!EdgeColour::WHITE.is_single_channel());
    }

    #[test]
    fn closer_by_magnitude_then_dot() {
        let near = SignedDistance::new(-1.0, 0.0);
        let far = SignedDistance::new(2.0, 1.0);
        assert!(near.is_closer_than(&far));
        assert!(!far.is_closer_than(&near));

        let orthogonal = SignedDistance::new(1.0, 0.9);
        let oblique = SignedDistance::new(-1.0, 0.2);
        assert!(orthogonal.is_closer_than(&oblique));
        assert!(!oblique.is_closer_than(&orthogonal));
        assert!(near.is_closer_than(&SignedDistance::INFINITE));
    }

    #[test]
    fn linear_distance_is_positive_on_the_right_of_travel() {
        // Upward edge: with clockwise outlines the inside is to the right.
        let edge = EdgeSegment::linear(v(0.0, 0.0), v(0.0, 10.0));
        let (inside, t) = edge.signed_distance(v(3.0, 5.0));
        assert!((inside.distance - 3.0).abs() < 1e-12);
        assert!((t - 0.5).abs() < 1e-12);

        let (outside, _) = edge.signed_distance(v(-2.0, 5.0));
        assert!((outside.distance + 2.0).abs() < 1e-12);
    }

    #[test]
    fn linear_distance_beyond_endpoint() {
        let edge = EdgeSegment::linear(v(0.0, 0.0), v(0.0, 10.0));
        let (d, t) = edge.signed_distance(v(0.0, 13.0));
        assert!((d.distance.abs() - 3.0).abs() < 1e-12);
        assert!(t > 1.0);
        // lined up with the tangent, so not orthogonal at all
        assert!(d.dot.abs() < 1e-12);
    }

    #[test]
    fn pseudo_distance_extends_tangent() {
        let edge = EdgeSegment::linear(v(0.0, 0.0), v(0.0, 10.0));
        let origin = v(2.0, 12.0);
        let (mut d, t) = edge.signed_distance(origin);
        assert!((d.distance - 8f64.sqrt()).abs() < 1e-12);
        edge.distance_to_pseudo_distance(&mut d, origin, t);
        assert!((d.distance - 2.0).abs() < 1e-12);
    }

    #[test]
    fn quadratic_distance_at_apex() {
        // apex of this parabola is (5, 5)
        let edge = EdgeSegment::quadratic(v(0.0, 0.0), v(5.0, 10.0), v(10.0, 0.0));
        let (d, t) = edge.signed_distance(v(5.0, 8.0));
        assert!((d.distance.abs() - 3.0).abs() < 1e-9);
        assert!((t - 0.5).abs() < 1e-9);
        assert_eq!(edge.point(0.5), v(5.0, 5.0));
    }

    #[test]
    fn quadratic_sign_matches_linear_convention() {
        // Nearly straight upward curve behaves like the upward line.
        let edge = EdgeSegment::quadratic(v(0.0, 0.0), v(0.1, 5.0), v(0.0, 10.0));
        assert!(edge.signed_distance(v(3.0, 5.0)).0.distance > 0.0);
        assert!(edge.signed_distance(v(-3.0, 5.0)).0.distance < 0.0);
    }

    #[test]
    fn degenerate_quadratic_is_linear() {
        let edge = EdgeSegment::quadratic(v(0.0, 0.0), v(0.0, 0.0), v(4.0, 0.0));
        assert!(matches!(edge, EdgeSegment::Linear { .. }));
    }

    #[test]
    fn split_in_thirds_preserves_curve() {
        let edge = EdgeSegment::quadratic(v(0.0, 0.0), v(5.0, 10.0), v(10.0, 0.0))
            .with_colour(EdgeColour::MAGENTA);
        let parts = edge.split_in_thirds();
        assert_eq!(parts[0].start(), edge.start());
        assert_eq!(parts[2].end(), edge.end());
        assert_eq!(parts[0].end(), parts[1].start());
        assert_eq!(parts[1].end(), parts[2].start());
        assert!(parts.iter().all(|p| p.colour() == EdgeColour::MAGENTA));
        // middle third passes through the original midpoint
        let mid = parts[1].point(0.5);
        assert!((mid - edge.point(0.5)).length() < 1e-9);
    }

    #[test]
    fn quadratic_bounds_include_extremum() {
        let edge = EdgeSegment::quadratic(v(0.0, 0.0), v(5.0, 10.0), v(10.0, 0.0));
        let (lo, hi) = edge.bounds();
        assert_eq!(lo, v(0.0, 0.0));
        assert!((hi.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn cubic_solver_roots() {
        // (x - 1)(x - 2)(x - 3)
        let (n, roots) = solve_cubic(1.0, -6.0, 11.0, -6.0);
        assert_eq!(n, 3);
        let mut r = roots;
        r.sort_by(f64::total_cmp);
        for (got, want) in r.iter().zip([1.0, 2.0, 3.0]) {
            assert!((got - want).abs() < 1e-9);
        }
        // falls through to the quadratic case
        let (n, roots) = solve_cubic(0.0, 1.0, 0.0, -4.0);
        assert_eq!(n, 2);
        assert!((roots[0].abs() - 2.0).abs() < 1e-12);
    }
}
