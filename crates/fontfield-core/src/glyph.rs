//! Glyph outlines from the `glyf` table.
//!
//! Simple glyphs are decoded directly. Composite glyphs are flattened by
//! resolving every component through the same reader and applying its affine
//! transform, so callers only ever see points and contour end indices.

use crate::contour::Contour;
use crate::error::{FontError, Result};
use crate::reader::{TableReader, Tag};
use crate::tables::LocaTable;
use std::collections::HashMap;

/// Composite nesting deeper than this is treated as a cycle.
pub const MAX_COMPONENT_DEPTH: usize = 16;

// Simple glyph flags
const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR: u8 = 0x20;

// Composite glyph flags
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
const SCALED_COMPONENT_OFFSET: u16 = 0x0800;

/// An outline point in font design units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub on_curve: bool,
}

impl Point {
    pub fn new(x: f64, y: f64, on_curve: bool) -> Self {
        Self { x, y, on_curve }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Glyph {
    pub id: u16,
    /// Negative for composite glyphs.
    pub number_of_contours: i16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub is_composite: bool,
    /// Index of the last point of each contour.
    pub contour_ends: Vec<usize>,
    pub points: Vec<Point>,
    /// Filled in by [`crate::contour::build_contours`].
    pub contours: Vec<Contour>,
}

impl Glyph {
    fn empty(id: u16) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Glyphs without any edges, such as the space. Only meaningful once
    /// contours have been built.
    pub fn is_whitespace(&self) -> bool {
        self.contours.iter().all(|c| c.edges.is_empty())
    }

    pub fn width(&self) -> i32 {
        i32::from(self.x_max) - i32::from(self.x_min)
    }

    pub fn height(&self) -> i32 {
        i32::from(self.y_max) - i32::from(self.y_min)
    }
}

/// 2x2 matrix plus offset applied to a composite component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComponentTransform {
    pub xx: f64,
    pub xy: f64,
    pub yx: f64,
    pub yy: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Default for ComponentTransform {
    fn default() -> Self {
        Self {
            xx: 1.0,
            xy: 0.0,
            yx: 0.0,
            yy: 1.0,
            dx: 0.0,
            dy: 0.0,
        }
    }
}

impl ComponentTransform {
    fn apply_linear(&self, x: f64, y: f64) -> (f64, f64) {
        (self.xx * x + self.yx * y, self.xy * x + self.yy * y)
    }

    pub fn apply(&self, p: Point) -> Point {
        let (x, y) = self.apply_linear(p.x, p.y);
        Point::new(x + self.dx, y + self.dy, p.on_curve)
    }
}

/// How a component is positioned relative to the glyph built so far.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Placement {
    Offset,
    /// Move the component so its point `child` lands on the parent's `parent`.
    MatchPoints { parent: usize, child: usize },
}

#[derive(Clone, Copy, Debug)]
struct Component {
    glyph: u16,
    transform: ComponentTransform,
    placement: Placement,
}

/// Reads glyph records out of `glyf` using `loca` offsets.
pub struct GlyphReader<'a> {
    glyf: &'a [u8],
    loca: &'a LocaTable,
}

impl<'a> GlyphReader<'a> {
    pub fn new(glyf: &'a [u8], loca: &'a LocaTable) -> Self {
        Self { glyf, loca }
    }

    /// Decode `glyph`, flattening composites. Contours are not built yet.
    pub fn read(&self, glyph: u16) -> Result<Glyph> {
        let mut resolved = HashMap::new();
        self.read_at_depth(glyph, 0, &mut resolved)
    }

    fn read_at_depth(
        &self,
        glyph: u16,
        depth: usize,
        resolved: &mut HashMap<u16, Glyph>,
    ) -> Result<Glyph> {
        let range = self.loca.glyph_range(glyph, self.glyf.len())?;
        if range.is_empty() {
            return Ok(Glyph::empty(glyph));
        }

        let mut r = TableReader::new(Tag::GLYF, &self.glyf[range]);
        let mut out = Glyph {
            id: glyph,
            number_of_contours: r.i16()?,
            x_min: r.i16()?,
            y_min: r.i16()?,
            x_max: r.i16()?,
            y_max: r.i16()?,
            ..Glyph::default()
        };

        if out.number_of_contours >= 0 {
            read_simple(&mut r, &mut out)?;
        } else {
            out.is_composite = true;
            for component in read_components(&mut r)? {
                self.absorb_component(&mut out, component, depth, resolved)?;
            }
        }
        Ok(out)
    }

    fn absorb_component(
        &self,
        parent: &mut Glyph,
        component: Component,
        depth: usize,
        resolved: &mut HashMap<u16, Glyph>,
    ) -> Result<()> {
        if depth + 1 > MAX_COMPONENT_DEPTH {
            return Err(FontError::CompositeDepthExceeded {
                glyph: component.glyph,
                max_depth: MAX_COMPONENT_DEPTH,
            });
        }

        // Taken out while in use, put back for later components
        let child = match resolved.remove(&component.glyph) {
            Some(child) => child,
            None => self.read_at_depth(component.glyph, depth + 1, resolved)?,
        };

        let mut transform = component.transform;
        if let Placement::MatchPoints {
            parent: parent_index,
            child: child_index,
        } = component.placement
        {
            let anchor = parent.points.get(parent_index).ok_or_else(|| {
                FontError::contour(parent.id, format!("anchor point {parent_index} out of range"))
            })?;
            let target = child.points.get(child_index).ok_or_else(|| {
                FontError::contour(
                    parent.id,
                    format!("component point {child_index} out of range"),
                )
            })?;
            let (tx, ty) = transform.apply_linear(target.x, target.y);
            transform.dx = anchor.x - tx;
            transform.dy = anchor.y - ty;
        }

        let base = parent.points.len();
        parent
            .points
            .extend(child.points.iter().map(|&p| transform.apply(p)));
        parent
            .contour_ends
            .extend(child.contour_ends.iter().map(|&end| end + base));
        resolved.insert(component.glyph, child);
        Ok(())
    }
}

fn read_simple(r: &mut TableReader<'_>, glyph: &mut Glyph) -> Result<()> {
    let contour_count = glyph.number_of_contours as usize;
    if contour_count == 0 {
        return Ok(());
    }

    let mut contour_ends = Vec::with_capacity(contour_count);
    for _ in 0..contour_count {
        let end = r.u16()? as usize;
        if contour_ends.last().is_some_and(|&prev| end <= prev) {
            return Err(FontError::contour(
                glyph.id,
                format!("contour end {end} does not increase"),
            ));
        }
        contour_ends.push(end);
    }
    let num_points = contour_ends.last().map_or(0, |&end| end + 1);

    let instruction_length = r.u16()? as usize;
    r.skip(instruction_length)?;

    let mut flags = Vec::with_capacity(num_points);
    while flags.len() < num_points {
        let flag = r.u8()?;
        flags.push(flag);
        if flag & REPEAT_FLAG != 0 {
            let repeat = r.u8()? as usize;
            if flags.len() + repeat > num_points {
                return Err(FontError::contour(
                    glyph.id,
                    format!("flag repeat runs past {num_points} points"),
                ));
            }
            flags.extend(std::iter::repeat_n(flag, repeat));
        }
    }

    let xs = read_coordinates(r, &flags, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR)?;
    let ys = read_coordinates(r, &flags, Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR)?;

    glyph.points = flags
        .iter()
        .zip(xs.iter().zip(&ys))
        .map(|(&flag, (&x, &y))| {
            Point::new(f64::from(x), f64::from(y), flag & ON_CURVE_POINT != 0)
        })
        .collect();
    glyph.contour_ends = contour_ends;
    Ok(())
}

/// Delta-decode one axis. Short vectors are a magnitude byte whose sign comes
/// from `same_or_positive`; otherwise that bit means "repeat previous value"
/// and its absence means a 16-bit signed delta follows.
fn read_coordinates(
    r: &mut TableReader<'_>,
    flags: &[u8],
    short_vector: u8,
    same_or_positive: u8,
) -> Result<Vec<i32>> {
    let mut out = Vec::with_capacity(flags.len());
    let mut value = 0i32;
    for &flag in flags {
        if flag & short_vector != 0 {
            let delta = i32::from(r.u8()?);
            value += if flag & same_or_positive != 0 {
                delta
            } else {
                -delta
            };
        } else if flag & same_or_positive == 0 {
            value += i32::from(r.i16()?);
        }
        out.push(value);
    }
    Ok(out)
}

fn read_components(r: &mut TableReader<'_>) -> Result<Vec<Component>> {
    let mut components = Vec::new();
    loop {
        let flags = r.u16()?;
        let glyph = r.u16()?;

        let words = flags & ARG_1_AND_2_ARE_WORDS != 0;
        let xy_values = flags & ARGS_ARE_XY_VALUES != 0;
        let (arg1, arg2) = match (words, xy_values) {
            (true, true) => (i32::from(r.i16()?), i32::from(r.i16()?)),
            (true, false) => (i32::from(r.u16()?), i32::from(r.u16()?)),
            (false, true) => (i32::from(r.i8()?), i32::from(r.i8()?)),
            (false, false) => (i32::from(r.u8()?), i32::from(r.u8()?)),
        };

        let mut transform = ComponentTransform::default();
        if flags & WE_HAVE_A_SCALE != 0 {
            let scale = r.f2dot14()?;
            transform.xx = scale;
            transform.yy = scale;
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            transform.xx = r.f2dot14()?;
            transform.yy = r.f2dot14()?;
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            transform.xx = r.f2dot14()?;
            transform.xy = r.f2dot14()?;
            transform.yx = r.f2dot14()?;
            transform.yy = r.f2dot14()?;
        }

        let placement = if xy_values {
            let (dx, dy) = (f64::from(arg1), f64::from(arg2));
            (transform.dx, transform.dy) = if flags & SCALED_COMPONENT_OFFSET != 0 {
                transform.apply_linear(dx, dy)
            } else {
                (dx, dy)
            };
            Placement::Offset
        } else {
            Placement::MatchPoints {
                parent: arg1 as usize,
                child: arg2 as usize,
            }
        };

        components.push(Component {
            glyph,
            transform,
            placement,
        });

        if flags & MORE_COMPONENTS == 0 {
            break;
        }
    }
    // Trailing composite instructions are irrelevant for outlines.
    Ok(components)
}
