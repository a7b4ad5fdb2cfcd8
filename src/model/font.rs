//! Typeface JSON fonts (the facetype.js format) and outline-to-shape conversion.
//!
//! Glyph outlines are command strings in font units:
//! `m x y` move, `l x y` line, `q x y cx cy` quadratic and
//! `b x y c1x c1y c2x c2y` cubic, end point first.

use std::collections::HashMap;

use glam::Vec2;
use serde::Deserialize;

use crate::error::{Result, SceneError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GlyphData {
    /// Horizontal advance.
    pub ha: f32,
    /// Outline commands; absent for blank glyphs such as space.
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    pub glyphs: HashMap<String, GlyphData>,
    pub resolution: f32,
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub underline_thickness: f32,
    #[serde(default)]
    pub family_name: String,
}

/// A filled outline with its holes, in scene units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub contour: Vec<Vec2>,
    pub holes: Vec<Vec<Vec2>>,
}

impl Shape {
    /// Filled area: contour minus holes.
    pub fn area(&self) -> f32 {
        signed_area(&self.contour).abs() - self.holes.iter().map(|h| signed_area(h).abs()).sum::<f32>()
    }
}

impl Font {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str::<Font>(json)?.validated()
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice::<Font>(bytes)?.validated()
    }

    /// Glyph coordinates are divided by the resolution, so it must be positive.
    fn validated(self) -> Result<Self> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(SceneError::InvalidFont(format!("resolution must be positive, got {}", self.resolution)));
        }
        tracing::debug!(family = %self.family_name, glyphs = self.glyphs.len(), "parsed typeface font");
        Ok(self)
    }

    pub fn glyph(&self, ch: char) -> Option<&GlyphData> {
        let mut buf = [0u8; 4];
        self.glyphs.get(&*ch.encode_utf8(&mut buf))
    }

    pub fn line_height(&self, size: f32) -> f32 {
        let bb = self.bounding_box;
        (bb.y_max - bb.y_min + self.underline_thickness) * size / self.resolution
    }

    /// Lay out `text` and convert every glyph outline into filled shapes.
    ///
    /// Characters missing from the font fall back to `?`; when that is missing
    /// too the character is skipped.
    pub fn generate_shapes(&self, text: &str, size: f32, curve_segments: usize) -> Vec<Shape> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);
        let mut offset = Vec2::ZERO;
        let mut shapes = Vec::new();

        for ch in text.chars() {
            if ch == '\n' {
                offset.x = 0.0;
                offset.y -= line_height;
                continue;
            }
            let Some(glyph) = self.glyph(ch).or_else(|| self.glyph('?')) else {
                tracing::warn!(character = %ch, family = %self.family_name, "character not found in font");
                continue;
            };
            if let Some(outline) = &glyph.o {
                let paths = parse_outline(outline, scale, offset, curve_segments.max(1));
                shapes.extend(paths_to_shapes(paths));
            }
            offset.x += glyph.ha * scale;
        }
        shapes
    }
}

fn parse_outline(outline: &str, scale: f32, offset: Vec2, segments: usize) -> Vec<Vec<Vec2>> {
    let tokens: Vec<&str> = outline.split_whitespace().collect();
    let mut paths: Vec<Vec<Vec2>> = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    let mut i = 0;

    // Reads the next coordinate pair, mapped into scene units.
    let point = |i: &mut usize| -> Option<Vec2> {
        let x = tokens.get(*i)?.parse::<f32>().ok()?;
        let y = tokens.get(*i + 1)?.parse::<f32>().ok()?;
        *i += 2;
        Some(Vec2::new(x, y) * scale + offset)
    };

    while i < tokens.len() {
        let action = tokens[i];
        i += 1;
        let parsed = match action {
            "m" => point(&mut i).map(|p| {
                if !current.is_empty() {
                    paths.push(std::mem::take(&mut current));
                }
                current.push(p);
            }),
            "l" => point(&mut i).map(|p| current.push(p)),
            "q" => (|| {
                let end = point(&mut i)?;
                let control = point(&mut i)?;
                let start = *current.last()?;
                for step in 1..=segments {
                    let t = step as f32 / segments as f32;
                    current.push(quadratic(start, control, end, t));
                }
                Some(())
            })(),
            "b" => (|| {
                let end = point(&mut i)?;
                let c1 = point(&mut i)?;
                let c2 = point(&mut i)?;
                let start = *current.last()?;
                for step in 1..=segments {
                    let t = step as f32 / segments as f32;
                    current.push(cubic(start, c1, c2, end, t));
                }
                Some(())
            })(),
            // `z` and anything unknown carry no coordinates
            _ => Some(()),
        };
        if parsed.is_none() {
            tracing::warn!(command = action, "malformed glyph outline, truncating");
            break;
        }
    }
    if !current.is_empty() {
        paths.push(current);
    }

    paths.into_iter().map(clean_path).filter(|p| p.len() >= 3).collect()
}

fn quadratic(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k) + p1 * (2.0 * k * t) + p2 * (t * t)
}

fn cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let k = 1.0 - t;
    p0 * (k * k * k) + p1 * (3.0 * k * k * t) + p2 * (3.0 * k * t * t) + p3 * (t * t * t)
}

const POINT_EPSILON: f32 = 1e-6;

/// Drop consecutive duplicates and a closing point that repeats the first.
fn clean_path(path: Vec<Vec2>) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(path.len());
    for p in path {
        if out.last().map_or(true, |last| last.distance_squared(p) > POINT_EPSILON) {
            out.push(p);
        }
    }
    while out.len() > 1 && out[0].distance_squared(out[out.len() - 1]) <= POINT_EPSILON {
        out.pop();
    }
    out
}

/// Shoelace area; positive for counter-clockwise (y up).
pub fn signed_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| {
            let (p, q) = (points[i], points[(i + 1) % n]);
            p.x * q.y - q.x * p.y
        })
        .sum();
    twice * 0.5
}

/// Even-odd point-in-polygon test.
pub fn contains_point(polygon: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let n = polygon.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Split one glyph's paths into solids and holes.
///
/// The winding of the largest path marks solids; paths winding the other way
/// are holes and go to the smallest solid that contains them.
fn paths_to_shapes(paths: Vec<Vec<Vec2>>) -> Vec<Shape> {
    let Some(largest) = paths
        .iter()
        .map(|p| signed_area(p))
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
    else {
        return Vec::new();
    };
    let solid_ccw = largest > 0.0;

    let (solids, holes): (Vec<_>, Vec<_>) = paths
        .into_iter()
        .filter(|p| signed_area(p) != 0.0)
        .partition(|p| (signed_area(p) > 0.0) == solid_ccw);

    let mut shapes: Vec<Shape> = solids.into_iter().map(|contour| Shape { contour, holes: Vec::new() }).collect();
    for hole in holes {
        let owner = shapes
            .iter_mut()
            .filter(|s| contains_point(&s.contour, hole[0]))
            .min_by(|a, b| signed_area(&a.contour).abs().total_cmp(&signed_area(&b.contour).abs()));
        match owner {
            Some(shape) => shape.holes.push(hole),
            None => tracing::debug!(points = hole.len(), "dropping hole outside every solid"),
        }
    }
    shapes
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: &str = r#"{
        "familyName": "Blocky",
        "resolution": 1000,
        "underlineThickness": 50,
        "boundingBox": { "xMin": 0, "xMax": 600, "yMin": -200, "yMax": 800 },
        "glyphs": {
            "u": { "ha": 700, "x_min": 0, "x_max": 600,
                   "o": "m 0 0 l 0 700 l 150 700 l 150 150 l 450 150 l 450 700 l 600 700 l 600 0 l 0 0 z" },
            "o": { "ha": 600, "o": "m 0 0 l 0 500 l 500 500 l 500 0 z m 100 100 l 400 100 l 400 400 l 100 400 z" },
            "d": { "ha": 700, "o": "m 0 0 l 0 600 l 300 600 q 300 0 600 300 l 0 0" },
            " ": { "ha": 300 }
        }
    }"#;

    fn font() -> Font {
        Font::from_json(FONT).unwrap()
    }

    #[test]
    fn parses_typeface_metadata() {
        let font = font();
        assert_eq!(font.family_name, "Blocky");
        assert_eq!(font.resolution, 1000.0);
        assert_eq!(font.glyph('u').unwrap().ha, 700.0);
        assert!(font.glyph(' ').unwrap().o.is_none());
        assert!((font.line_height(1.0) - 1.05).abs() < 1e-6);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Font::from_json("{\"glyphs\": 3}").is_err());
    }

    #[test]
    fn rejects_non_positive_resolution() {
        for resolution in ["0", "-1000"] {
            let json = FONT.replace("\"resolution\": 1000", &format!("\"resolution\": {resolution}"));
            let err = Font::from_json(&json).unwrap_err();
            assert!(matches!(err, SceneError::InvalidFont(_)), "{resolution}: {err}");
            assert!(Font::from_slice(json.as_bytes()).is_err());
        }
    }

    #[test]
    fn unused_metadata_is_accepted() {
        let json = FONT.replace(
            "\"familyName\": \"Blocky\",",
            "\"familyName\": \"Blocky\", \"ascender\": 800, \"descender\": -200, \"underlinePosition\": -100,",
        );
        assert_eq!(Font::from_json(&json).unwrap().glyphs.len(), font().glyphs.len());
    }

    #[test]
    fn scales_outline_to_requested_size() {
        let shapes = font().generate_shapes("u", 1.0, 12);
        assert_eq!(shapes.len(), 1);
        let u = &shapes[0];
        assert_eq!(u.contour.len(), 8, "closing point must be dropped");
        assert!(u.holes.is_empty());
        assert!((u.area() - 0.255).abs() < 1e-5);
    }

    #[test]
    fn inner_ring_becomes_hole() {
        let shapes = font().generate_shapes("o", 2.0, 12);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);
        assert!((shapes[0].area() - 0.64).abs() < 1e-5);
    }

    #[test]
    fn quadratic_is_sampled_by_segment_count() {
        let shapes = font().generate_shapes("d", 1.0, 12);
        // 3 corners + 12 curve samples, the last landing on (0.3, 0)
        assert_eq!(shapes[0].contour.len(), 15);
        let coarse = font().generate_shapes("d", 1.0, 3);
        assert_eq!(coarse[0].contour.len(), 6);
    }

    #[test]
    fn advance_and_newline_offset_glyphs() {
        let font = font();
        let shapes = font.generate_shapes("u u\nu", 1.0, 12);
        assert_eq!(shapes.len(), 3);
        let min_x = |s: &Shape| s.contour.iter().map(|p| p.x).fold(f32::MAX, f32::min);
        let min_y = |s: &Shape| s.contour.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!((min_x(&shapes[1]) - 1.0).abs() < 1e-5, "u + space advance");
        assert!(min_x(&shapes[2]).abs() < 1e-5);
        assert!((min_y(&shapes[2]) + 1.05).abs() < 1e-5);
    }

    #[test]
    fn missing_character_is_skipped() {
        assert!(font().generate_shapes("x", 1.0, 12).is_empty());
    }

    #[test]
    fn missing_character_falls_back_to_question_mark() {
        let mut font = font();
        let u = font.glyphs["u"].clone();
        font.glyphs.insert("?".to_string(), u);
        assert_eq!(font.generate_shapes("x", 1.0, 12).len(), 1);
    }

    #[test]
    fn truncated_outline_keeps_complete_part() {
        let paths = parse_outline("m 0 0 l 10 0 l 10 10 l 0", 1.0, Vec2::ZERO, 4);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 3);
    }

    #[test]
    fn point_in_polygon() {
        let square = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        assert!(contains_point(&square, Vec2::splat(0.5)));
        assert!(!contains_point(&square, Vec2::new(1.5, 0.5)));
        assert!((signed_area(&square) - 1.0).abs() < 1e-6);
    }
}
