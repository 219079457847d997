//! Directional alpha feathering along mask silhouette edges.
//!
//! For each of the four image edges the engine finds, per column or row, the
//! first filled pixel seen when scanning inward from that edge. From each seed
//! it then walks back out toward the edge, repainting pixels with the seed's
//! color and an alpha that drops by [`FEATHER_ALPHA_STEP`] per pixel.

use image::{Rgba, RgbaImage};

use crate::{FEATHER_ALPHA_STEP, FEATHER_STEPS};

/// Image edge a feathering pass fades toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// Order in which [`feather`] applies its passes. Later passes overwrite
    /// earlier ones where they meet, so the order shapes the corners.
    pub const PASS_ORDER: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

    /// Unit step from a seed toward this edge.
    fn outward(self) -> (i64, i64) {
        match self {
            Edge::Top => (0, -1),
            Edge::Bottom => (0, 1),
            Edge::Left => (-1, 0),
            Edge::Right => (1, 0),
        }
    }
}

/// How the bottom edge is feathered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BottomEdge {
    /// Fade downward exactly like the other three edges.
    #[default]
    Symmetric,

    /// Stop after the seed pixel, which leaves the bottom edge unchanged.
    /// Matches the output of earlier releases of the Android app.
    Legacy,
}

/// Seed pixel of an edge scan, captured before any pixel is repainted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPoint {
    pub x: u32,
    pub y: u32,
    pub color: Rgba<u8>,
}

fn is_filled(pixel: &Rgba<u8>) -> bool {
    pixel.0[3] != 0
}

fn first_filled(
    mask: &RgbaImage,
    mut line: impl Iterator<Item = (u32, u32)>,
) -> Option<ColorPoint> {
    line.find_map(|(x, y)| {
        let color = *mask.get_pixel(x, y);
        is_filled(&color).then_some(ColorPoint { x, y, color })
    })
}

/// First filled pixel of every column (Top/Bottom) or row (Left/Right),
/// scanning inward from `edge`. Lines with no filled pixel yield no seed.
pub fn find_seeds(mask: &RgbaImage, edge: Edge) -> Vec<ColorPoint> {
    let (width, height) = mask.dimensions();
    match edge {
        Edge::Top => (0..width)
            .filter_map(|x| first_filled(mask, (0..height).map(|y| (x, y))))
            .collect(),
        Edge::Bottom => (0..width)
            .filter_map(|x| first_filled(mask, (0..height).rev().map(|y| (x, y))))
            .collect(),
        Edge::Left => (0..height)
            .filter_map(|y| first_filled(mask, (0..width).map(|x| (x, y))))
            .collect(),
        Edge::Right => (0..height)
            .filter_map(|y| first_filled(mask, (0..width).rev().map(|x| (x, y))))
            .collect(),
    }
}

/// Fade from each seed toward `edge`, writing at most `max_steps` pixels
/// (the seed included) and never a negative alpha.
fn fade_from_seeds(mask: &mut RgbaImage, seeds: &[ColorPoint], edge: Edge, max_steps: u32) {
    let (width, height) = (mask.width() as i64, mask.height() as i64);
    let (dx, dy) = edge.outward();

    for seed in seeds {
        let [r, g, b, seed_alpha] = seed.color.0;
        let mut alpha = seed_alpha as i32;

        for step in 0..max_steps as i64 {
            if alpha < 0 {
                break;
            }
            let x = seed.x as i64 + dx * step;
            let y = seed.y as i64 + dy * step;
            if x < 0 || y < 0 || x >= width || y >= height {
                break;
            }
            mask.put_pixel(x as u32, y as u32, Rgba([r, g, b, alpha as u8]));
            alpha -= FEATHER_ALPHA_STEP;
        }
    }
}

fn steps_for(edge: Edge, bottom: BottomEdge) -> u32 {
    match (edge, bottom) {
        (Edge::Bottom, BottomEdge::Legacy) => 1,
        _ => FEATHER_STEPS,
    }
}

/// Feather a single edge in place.
pub fn feather_edge(mask: &mut RgbaImage, edge: Edge) {
    let seeds = find_seeds(mask, edge);
    fade_from_seeds(mask, &seeds, edge, FEATHER_STEPS);
}

/// Feather all four edges in place with a symmetric bottom pass.
pub fn feather(mask: &mut RgbaImage) {
    feather_with(mask, BottomEdge::default());
}

/// Feather all four edges in place.
///
/// Seeds for every edge are taken from the mask as it was on entry; the
/// passes then run in [`Edge::PASS_ORDER`] over the same image.
pub fn feather_with(mask: &mut RgbaImage, bottom: BottomEdge) {
    let seeds: Vec<(Edge, Vec<ColorPoint>)> = Edge::PASS_ORDER
        .iter()
        .map(|&edge| (edge, find_seeds(mask, edge)))
        .collect();

    for (edge, edge_seeds) in &seeds {
        fade_from_seeds(mask, edge_seeds, *edge, steps_for(*edge, bottom));
    }

    tracing::trace!(
        seeds = seeds.iter().map(|(_, s)| s.len()).sum::<usize>(),
        ?bottom,
        "feathered mask edges"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::TRANSPARENT;

    const RED: Rgba<u8> = Rgba([200, 10, 10, 255]);

    fn single_pixel_mask() -> RgbaImage {
        let mut mask = RgbaImage::from_pixel(10, 10, TRANSPARENT);
        mask.put_pixel(5, 5, RED);
        mask
    }

    fn alpha(mask: &RgbaImage, x: u32, y: u32) -> u8 {
        mask.get_pixel(x, y).0[3]
    }

    #[test]
    fn top_pass_fades_up_to_border() {
        let mut mask = single_pixel_mask();
        feather_edge(&mut mask, Edge::Top);

        let column: Vec<u8> = (0..=5).rev().map(|y| alpha(&mask, 5, y)).collect();
        assert_eq!(column, vec![255, 213, 171, 129, 87, 45]);
        for y in 0..5 {
            let [r, g, b, _] = mask.get_pixel(5, y).0;
            assert_eq!([r, g, b], [200, 10, 10]);
        }
        for y in 6..10 {
            assert_eq!(mask.get_pixel(5, y), &TRANSPARENT);
        }
    }

    #[test]
    fn fade_stops_before_negative_alpha() {
        let mut mask = RgbaImage::from_pixel(1, 20, TRANSPARENT);
        mask.put_pixel(0, 19, RED);
        feather_edge(&mut mask, Edge::Top);

        let expected = [255u8, 213, 171, 129, 87, 45, 3];
        for (i, a) in expected.iter().enumerate() {
            assert_eq!(alpha(&mask, 0, 19 - i as u32), *a);
        }
        assert_eq!(mask.get_pixel(0, 12), &TRANSPARENT);
    }

    #[test]
    fn zero_alpha_is_written_but_not_below() {
        let mut mask = RgbaImage::from_pixel(10, 1, TRANSPARENT);
        mask.put_pixel(0, 0, Rgba([1, 2, 3, 84]));
        feather_edge(&mut mask, Edge::Right);
        assert_eq!(alpha(&mask, 1, 0), 42);
        assert_eq!(mask.get_pixel(2, 0), &Rgba([1, 2, 3, 0]));
        assert_eq!(mask.get_pixel(3, 0), &TRANSPARENT);
    }

    #[test]
    fn step_budget_caps_the_walk() {
        let mut mask = RgbaImage::new(1, 20);
        mask.put_pixel(0, 15, Rgba([0, 0, 0, 255]));
        let seeds = find_seeds(&mask, Edge::Top);
        fade_from_seeds(&mut mask, &seeds, Edge::Top, 3);
        assert_eq!(alpha(&mask, 0, 13), 171);
        assert_eq!(alpha(&mask, 0, 12), 0);
    }

    #[test]
    fn each_direction_fades_outward() {
        let mut mask = RgbaImage::from_pixel(9, 9, TRANSPARENT);
        for y in 3..6 {
            for x in 3..6 {
                mask.put_pixel(x, y, RED);
            }
        }

        let mut bottom = mask.clone();
        feather_edge(&mut bottom, Edge::Bottom);
        assert_eq!(alpha(&bottom, 4, 6), 213);
        assert_eq!(alpha(&bottom, 4, 8), 129);

        let mut left = mask.clone();
        feather_edge(&mut left, Edge::Left);
        assert_eq!(alpha(&left, 2, 4), 213);
        assert_eq!(alpha(&left, 0, 4), 129);

        let mut right = mask.clone();
        feather_edge(&mut right, Edge::Right);
        assert_eq!(alpha(&right, 6, 4), 213);
        assert_eq!(alpha(&right, 8, 4), 129);
    }

    #[test]
    fn seeds_follow_scan_direction() {
        let mut mask = RgbaImage::from_pixel(4, 4, TRANSPARENT);
        mask.put_pixel(1, 1, RED);
        mask.put_pixel(1, 2, Rgba([0, 0, 0, 10]));

        let top = find_seeds(&mask, Edge::Top);
        assert_eq!(top, vec![ColorPoint { x: 1, y: 1, color: RED }]);

        let bottom = find_seeds(&mask, Edge::Bottom);
        assert_eq!(bottom.len(), 1);
        assert_eq!((bottom[0].x, bottom[0].y), (1, 2));

        assert_eq!(find_seeds(&mask, Edge::Left).len(), 2);
        assert!(find_seeds(&RgbaImage::new(3, 3), Edge::Right).is_empty());
    }

    #[test]
    fn legacy_bottom_leaves_bottom_edge_alone() {
        let mut mask = RgbaImage::from_pixel(1, 10, TRANSPARENT);
        mask.put_pixel(0, 2, RED);
        feather_with(&mut mask, BottomEdge::Legacy);
        assert_eq!(mask.get_pixel(0, 2), &RED);
        assert_eq!(mask.get_pixel(0, 3), &TRANSPARENT);
        assert_eq!(alpha(&mask, 0, 1), 213);
    }

    #[test]
    fn symmetric_bottom_fades_down() {
        let mut mask = RgbaImage::from_pixel(1, 10, TRANSPARENT);
        mask.put_pixel(0, 2, RED);
        feather(&mut mask);
        assert_eq!(alpha(&mask, 0, 3), 213);
        assert_eq!(alpha(&mask, 0, 8), 3);
        assert_eq!(mask.get_pixel(0, 9), &TRANSPARENT);
    }

    #[test]
    fn seeds_come_from_the_unmodified_mask() {
        // The top pass fills column 5 upward; left and right seeds must still
        // be found only on row 5.
        let mut mask = single_pixel_mask();
        feather(&mut mask);
        assert_eq!(mask.get_pixel(4, 4), &TRANSPARENT);
        assert_eq!(alpha(&mask, 4, 5), 213);
        assert_eq!(alpha(&mask, 5, 4), 213);
    }

    #[test]
    fn refeathering_one_edge_keeps_transparent_pixels() {
        let mut mask = RgbaImage::from_pixel(12, 12, TRANSPARENT);
        for (x, y) in [(2, 9), (3, 7), (4, 4), (5, 11), (6, 6), (9, 2)] {
            mask.put_pixel(x, y, Rgba([90, 40, 200, 210]));
        }

        for edge in Edge::PASS_ORDER {
            let mut once = mask.clone();
            feather_edge(&mut once, edge);
            let mut twice = once.clone();
            feather_edge(&mut twice, edge);

            for (x, y, pixel) in once.enumerate_pixels() {
                if pixel.0[3] == 0 {
                    assert_eq!(twice.get_pixel(x, y).0[3], 0, "{edge:?} at ({x}, {y})");
                }
            }
        }
    }
}
