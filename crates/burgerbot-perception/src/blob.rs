//! Connected components of a [`ColorMask`] and their geometry.
//!
//! Components are 8-connected.  For each one we keep its outer boundary
//! pixels (the contour), the convex hull of that contour and the
//! axis-aligned bounding box of the hull.  Blobs come back in raster order
//! of their first pixel.

use burgerbot_types::BlobRect;

use crate::color::ColorMask;

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// One connected region of set mask pixels.
#[derive(Debug, Clone)]
pub struct Blob {
    /// Number of pixels in the component.
    pub pixel_count: usize,
    /// Boundary pixels: members with at least one 4-neighbour outside the
    /// component.
    pub contour: Vec<Point>,
    /// Convex hull of `contour`, counter-clockwise.
    pub hull: Vec<Point>,
    pub rect: BlobRect,
}

const NEIGHBOURS_8: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const NEIGHBOURS_4: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Extract every blob in `mask`.
pub fn find_blobs(mask: &ColorMask) -> Vec<Blob> {
    let (w, h) = (i64::from(mask.width()), i64::from(mask.height()));
    let mut visited = vec![false; (w * h) as usize];
    let mut blobs = Vec::new();
    let mut stack = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if visited[idx] || !mask.get(x, y) {
                continue;
            }

            visited[idx] = true;
            stack.push(Point::new(x, y));
            let mut pixel_count = 0;
            let mut contour = Vec::new();

            while let Some(p) = stack.pop() {
                pixel_count += 1;
                if NEIGHBOURS_4
                    .iter()
                    .any(|(dx, dy)| !mask.get(p.x + dx, p.y + dy))
                {
                    contour.push(p);
                }
                for (dx, dy) in NEIGHBOURS_8 {
                    let (nx, ny) = (p.x + dx, p.y + dy);
                    if !mask.get(nx, ny) {
                        continue;
                    }
                    let n = (ny * w + nx) as usize;
                    if !visited[n] {
                        visited[n] = true;
                        stack.push(Point::new(nx, ny));
                    }
                }
            }

            let hull = convex_hull(&contour);
            let rect = bounding_rect(&hull);
            blobs.push(Blob {
                pixel_count,
                contour,
                hull,
                rect,
            });
        }
    }
    blobs
}

fn cross(o: Point, a: Point, b: Point) -> i64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull by Andrew's monotone chain.  Collinear points are dropped.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    pts.sort_unstable();
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Smallest upright rectangle covering `points`, inclusive of the edge
/// pixels.  An empty slice yields a zero-sized rectangle at the origin.
pub fn bounding_rect(points: &[Point]) -> BlobRect {
    let Some(first) = points.first() else {
        return BlobRect {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
    };
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    BlobRect {
        x: min_x.max(0) as u32,
        y: min_y.max(0) as u32,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> ColorMask {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let bits = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        ColorMask::from_bits(width, height, bits).unwrap()
    }

    #[test]
    fn empty_mask_has_no_blobs() {
        assert!(find_blobs(&mask_from(&["....", "...."])).is_empty());
    }

    #[test]
    fn solid_rectangle_is_one_blob_with_exact_bounds() {
        let mask = mask_from(&[
            "......", //
            ".####.",
            ".####.",
            ".####.",
            "......",
        ]);
        let blobs = find_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        let b = &blobs[0];
        assert_eq!(b.pixel_count, 12);
        assert_eq!(
            b.rect,
            BlobRect {
                x: 1,
                y: 1,
                width: 4,
                height: 3
            }
        );
        // Only the centre two pixels are interior.
        assert_eq!(b.contour.len(), 10);
        assert_eq!(b.hull.len(), 4);
    }

    #[test]
    fn diagonal_pixels_are_connected() {
        let mask = mask_from(&[
            "#...", //
            ".#..",
            "..#.",
        ]);
        let blobs = find_blobs(&mask);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].rect.width, 3);
        assert_eq!(blobs[0].rect.height, 3);
    }

    #[test]
    fn separate_regions_come_back_in_raster_order() {
        let mask = mask_from(&[
            "..##", //
            "..##",
            "....",
            "#...",
        ]);
        let blobs = find_blobs(&mask);
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[0].rect.x, 2);
        assert_eq!(blobs[0].rect.area(), 4);
        assert_eq!(blobs[1].rect.y, 3);
        assert_eq!(blobs[1].rect.area(), 1);
    }

    #[test]
    fn single_pixel_blob_has_unit_rect() {
        let blobs = find_blobs(&mask_from(&["...", ".#.", "..."]));
        assert_eq!(
            blobs[0].rect,
            BlobRect {
                x: 1,
                y: 1,
                width: 1,
                height: 1
            }
        );
        assert_eq!(blobs[0].hull, vec![Point::new(1, 1)]);
    }

    #[test]
    fn hull_of_l_shape_skips_the_notch() {
        let mask = mask_from(&[
            "#..", //
            "#..",
            "###",
        ]);
        let blob = &find_blobs(&mask)[0];
        assert_eq!(blob.hull.len(), 3);
        assert!(blob.hull.contains(&Point::new(0, 0)));
        assert!(blob.hull.contains(&Point::new(0, 2)));
        assert!(blob.hull.contains(&Point::new(2, 2)));
    }

    #[test]
    fn convex_hull_drops_collinear_points() {
        let pts = [
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(2, 0),
            Point::new(2, 2),
            Point::new(0, 2),
        ];
        assert_eq!(convex_hull(&pts).len(), 4);
    }
}
