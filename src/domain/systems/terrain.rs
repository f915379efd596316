// Static platform geometry and blast line-of-sight checks.

use tracing::{debug, warn};

use crate::domain::errors::CombatError;
use crate::domain::state::Point;

/// Axis-aligned platform. `x`/`y` is the rectangle center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Platform {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// True when the segment crosses any of the four edges.
    pub fn blocks(&self, from: Point, to: Point) -> bool {
        crosses_vertical(from, to, self.left(), self.top(), self.bottom())
            || crosses_vertical(from, to, self.right(), self.top(), self.bottom())
            || crosses_horizontal(from, to, self.top(), self.left(), self.right())
            || crosses_horizontal(from, to, self.bottom(), self.left(), self.right())
    }
}

// Segment vs. the vertical edge x = edge_x, y in [y1, y2].
fn crosses_vertical(from: Point, to: Point, edge_x: f32, y1: f32, y2: f32) -> bool {
    // Both endpoints on one side (or touching the line) is not a crossing.
    if (from.x <= edge_x && to.x <= edge_x) || (from.x >= edge_x && to.x >= edge_x) {
        return false;
    }
    let t = (edge_x - from.x) / (to.x - from.x);
    let y = from.y + t * (to.y - from.y);
    y >= y1.min(y2) && y <= y1.max(y2)
}

// Segment vs. the horizontal edge y = edge_y, x in [x1, x2].
fn crosses_horizontal(from: Point, to: Point, edge_y: f32, x1: f32, x2: f32) -> bool {
    if (from.y <= edge_y && to.y <= edge_y) || (from.y >= edge_y && to.y >= edge_y) {
        return false;
    }
    let t = (edge_y - from.y) / (to.y - from.y);
    let x = from.x + t * (to.x - from.x);
    x >= x1.min(x2) && x <= x1.max(x2)
}

/// Platform set for the current map.
#[derive(Debug, Clone, Default)]
pub struct TerrainModel {
    // `None` means the map provider never supplied terrain.
    platforms: Option<Vec<Platform>>,
}

impl TerrainModel {
    pub fn new(platforms: Vec<Platform>) -> Self {
        Self {
            platforms: Some(platforms),
        }
    }

    /// Terrain with no platform data at all; every occlusion query lets damage through.
    pub fn missing() -> Self {
        Self { platforms: None }
    }

    pub fn platforms(&self) -> &[Platform] {
        self.platforms.as_deref().unwrap_or(&[])
    }

    /// Index of the first platform blocking the segment, if any.
    pub fn occluding_platform(&self, explosion: Point, player: Point) -> Option<usize> {
        let Some(platforms) = self.platforms.as_deref() else {
            warn!(error = %CombatError::MissingTerrainData, "occlusion check without terrain; allowing damage");
            return None;
        };
        platforms
            .iter()
            .position(|platform| platform.blocks(explosion, player))
    }

    pub fn is_occluded(&self, explosion: Point, player: Point) -> bool {
        match self.occluding_platform(explosion, player) {
            Some(index) => {
                debug!(
                    platform = index,
                    ex = explosion.x,
                    ey = explosion.y,
                    px = player.x,
                    py = player.y,
                    "blast blocked by terrain"
                );
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab() -> Platform {
        // Spans x 300..500, y 550..600.
        Platform::new(400.0, 575.0, 200.0, 50.0)
    }

    #[test]
    fn bounds_are_center_anchored() {
        let p = slab();
        assert_eq!((p.left(), p.right(), p.top(), p.bottom()), (300.0, 500.0, 550.0, 600.0));
    }

    #[test]
    fn platform_between_points_occludes_in_both_directions() {
        let terrain = TerrainModel::new(vec![slab()]);
        let above = Point::new(400.0, 450.0);
        let below = Point::new(400.0, 650.0);

        assert!(terrain.is_occluded(above, below));
        assert!(terrain.is_occluded(below, above));
    }

    #[test]
    fn horizontal_blast_through_platform_is_blocked() {
        let terrain = TerrainModel::new(vec![slab()]);
        assert!(terrain.is_occluded(Point::new(250.0, 575.0), Point::new(550.0, 575.0)));
        assert!(terrain.is_occluded(Point::new(550.0, 575.0), Point::new(250.0, 575.0)));
    }

    #[test]
    fn clear_line_of_sight_is_not_occluded() {
        let terrain = TerrainModel::new(vec![slab()]);
        // Both above the platform.
        assert!(!terrain.is_occluded(Point::new(300.0, 500.0), Point::new(500.0, 520.0)));
        // Passing beside it.
        assert!(!terrain.is_occluded(Point::new(600.0, 450.0), Point::new(600.0, 700.0)));
    }

    #[test]
    fn crossing_a_single_edge_counts() {
        let terrain = TerrainModel::new(vec![slab()]);
        // Player standing inside the slab, blast from above: only the top edge is crossed.
        assert!(terrain.is_occluded(Point::new(400.0, 500.0), Point::new(400.0, 575.0)));
    }

    #[test]
    fn touching_an_edge_line_is_not_a_crossing() {
        let terrain = TerrainModel::new(vec![slab()]);
        // Segment ends exactly on the top edge.
        assert!(!terrain.is_occluded(Point::new(400.0, 500.0), Point::new(400.0, 550.0)));
    }

    #[test]
    fn any_platform_of_many_blocks() {
        let terrain = TerrainModel::new(vec![
            Platform::new(100.0, 100.0, 20.0, 20.0),
            slab(),
        ]);
        assert_eq!(
            terrain.occluding_platform(Point::new(400.0, 450.0), Point::new(400.0, 650.0)),
            Some(1)
        );
    }

    #[test]
    fn missing_terrain_never_occludes() {
        let terrain = TerrainModel::missing();
        assert!(terrain.platforms().is_empty());
        assert!(!terrain.is_occluded(Point::new(400.0, 450.0), Point::new(400.0, 650.0)));
    }
}
