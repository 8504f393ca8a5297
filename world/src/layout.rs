//! Static geometry of the sorting floor.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Placement of the belt, hazards, receptacles and the player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Conveyor belt band.
    pub belt: BeltLayout,
    /// Point where spawned items land.
    pub spawner: Vec2,
    /// Left edge of the danger zone; the zone extends to the shredder.
    pub danger_zone_start_x: f32,
    /// Items travelling past this x coordinate are shredded.
    pub shredder_x: f32,
    /// Centres of the destination receptacles, in destination id order.
    pub destinations: Vec<Vec2>,
    /// Distance from a receptacle centre within which a drop counts.
    pub destination_radius: f32,
    /// Player body parameters.
    pub player: PlayerLayout,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            belt: BeltLayout::default(),
            spawner: Vec2::new(-7.5, 0.0),
            danger_zone_start_x: 5.0,
            shredder_x: 7.0,
            destinations: vec![Vec2::new(-4.0, 3.0), Vec2::new(0.0, 3.0), Vec2::new(4.0, 3.0)],
            destination_radius: 0.8,
            player: PlayerLayout::default(),
        }
    }
}

/// Horizontal conveyor band moving items towards +x.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeltLayout {
    /// Centre line of the belt.
    pub y: f32,
    /// Half of the belt's thickness.
    pub half_height: f32,
    /// Left end of the belt.
    pub start_x: f32,
}

impl Default for BeltLayout {
    fn default() -> Self {
        Self {
            y: 0.0,
            half_height: 0.5,
            start_x: -8.0,
        }
    }
}

impl BeltLayout {
    /// Reports whether the point rests on the belt surface.
    #[must_use]
    pub fn carries(&self, point: Vec2) -> bool {
        (point.y - self.y).abs() <= self.half_height && point.x >= self.start_x
    }
}

/// Movement and reach of the player body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerLayout {
    /// Spawn point of the player body.
    pub start: Vec2,
    /// Top speed in world units per second before scaling.
    pub movement_speed: f32,
    /// Weight of the previous step when smoothing movement, in `0.0..1.0`.
    pub acceleration: f32,
    /// Distance within which the player can grab an item.
    pub pickup_radius: f32,
}

impl Default for PlayerLayout {
    fn default() -> Self {
        Self {
            start: Vec2::new(0.0, 1.5),
            movement_speed: 4.0,
            acceleration: 0.8,
            pickup_radius: 0.6,
        }
    }
}
