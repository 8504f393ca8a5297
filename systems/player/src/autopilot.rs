//! Scripted player used on the attract screen.

use glam::Vec2;
use lost_and_found_core::PlayerInput;
use lost_and_found_world::query::ItemSnapshot;

use crate::PlayerView;

/// Distance below which steering output shrinks to avoid overshooting.
const SLOW_RADIUS: f32 = 1.0;
/// Fraction of the pickup radius the autopilot closes before grabbing.
const PICKUP_MARGIN: f32 = 0.8;
/// Fraction of the receptacle radius the held item must reach before release.
const DELIVERY_MARGIN: f32 = 0.5;

/// Fetches wanted items, carries them to their destination and returns
/// unwanted items to the belt.
#[derive(Clone, Copy, Debug, Default)]
pub struct Autopilot;

impl Autopilot {
    /// Computes the input for the current tick.
    pub fn steer(&mut self, view: &PlayerView<'_>) -> PlayerInput {
        match view.player.held {
            Some(held) => match view.items.iter().find(|item| item.id == held) {
                Some(item) => carry(view, item),
                None => PlayerInput::IDLE,
            },
            None => fetch(view),
        }
    }
}

fn carry(view: &PlayerView<'_>, item: &ItemSnapshot) -> PlayerInput {
    let destination = view
        .destinations
        .iter()
        .find(|destination| destination.want == Some(item.kind));

    if let Some(destination) = destination {
        let reach = view.layout.destination_radius * DELIVERY_MARGIN;
        if item.position.distance(destination.position) <= reach {
            return release();
        }
        return moving(item.position, destination.position);
    }

    let belt = view.layout.belt;
    let settled = (item.position.y - belt.y).abs() <= belt.half_height * 0.5
        && item.position.x >= belt.start_x;
    if settled {
        return release();
    }
    let drop_point = Vec2::new(item.position.x.max(belt.start_x + belt.half_height), belt.y);
    moving(item.position, drop_point)
}

fn fetch(view: &PlayerView<'_>) -> PlayerInput {
    let origin = view.player.position;
    let shredder_x = view.layout.shredder_x;
    let is_wanted = |item: &&ItemSnapshot| {
        view.destinations
            .iter()
            .any(|destination| destination.want == Some(item.kind))
    };

    let target = nearest(view.items.iter().filter(is_wanted), origin, shredder_x).or_else(|| {
        nearest(
            view.items.iter().filter(|item| !item.on_belt),
            origin,
            shredder_x,
        )
    });

    let Some(target) = target else {
        return moving(origin, view.layout.player.start);
    };

    let reach = view.layout.player.pickup_radius * PICKUP_MARGIN;
    let grabs_target = nearest(view.items.iter(), origin, f32::INFINITY)
        .is_some_and(|closest| closest.id == target.id);
    if grabs_target && target.position.distance(origin) <= reach {
        return PlayerInput {
            pickup_pressed: true,
            ..PlayerInput::IDLE
        };
    }
    moving(origin, target.position)
}

fn nearest<'a>(
    candidates: impl Iterator<Item = &'a ItemSnapshot>,
    origin: Vec2,
    shredder_x: f32,
) -> Option<ItemSnapshot> {
    candidates
        .filter(|item| !item.held && item.position.x < shredder_x)
        .min_by(|left, right| {
            left.position
                .distance_squared(origin)
                .total_cmp(&right.position.distance_squared(origin))
                .then(left.id.cmp(&right.id))
        })
        .copied()
}

fn moving(from: Vec2, to: Vec2) -> PlayerInput {
    let axes = ((to - from) / SLOW_RADIUS).clamp_length_max(1.0);
    PlayerInput {
        horizontal: axes.x,
        vertical: axes.y,
        ..PlayerInput::IDLE
    }
}

fn release() -> PlayerInput {
    PlayerInput {
        pickup_released: true,
        ..PlayerInput::IDLE
    }
}
