//! Physics world boundary and a minimal reference implementation
//!
//! The engine does not own collision detection. A `PhysicsWorld` moves the
//! balls and reports which bodies touch; `GravityWorld` is a small built-in
//! world (gravity plus ball-vs-segment contacts) for headless sessions.

use glam::Vec2;

use super::collision::{BodyRef, Contact};
use super::state::{Ball, Line};
use crate::closest_point_on_segment;
use crate::consts::{GRAVITY, RESTITUTION};

/// Anything that can advance balls and report contacts
pub trait PhysicsWorld {
    /// Integrate one step and return every contact observed during it
    fn step(&mut self, balls: &mut [Ball], lines: &[Line], dt: f32) -> Vec<Contact>;
}

/// Result of a ball-vs-segment check
#[derive(Debug, Clone)]
pub struct SegmentHit {
    /// Closest point on the segment
    pub point: Vec2,
    /// Surface normal pointing toward the ball center
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

/// Check a ball against a line segment
pub fn ball_segment_collision(ball_pos: Vec2, ball_radius: f32, line: &Line) -> Option<SegmentHit> {
    let closest = closest_point_on_segment(ball_pos, line.start, line.end);
    let offset = ball_pos - closest;
    let dist = offset.length();
    if dist >= ball_radius {
        return None;
    }

    let mut normal = offset.normalize_or_zero();
    if normal.length_squared() < 0.5 {
        // Ball center is on the line - use the perpendicular facing up
        let seg = line.end - line.start;
        let perp = Vec2::new(-seg.y, seg.x).normalize_or_zero();
        normal = if perp.y < 0.0 { -perp } else { perp };
        if normal == Vec2::ZERO {
            normal = Vec2::Y;
        }
    }

    Some(SegmentHit {
        point: closest,
        normal,
        penetration: ball_radius - dist,
    })
}

/// Reflect velocity off a surface, keeping `restitution` of the normal speed
///
/// v' = v - (1 + e)(v·n)n, applied only when moving into the surface
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let into = velocity.dot(normal);
    if into >= 0.0 {
        return velocity;
    }
    velocity - (1.0 + restitution) * into * normal
}

/// Constant-gravity world with bouncy static segments
#[derive(Debug, Clone)]
pub struct GravityWorld {
    pub gravity: Vec2,
    pub restitution: f32,
}

impl Default for GravityWorld {
    fn default() -> Self {
        Self::new(GRAVITY, RESTITUTION)
    }
}

impl GravityWorld {
    /// `gravity` is the downward acceleration magnitude
    pub fn new(gravity: f32, restitution: f32) -> Self {
        Self {
            gravity: Vec2::new(0.0, -gravity),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }
}

impl PhysicsWorld for GravityWorld {
    fn step(&mut self, balls: &mut [Ball], lines: &[Line], dt: f32) -> Vec<Contact> {
        let mut contacts = Vec::new();

        for ball in balls.iter_mut() {
            ball.vel += self.gravity * dt;
            ball.pos += ball.vel * dt;

            for line in lines {
                let Some(hit) = ball_segment_collision(ball.pos, ball.radius, line) else {
                    continue;
                };
                ball.pos += hit.normal * hit.penetration;
                ball.vel = reflect_velocity(ball.vel, hit.normal, self.restitution);
                contacts.push(Contact::new(BodyRef::Ball(ball.id), BodyRef::Line(line.id)));
            }
        }

        contacts
    }
}
