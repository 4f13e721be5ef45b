use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn extend(self, z: f32) -> Vec3 {
        Vec3 {
            x: self.x,
            y: self.y,
            z,
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const ONE: Vec3 = Vec3 {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(value: f32) -> Self {
        Self::new(value, value, value)
    }

    pub const fn truncate(self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.y,
        }
    }

    /// Component-wise product.
    pub fn scaled_by(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color3 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color3 {
    pub const WHITE: Color3 = Color3::new(255, 255, 255);
    pub const BLACK: Color3 = Color3::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub(crate) fn channels(self) -> [f32; 3] {
        [f32::from(self.r), f32::from(self.g), f32::from(self.b)]
    }

    pub(crate) fn from_channels(channels: [f32; 3]) -> Self {
        Self::new(
            channel_to_u8(channels[0]),
            channel_to_u8(channels[1]),
            channel_to_u8(channels[2]),
        )
    }
}

impl Default for Color3 {
    fn default() -> Self {
        Self::WHITE
    }
}

pub(crate) fn channel_to_u8(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Wraps `start` into `period` and returns it with the signed delta to
/// `destination` reduced to a single turn in `(-180, 180]` degrees.
pub fn shortest_arc(start: f32, destination: f32, period: f32) -> (f32, f32) {
    let start = start % period;
    let mut delta = (destination - start).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    (start, delta)
}

/// Cubic Bernstein polynomial through `a`, `b`, `c`, `d` at `t`.
pub fn bezier_at(a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
    let inv = 1.0 - t;
    inv.powi(3) * a + 3.0 * t * inv.powi(2) * b + 3.0 * t.powi(2) * inv * c + t.powi(3) * d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_ops_are_component_wise() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(0.5, -1.0, 2.0);
        assert_eq!(a + b, Vec3::new(1.5, 1.0, 5.0));
        assert_eq!(a - b, Vec3::new(0.5, 3.0, 1.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(a.scaled_by(b), Vec3::new(0.5, -2.0, 6.0));
        assert_eq!(-Vec2::new(1.0, -2.0), Vec2::new(-1.0, 2.0));
    }

    #[test]
    fn shortest_arc_takes_the_short_way_round() {
        let (start, delta) = shortest_arc(350.0, 10.0, 360.0);
        assert!((start - 350.0).abs() < 0.0001);
        assert!((delta - 20.0).abs() < 0.0001);

        let (start, delta) = shortest_arc(-370.0, 90.0, 360.0);
        assert!((start + 10.0).abs() < 0.0001);
        assert!((delta - 100.0).abs() < 0.0001);

        let (_, delta) = shortest_arc(10.0, 300.0, 360.0);
        assert!((delta + 70.0).abs() < 0.0001);
    }

    #[test]
    fn shortest_arc_reduces_deltas_beyond_a_full_turn() {
        let (_, delta) = shortest_arc(0.0, 720.0, 360.0);
        assert!(delta.abs() < 0.0001);

        let (start, delta) = shortest_arc(350.0, -350.0, 360.0);
        assert!((start - 350.0).abs() < 0.0001);
        assert!((delta - 20.0).abs() < 0.0001);

        let (_, delta) = shortest_arc(0.0, -900.0, 360.0);
        assert!((delta - 180.0).abs() < 0.0001);
    }

    #[test]
    fn skew_period_wraps_start_at_half_turn() {
        let (start, delta) = shortest_arc(200.0, 10.0, 180.0);
        assert!((start - 20.0).abs() < 0.0001);
        assert!((delta + 10.0).abs() < 0.0001);
    }

    #[test]
    fn bezier_hits_endpoints() {
        assert_eq!(bezier_at(0.0, 5.0, 7.0, 10.0, 0.0), 0.0);
        assert!((bezier_at(0.0, 5.0, 7.0, 10.0, 1.0) - 10.0).abs() < 0.0001);
        assert!((bezier_at(0.0, 0.0, 10.0, 10.0, 0.5) - 5.0).abs() < 0.0001);
    }

    #[test]
    fn channel_conversion_saturates() {
        assert_eq!(channel_to_u8(300.0), 255);
        assert_eq!(channel_to_u8(-4.0), 0);
        assert_eq!(channel_to_u8(f32::NAN), 0);
        assert_eq!(Color3::from_channels([10.4, 10.6, 255.0]), Color3::new(10, 11, 255));
    }
}
