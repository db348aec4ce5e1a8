//! Short-lived debug line primitives.

use std::f32::consts::TAU;

use glam::Vec3;

/// Segments in a debug circle.
const CIRCLE_SEGMENTS: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugLine {
    pub from: Vec3,
    pub to: Vec3,
    pub color: Vec3,
    /// Seconds left before the line is pruned.
    pub life: f32,
}

/// Debug lines in insertion order.
#[derive(Clone, Debug, Default)]
pub struct DebugLines {
    lines: Vec<DebugLine>,
}

impl DebugLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[DebugLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn add_line(&mut self, from: Vec3, to: Vec3, color: Vec3, life: f32) {
        self.lines.push(DebugLine {
            from,
            to,
            color,
            life,
        });
    }

    /// Adds the 12 edges of the axis-aligned cube at `min` with edge `size`.
    pub fn add_cube(&mut self, min: Vec3, size: f32, color: Vec3, life: f32) {
        let corner = |x: f32, y: f32, z: f32| min + Vec3::new(x, y, z) * size;
        let bottom = [
            corner(0.0, 0.0, 0.0),
            corner(1.0, 0.0, 0.0),
            corner(1.0, 0.0, 1.0),
            corner(0.0, 0.0, 1.0),
        ];
        let top = bottom.map(|p| p + Vec3::Y * size);
        for i in 0..4 {
            let next = (i + 1) % 4;
            self.add_line(bottom[i], bottom[next], color, life);
            self.add_line(top[i], top[next], color, life);
            self.add_line(bottom[i], top[i], color, life);
        }
    }

    /// Adds a closed circle in the X/Z plane around `center`.
    pub fn add_circle(&mut self, center: Vec3, radius: f32, color: Vec3, life: f32) {
        let point = |i: usize| {
            let angle = TAU * i as f32 / CIRCLE_SEGMENTS as f32;
            center + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
        };
        for i in 0..CIRCLE_SEGMENTS {
            self.add_line(point(i), point(i + 1), color, life);
        }
    }

    /// Ages every line by `dt` and drops the ones whose life ran out.
    pub fn update(&mut self, dt: f32) {
        for line in &mut self.lines {
            line.life -= dt;
        }
        self.lines.retain(|line| line.life > 0.0);
    }
}
