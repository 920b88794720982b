//! Conversion helpers between glam and Rapier's nalgebra types

use glam::Vec2;
use rapier2d::prelude as rapier;

#[inline]
pub(crate) fn vector(v: Vec2) -> rapier::Vector<f32> {
    rapier::Vector::new(v.x, v.y)
}

#[inline]
pub(crate) fn point(v: Vec2) -> rapier::Point<f32> {
    rapier::Point::new(v.x, v.y)
}

#[inline]
pub(crate) fn from_vector(v: &rapier::Vector<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

#[inline]
pub(crate) fn from_point(p: &rapier::Point<f32>) -> Vec2 {
    Vec2::new(p.x, p.y)
}
