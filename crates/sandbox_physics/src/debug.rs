//! Collider outlines for debug drawing

use glam::Vec2;
use rapier2d::prelude as rapier;

use crate::math;

/// Receives every shape in the space as world-space outline segments
pub trait DebugDraw {
    fn line(&mut self, a: Vec2, b: Vec2);
}

/// Routes Rapier's shape outlines into a [`DebugDraw`]
pub(crate) struct OutlineBackend<'a> {
    pub(crate) draw: &'a mut dyn DebugDraw,
}

impl rapier::DebugRenderBackend for OutlineBackend<'_> {
    fn filter_object(&self, object: rapier::DebugRenderObject) -> bool {
        matches!(object, rapier::DebugRenderObject::Collider(..))
    }

    fn draw_line(
        &mut self,
        _object: rapier::DebugRenderObject,
        a: rapier::Point<f32>,
        b: rapier::Point<f32>,
        _color: rapier::DebugColor,
    ) {
        self.draw.line(math::from_point(&a), math::from_point(&b));
    }
}

/// Debug renderer limited to shape outlines
pub(crate) fn outline_pipeline() -> rapier::DebugRenderPipeline {
    rapier::DebugRenderPipeline::new(
        rapier::DebugRenderStyle::default(),
        rapier::DebugRenderMode::COLLIDER_SHAPES,
    )
}
