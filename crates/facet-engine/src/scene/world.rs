use glam::Vec3;

use super::light::{LightData, LightKind};
use super::renderable::{Renderable, RenderableId, SceneError};

/// Renderables in draw order plus scene lighting.
#[derive(Debug, Default)]
pub struct Scene {
    entries: Vec<(RenderableId, Renderable)>,
    next_id: u32,
    light: LightData,
    light_source: Option<RenderableId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `renderable`; draw order is insertion order.
    pub fn add(&mut self, renderable: Renderable) -> RenderableId {
        let id = RenderableId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, renderable));
        id
    }

    pub fn get(&self, id: RenderableId) -> Option<&Renderable> {
        self.entries.iter().find(|(i, _)| *i == id).map(|(_, r)| r)
    }

    pub fn get_mut(&mut self, id: RenderableId) -> Option<&mut Renderable> {
        self.entries
            .iter_mut()
            .find(|(i, _)| *i == id)
            .map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RenderableId, &Renderable)> {
        self.entries.iter().map(|(id, r)| (*id, r))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (RenderableId, &mut Renderable)> {
        self.entries.iter_mut().map(|(id, r)| (*id, r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn light(&self) -> &LightData {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut LightData {
        &mut self.light
    }

    /// Makes the light follow `id`'s position each frame.
    pub fn set_light_source(&mut self, id: RenderableId) -> Result<(), SceneError> {
        if self.get(id).is_none() {
            return Err(SceneError::UnknownRenderable(id));
        }
        self.light_source = Some(id);
        Ok(())
    }

    pub fn light_source(&self) -> Option<RenderableId> {
        self.light_source
    }

    /// Lighting for this frame, with the light source's current position
    /// substituted when one is set and still present.
    pub fn resolved_light(&self) -> LightData {
        let source = self.light_source.and_then(|id| self.get(id));
        resolve_light(self.light, source.map(Renderable::position))
    }

    /// Closest hit of the segment across all renderables.
    pub fn trace_line(&self, origin: Vec3, destination: Vec3) -> Option<(RenderableId, Vec3)> {
        closest_hit(
            origin,
            self.iter()
                .filter_map(|(id, r)| r.intersect(origin, destination).map(|hit| (id, hit))),
        )
    }
}

fn resolve_light(mut light: LightData, source: Option<Vec3>) -> LightData {
    if let Some(position) = source {
        light.kind = LightKind::Point(position);
    }
    light
}

fn closest_hit<I>(origin: Vec3, hits: I) -> Option<(RenderableId, Vec3)>
where
    I: IntoIterator<Item = (RenderableId, Vec3)>,
{
    hits.into_iter().min_by(|(_, a), (_, b)| {
        a.distance_squared(origin)
            .total_cmp(&b.distance_squared(origin))
    })
}
