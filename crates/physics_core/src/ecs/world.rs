//! Minimal scene world
//!
//! Holds entities with a local transform, an optional parent and an active
//! flag. It is the scene collaborator the physics world reads transforms
//! from and writes rigidbody motion back to.

use super::components::TransformComponent;
use super::{Entity, SceneAccess, SceneAccessMut};
use crate::foundation::math::{Transform, Vec3};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct EntityRecord {
    transform: TransformComponent,
    parent: Option<Entity>,
    active: bool,
}

/// Scene world containing all entities and their transforms
#[derive(Debug, Default)]
pub struct World {
    next_entity_id: u32,
    entities: HashMap<Entity, EntityRecord>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a root entity with the given local transform
    pub fn create_entity(&mut self, transform: TransformComponent) -> Entity {
        self.spawn(transform, None)
    }

    /// Create an entity parented to `parent`
    ///
    /// Returns `None` when the parent does not exist.
    pub fn create_child(&mut self, parent: Entity, transform: TransformComponent) -> Option<Entity> {
        if !self.entities.contains_key(&parent) {
            return None;
        }
        Some(self.spawn(transform, Some(parent)))
    }

    fn spawn(&mut self, transform: TransformComponent, parent: Option<Entity>) -> Entity {
        let entity = Entity::from_raw(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities.insert(
            entity,
            EntityRecord {
                transform,
                parent,
                active: true,
            },
        );
        entity
    }

    /// Destroy an entity and all of its descendants
    ///
    /// Returns every destroyed entity so the caller can release their
    /// physics components.
    pub fn destroy_entity(&mut self, entity: Entity) -> Vec<Entity> {
        if !self.entities.contains_key(&entity) {
            return Vec::new();
        }

        let mut destroyed = vec![entity];
        let mut cursor = 0;
        while cursor < destroyed.len() {
            let current = destroyed[cursor];
            let mut children: Vec<Entity> = self
                .entities
                .iter()
                .filter(|(_, record)| record.parent == Some(current))
                .map(|(&child, _)| child)
                .collect();
            children.sort();
            destroyed.extend(children);
            cursor += 1;
        }

        for dead in &destroyed {
            self.entities.remove(dead);
        }
        destroyed
    }

    /// Whether the entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the world has no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Local transform of an entity
    pub fn local_transform(&self, entity: Entity) -> Option<&TransformComponent> {
        self.entities.get(&entity).map(|record| &record.transform)
    }

    /// Mutable local transform of an entity
    pub fn local_transform_mut(&mut self, entity: Entity) -> Option<&mut TransformComponent> {
        self.entities.get_mut(&entity).map(|record| &mut record.transform)
    }

    /// Set the local position of an entity
    pub fn set_position(&mut self, entity: Entity, position: Vec3) {
        if let Some(transform) = self.local_transform_mut(entity) {
            transform.position = position;
        }
    }

    /// Parent of an entity
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.entities.get(&entity).and_then(|record| record.parent)
    }

    /// Set the entity's own active flag
    pub fn set_active(&mut self, entity: Entity, active: bool) {
        if let Some(record) = self.entities.get_mut(&entity) {
            record.active = active;
        }
    }

    /// Global position of an entity
    pub fn global_position(&self, entity: Entity) -> Option<Vec3> {
        self.global_transform(entity).map(|transform| transform.position)
    }
}

impl SceneAccess for World {
    fn global_transform(&self, entity: Entity) -> Option<Transform> {
        let record = self.entities.get(&entity)?;
        let local = record.transform.to_math_transform();

        match record.parent {
            Some(parent) => {
                let parent_global = self.global_transform(parent).unwrap_or_default();
                Some(parent_global.combine(&local))
            }
            None => Some(local),
        }
    }

    fn is_active(&self, entity: Entity) -> bool {
        let mut current = Some(entity);
        while let Some(id) = current {
            match self.entities.get(&id) {
                Some(record) if record.active => current = record.parent,
                _ => return false,
            }
        }
        true
    }
}

impl SceneAccessMut for World {
    fn translate(&mut self, entity: Entity, delta: Vec3) {
        let local_delta = match self.parent(entity) {
            Some(parent) => self
                .global_transform(parent)
                .map_or(delta, |parent_global| parent_global.inverse_transform_vector(&delta)),
            None => delta,
        };

        if let Some(transform) = self.local_transform_mut(entity) {
            transform.position += local_delta;
        }
    }
}
