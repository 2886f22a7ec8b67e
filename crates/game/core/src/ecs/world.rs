use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{Component, ComponentStore, StoreError, short_type_name};
use crate::state::EntityId;

/// Type-erased view of one component column, so `despawn` can clear an
/// entity from every column without knowing the concrete types.
trait Column: Any + Send {
    fn remove_entity(&mut self, entity: EntityId);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> Column for BTreeMap<EntityId, T> {
    fn remove_entity(&mut self, entity: EntityId) {
        self.remove(&entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// In-memory entity-component store.
///
/// Identifiers are allocated monotonically and never reused by the same
/// `World`, so a stale [`EntityId`] can never alias a newer entity. Columns
/// are ordered maps, which keeps every iteration deterministic.
#[derive(Default)]
pub struct World {
    next_id: u32,
    alive: BTreeSet<EntityId>,
    columns: HashMap<TypeId, Box<dyn Column>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh entity with no components.
    pub fn spawn(&mut self) -> EntityId {
        let entity = EntityId(self.next_id);
        self.next_id += 1;
        self.alive.insert(entity);
        entity
    }

    /// Starts building a new entity with chained components.
    pub fn build(&mut self) -> EntityBuilder<'_> {
        let entity = self.spawn();
        EntityBuilder {
            world: self,
            entity,
        }
    }

    /// Destroys the entity and every component attached to it.
    /// Returns false if the entity was already gone.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        if !self.alive.remove(&entity) {
            return false;
        }
        for column in self.columns.values_mut() {
            column.remove_entity(entity);
        }
        true
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// Live entities in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive.iter().copied()
    }

    fn column<T: Component>(&self) -> Option<&BTreeMap<EntityId, T>> {
        self.columns
            .get(&TypeId::of::<T>())
            .and_then(|column| column.as_any().downcast_ref())
    }

    fn column_mut<T: Component>(&mut self) -> Option<&mut BTreeMap<EntityId, T>> {
        self.columns
            .get_mut(&TypeId::of::<T>())
            .and_then(|column| column.as_any_mut().downcast_mut())
    }

    fn column_or_insert<T: Component>(&mut self) -> &mut BTreeMap<EntityId, T> {
        let column = self
            .columns
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(BTreeMap::<EntityId, T>::new()));
        match column.as_any_mut().downcast_mut() {
            Some(column) => column,
            None => unreachable!("column keyed by TypeId::of::<T>() always stores T"),
        }
    }

    fn ensure_alive(&self, entity: EntityId) -> Result<(), StoreError> {
        if self.alive.contains(&entity) {
            Ok(())
        } else {
            Err(StoreError::EntityNotFound { entity })
        }
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("alive", &self.alive)
            .field("columns", &self.columns.len())
            .finish()
    }
}

impl ComponentStore for World {
    fn is_alive(&self, entity: EntityId) -> bool {
        self.alive.contains(&entity)
    }

    fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        self.column::<T>()
            .is_some_and(|column| column.contains_key(&entity))
    }

    fn get_component<T: Component>(&self, entity: EntityId) -> Result<&T, StoreError> {
        self.column::<T>()
            .and_then(|column| column.get(&entity))
            .ok_or(StoreError::ComponentNotFound {
                entity,
                component: short_type_name::<T>(),
            })
    }

    fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Result<&mut T, StoreError> {
        self.column_mut::<T>()
            .and_then(|column| column.get_mut(&entity))
            .ok_or(StoreError::ComponentNotFound {
                entity,
                component: short_type_name::<T>(),
            })
    }

    fn add_component<T: Component>(
        &mut self,
        entity: EntityId,
        component: T,
    ) -> Result<(), StoreError> {
        self.ensure_alive(entity)?;
        self.column_or_insert::<T>().insert(entity, component);
        Ok(())
    }

    fn remove_component<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        self.column_mut::<T>()
            .and_then(|column| column.remove(&entity))
    }

    fn entities_with<T: Component>(&self) -> Vec<EntityId> {
        self.column::<T>()
            .map(|column| column.keys().copied().collect())
            .unwrap_or_default()
    }
}

/// Chained component attachment for a freshly spawned entity.
pub struct EntityBuilder<'w> {
    world: &'w mut World,
    entity: EntityId,
}

impl EntityBuilder<'_> {
    pub fn with<T: Component>(self, component: T) -> Self {
        self.world.column_or_insert::<T>().insert(self.entity, component);
        self
    }

    pub fn id(self) -> EntityId {
        self.entity
    }
}
