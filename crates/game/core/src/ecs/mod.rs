//! Entity-component storage.
//!
//! The scheduler never depends on a concrete store. It is generic over
//! [`ComponentStore`], the minimal capability set it needs, and [`World`] is the
//! in-memory implementation shipped with the crate.

mod world;

pub use world::{EntityBuilder, World};

use crate::state::EntityId;

/// Any `Send + 'static` type can be stored as a component.
pub trait Component: Send + 'static {}

impl<T: Send + 'static> Component for T {}

/// Errors surfaced by a [`ComponentStore`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("entity {entity} does not exist")]
    EntityNotFound { entity: EntityId },

    #[error("entity {entity} has no {component} component")]
    ComponentNotFound {
        entity: EntityId,
        component: &'static str,
    },

    #[error("no entity holds the {marker} marker")]
    MarkerNotFound { marker: &'static str },

    #[error("{} entities hold the {marker} marker: {holders:?}", holders.len())]
    MultipleMarkersFound {
        marker: &'static str,
        holders: Vec<EntityId>,
    },
}

/// Capability contract the scheduler consumes from an entity-component store.
///
/// Iteration results are snapshots: they are materialised before being
/// returned, so the store cannot be mutated mid-iteration.
pub trait ComponentStore {
    /// Returns true while the entity exists in the store.
    fn is_alive(&self, entity: EntityId) -> bool;

    fn has_component<T: Component>(&self, entity: EntityId) -> bool;

    /// Borrows the `T` component of `entity`.
    ///
    /// Fails with [`StoreError::ComponentNotFound`] when absent; callers that
    /// expect absence should check [`ComponentStore::has_component`] first.
    fn get_component<T: Component>(&self, entity: EntityId) -> Result<&T, StoreError>;

    fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Result<&mut T, StoreError>;

    /// Attaches `component`, overwriting any existing `T` on the entity.
    fn add_component<T: Component>(
        &mut self,
        entity: EntityId,
        component: T,
    ) -> Result<(), StoreError>;

    /// Detaches `T` from the entity. Removing an absent component is a no-op.
    fn remove_component<T: Component>(&mut self, entity: EntityId) -> Option<T>;

    /// Live entities owning `T`, in ascending id order.
    fn entities_with<T: Component>(&self) -> Vec<EntityId>;

    /// Snapshot of every live entity owning `T` together with a copy of it.
    fn for_each_entity_with<T: Component + Clone>(&self) -> Vec<(EntityId, T)> {
        self.entities_with::<T>()
            .into_iter()
            .filter_map(|entity| {
                self.get_component::<T>(entity)
                    .ok()
                    .map(|component| (entity, component.clone()))
            })
            .collect()
    }

    /// Returns the single entity holding marker `T`.
    ///
    /// Zero holders is [`StoreError::MarkerNotFound`]; more than one is
    /// [`StoreError::MultipleMarkersFound`]. The store never picks one
    /// arbitrarily.
    fn find_unique<T: Component>(&self) -> Result<EntityId, StoreError> {
        let holders = self.entities_with::<T>();
        match holders.as_slice() {
            [] => Err(StoreError::MarkerNotFound {
                marker: short_type_name::<T>(),
            }),
            [single] => Ok(*single),
            _ => Err(StoreError::MultipleMarkersFound {
                marker: short_type_name::<T>(),
                holders,
            }),
        }
    }
}

/// Type name without its module path, for error messages.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = core::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
