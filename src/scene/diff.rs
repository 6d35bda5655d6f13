use bevy::prelude::*;
use std::collections::HashSet;
use std::hash::Hash;

use crate::lights::{PetalLight, PetalLightSource};

/// Identities present in `after` but not in `before`.
pub fn detect_new<T: Eq + Hash + Clone>(before: &HashSet<T>, after: &HashSet<T>) -> HashSet<T> {
    after.difference(before).cloned().collect()
}

/// Named entities that count as scene nodes.
///
/// Mesh primitive entities (spawned by the glTF loader under each node) are
/// not nodes. Nodes that already own a materialized light, and the lights
/// themselves, are left out so a later import never picks them up again.
type SceneNodeFilter = (
    With<Name>,
    Without<Mesh3d>,
    Without<PetalLightSource>,
    Without<PetalLight>,
);

/// The set of scene nodes that exist at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSnapshot {
    nodes: HashSet<Entity>,
}

impl NodeSnapshot {
    pub fn capture(world: &mut World) -> Self {
        let mut query = world.query_filtered::<Entity, SceneNodeFilter>();
        Self {
            nodes: query.iter(world).collect(),
        }
    }

    /// Nodes that appeared between `self` and `after`
    pub fn new_since(&self, after: &NodeSnapshot) -> HashSet<Entity> {
        detect_new(&self.nodes, &after.nodes)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.nodes.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
