use bevy::gltf::GltfExtras;
use bevy::prelude::*;
use std::collections::HashSet;

use super::candidate::is_light_candidate;
use super::descriptor::{LightDescriptor, extract, extract_all};
use super::materialize::{LightKind, materialize_nth};
use super::placement::parent_inverse;
use crate::error::{DescriptorError, MaterializeError};
use crate::settings::{BatchOrder, DescriptorSelection, PetalLightSettings};

/// Outcome of one batch of light materialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Reflect)]
pub struct LightBatchReport {
    /// Lights created
    pub spawned: usize,
    /// Candidate nodes without a usable `lights` list
    pub skipped: usize,
    /// Candidate nodes whose descriptor was rejected
    pub failed: usize,
    /// Created light entities, in creation order
    pub lights: Vec<Entity>,
}

type NodePlan = Result<Option<Vec<LightDescriptor>>, DescriptorError>;

/// Candidate nodes among `new_nodes`, with their names, in processing order.
pub fn candidate_nodes(
    world: &World,
    new_nodes: &HashSet<Entity>,
    settings: &PetalLightSettings,
) -> Vec<(Entity, String)> {
    let mut candidates: Vec<(Entity, String)> = new_nodes
        .iter()
        .filter_map(|&entity| {
            let name = world.get::<Name>(entity)?;
            is_light_candidate(name.as_str(), &settings.candidate_prefix)
                .then(|| (entity, name.as_str().to_string()))
        })
        .collect();

    if settings.order == BatchOrder::ByName {
        candidates.sort_by(|(a_entity, a_name), (b_entity, b_name)| {
            a_name.cmp(b_name).then(a_entity.cmp(b_entity))
        });
    }
    candidates
}

fn plan_node(world: &World, entity: Entity, selection: DescriptorSelection) -> NodePlan {
    let Some(extras) = world.get::<GltfExtras>(entity) else {
        return Ok(None);
    };
    match selection {
        DescriptorSelection::First => extract(extras).map(|first| first.map(|d| vec![d])),
        DescriptorSelection::All => extract_all(extras),
    }
}

/// Dry run of everything `materialize` could reject for this node.
fn validate_node(
    world: &World,
    entity: Entity,
    name: &str,
    descriptors: &[LightDescriptor],
) -> Result<(), MaterializeError> {
    for descriptor in descriptors {
        LightKind::resolve(&descriptor.kind)?;
    }
    if !descriptors.is_empty() && parent_inverse(world, entity).is_none() {
        return Err(MaterializeError::SingularParentTransform(name.to_string()));
    }
    Ok(())
}

/// Materialize the lights of every candidate among `new_nodes`.
///
/// A node that fails is logged and counted; the batch carries on with the
/// next node and lights created so far are kept.
pub fn spawn_lights_for_new_nodes(
    world: &mut World,
    new_nodes: &HashSet<Entity>,
    settings: &PetalLightSettings,
) -> LightBatchReport {
    let plans: Vec<(Entity, String, NodePlan)> = candidate_nodes(world, new_nodes, settings)
        .into_iter()
        .map(|(entity, name)| {
            let plan = plan_node(world, entity, settings.selection);
            (entity, name, plan)
        })
        .collect();

    let mut report = LightBatchReport::default();

    if settings.validate_before_spawn {
        for (entity, name, plan) in &plans {
            let result = match plan {
                Ok(Some(descriptors)) => validate_node(world, *entity, name, descriptors)
                    .map_err(|err| err.to_string()),
                Ok(None) => Ok(()),
                Err(err) => Err(err.to_string()),
            };
            if let Err(err) = result {
                warn!("[Invalid] {}: {}", name, err);
                report.failed += 1;
            }
        }
        if report.failed > 0 {
            warn!("Validation failed for {} node(s), no lights spawned", report.failed);
            return report;
        }
    }

    for (entity, name, plan) in plans {
        let descriptors = match plan {
            Ok(Some(descriptors)) => descriptors,
            Ok(None) => {
                info!("[Skip] No lights array on {}", name);
                report.skipped += 1;
                continue;
            }
            Err(err) => {
                warn!("[Failed] Could not decode lights on {}: {}", name, err);
                report.failed += 1;
                continue;
            }
        };

        for (ordinal, descriptor) in descriptors.iter().enumerate() {
            info!("[Found] Light for {}: {:?}", name, descriptor);
            match materialize_nth(world, entity, descriptor, settings, ordinal) {
                Ok(light) => {
                    report.spawned += 1;
                    report.lights.push(light);
                }
                Err(err) => {
                    warn!("[Failed] Could not create light for {}: {}", name, err);
                    report.failed += 1;
                    break;
                }
            }
        }
    }

    info!("Spawned {} lights", report.spawned);
    report
}
