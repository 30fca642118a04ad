use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use morphpack::archive::{synapse_table, Synapse, SynapseKind};
use morphpack::dataset::{write_container, NeuronCollection};
use morphpack::record::{NeuronKind, Skeleton, SkeletonNode};
use morphpack::writer::WriterConfig;

const NAMES: [&str; 6] = ["Humpty", "Dumpty", "DA1", "DL4", "KC", "PN"];

/// Generate a synthetic skeleton collection with synapses and metadata
pub fn run(output: PathBuf, neurons: usize, nodes: usize, config: WriterConfig) -> Result<()> {
    info!("Generating {} synthetic skeletons with {} nodes each", neurons, nodes);
    let collection = build_demo_collection(neurons, nodes.max(1))?;

    let report = write_container(&output, &collection, &config)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote {}", output.display());
    println!("  {}", report);
    Ok(())
}

/// Deterministic collection: one branching skeleton per record, a synapse on
/// every fourth node and a few typed metadata properties.
pub fn build_demo_collection(neurons: usize, nodes: usize) -> Result<NeuronCollection> {
    let mut collection = NeuronCollection::new(NeuronKind::Skeleton);
    let mut synapses = Vec::new();

    for n in 0..neurons {
        let id = 10_000 + n as i64 * 7;
        let skeleton = demo_skeleton(id, n, nodes);
        synapses.extend(demo_synapses(&skeleton));

        collection.metadata.insert(id, "name", format!("{}-{}", NAMES[n % NAMES.len()], n));
        collection.metadata.set_float(id, "cable_length", cable_length(&skeleton));
        collection.metadata.set_bool(id, "has_soma", n % 3 != 0);
        collection.push(skeleton);
    }

    if !synapses.is_empty() {
        collection.secondary.push(synapse_table("synapses", &synapses)?);
    }
    Ok(collection)
}

fn demo_skeleton(id: i64, seed: usize, nodes: usize) -> Skeleton {
    let origin = seed as f32 * 50.0;
    let nodes = (0..nodes as i64)
        .map(|i| {
            // Every fifth node starts a side branch off the node two back
            let parent = match i {
                0 => -1,
                i if i % 5 == 0 && i >= 2 => i - 1,
                i => i,
            };
            let t = i as f32 * 0.35;
            SkeletonNode::new(i + 1, parent, origin + t * 10.0, origin + t.sin() * 25.0, t.cos() * 5.0)
                .with_radius(1.0 + (t * 0.5).sin().abs())
        })
        .collect();
    Skeleton::new(id, nodes)
}

fn demo_synapses(skeleton: &Skeleton) -> Vec<Synapse> {
    skeleton
        .nodes
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 4 == 3)
        .map(|(i, node)| Synapse {
            neuron: skeleton.id.clone(),
            connector_id: Some(node.node_id * 1_000 + i as i64),
            node_id: Some(node.node_id),
            kind: if i % 8 == 3 { SynapseKind::Pre } else { SynapseKind::Post },
            x: node.x,
            y: node.y,
            z: node.z,
        })
        .collect()
}

fn cable_length(skeleton: &Skeleton) -> f64 {
    let position = |id: i64| skeleton.nodes.iter().find(|n| n.node_id == id);
    skeleton
        .nodes
        .iter()
        .filter_map(|node| {
            let parent = position(node.parent_id?)?;
            let (dx, dy, dz) = (node.x - parent.x, node.y - parent.y, node.z - parent.z);
            Some(f64::from((dx * dx + dy * dy + dz * dz).sqrt()))
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphpack::record::RecordId;

    #[test]
    fn test_demo_collection_is_valid() {
        let collection = build_demo_collection(4, 12).unwrap();
        assert_eq!(collection.len(), 4);
        assert_eq!(collection.secondary.len(), 1);
        assert!(collection.get(&RecordId::Int(10_007)).is_some());
        for record in &collection.records {
            let graph = record.as_skeleton().unwrap().graph().unwrap();
            assert_eq!(graph.roots(), &[1]);
        }

        let (_, report) = morphpack::dataset::pack(&collection, &WriterConfig::default()).unwrap();
        assert!(report.dangling.is_empty());
    }
}
