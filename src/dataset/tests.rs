use super::*;
use std::fs;

use tempfile::tempdir;

use crate::archive::{read_synapses, synapse_table, ArchiveError, Synapse, SynapseKind};
use crate::metadata::MetaValue;
use crate::reader::{ContainerKind, NeuronReader};
use crate::record::{Dotprops, Neuron, NeuronKind, RecordId, Skeleton, SkeletonNode};
use crate::writer::{ContainerFormat, WriterConfig, WriterError};

fn skeleton(id: i64, nodes: usize) -> Neuron {
    let nodes = (0..nodes as i64)
        .map(|i| SkeletonNode::new(i + 1, if i == 0 { -1 } else { i }, i as f32, 0.0, 1.0))
        .collect();
    Skeleton::new(id, nodes).into()
}

fn synapse(neuron: i64, connector: i64) -> Synapse {
    Synapse {
        neuron: RecordId::Int(neuron),
        connector_id: Some(connector),
        node_id: Some(1),
        kind: SynapseKind::Pre,
        x: 1.0,
        y: 2.0,
        z: 3.0,
    }
}

fn humpty_dumpty() -> NeuronCollection {
    let mut collection = NeuronCollection::new(NeuronKind::Skeleton);
    collection.push(skeleton(67890, 3));
    collection.push(skeleton(12345, 5));
    collection.metadata.insert(12345, "name", "Humpty");
    collection.metadata.insert(67890, "name", "Dumpty");
    collection
}

fn with_synapses(mut collection: NeuronCollection, synapses: &[Synapse]) -> NeuronCollection {
    collection
        .secondary
        .push(synapse_table("synapses", synapses).expect("synapse table"));
    collection
}

#[test]
fn test_pack_bare_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let collection = humpty_dumpty();
    let (bytes, report) = pack(&collection, &WriterConfig::default())?;

    assert_eq!(&bytes[..4], b"PAR1");
    assert_eq!(report.format, ContainerKind::Bare);
    assert_eq!(report.stats.records_written, 2);
    assert_eq!(report.stats.rows_written, 8);
    assert_eq!(report.stats.file_size_bytes, bytes.len() as u64);
    assert!(report.dangling.is_empty());

    let unpacked = unpack(bytes, None)?;
    assert!(unpacked.missing.is_empty());
    assert!(unpacked.metadata_issues.is_empty());

    // Sorted by id on write, row order inside a record kept
    let ids: Vec<_> = unpacked.collection.ids().cloned().collect();
    assert_eq!(ids, vec![RecordId::Int(12345), RecordId::Int(67890)]);
    assert_eq!(unpacked.collection.get(&RecordId::Int(12345)), collection.get(&RecordId::Int(12345)));
    assert_eq!(
        unpacked.collection.metadata.get(&RecordId::Int(67890), "name"),
        Some(&MetaValue::from("Dumpty"))
    );
    Ok(())
}

#[test]
fn test_pack_keeps_caller_order_without_sorting() -> Result<(), Box<dyn std::error::Error>> {
    let config = WriterConfig {
        sort_by_id: false,
        ..WriterConfig::default()
    };
    let (bytes, _) = pack(&humpty_dumpty(), &config)?;
    let unpacked = unpack(bytes, None)?;
    let ids: Vec<_> = unpacked.collection.ids().cloned().collect();
    assert_eq!(ids, vec![RecordId::Int(67890), RecordId::Int(12345)]);
    Ok(())
}

#[test]
fn test_pack_dotprops_with_string_ids() -> Result<(), Box<dyn std::error::Error>> {
    let mut collection = NeuronCollection::new(NeuronKind::Dotprops);
    collection.push(Dotprops::new("a", vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]).with_alpha(vec![0.5, 0.25]));
    collection.push(Dotprops::new("b", vec![[2.0, 2.0, 2.0]]).with_alpha(vec![1.0]));

    let (bytes, _) = pack(&collection, &WriterConfig::default())?;
    let unpacked = unpack(bytes, None)?;
    assert_eq!(unpacked.collection.kind, NeuronKind::Dotprops);
    assert_eq!(unpacked.collection.records, collection.records);
    Ok(())
}

#[test]
fn test_pack_rejects_cyclic_skeleton() {
    let mut collection = NeuronCollection::new(NeuronKind::Skeleton);
    collection.push(Skeleton::new(
        1,
        vec![SkeletonNode::new(1, 2, 0.0, 0.0, 0.0), SkeletonNode::new(2, 1, 1.0, 0.0, 0.0)],
    ));
    assert!(matches!(
        pack(&collection, &WriterConfig::default()),
        Err(WriterError::SchemaError(_))
    ));
}

#[test]
fn test_pack_rejects_metadata_for_unknown_record() {
    let mut collection = humpty_dumpty();
    collection.metadata.insert(42, "name", "Nobody");
    match pack(&collection, &WriterConfig::default()) {
        Err(WriterError::MetadataError(errors)) => assert_eq!(errors.0.len(), 1),
        other => panic!("expected metadata error, got {:?}", other.map(|(_, r)| r)),
    }
}

#[test]
fn test_pack_accepts_metadata_keyed_by_id_text() -> Result<(), Box<dyn std::error::Error>> {
    let mut collection = NeuronCollection::new(NeuronKind::Skeleton);
    collection.push(skeleton(12345, 5));
    collection.push(skeleton(67890, 5));
    collection.metadata.insert("12345", "name", "Humpty");
    collection.metadata.insert("67890", "name", "Dumpty");

    let (bytes, _) = pack(&collection, &WriterConfig::default())?;
    let unpacked = unpack(bytes, Some(&[RecordId::Int(12345)]))?;
    assert!(unpacked.metadata_issues.is_empty());
    assert_eq!(
        unpacked.collection.metadata.get(&RecordId::Int(12345), "name"),
        Some(&MetaValue::from("Humpty"))
    );
    assert!(unpacked.collection.metadata.get(&RecordId::Int(67890), "name").is_none());
    Ok(())
}

#[test]
fn test_pack_after_bytes_overwritten_by_text() -> Result<(), Box<dyn std::error::Error>> {
    let mut collection = humpty_dumpty();
    collection.metadata.insert(12345, "blob", vec![1u8, 2, 3]);
    collection.metadata.insert(12345, "blob", "now text");

    let (bytes, _) = pack(&collection, &WriterConfig::default())?;
    let unpacked = unpack(bytes, None)?;
    assert_eq!(
        unpacked.collection.metadata.get(&RecordId::Int(12345), "blob"),
        Some(&MetaValue::from("now text"))
    );
    Ok(())
}

#[test]
fn test_archive_round_trip_with_dangling_synapse() -> Result<(), Box<dyn std::error::Error>> {
    let synapses = vec![synapse(12345, 1), synapse(67890, 2), synapse(999, 3)];
    let collection = with_synapses(humpty_dumpty(), &synapses);

    let (bytes, report) = pack(&collection, &WriterConfig::default())?;
    assert_eq!(&bytes[..4], b"PK\x03\x04");
    assert_eq!(report.format, ContainerKind::Archive);
    assert_eq!(report.secondary_tables, 1);
    assert_eq!(report.dangling.len(), 1);
    assert_eq!(report.dangling[0].record, RecordId::Int(999));
    assert_eq!(report.dangling[0].rows, 1);

    let reader = NeuronReader::from_bytes(bytes.into())?;
    assert_eq!(reader.primary_entry(), Some("neurons.parquet"));
    assert_eq!(reader.secondary_names(), vec!["synapses".to_string()]);

    // Orphan rows are kept as written
    let unpacked = unpack_reader(&reader, None)?;
    let table = unpacked.collection.secondary("synapses").expect("synapses");
    assert_eq!(read_synapses(table)?, synapses);
    Ok(())
}

#[test]
fn test_subset_unpack_filters_secondary_and_metadata() -> Result<(), Box<dyn std::error::Error>> {
    let synapses = vec![synapse(12345, 1), synapse(67890, 2), synapse(12345, 3)];
    let (bytes, _) = pack(&with_synapses(humpty_dumpty(), &synapses), &WriterConfig::default())?;

    let unpacked = unpack(bytes, Some(&[RecordId::Int(12345), RecordId::Int(5)]))?;
    assert_eq!(unpacked.collection.len(), 1);
    assert_eq!(unpacked.missing, vec![RecordId::Int(5)]);
    assert_eq!(unpacked.collection.metadata.len(), 1);
    assert!(unpacked.collection.metadata.get(&RecordId::Int(67890), "name").is_none());

    let kept = read_synapses(unpacked.collection.secondary("synapses").expect("synapses"))?;
    assert_eq!(kept, vec![synapses[0].clone(), synapses[2].clone()]);
    Ok(())
}

#[test]
fn test_forced_archive_without_secondary_tables() -> Result<(), Box<dyn std::error::Error>> {
    let config = WriterConfig {
        container_format: ContainerFormat::Archive,
        primary_table_name: "skeletons".to_string(),
        ..WriterConfig::default()
    };
    let (bytes, report) = pack(&humpty_dumpty(), &config)?;
    assert_eq!(report.format, ContainerKind::Archive);

    let reader = NeuronReader::from_bytes(bytes.into())?;
    assert_eq!(reader.primary_entry(), Some("skeletons.parquet"));
    assert!(reader.secondary_names().is_empty());
    assert_eq!(reader.ids()?.len(), 2);
    Ok(())
}

#[test]
fn test_bare_format_rejects_secondary_tables() {
    let collection = with_synapses(humpty_dumpty(), &[synapse(12345, 1)]);
    let config = WriterConfig {
        container_format: ContainerFormat::Bare,
        ..WriterConfig::default()
    };
    assert!(matches!(pack(&collection, &config), Err(WriterError::InvalidData(_))));
}

#[test]
fn test_secondary_table_name_collisions() {
    let table = synapse_table("synapses", &[synapse(12345, 1)]).expect("table");
    let collection = humpty_dumpty().with_secondary(table.clone()).with_secondary(table);
    assert!(matches!(
        pack(&collection, &WriterConfig::default()),
        Err(WriterError::ArchiveError(ArchiveError::DuplicateTable(_)))
    ));

    let reserved = synapse_table("neurons", &[synapse(12345, 1)]).expect("table");
    assert!(matches!(
        pack(&humpty_dumpty().with_secondary(reserved), &WriterConfig::default()),
        Err(WriterError::ArchiveError(_))
    ));
}

#[test]
fn test_write_container_publishes_atomically() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("collection.zip");
    let collection = with_synapses(humpty_dumpty(), &[synapse(12345, 1)]);

    let report = write_container(&path, &collection, &WriterConfig::default())?;
    assert_eq!(report.stats.file_size_bytes, fs::metadata(&path)?.len());

    let unpacked = read_container(&path, None)?;
    assert_eq!(unpacked.collection.len(), 2);
    assert_eq!(unpacked.collection.secondary.len(), 1);

    let entries: Vec<_> = fs::read_dir(dir.path())?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    assert_eq!(entries, vec!["collection.zip".to_string()]);
    Ok(())
}

#[test]
fn test_write_container_refuses_to_overwrite() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("collection.parquet");
    fs::write(&path, b"precious")?;

    match write_container(&path, &humpty_dumpty(), &WriterConfig::default()) {
        Err(WriterError::AlreadyExists(p)) => assert_eq!(p, path),
        other => panic!("expected AlreadyExists, got {:?}", other),
    }
    assert_eq!(fs::read(&path)?, b"precious");

    let config = WriterConfig {
        overwrite: true,
        ..WriterConfig::default()
    };
    write_container(&path, &humpty_dumpty(), &config)?;
    assert_eq!(&fs::read(&path)?[..4], b"PAR1");
    Ok(())
}

#[test]
fn test_failed_pack_leaves_destination_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("collection.parquet");
    let mut collection = humpty_dumpty();
    collection.metadata.insert(42, "name", "Nobody");

    assert!(write_container(&path, &collection, &WriterConfig::default()).is_err());
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_empty_collection() -> Result<(), Box<dyn std::error::Error>> {
    let (bytes, report) = pack(&NeuronCollection::new(NeuronKind::Skeleton), &WriterConfig::default())?;
    assert_eq!(report.stats.records_written, 0);
    let unpacked = unpack(bytes, None)?;
    assert!(unpacked.collection.is_empty());
    Ok(())
}

fn branching(id: i64, seeds: &[u8]) -> Neuron {
    let nodes = seeds
        .iter()
        .enumerate()
        .map(|(i, &seed)| {
            let node_id = i as i64 + 1;
            let parent = if i == 0 { -1 } else { i64::from(seed) % i as i64 + 1 };
            SkeletonNode::new(node_id, parent, seed as f32, node_id as f32, id as f32).with_radius(0.5)
        })
        .collect();
    Skeleton::new(id, nodes).into()
}

fn assert_subset_matches_full(
    collection: &NeuronCollection,
    config: &WriterConfig,
    keep: &[bool],
) -> Result<(), proptest::test_runner::TestCaseError> {
    use proptest::prelude::*;

    let (bytes, _) = pack(collection, config).expect("pack");
    let full = unpack(bytes.clone(), None).expect("full unpack");
    prop_assert_eq!(full.collection.len(), collection.len());
    for record in &collection.records {
        prop_assert_eq!(full.collection.get(record.id()), Some(record));
    }

    let subset: Vec<RecordId> = collection
        .ids()
        .zip(keep.iter().cycle())
        .filter(|(_, k)| **k)
        .map(|(id, _)| id.clone())
        .collect();
    let partial = unpack(bytes, Some(&subset)).expect("subset unpack");
    prop_assert!(partial.missing.is_empty());
    prop_assert_eq!(partial.collection.len(), subset.len());
    for id in &subset {
        prop_assert_eq!(partial.collection.get(id), full.collection.get(id));
    }
    Ok(())
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_skeleton_subset_matches_full_read(
            records in prop::collection::btree_map(0i64..500, prop::collection::vec(any::<u8>(), 1..8), 1..6),
            keep in prop::collection::vec(any::<bool>(), 1..6),
            row_group_size in 1usize..12,
            sort_by_id in any::<bool>(),
        ) {
            let mut collection = NeuronCollection::new(NeuronKind::Skeleton);
            for (id, seeds) in &records {
                collection.push(branching(*id, seeds));
            }
            let config = WriterConfig { row_group_size, sort_by_id, ..WriterConfig::default() };
            assert_subset_matches_full(&collection, &config, &keep)?;
        }

        #[test]
        fn prop_dotprops_subset_matches_full_read(
            records in prop::collection::btree_map("[a-z]{1,4}", 1usize..5, 1..6),
            keep in prop::collection::vec(any::<bool>(), 1..6),
            row_group_size in 1usize..8,
        ) {
            let mut collection = NeuronCollection::new(NeuronKind::Dotprops);
            for (id, count) in &records {
                let points: Vec<[f32; 3]> = (0..*count).map(|i| [i as f32, 0.5, -1.0]).collect();
                let vectors = vec![[0.0, 0.0, 1.0]; *count];
                collection.push(Dotprops::new(id.as_str(), points).with_vectors(vectors));
            }
            let config = WriterConfig { row_group_size, ..WriterConfig::default() };
            assert_subset_matches_full(&collection, &config, &keep)?;
        }
    }
}
