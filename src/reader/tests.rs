use super::*;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float32Array, Int64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::archive::{synapse_table, ArchiveComposer, Synapse, SynapseKind};
use crate::metadata::{MetaValue, RecordMetadata};
use crate::record::{Dotprops, ExtraColumns, IdType, Neuron, NeuronKind, RecordId, Skeleton, SkeletonNode};
use crate::schema::{validate_records, KEY_KIND};
use crate::writer::{primary_footer, NeuronTableWriter, WriterConfig};

fn chain(id: impl Into<RecordId>, nodes: usize) -> Neuron {
    let nodes = (0..nodes as i64)
        .map(|i| SkeletonNode::new(i + 1, if i == 0 { -1 } else { i }, i as f32, 2.0 * i as f32, 0.5).with_radius(1.5))
        .collect();
    Skeleton::new(id, nodes).into()
}

fn pack_table(records: &[Neuron], config: &WriterConfig, metadata: Option<&RecordMetadata>) -> Bytes {
    let kind = records.first().map(|r| r.kind()).unwrap_or(NeuronKind::Skeleton);
    let layout = validate_records(kind, records).expect("valid records");
    let mut footer = primary_footer(&layout, "neurons", records.len(), false);
    if let Some(metadata) = metadata {
        footer.extend(metadata.to_key_values());
    }
    let mut writer = NeuronTableWriter::new(Vec::new(), layout, config, &footer).expect("writer");
    let refs: Vec<&Neuron> = records.iter().collect();
    writer.write_records(&refs).expect("write");
    let (buffer, _) = writer.finish().expect("finish");
    Bytes::from(buffer)
}

fn raw_table(schema: Schema, columns: Vec<ArrayRef>, kv: Vec<(&str, &str)>) -> Bytes {
    let batch = RecordBatch::try_new(Arc::new(schema), columns).expect("batch");
    let kv = kv
        .into_iter()
        .map(|(k, v)| KeyValue::new(k.to_string(), v.to_string()))
        .collect();
    let props = WriterProperties::builder().set_key_value_metadata(Some(kv)).build();
    let mut writer = ArrowWriter::try_new(Vec::new(), batch.schema(), Some(props)).expect("writer");
    writer.write(&batch).expect("write");
    Bytes::from(writer.into_inner().expect("finish"))
}

#[test]
fn test_read_all_round_trip() -> Result<(), ReaderError> {
    let tagged = Skeleton::new(7, vec![SkeletonNode::root(1, 0.0, 0.0, 0.0), SkeletonNode::new(2, 1, 1.0, 1.0, 1.0)])
        .with_extra(ExtraColumns::new().with(
            "compartment",
            Arc::new(StringArray::from(vec!["soma", "axon"])) as ArrayRef,
        ));
    let records = vec![chain(3, 4), tagged.into(), chain(5, 1)];
    let reader = NeuronReader::from_bytes(pack_table(&records, &WriterConfig::default(), None))?;

    assert_eq!(reader.kind(), NeuronKind::Skeleton);
    assert_eq!(reader.id_type(), IdType::Int);
    assert_eq!(reader.container_kind(), ContainerKind::Bare);
    assert_eq!(reader.metadata().total_rows, 7);
    assert_eq!(reader.metadata().record_count, Some(3));
    assert_eq!(reader.metadata().extra_columns(), vec!["compartment"]);

    // Records without the extra column do not gain an all-null one
    assert_eq!(reader.read_all()?, records);
    Ok(())
}

#[test]
fn test_selective_read_returns_only_requested_rows() -> Result<(), ReaderError> {
    let records = vec![chain(12345, 8), chain(67890, 5)];
    let reader = NeuronReader::from_bytes(pack_table(&records, &WriterConfig::default(), None))?;

    let outcome = reader.read_ids(&[RecordId::Int(67890)])?;
    assert!(outcome.missing.is_empty());
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].row_count(), 5);
    assert_eq!(outcome.records[0], records[1]);

    let graph = outcome.records[0].as_skeleton().expect("skeleton").graph().expect("graph");
    assert_eq!(graph.roots(), &[1]);
    assert_eq!(graph.children(1), &[2]);
    Ok(())
}

#[test]
fn test_read_ids_order_and_missing() -> Result<(), ReaderError> {
    let records: Vec<Neuron> = (1..=4).map(|i| chain(i, 2)).collect();
    let reader = NeuronReader::from_bytes(pack_table(&records, &WriterConfig::default(), None))?;

    let outcome = reader.read_ids(&[
        RecordId::Int(3),
        RecordId::Int(99),
        RecordId::Int(1),
        RecordId::Int(3),
        RecordId::from("not-a-number"),
    ])?;
    let ids: Vec<_> = outcome.records.iter().map(|r| r.id().clone()).collect();
    assert_eq!(ids, vec![RecordId::Int(3), RecordId::Int(1)]);
    assert_eq!(outcome.missing, vec![RecordId::Int(99), RecordId::from("not-a-number")]);

    assert!(reader.read_ids(&[])?.records.is_empty());
    Ok(())
}

#[test]
fn test_get() -> Result<(), ReaderError> {
    let reader = NeuronReader::from_bytes(pack_table(&[chain(1, 3)], &WriterConfig::default(), None))?;
    // Textual ids are coerced to the table's id type
    assert_eq!(reader.get(&RecordId::from("1"))?.row_count(), 3);
    match reader.get(&RecordId::Int(2)) {
        Err(ReaderError::RecordNotFound(ids)) => assert_eq!(ids, vec![RecordId::Int(2)]),
        other => panic!("expected RecordNotFound, got {:?}", other.map(|r| r.id().clone())),
    }
    Ok(())
}

#[test]
fn test_ids_in_table_order() -> Result<(), ReaderError> {
    let records = vec![chain(30, 2), chain(10, 3), chain(20, 1)];
    let reader = NeuronReader::from_bytes(pack_table(&records, &WriterConfig::default(), None))?;
    assert_eq!(
        reader.ids()?,
        vec![RecordId::Int(30), RecordId::Int(10), RecordId::Int(20)]
    );
    Ok(())
}

#[test]
fn test_row_group_pruning() -> Result<(), ReaderError> {
    let records: Vec<Neuron> = (0..10).map(|i| chain(100 + i, 4)).collect();
    let config = WriterConfig {
        row_group_size: 4,
        ..WriterConfig::default()
    };
    let reader = NeuronReader::from_bytes(pack_table(&records, &config, None))?;
    assert_eq!(reader.metadata().num_row_groups, 10);

    let selection = reader.plan_row_groups(&[RecordId::Int(104), RecordId::Int(107)])?;
    assert_eq!(selection.selected, vec![4, 7]);
    assert_eq!(selection.pruned, 8);
    assert_eq!(selection.unpruned, 0);

    let outcome = reader.read_ids(&[RecordId::Int(107)])?;
    assert_eq!(outcome.records, vec![records[7].clone()]);
    Ok(())
}

#[test]
fn test_pruning_falls_back_without_statistics() -> Result<(), ReaderError> {
    let records: Vec<Neuron> = (0..3).map(|i| chain(i, 2)).collect();
    let config = WriterConfig {
        row_group_size: 2,
        write_statistics: false,
        ..WriterConfig::default()
    };
    let reader = NeuronReader::from_bytes(pack_table(&records, &config, None))?;
    let selection = reader.plan_row_groups(&[RecordId::Int(1)])?;
    assert_eq!(selection.selected, vec![0, 1, 2]);
    assert_eq!(selection.unpruned, 3);
    assert_eq!(reader.get(&RecordId::Int(1))?, records[1]);
    Ok(())
}

#[test]
fn test_unsorted_rows_are_regrouped() -> Result<(), ReaderError> {
    // Rows of record 1 are split around record 2
    let schema = Schema::new(vec![
        Field::new("node_id", DataType::Int32, false),
        Field::new("parent_id", DataType::Int32, true),
        Field::new("x", DataType::Float64, false),
        Field::new("y", DataType::Float64, false),
        Field::new("z", DataType::Float64, false),
        Field::new("neuron", DataType::Int64, false),
    ]);
    let bytes = raw_table(
        schema,
        vec![
            Arc::new(arrow::array::Int32Array::from(vec![1, 1, 2])),
            Arc::new(arrow::array::Int32Array::from(vec![None, None, Some(1)])),
            Arc::new(arrow::array::Float64Array::from(vec![0.0, 5.0, 1.0])),
            Arc::new(arrow::array::Float64Array::from(vec![0.0, 5.0, 1.0])),
            Arc::new(arrow::array::Float64Array::from(vec![0.0, 5.0, 1.0])),
            Arc::new(Int64Array::from(vec![1, 2, 1])),
        ],
        vec![],
    );
    let reader = NeuronReader::from_bytes(bytes)?;
    assert_eq!(reader.kind(), NeuronKind::Skeleton);
    let outcome = reader.read_ids(&[RecordId::Int(1)])?;
    let skeleton = outcome.records[0].as_skeleton().expect("skeleton");
    assert_eq!(skeleton.nodes.len(), 2);
    assert!(skeleton.nodes[0].is_root());
    assert_eq!(skeleton.nodes[1].parent_id, Some(1));
    assert_eq!(skeleton.nodes[1].x, 1.0);

    // Adjacency of the filtered record is rebuilt from its own rows
    let graph = skeleton.graph().expect("checked on read");
    assert_eq!(graph.roots(), &[1]);
    assert_eq!(graph.children(1), &[2]);
    assert_eq!(graph.parent(2), Some(1));
    Ok(())
}

#[test]
fn test_cyclic_table_is_corrupt() {
    let schema = Schema::new(vec![
        Field::new("node_id", DataType::Int64, false),
        Field::new("parent_id", DataType::Int64, false),
        Field::new("x", DataType::Float32, false),
        Field::new("y", DataType::Float32, false),
        Field::new("z", DataType::Float32, false),
        Field::new("neuron", DataType::Int64, false),
    ]);
    let coords = || Arc::new(Float32Array::from(vec![0.0, 1.0, 2.0])) as ArrayRef;
    let bytes = raw_table(
        schema,
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3])),
            Arc::new(Int64Array::from(vec![3, 1, 2])),
            coords(),
            coords(),
            coords(),
            Arc::new(Int64Array::from(vec![5, 5, 5])),
        ],
        vec![(KEY_KIND, "skeleton")],
    );
    let reader = NeuronReader::from_bytes(bytes).expect("footer is fine");
    let err = reader.read_all().expect_err("cycle");
    assert!(matches!(err, ReaderError::CorruptTable(msg) if msg.contains("skeleton 5")));
}

#[test]
fn test_unsigned_ids_above_i32_range_are_not_pruned() -> Result<(), ReaderError> {
    let big = 3_000_000_000u32;
    let schema = Schema::new(vec![
        Field::new("x", DataType::Float32, false),
        Field::new("y", DataType::Float32, false),
        Field::new("z", DataType::Float32, false),
        Field::new("neuron", DataType::UInt32, false),
    ]);
    let coords = || Arc::new(Float32Array::from(vec![0.0, 1.0])) as ArrayRef;
    let bytes = raw_table(
        schema,
        vec![coords(), coords(), coords(), Arc::new(UInt32Array::from(vec![big, big]))],
        vec![(KEY_KIND, "dotprops")],
    );
    let reader = NeuronReader::from_bytes(bytes)?;
    let id = RecordId::Int(i64::from(big));

    assert_eq!(reader.row_group_id_ranges()?, vec![Some((id.clone(), id.clone()))]);

    let outcome = reader.read_ids(&[id.clone(), RecordId::Int(7)])?;
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].id(), &id);
    assert_eq!(outcome.records[0].row_count(), 2);
    assert_eq!(outcome.missing, vec![RecordId::Int(7)]);
    Ok(())
}

#[test]
fn test_missing_required_column_is_corrupt() {
    let schema = Schema::new(vec![
        Field::new("x", DataType::Float32, false),
        Field::new("neuron", DataType::Utf8, false),
    ]);
    let bytes = raw_table(
        schema,
        vec![
            Arc::new(Float32Array::from(vec![1.0])),
            Arc::new(StringArray::from(vec!["a"])),
        ],
        vec![(KEY_KIND, "dotprops")],
    );
    match NeuronReader::from_bytes(bytes) {
        Err(ReaderError::CorruptTable(msg)) => {
            assert!(msg.contains("'y'"));
            assert!(msg.contains("'z'"));
        }
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("table without y/z must not open"),
    }
}

#[test]
fn test_unrecognized_bytes() {
    let err = NeuronReader::from_bytes(Bytes::from_static(b"GIF89a...")).err().expect("error");
    assert!(matches!(err, ReaderError::InvalidFormat(_)));
}

#[test]
fn test_dotprops_with_string_ids() -> Result<(), ReaderError> {
    let full = Dotprops::new("a", vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]])
        .with_vectors(vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
        .with_alpha(vec![0.9, 0.8]);
    let bare = Dotprops::new("b", vec![[5.0, 5.0, 5.0]]);
    let records: Vec<Neuron> = vec![full.into(), bare.into()];
    let reader = NeuronReader::from_bytes(pack_table(&records, &WriterConfig::default(), None))?;

    assert_eq!(reader.kind(), NeuronKind::Dotprops);
    assert_eq!(reader.id_type(), IdType::Str);
    assert_eq!(reader.read_all()?, records);
    let outcome = reader.read_ids(&[RecordId::from("b"), RecordId::Int(3)])?;
    assert_eq!(outcome.records, vec![records[1].clone()]);
    assert_eq!(outcome.missing, vec![RecordId::Int(3)]);
    Ok(())
}

#[test]
fn test_record_metadata_from_footer() -> Result<(), ReaderError> {
    let mut metadata = RecordMetadata::new();
    metadata.insert(12345, "name", "Humpty");
    metadata.insert(67890, "name", "Dumpty");
    metadata.insert(42, "name", "Nobody");
    let records = vec![chain(12345, 2), chain(67890, 2)];
    let reader = NeuronReader::from_bytes(pack_table(&records, &WriterConfig::default(), Some(&metadata)))?;

    let known: HashSet<RecordId> = reader.ids()?.into_iter().collect();
    let decoded = reader.record_metadata(Some(&known));
    assert_eq!(
        decoded.metadata.get(&RecordId::Int(12345), "name"),
        Some(&MetaValue::from("Humpty"))
    );
    assert_eq!(
        decoded.metadata.get(&RecordId::Int(67890), "name"),
        Some(&MetaValue::from("Dumpty"))
    );
    // Entries for unknown records are kept and flagged
    assert!(decoded.metadata.get(&RecordId::Int(42), "name").is_some());
    assert_eq!(decoded.issues.len(), 1);
    Ok(())
}

fn archive_bytes(primary: &Bytes) -> Vec<u8> {
    let synapses = synapse_table(
        "synapses",
        &[
            Synapse {
                neuron: RecordId::Int(1),
                connector_id: Some(10),
                node_id: Some(2),
                kind: SynapseKind::Pre,
                x: 1.0,
                y: 2.0,
                z: 3.0,
            },
            Synapse {
                neuron: RecordId::Int(2),
                connector_id: Some(10),
                node_id: Some(1),
                kind: SynapseKind::Post,
                x: 1.0,
                y: 2.0,
                z: 3.0,
            },
        ],
    )
    .expect("synapses");
    let mut composer = ArchiveComposer::new(Cursor::new(Vec::new()));
    composer.add_primary("neurons.parquet", primary.as_ref()).expect("primary");
    composer
        .add_secondary_table(&synapses, &WriterConfig::default())
        .expect("secondary");
    composer.finish().expect("finish").into_inner()
}

#[test]
fn test_archive_in_memory() -> Result<(), ReaderError> {
    let records = vec![chain(1, 3), chain(2, 2)];
    let primary = pack_table(&records, &WriterConfig::default(), None);
    let reader = NeuronReader::from_bytes(Bytes::from(archive_bytes(&primary)))?;

    assert_eq!(reader.container_kind(), ContainerKind::Archive);
    assert_eq!(reader.primary_entry(), Some("neurons.parquet"));
    assert_eq!(reader.secondary_names(), vec!["synapses".to_string()]);
    assert_eq!(reader.read_all()?, records);

    let all = reader.read_secondary("synapses")?;
    assert_eq!(all.num_rows(), 2);
    let keep: HashSet<RecordId> = [RecordId::Int(2)].into_iter().collect();
    let subset = reader.read_secondary_for("synapses", &keep)?;
    assert_eq!(subset.num_rows(), 1);

    assert!(matches!(
        reader.read_secondary("annotations"),
        Err(ReaderError::TableNotFound(_))
    ));
    Ok(())
}

#[test]
fn test_archive_on_disk_without_comment() -> Result<(), ReaderError> {
    let records = vec![chain(9, 4)];
    let primary = pack_table(&records, &WriterConfig::default(), None);

    let temp = tempfile::NamedTempFile::new()?;
    let mut zip = ZipWriter::new(temp.reopen()?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file("neurons.parquet", options)?;
    zip.write_all(&primary)?;
    zip.finish()?;

    let reader = NeuronReader::open(temp.path())?;
    assert_eq!(reader.primary_entry(), Some("neurons.parquet"));
    assert!(reader.secondary_names().is_empty());
    assert_eq!(reader.get(&RecordId::Int(9))?, records[0]);
    Ok(())
}

#[test]
fn test_archive_with_ambiguous_primary() -> Result<(), ReaderError> {
    let primary = pack_table(&[chain(1, 1)], &WriterConfig::default(), None);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for name in ["a.parquet", "b.parquet"] {
        zip.start_file(name, options)?;
        zip.write_all(&primary)?;
    }
    let bytes = zip.finish()?.into_inner();
    assert!(matches!(
        NeuronReader::from_bytes(Bytes::from(bytes)),
        Err(ReaderError::InvalidFormat(_))
    ));
    Ok(())
}

#[test]
fn test_small_batches_keep_records_whole() -> Result<(), ReaderError> {
    let records: Vec<Neuron> = (0..5).map(|i| chain(i, 7)).collect();
    let bytes = pack_table(&records, &WriterConfig::default(), None);
    let reader = NeuronReader::from_bytes_with_config(bytes, ReaderConfig { batch_size: 3 })?;
    assert_eq!(reader.read_all_batches()?.len(), 12);
    assert_eq!(reader.read_all()?, records);
    assert_eq!(reader.read_ids(&[RecordId::Int(2)])?.records, vec![records[2].clone()]);
    Ok(())
}
