use super::*;
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use zip::{CompressionMethod, ZipArchive};

use crate::record::{IdType, RecordId};
use crate::schema::KEY_ID_COLUMN;
use crate::writer::WriterConfig;

fn synapse(neuron: i64, connector: i64, kind: SynapseKind) -> Synapse {
    Synapse {
        neuron: RecordId::Int(neuron),
        connector_id: Some(connector),
        node_id: None,
        kind,
        x: connector as f32,
        y: 0.5,
        z: -1.0,
    }
}

fn annotations(ids: Vec<Option<&str>>) -> SecondaryTable {
    let schema = Arc::new(Schema::new(vec![
        Field::new("skid", DataType::Utf8, true),
        Field::new("label", DataType::Utf8, false),
    ]));
    let labels: Vec<String> = (0..ids.len()).map(|i| format!("label{}", i)).collect();
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids)) as ArrayRef,
            Arc::new(StringArray::from(labels)) as ArrayRef,
        ],
    )
    .expect("batch");
    SecondaryTable::new("annotations", batch).with_id_column("skid")
}

#[test]
fn test_synapse_table_round_trip() {
    let synapses = vec![
        synapse(12345, 1, SynapseKind::Pre),
        Synapse {
            node_id: Some(7),
            connector_id: None,
            ..synapse(67890, 2, SynapseKind::Post)
        },
    ];
    let table = synapse_table("synapses", &synapses).expect("table");
    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.id_type().expect("id type"), IdType::Int);
    assert_eq!(table.entry_name(), "synapses.parquet");
    assert_eq!(read_synapses(&table).expect("read"), synapses);
}

#[test]
fn test_synapse_table_rejects_mixed_id_types() {
    let mut other = synapse(1, 1, SynapseKind::Pre);
    other.neuron = RecordId::from("one");
    let err = synapse_table("synapses", &[synapse(1, 1, SynapseKind::Pre), other]).expect_err("mixed");
    assert!(matches!(err, ArchiveError::InvalidData(_)));
}

#[test]
fn test_find_dangling_counts_rows() {
    let table = synapse_table(
        "synapses",
        &[
            synapse(1, 1, SynapseKind::Pre),
            synapse(99, 2, SynapseKind::Post),
            synapse(99, 3, SynapseKind::Post),
            synapse(2, 4, SynapseKind::Pre),
        ],
    )
    .expect("table");
    let primary: HashSet<RecordId> = [RecordId::Int(1), RecordId::Int(2)].into_iter().collect();

    let dangling = find_dangling(&table, &primary, IdType::Int).expect("dangling");
    assert_eq!(
        dangling,
        vec![DanglingReference {
            table: "synapses".to_string(),
            record: RecordId::Int(99),
            rows: 2,
        }]
    );
    assert!(dangling[0].to_string().contains("missing record 99"));
}

#[test]
fn test_find_dangling_across_id_types() {
    // String keys that spell integers match integer primary ids
    let table = annotations(vec![Some("1"), None, Some("x")]);
    let primary: HashSet<RecordId> = [RecordId::Int(1)].into_iter().collect();
    let dangling = find_dangling(&table, &primary, IdType::Int).expect("dangling");
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].record, RecordId::from("x"));
}

#[test]
fn test_filter_keeps_requested_rows() {
    let table = annotations(vec![Some("a"), Some("b"), None, Some("a")]);
    let keep: HashSet<RecordId> = [RecordId::from("a")].into_iter().collect();
    let filtered = table.filter(&keep).expect("filter");
    assert_eq!(filtered.num_rows(), 2);
    assert_eq!(filtered.id_column(), "skid");
    assert_eq!(
        filtered.ids().expect("ids"),
        vec![Some(RecordId::from("a")), Some(RecordId::from("a"))]
    );
}

#[test]
fn test_missing_id_column() {
    let table = annotations(vec![Some("a")]).with_id_column("neuron");
    assert!(matches!(
        table.id_type(),
        Err(ArchiveError::MissingIdColumn { column, .. }) if column == "neuron"
    ));
}

#[test]
fn test_table_names() {
    let batch = RecordBatch::try_new(
        Arc::new(Schema::new(vec![Field::new("neuron", DataType::Int64, false)])),
        vec![Arc::new(Int64Array::from(vec![1])) as ArrayRef],
    )
    .expect("batch");
    for bad in ["", "neurons", "a/b", "x.parquet", ".hidden"] {
        assert!(
            SecondaryTable::new(bad, batch.clone()).validate_name().is_err(),
            "{:?} should be rejected",
            bad
        );
    }
    assert!(SecondaryTable::new("synapses", batch).validate_name().is_ok());
}

#[test]
fn test_secondary_table_footer() {
    let table = annotations(vec![Some("a")]);
    let buffer = write_secondary_table(Vec::new(), &table, &WriterConfig::default()).expect("write");
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(buffer)).expect("parquet");
    let kv = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .cloned()
        .unwrap_or_default();
    let id_column = kv.iter().find(|e| e.key == KEY_ID_COLUMN).and_then(|e| e.value.clone());
    assert_eq!(id_column.as_deref(), Some("skid"));
}

#[test]
fn test_secondary_table_with_text_coordinate_names() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("neuron", DataType::Int64, false),
        Field::new("x", DataType::Utf8, false),
        Field::new("alpha", DataType::Int64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef,
            Arc::new(StringArray::from(vec!["left", "right"])) as ArrayRef,
            Arc::new(Int64Array::from(vec![10, 20])) as ArrayRef,
        ],
    )
    .expect("batch");
    let table = SecondaryTable::new("sides", batch);

    let buffer = write_secondary_table(Vec::new(), &table, &WriterConfig::default()).expect("write");
    let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(buffer))
        .expect("parquet")
        .build()
        .expect("reader");
    let batches: Vec<RecordBatch> = reader.collect::<Result<_, _>>().expect("batches");
    let x = batches[0]
        .column_by_name("x")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .expect("utf8 x");
    assert_eq!(x.value(1), "right");
}

#[test]
fn test_composer_layout() {
    let table = synapse_table("synapses", &[synapse(1, 1, SynapseKind::Pre)]).expect("table");
    let mut composer = ArchiveComposer::new(Cursor::new(Vec::new()));
    composer.add_primary("neurons.parquet", &b"PAR1 primary PAR1"[..]).expect("primary");
    composer
        .add_secondary_table(&table, &WriterConfig::default())
        .expect("secondary");
    assert!(matches!(
        composer.add_secondary("synapses.parquet", &b""[..]),
        Err(ArchiveError::DuplicateTable(_))
    ));
    let bytes = composer.finish().expect("finish").into_inner();

    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("zip");
    assert_eq!(archive.comment(), b"morphpack:primary=neurons.parquet");
    assert_eq!(archive.len(), 2);
    for name in ["neurons.parquet", "synapses.parquet"] {
        let entry = archive.by_name(name).expect("entry");
        assert_eq!(entry.compression(), CompressionMethod::Stored);
    }
}

#[test]
fn test_composer_requires_primary() {
    let composer = ArchiveComposer::new(Cursor::new(Vec::new()));
    assert!(matches!(composer.finish(), Err(ArchiveError::MissingPrimary)));
}
