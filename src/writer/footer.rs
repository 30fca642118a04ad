use chrono::Utc;

use crate::record::IdType;
use crate::schema::{
    columns, TableLayout, FORMAT_VERSION, KEY_CREATED, KEY_FORMAT_VERSION, KEY_ID_COLUMN,
    KEY_ID_TYPE, KEY_KIND, KEY_RECORD_COUNT, KEY_SORTED_BY_ID, KEY_TABLE_NAME, KEY_TABLE_ROLE,
    KEY_WRITER, ROLE_PRIMARY, ROLE_SECONDARY,
};

fn common_keys(role: &str, table_name: &str, id_type: IdType, id_column: &str) -> Vec<(String, String)> {
    vec![
        (KEY_FORMAT_VERSION.to_string(), FORMAT_VERSION.to_string()),
        (KEY_TABLE_ROLE.to_string(), role.to_string()),
        (KEY_TABLE_NAME.to_string(), table_name.to_string()),
        (KEY_ID_TYPE.to_string(), id_type.as_str().to_string()),
        (KEY_ID_COLUMN.to_string(), id_column.to_string()),
        (KEY_CREATED.to_string(), Utc::now().to_rfc3339()),
        (
            KEY_WRITER.to_string(),
            format!("morphpack v{}", env!("CARGO_PKG_VERSION")),
        ),
    ]
}

/// Format keys for a primary table footer
pub(crate) fn primary_footer(
    layout: &TableLayout,
    table_name: &str,
    record_count: usize,
    sorted_by_id: bool,
) -> Vec<(String, String)> {
    let mut kv = common_keys(ROLE_PRIMARY, table_name, layout.id_type, columns::NEURON);
    kv.push((KEY_KIND.to_string(), layout.kind.as_str().to_string()));
    kv.push((KEY_RECORD_COUNT.to_string(), record_count.to_string()));
    kv.push((KEY_SORTED_BY_ID.to_string(), sorted_by_id.to_string()));
    kv
}

/// Format keys for a secondary table footer
pub(crate) fn secondary_footer(table_name: &str, id_column: &str, id_type: IdType) -> Vec<(String, String)> {
    common_keys(ROLE_SECONDARY, table_name, id_type, id_column)
}
