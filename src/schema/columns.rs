//! Column name constants for the primary neuron table
//!
//! These constants ensure consistency between writer and reader implementations.

/// Reserved record identifier column, present in every primary table
pub const NEURON: &str = "neuron";

/// Node identifier, unique within a skeleton
pub const NODE_ID: &str = "node_id";

/// Parent node identifier, `-1` (or null) for roots
pub const PARENT_ID: &str = "parent_id";

/// X coordinate
pub const X: &str = "x";

/// Y coordinate
pub const Y: &str = "y";

/// Z coordinate
pub const Z: &str = "z";

/// Node radius (skeletons, optional)
pub const RADIUS: &str = "radius";

/// Tangent vector X component (dotprops, optional)
pub const VEC_X: &str = "vec_x";

/// Tangent vector Y component (dotprops, optional)
pub const VEC_Y: &str = "vec_y";

/// Tangent vector Z component (dotprops, optional)
pub const VEC_Z: &str = "vec_z";

/// Alpha (linearity) value (dotprops, optional)
pub const ALPHA: &str = "alpha";

use crate::record::NeuronKind;

/// Columns every table of the given kind must carry.
pub fn required_columns(kind: NeuronKind) -> &'static [&'static str] {
    match kind {
        NeuronKind::Skeleton => &[NODE_ID, PARENT_ID, X, Y, Z, NEURON],
        NeuronKind::Dotprops => &[X, Y, Z, NEURON],
    }
}

/// Columns with a defined meaning for the given kind, required or optional.
pub fn known_columns(kind: NeuronKind) -> &'static [&'static str] {
    match kind {
        NeuronKind::Skeleton => &[NODE_ID, PARENT_ID, X, Y, Z, RADIUS, NEURON],
        NeuronKind::Dotprops => &[X, Y, Z, VEC_X, VEC_Y, VEC_Z, ALPHA, NEURON],
    }
}

/// True if `name` may not be used as a pass-through column for `kind`.
pub fn is_reserved_column(kind: NeuronKind, name: &str) -> bool {
    known_columns(kind).contains(&name)
}
