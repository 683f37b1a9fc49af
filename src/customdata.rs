//! Per-element custom-data contract.
//!
//! Every element owns one [`Block`]: an ordered sequence of per-layer
//! values whose layout is described by the mesh's [`CustomDataLayout`]
//! for that element kind. The kernel never interprets the values; it
//! only interpolates, copies, and resizes blocks through the layout,
//! honoring each layer's interpolation settings.

use serde::{Deserialize, Serialize};

use crate::math::Vector3;

/// Per-layer behavior flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayerFlags(u8);

impl LayerFlags {
    /// The layer must never be blended; splits and collapses copy the
    /// dominant source value instead (stable original-index trackers
    /// and the like).
    pub const NO_INTERP: LayerFlags = LayerFlags(1);

    /// No flags set.
    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    /// Returns `true` if all flags in `other` are set.
    #[must_use]
    pub fn contains(self, other: LayerFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[must_use]
    pub fn union(self, other: LayerFlags) -> Self {
        Self(self.0 | other.0)
    }
}

/// The value type a layer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    /// A scalar channel.
    Float,
    /// A 3D vector channel (colors, offsets, ...).
    Float3,
    /// An integer channel; never blended, always copied from the
    /// dominant source.
    Int,
}

/// One per-layer record inside an element's block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Scalar value.
    Float(f64),
    /// Vector value.
    Float3(Vector3),
    /// Integer value.
    Int(i64),
}

impl Value {
    /// The zero value for a layer kind.
    #[must_use]
    pub fn zero(kind: LayerKind) -> Self {
        match kind {
            LayerKind::Float => Value::Float(0.0),
            LayerKind::Float3 => Value::Float3(Vector3::zeros()),
            LayerKind::Int => Value::Int(0),
        }
    }

    /// The kind of this value.
    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self {
            Value::Float(_) => LayerKind::Float,
            Value::Float3(_) => LayerKind::Float3,
            Value::Int(_) => LayerKind::Int,
        }
    }
}

/// Describes one custom-data layer of an element kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// Layer name, unique within its element kind.
    pub name: String,
    /// Value type of the layer.
    pub kind: LayerKind,
    /// Per-layer behavior flags.
    pub flags: LayerFlags,
}

impl LayerDescriptor {
    /// Creates a descriptor with no flags set.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            flags: LayerFlags::empty(),
        }
    }

    /// Marks the layer as never-interpolated.
    #[must_use]
    pub fn no_interp(mut self) -> Self {
        self.flags = self.flags.union(LayerFlags::NO_INTERP);
        self
    }
}

/// One element's custom-data records, one [`Value`] per layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    values: Vec<Value>,
}

impl Block {
    /// Number of per-layer records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the block has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value of layer `index`, if present.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Sets the value of layer `index`; out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// Appends a record for a newly added layer.
    pub(crate) fn push_value(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Drops the record of a removed layer.
    pub(crate) fn remove_value(&mut self, index: usize) {
        if index < self.values.len() {
            self.values.remove(index);
        }
    }
}

/// The ordered set of layers one element kind carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomDataLayout {
    layers: Vec<LayerDescriptor>,
}

impl CustomDataLayout {
    /// Creates an empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The layer descriptors, in block order.
    #[must_use]
    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    /// Returns the index of the layer named `name`.
    #[must_use]
    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    /// Appends a layer and returns its index.
    pub fn add_layer(&mut self, descriptor: LayerDescriptor) -> usize {
        self.layers.push(descriptor);
        self.layers.len() - 1
    }

    /// Removes the layer named `name`, returning its old index.
    pub fn remove_layer(&mut self, name: &str) -> Option<usize> {
        let index = self.layer_index(name)?;
        self.layers.remove(index);
        Some(index)
    }

    /// A block of zero values matching this layout.
    #[must_use]
    pub fn default_block(&self) -> Block {
        Block {
            values: self.layers.iter().map(|l| Value::zero(l.kind)).collect(),
        }
    }

    /// Returns `true` if `block` has one record per layer.
    #[must_use]
    pub fn matches(&self, block: &Block) -> bool {
        block.len() == self.layers.len()
    }

    /// Full per-layer duplicate of `src` into `dst`.
    pub fn copy(&self, dst: &mut Block, src: &Block) {
        dst.values.clear();
        dst.values.extend_from_slice(&src.values);
        dst.values.resize(self.layers.len(), Value::Int(0));
        for (i, layer) in self.layers.iter().enumerate() {
            if dst.values[i].kind() != layer.kind {
                dst.values[i] = Value::zero(layer.kind);
            }
        }
    }

    /// Blends `sources` into `dst` with the given weights.
    ///
    /// Weights are expected to sum to one and to pair one-to-one with
    /// the sources. Layers flagged [`LayerFlags::NO_INTERP`] and integer
    /// layers take the value of the dominant (highest-weight) source
    /// instead of blending.
    pub fn interpolate(&self, dst: &mut Block, sources: &[&Block], weights: &[f64]) {
        debug_assert_eq!(sources.len(), weights.len());
        if sources.is_empty() || sources.len() != weights.len() {
            *dst = self.default_block();
            return;
        }
        let dominant = weights
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map_or(0, |(i, _)| i);
        dst.values.clear();
        for (i, layer) in self.layers.iter().enumerate() {
            let pick = sources[dominant]
                .value(i)
                .copied()
                .unwrap_or_else(|| Value::zero(layer.kind));
            if layer.flags.contains(LayerFlags::NO_INTERP) {
                dst.values.push(pick);
                continue;
            }
            let blended = match layer.kind {
                LayerKind::Float => {
                    let mut sum = 0.0;
                    for (src, w) in sources.iter().zip(weights) {
                        if let Some(Value::Float(v)) = src.value(i) {
                            sum += v * w;
                        }
                    }
                    Value::Float(sum)
                }
                LayerKind::Float3 => {
                    let mut sum = Vector3::zeros();
                    for (src, w) in sources.iter().zip(weights) {
                        if let Some(Value::Float3(v)) = src.value(i) {
                            sum += v * *w;
                        }
                    }
                    Value::Float3(sum)
                }
                LayerKind::Int => pick,
            };
            dst.values.push(blended);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scalar_layout() -> CustomDataLayout {
        let mut layout = CustomDataLayout::new();
        layout.add_layer(LayerDescriptor::new("weight", LayerKind::Float));
        layout
    }

    #[test]
    fn default_block_matches_layout() {
        let layout = scalar_layout();
        let block = layout.default_block();
        assert_eq!(block.len(), 1);
        assert!(layout.matches(&block));
        assert_eq!(block.value(0), Some(&Value::Float(0.0)));
    }

    #[test]
    fn interpolate_blends_scalars() {
        let layout = scalar_layout();
        let mut a = layout.default_block();
        a.set(0, Value::Float(10.0));
        let mut b = layout.default_block();
        b.set(0, Value::Float(20.0));

        let mut dst = layout.default_block();
        layout.interpolate(&mut dst, &[&a, &b], &[0.5, 0.5]);
        assert_eq!(dst.value(0), Some(&Value::Float(15.0)));
    }

    #[test]
    fn no_interp_layer_takes_dominant_source() {
        let mut layout = CustomDataLayout::new();
        layout.add_layer(LayerDescriptor::new("orig_index", LayerKind::Float).no_interp());
        let mut a = layout.default_block();
        a.set(0, Value::Float(7.0));
        let mut b = layout.default_block();
        b.set(0, Value::Float(9.0));

        let mut dst = layout.default_block();
        layout.interpolate(&mut dst, &[&a, &b], &[0.25, 0.75]);
        assert_eq!(dst.value(0), Some(&Value::Float(9.0)));
    }

    #[test]
    fn int_layers_never_blend() {
        let mut layout = CustomDataLayout::new();
        layout.add_layer(LayerDescriptor::new("material", LayerKind::Int));
        let mut a = layout.default_block();
        a.set(0, Value::Int(3));
        let mut b = layout.default_block();
        b.set(0, Value::Int(5));

        let mut dst = layout.default_block();
        layout.interpolate(&mut dst, &[&a, &b], &[0.6, 0.4]);
        assert_eq!(dst.value(0), Some(&Value::Int(3)));
    }

    #[test]
    fn copy_resizes_to_the_layout() {
        let mut layout = scalar_layout();
        let src = layout.default_block();
        layout.add_layer(LayerDescriptor::new("extra", LayerKind::Int));
        let mut dst = layout.default_block();
        layout.copy(&mut dst, &src);
        assert_eq!(dst.len(), 2);
        assert_eq!(dst.value(1), Some(&Value::Int(0)));
    }

    #[test]
    fn remove_layer_by_name() {
        let mut layout = scalar_layout();
        layout.add_layer(LayerDescriptor::new("uv", LayerKind::Float3));
        assert_eq!(layout.remove_layer("weight"), Some(0));
        assert_eq!(layout.layer_index("uv"), Some(0));
        assert_eq!(layout.remove_layer("missing"), None);
    }
}
