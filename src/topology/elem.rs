//! Element identity: ids, kinds, flags, and the trait shared by all
//! four element types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::customdata::Block;

/// Stable integer identifier of a live element.
///
/// Unique across all live elements of any kind within one mesh; freed
/// ids may be recycled when id reuse is enabled, so an id identifies an
/// element only for as long as that element is alive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ElemId(pub u64);

impl fmt::Display for ElemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The four element kinds; immutable for the lifetime of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElemKind {
    /// A point in space carrying its disk of incident edges.
    Vertex,
    /// A two-vertex connection carrying its radial cycle entry.
    Edge,
    /// One face-corner; member of a boundary cycle and a radial cycle.
    Loop,
    /// A polygon bounded by one outer loop cycle and optional holes.
    Face,
}

impl fmt::Display for ElemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElemKind::Vertex => "vertex",
            ElemKind::Edge => "edge",
            ElemKind::Loop => "loop",
            ElemKind::Face => "face",
        };
        f.write_str(name)
    }
}

/// Per-element flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElemFlags(u8);

impl ElemFlags {
    /// The element is selected.
    pub const SELECT: ElemFlags = ElemFlags(1);
    /// The element is hidden from display/tools.
    pub const HIDDEN: ElemFlags = ElemFlags(1 << 1);
    /// Derived data for the element is pending recalculation.
    pub const UPDATE: ElemFlags = ElemFlags(1 << 2);
    /// Internal scratch bit; only set transiently inside an operator.
    pub const TAG: ElemFlags = ElemFlags(1 << 3);
    /// Internal: the slot is tombstoned and awaits compaction.
    pub const TOMB: ElemFlags = ElemFlags(1 << 4);

    /// The bits that survive a save/load round trip.
    pub const PERSIST_MASK: u8 = 0b111;

    /// No flags set.
    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    /// The raw bits.
    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Reconstructs flags from raw bits.
    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns `true` if all bits of `other` are set.
    #[must_use]
    pub fn contains(self, other: ElemFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the bits of `other`.
    pub fn insert(&mut self, other: ElemFlags) {
        self.0 |= other.0;
    }

    /// Clears the bits of `other`.
    pub fn remove(&mut self, other: ElemFlags) {
        self.0 &= !other.0;
    }
}

/// The abstract base shared by vertices, edges, loops, and faces.
///
/// Gives the stores and the serialization adapter uniform access to
/// identity, flags, custom data, and the dense index cache.
pub trait Element {
    /// The kind of this element type.
    const KIND: ElemKind;

    /// The element's id.
    fn id(&self) -> ElemId;

    /// The element's flags.
    fn flags(&self) -> ElemFlags;

    /// Mutable access to the element's flags.
    fn flags_mut(&mut self) -> &mut ElemFlags;

    /// The element's custom-data block.
    fn custom(&self) -> &Block;

    /// Mutable access to the element's custom-data block.
    fn custom_mut(&mut self) -> &mut Block;

    /// The cached dense index; invalidated by compaction.
    fn index(&self) -> usize;

    /// Updates the cached dense index.
    fn set_index(&mut self, index: usize);

    /// Drops every reference the element owns into other elements.
    ///
    /// Called when the slot is freed so a stale key can never be
    /// followed out of a dead element.
    fn clear_links(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_set_and_clear() {
        let mut flags = ElemFlags::empty();
        flags.insert(ElemFlags::SELECT);
        flags.insert(ElemFlags::TAG);
        assert!(flags.contains(ElemFlags::SELECT));
        assert!(flags.contains(ElemFlags::TAG));
        flags.remove(ElemFlags::TAG);
        assert!(!flags.contains(ElemFlags::TAG));
        assert!(flags.contains(ElemFlags::SELECT));
    }

    #[test]
    fn persist_mask_drops_scratch_bits() {
        let mut flags = ElemFlags::empty();
        flags.insert(ElemFlags::SELECT);
        flags.insert(ElemFlags::TOMB);
        flags.insert(ElemFlags::TAG);
        let kept = ElemFlags::from_bits(flags.bits() & ElemFlags::PERSIST_MASK);
        assert!(kept.contains(ElemFlags::SELECT));
        assert!(!kept.contains(ElemFlags::TOMB));
        assert!(!kept.contains(ElemFlags::TAG));
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(ElemKind::Vertex.to_string(), "vertex");
        assert_eq!(ElemKind::Loop.to_string(), "loop");
    }
}
