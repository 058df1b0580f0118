//! Target animation registry
//!
//! Maps `(target, kind)` to the one instance currently animating that slot.
//! The registry only tracks ownership; tearing down an evicted instance is
//! the scheduler's job, done under the same lock as the eviction.

use rustc_hash::FxHashMap;

use crate::animation::AnimationKind;
use crate::scheduler::AnimationId;
use crate::style::TargetId;

#[derive(Debug, Default)]
pub struct TargetRegistry {
    slots: FxHashMap<(TargetId, AnimationKind), AnimationId>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `id` for `(target, kind)`, returning the instance it displaced
    pub fn attach(
        &mut self,
        target: TargetId,
        kind: AnimationKind,
        id: AnimationId,
    ) -> Option<AnimationId> {
        self.slots.insert((target, kind), id)
    }

    /// Clear `(target, kind)`, returning whatever was installed there
    pub fn detach(&mut self, target: TargetId, kind: AnimationKind) -> Option<AnimationId> {
        self.slots.remove(&(target, kind))
    }

    /// Clear `(target, kind)` only if it still points at `id`
    ///
    /// Used when an instance finishes on its own: by then a replacement may
    /// already own the slot, and it must not be evicted.
    pub fn release(&mut self, target: TargetId, kind: AnimationKind, id: AnimationId) -> bool {
        if self.slots.get(&(target, kind)) == Some(&id) {
            self.slots.remove(&(target, kind));
            true
        } else {
            false
        }
    }

    pub fn get(&self, target: TargetId, kind: AnimationKind) -> Option<AnimationId> {
        self.slots.get(&(target, kind)).copied()
    }

    /// Number of kinds currently animating `target`
    pub fn count_for_target(&self, target: TargetId) -> usize {
        self.slots.keys().filter(|(t, _)| *t == target).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::VisualTarget;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<AnimationId> {
        let mut map: SlotMap<AnimationId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_attach_replaces_same_kind() {
        let mut registry = TargetRegistry::new();
        let target = VisualTarget::new("star").id();
        let ids = ids(2);

        assert_eq!(registry.attach(target, AnimationKind::Rotation, ids[0]), None);
        assert_eq!(
            registry.attach(target, AnimationKind::Rotation, ids[1]),
            Some(ids[0])
        );
        assert_eq!(registry.get(target, AnimationKind::Rotation), Some(ids[1]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut registry = TargetRegistry::new();
        let target = VisualTarget::new("star").id();
        let ids = ids(2);

        registry.attach(target, AnimationKind::Rotation, ids[0]);
        registry.attach(target, AnimationKind::Pulse, ids[1]);
        assert_eq!(registry.count_for_target(target), 2);

        assert_eq!(registry.detach(target, AnimationKind::Rotation), Some(ids[0]));
        assert_eq!(registry.get(target, AnimationKind::Pulse), Some(ids[1]));
        assert_eq!(registry.count_for_target(target), 1);
    }

    #[test]
    fn test_release_ignores_stale_instance() {
        let mut registry = TargetRegistry::new();
        let target = VisualTarget::new("star").id();
        let ids = ids(2);

        registry.attach(target, AnimationKind::Rotation, ids[0]);
        registry.attach(target, AnimationKind::Rotation, ids[1]);

        assert!(!registry.release(target, AnimationKind::Rotation, ids[0]));
        assert_eq!(registry.get(target, AnimationKind::Rotation), Some(ids[1]));

        assert!(registry.release(target, AnimationKind::Rotation, ids[1]));
        assert!(registry.is_empty());
    }
}
