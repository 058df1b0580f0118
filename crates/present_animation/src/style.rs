//! Visual targets and the style sink
//!
//! The rendering layer is external. The engine only needs two things from it:
//! an identity for each thing it animates ([`VisualTarget`]) and a way to
//! install a transform/opacity description on that thing ([`StyleSink`]).
//!
//! Descriptions are non-cumulative: applying one replaces whatever was
//! previously installed in the same [`StyleSlot`] on the same target. Slots
//! are independent, so a rotation and a pulse on one target do not overwrite
//! each other.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::animation::AnimationKind;
use crate::error::{AnimationError, Result};

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a visual target, unique for the lifetime of the process
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TargetId(u64);

impl TargetId {
    fn next() -> Self {
        TargetId(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct TargetInner {
    id: TargetId,
    label: String,
}

/// Strong handle to a renderable surface owned by the UI layer
///
/// The engine never keeps one of these inside a running animation; it holds a
/// [`WeakTarget`] instead, so dropping the last `VisualTarget` tears down every
/// animation attached to it on the next tick.
#[derive(Clone, Debug)]
pub struct VisualTarget {
    inner: Arc<TargetInner>,
}

impl VisualTarget {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TargetInner {
                id: TargetId::next(),
                label: label.into(),
            }),
        }
    }

    pub fn id(&self) -> TargetId {
        self.inner.id
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn downgrade(&self) -> WeakTarget {
        WeakTarget {
            id: self.inner.id,
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl PartialEq for VisualTarget {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for VisualTarget {}

/// Non-owning reference to a [`VisualTarget`]
#[derive(Clone, Debug)]
pub struct WeakTarget {
    id: TargetId,
    inner: Weak<TargetInner>,
}

impl WeakTarget {
    pub fn id(&self) -> TargetId {
        self.id
    }

    pub fn upgrade(&self) -> Option<VisualTarget> {
        self.inner.upgrade().map(|inner| VisualTarget { inner })
    }

    /// Upgrade or report the target as gone
    pub fn resolve(&self) -> Result<VisualTarget> {
        self.upgrade().ok_or(AnimationError::TargetDropped(self.id))
    }
}

/// A transform/opacity description
///
/// Any subset of fields may be set; unset fields are left alone by the sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct StyleDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_y_px: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl StyleDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rotation(degrees: f64) -> Self {
        Self::new().with_rotation(degrees)
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotate_degrees = Some(degrees);
        self
    }

    pub fn with_translate_y(mut self, px: f64) -> Self {
        self.translate_y_px = Some(px);
        self
    }

    pub fn with_scale(mut self, factor: f64) -> Self {
        self.scale = Some(factor);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }
}

impl fmt::Display for StyleDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(4);
        if let Some(o) = self.opacity {
            parts.push(format!("opacity: {o:.2}"));
        }
        if let Some(y) = self.translate_y_px {
            parts.push(format!("translateY({y:.0}px)"));
        }
        if let Some(deg) = self.rotate_degrees {
            parts.push(format!("rotate({deg:.2}deg)"));
        }
        if let Some(s) = self.scale {
            parts.push(format!("scale({s:.2})"));
        }
        if parts.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

/// Which aspect of a target a description controls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleLayer {
    Rotation,
    OpacityScale,
    Translate,
}

/// A logical slot on a target: one layer, owned by one kind of animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StyleSlot {
    pub source: AnimationKind,
    pub layer: StyleLayer,
}

impl StyleSlot {
    pub const fn new(source: AnimationKind, layer: StyleLayer) -> Self {
        Self { source, layer }
    }
}

/// Stacking priority for a style description; higher wins
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct StylePriority(pub u32);

impl StylePriority {
    /// Priority of ordinary application styles
    pub const APPLICATION: StylePriority = StylePriority(600);

    /// A priority `levels` above this one
    pub const fn above(self, levels: u32) -> Self {
        StylePriority(self.0 + levels)
    }
}

/// Capability to apply a style description to a visual target
///
/// Implemented by the rendering layer. Called with the scheduler lock held,
/// so implementations must not call back into the scheduler.
pub trait StyleSink: Send + Sync {
    /// Install `style` in `slot` on `target`, replacing what that slot held
    fn apply_style(
        &self,
        target: &VisualTarget,
        slot: StyleSlot,
        style: &StyleDescription,
        priority: StylePriority,
    );
}

/// A style currently installed in a [`StyleTable`]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppliedStyle {
    pub target: TargetId,
    pub label: String,
    pub slot: StyleSlot,
    pub priority: StylePriority,
    pub style: StyleDescription,
}

/// In-memory sink that keeps the latest description per (target, slot)
///
/// Stands in for the renderer in the headless driver and in tests.
#[derive(Debug, Default)]
pub struct StyleTable {
    entries: Mutex<FxHashMap<(TargetId, StyleSlot), AppliedStyle>>,
    applied: AtomicU64,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest description in `slot` on `target`
    pub fn get(&self, target: TargetId, slot: StyleSlot) -> Option<StyleDescription> {
        self.lock().get(&(target, slot)).map(|entry| entry.style)
    }

    /// Number of `apply_style` calls received so far
    pub fn apply_count(&self) -> u64 {
        self.applied.load(Ordering::Acquire)
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// All installed styles, ordered by target then slot
    pub fn snapshot(&self) -> Vec<AppliedStyle> {
        let mut entries: Vec<AppliedStyle> = self.lock().values().cloned().collect();
        entries.sort_by_key(|entry| (entry.target, entry.slot));
        entries
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<(TargetId, StyleSlot), AppliedStyle>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StyleSink for StyleTable {
    fn apply_style(
        &self,
        target: &VisualTarget,
        slot: StyleSlot,
        style: &StyleDescription,
        priority: StylePriority,
    ) {
        tracing::trace!("{} [{:?}] <- {}", target.label(), slot.layer, style);
        self.lock().insert(
            (target.id(), slot),
            AppliedStyle {
                target: target.id(),
                label: target.label().to_string(),
                slot,
                priority,
                style: *style,
            },
        );
        self.applied.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATION: StyleSlot = StyleSlot::new(AnimationKind::Rotation, StyleLayer::Rotation);
    const PULSE: StyleSlot = StyleSlot::new(AnimationKind::Pulse, StyleLayer::OpacityScale);

    #[test]
    fn test_target_ids_are_unique() {
        let a = VisualTarget::new("a");
        let b = VisualTarget::new("b");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_weak_target_dies_with_last_strong_handle() {
        let target = VisualTarget::new("star");
        let weak = target.downgrade();
        assert!(weak.upgrade().is_some());

        drop(target);
        assert!(weak.upgrade().is_none());
        assert!(matches!(
            weak.resolve(),
            Err(AnimationError::TargetDropped(id)) if id == weak.id()
        ));
    }

    #[test]
    fn test_style_table_replaces_per_slot() {
        let table = StyleTable::new();
        let target = VisualTarget::new("star");

        table.apply_style(
            &target,
            ROTATION,
            &StyleDescription::rotation(10.0),
            StylePriority::APPLICATION,
        );
        table.apply_style(
            &target,
            ROTATION,
            &StyleDescription::rotation(20.0),
            StylePriority::APPLICATION,
        );

        assert_eq!(table.len(), 1);
        assert_eq!(table.apply_count(), 2);
        assert_eq!(
            table.get(target.id(), ROTATION).and_then(|s| s.rotate_degrees),
            Some(20.0)
        );
    }

    #[test]
    fn test_style_table_slots_are_independent() {
        let table = StyleTable::new();
        let target = VisualTarget::new("star");

        table.apply_style(
            &target,
            ROTATION,
            &StyleDescription::rotation(45.0),
            StylePriority::APPLICATION,
        );
        table.apply_style(
            &target,
            PULSE,
            &StyleDescription::new().with_opacity(0.5).with_scale(1.2),
            StylePriority::APPLICATION,
        );

        let rotation = table.get(target.id(), ROTATION).unwrap();
        let pulse = table.get(target.id(), PULSE).unwrap();
        assert_eq!(rotation.rotate_degrees, Some(45.0));
        assert_eq!(rotation.opacity, None);
        assert_eq!(pulse.opacity, Some(0.5));
        assert_eq!(pulse.scale, Some(1.2));
        assert_eq!(table.snapshot().len(), 2);
    }

    #[test]
    fn test_style_description_display() {
        let style = StyleDescription::new()
            .with_translate_y(-1300.0)
            .with_rotation(179.91);
        assert_eq!(style.to_string(), "translateY(-1300px) rotate(179.91deg)");
        assert_eq!(StyleDescription::new().to_string(), "none");
    }

    #[test]
    fn test_priority_above() {
        assert_eq!(StylePriority::APPLICATION.above(2), StylePriority(602));
    }
}
