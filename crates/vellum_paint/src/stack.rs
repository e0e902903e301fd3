//! Transform and clip/layer stacks
//!
//! Both stacks are balance-checked: popping an empty stack, or popping a clip
//! when a layer is on top (and vice versa), is an error rather than a silent
//! no-op.

use vellum_core::{Affine2D, Rect};

use crate::error::{StackImbalanceError, StackKind};
use crate::resource::ResourceId;

/// Current transform plus the saved transforms beneath it
#[derive(Clone, Debug, Default)]
pub struct TransformStack {
    current: Affine2D,
    saved: Vec<Affine2D>,
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Affine2D {
        self.current
    }

    pub fn set(&mut self, transform: Affine2D) {
        self.current = transform;
    }

    /// Compose an elementary transform onto the current one.
    ///
    /// The elementary transform applies first, in local coordinates.
    pub fn compose(&mut self, elementary: &Affine2D) {
        self.current = self.current.then(elementary);
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the most recently saved transform.
    pub fn pop(&mut self) -> Result<Affine2D, StackImbalanceError> {
        let restored = self
            .saved
            .pop()
            .ok_or(StackImbalanceError::TransformUnderflow)?;
        self.current = restored;
        Ok(restored)
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Back to identity with nothing saved
    pub fn reset(&mut self) {
        self.current = Affine2D::IDENTITY;
        self.saved.clear();
    }
}

/// A layer on the clip/layer stack and the resources it draws with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PushedLayer {
    pub layer: ResourceId,
    pub mask: Option<ResourceId>,
    pub opacity_brush: Option<ResourceId>,
}

impl PushedLayer {
    pub fn new(layer: ResourceId) -> Self {
        Self {
            layer,
            mask: None,
            opacity_brush: None,
        }
    }

    /// Every resource that must stay alive until the layer is popped
    pub fn resources(&self) -> impl Iterator<Item = ResourceId> {
        std::iter::once(self.layer)
            .chain(self.mask)
            .chain(self.opacity_brush)
    }
}

/// An entry on the clip/layer stack
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipEntry {
    Clip(Rect),
    Layer(PushedLayer),
}

impl ClipEntry {
    pub fn kind(&self) -> StackKind {
        match self {
            ClipEntry::Clip(_) => StackKind::Clip,
            ClipEntry::Layer(_) => StackKind::Layer,
        }
    }
}

/// Interleaved axis-aligned clips and layers, popped in LIFO order
#[derive(Clone, Debug, Default)]
pub struct ClipStack {
    entries: Vec<ClipEntry>,
}

impl ClipStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_clip(&mut self, rect: Rect) {
        self.entries.push(ClipEntry::Clip(rect));
    }

    pub fn push_layer(&mut self, layer: PushedLayer) {
        self.entries.push(ClipEntry::Layer(layer));
    }

    pub fn pop_clip(&mut self) -> Result<Rect, StackImbalanceError> {
        match self.entries.last() {
            None => Err(StackImbalanceError::ClipUnderflow),
            Some(ClipEntry::Layer(_)) => Err(StackImbalanceError::Mismatch {
                expected: StackKind::Clip,
                found: StackKind::Layer,
            }),
            Some(&ClipEntry::Clip(rect)) => {
                self.entries.pop();
                Ok(rect)
            }
        }
    }

    /// The innermost entry, if it is a layer
    pub fn top_layer(&self) -> Result<PushedLayer, StackImbalanceError> {
        match self.entries.last() {
            None => Err(StackImbalanceError::LayerUnderflow),
            Some(ClipEntry::Clip(_)) => Err(StackImbalanceError::Mismatch {
                expected: StackKind::Layer,
                found: StackKind::Clip,
            }),
            Some(&ClipEntry::Layer(layer)) => Ok(layer),
        }
    }

    pub fn pop_layer(&mut self) -> Result<PushedLayer, StackImbalanceError> {
        let layer = self.top_layer()?;
        self.entries.pop();
        Ok(layer)
    }

    pub fn top(&self) -> Option<&ClipEntry> {
        self.entries.last()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn clip_depth(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, ClipEntry::Clip(_)))
            .count()
    }

    pub fn layer_depth(&self) -> usize {
        self.entries.len() - self.clip_depth()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry, innermost first
    pub fn drain(&mut self) -> impl Iterator<Item = ClipEntry> + '_ {
        self.entries.drain(..).rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use vellum_core::Point;

    fn pushed_layer() -> PushedLayer {
        let mut ids: SlotMap<ResourceId, ()> = SlotMap::with_key();
        PushedLayer::new(ids.insert(()))
    }

    #[test]
    fn test_transform_push_pop_restores() {
        let mut stack = TransformStack::new();
        stack.compose(&Affine2D::translation(10.0, 0.0));
        let before = stack.current();

        stack.push();
        stack.compose(&Affine2D::scale(2.0, 2.0));
        stack.compose(&Affine2D::rotation(30.0));
        assert_ne!(stack.current(), before);

        assert_eq!(stack.pop().unwrap(), before);
        assert_eq!(stack.current(), before);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_transform_underflow() {
        let mut stack = TransformStack::new();
        assert_eq!(stack.pop(), Err(StackImbalanceError::TransformUnderflow));
    }

    #[test]
    fn test_compose_applies_elementary_first() {
        let mut stack = TransformStack::new();
        stack.compose(&Affine2D::translation(10.0, 0.0));
        stack.compose(&Affine2D::scale(2.0, 2.0));

        // Scale in local space, then translate
        let p = stack.current().transform_point(Point::new(1.0, 1.0));
        assert!((p.x - 12.0).abs() < 1e-5);
        assert!((p.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_clip_layer_interleaving() {
        let mut stack = ClipStack::new();
        let layer = pushed_layer();

        stack.push_clip(Rect::new(0.0, 0.0, 10.0, 10.0));
        stack.push_layer(layer);

        assert_eq!(
            stack.pop_clip(),
            Err(StackImbalanceError::Mismatch {
                expected: StackKind::Clip,
                found: StackKind::Layer,
            })
        );
        assert_eq!(stack.top_layer(), Ok(layer));
        assert_eq!(stack.pop_layer(), Ok(layer));
        assert!(stack.pop_clip().is_ok());
        assert_eq!(stack.pop_clip(), Err(StackImbalanceError::ClipUnderflow));
        assert_eq!(stack.pop_layer(), Err(StackImbalanceError::LayerUnderflow));
    }

    #[test]
    fn test_drain_innermost_first() {
        let mut stack = ClipStack::new();
        let layer = pushed_layer();
        stack.push_layer(layer);
        stack.push_clip(Rect::ZERO);

        assert_eq!(stack.clip_depth(), 1);
        assert_eq!(stack.layer_depth(), 1);

        let drained: Vec<_> = stack.drain().collect();
        assert_eq!(drained, vec![ClipEntry::Clip(Rect::ZERO), ClipEntry::Layer(layer)]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pushed_layer_lists_its_resources() {
        let mut ids: SlotMap<ResourceId, ()> = SlotMap::with_key();
        let (layer, mask, brush) = (ids.insert(()), ids.insert(()), ids.insert(()));

        let bare = PushedLayer::new(layer);
        assert_eq!(bare.resources().collect::<Vec<_>>(), vec![layer]);

        let full = PushedLayer {
            layer,
            mask: Some(mask),
            opacity_brush: Some(brush),
        };
        assert_eq!(full.resources().collect::<Vec<_>>(), vec![layer, mask, brush]);
    }
}
