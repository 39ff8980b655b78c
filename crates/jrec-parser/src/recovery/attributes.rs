//! Pending attribute buffer.
//!
//! Modifiers and annotations are seen before the declaration they decorate
//! is known. They wait here until the next child node is created, which
//! takes them over and clears the buffer.

use crate::ast::{Annotation, ModifierFlags};
use jrec_common::Span;
use smallvec::SmallVec;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingAttributes {
    modifiers: ModifierFlags,
    annotations: SmallVec<[Annotation; 2]>,
    /// Offset of the first modifier or annotation seen.
    start: Option<u32>,
}

impl PendingAttributes {
    pub fn new() -> Self {
        PendingAttributes::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    #[inline]
    pub fn modifiers(&self) -> ModifierFlags {
        self.modifiers
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    #[inline]
    pub fn start(&self) -> Option<u32> {
        self.start
    }

    /// Span from the first attribute to the end of the last annotation or
    /// modifier recorded.
    pub fn span(&self) -> Option<Span> {
        let start = self.start?;
        let end = self
            .annotations
            .iter()
            .map(|a| a.span.end)
            .max()
            .unwrap_or(start)
            .max(start);
        Some(Span::new(start, end))
    }

    pub fn add_modifier(&mut self, flag: ModifierFlags, offset: u32) {
        self.modifiers |= flag;
        self.note_start(offset);
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.note_start(annotation.span.start);
        self.annotations.push(annotation);
    }

    fn note_start(&mut self, offset: u32) {
        self.start = Some(self.start.map_or(offset, |s| s.min(offset)));
    }

    /// Move everything from `other` into this buffer, leaving `other` empty.
    pub fn merge_from(&mut self, other: &mut PendingAttributes) {
        let Some(start) = other.start.take() else {
            return;
        };
        self.modifiers |= other.modifiers;
        other.modifiers = ModifierFlags::empty();
        self.annotations.extend(other.annotations.drain(..));
        self.note_start(start);
    }

    /// Attach the buffered attributes to a declaration and clear the buffer.
    /// Buffered annotations precede the ones the declaration already has.
    pub fn flush_into(
        &mut self,
        modifiers: &mut ModifierFlags,
        annotations: &mut Vec<Annotation>,
        span: &mut Span,
    ) {
        let Some(start) = self.start.take() else {
            return;
        };
        *modifiers |= self.modifiers;
        self.modifiers = ModifierFlags::empty();
        if !self.annotations.is_empty() {
            let mut merged: Vec<Annotation> = self.annotations.drain(..).collect();
            merged.append(annotations);
            *annotations = merged;
        }
        span.extend_start(start);
    }

    pub fn clear(&mut self) {
        *self = PendingAttributes::default();
    }
}

#[cfg(test)]
#[path = "tests/attributes_tests.rs"]
mod tests;
