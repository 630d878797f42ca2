use std::sync::atomic::{AtomicU64, Ordering};

use crate::color::Color;

static NEXT_SECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique section id (`sec-1`, `sec-2`, ...).
pub(crate) fn next_section_id() -> String {
    format!("sec-{}", NEXT_SECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// A contiguous, inclusive range of pixels with one color per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub(crate) id: String,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) colors: Vec<Color>,
    pub(crate) is_on: bool,
}

impl Section {
    pub(crate) fn new(id: String, start: usize, end: usize, color: Color) -> Self {
        Self {
            id,
            start,
            end,
            colors: vec![color; end - start + 1],
            is_on: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of pixels covered.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false: a section covers at least one pixel.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Color of the first pixel.
    pub fn color(&self) -> Color {
        self.colors[0]
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Whether the closed intervals share a pixel.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start <= end && start <= self.end
    }
}

/// A section to be created as part of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSection {
    pub start: usize,
    pub end: usize,
    pub color: Color,
}

impl NewSection {
    pub fn new(start: usize, end: usize, color: Color) -> Self {
        Self { start, end, color }
    }
}
