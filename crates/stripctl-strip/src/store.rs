use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::color::Color;
use crate::error::{Result, StripError};
use crate::section::{next_section_id, NewSection, Section};

/// How an edit treats the colors of the resized section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recolor {
    /// Replicate the current first-pixel color over the new length.
    Keep,
    /// Fill the new length with one color.
    Fill(Color),
    /// Exact per-pixel colors; must match the new length.
    Exact(Vec<Color>),
}

/// Non-overlapping sections of a strip, indexed by id and by start pixel.
///
/// `by_start` always holds exactly one entry per section, keyed by its
/// `start`. Because sections never overlap, starts are unique and the
/// index order is also the order of ends.
#[derive(Debug, Clone)]
pub struct SectionStore {
    strip_length: usize,
    sections: HashMap<String, Section>,
    by_start: BTreeMap<usize, String>,
}

impl SectionStore {
    pub fn new(strip_length: usize) -> Self {
        Self {
            strip_length,
            sections: HashMap::new(),
            by_start: BTreeMap::new(),
        }
    }

    pub fn strip_length(&self) -> usize {
        self.strip_length
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Create a section filled with `color`, returning its id.
    pub fn create(&mut self, start: usize, end: usize, color: Color) -> Result<String> {
        self.check_bounds(start, end)?;
        self.check_free(start, end, None)?;
        Ok(self.insert(start, end, color))
    }

    /// Create several sections atomically.
    ///
    /// Every candidate is checked against the strip bounds, against the
    /// other candidates and against existing sections before any is
    /// inserted. Ids are returned in candidate order.
    pub fn create_many(&mut self, candidates: &[NewSection]) -> Result<Vec<String>> {
        for candidate in candidates {
            self.check_bounds(candidate.start, candidate.end)?;
        }

        let spans: Vec<Span> = candidates
            .iter()
            .map(|c| Span {
                start: c.start,
                end: c.end,
            })
            .collect();
        if let Err(later) = sorted_disjoint(&spans) {
            return Err(StripError::Overlap {
                start: later.start,
                end: later.end,
            });
        }

        for candidate in candidates {
            self.check_free(candidate.start, candidate.end, None)?;
        }

        Ok(candidates
            .iter()
            .map(|c| self.insert(c.start, c.end, c.color))
            .collect())
    }

    /// Move and/or recolor a section.
    ///
    /// Omitted bounds keep their current value. The section is left
    /// untouched if any check fails.
    pub fn edit(
        &mut self,
        id: &str,
        start: Option<usize>,
        end: Option<usize>,
        recolor: Recolor,
    ) -> Result<()> {
        let current = self.get(id)?;
        let old_start = current.start;
        let start = start.unwrap_or(current.start);
        let end = end.unwrap_or(current.end);
        let keep = current.color();

        self.check_bounds(start, end)?;
        self.check_free(start, end, Some(id))?;

        let len = end - start + 1;
        let colors = match recolor {
            Recolor::Keep => vec![keep; len],
            Recolor::Fill(color) => vec![color; len],
            Recolor::Exact(colors) if colors.len() == len => colors,
            Recolor::Exact(colors) => {
                return Err(StripError::LengthMismatch {
                    expected: len,
                    actual: colors.len(),
                })
            }
        };

        let section = self.section_mut(id)?;
        section.start = start;
        section.end = end;
        section.colors = colors;

        if start != old_start {
            self.by_start.remove(&old_start);
            self.by_start.insert(start, id.to_string());
        }
        debug!(id, start, end, "section edited");
        Ok(())
    }

    /// Replace a section's per-pixel colors without moving it.
    pub fn set_color(&mut self, id: &str, colors: Vec<Color>) -> Result<()> {
        let section = self.section_mut(id)?;
        if colors.len() != section.len() {
            return Err(StripError::LengthMismatch {
                expected: section.len(),
                actual: colors.len(),
            });
        }
        section.colors = colors;
        Ok(())
    }

    /// Paint every pixel of a section with one color.
    pub fn fill(&mut self, id: &str, color: Color) -> Result<()> {
        let section = self.section_mut(id)?;
        section.colors.fill(color);
        Ok(())
    }

    /// Switch a section on or off.
    pub fn set_on(&mut self, id: &str, on: bool) -> Result<()> {
        let section = self.section_mut(id)?;
        match (section.is_on, on) {
            (true, true) => Err(StripError::AlreadyOn(Some(id.to_string()))),
            (false, false) => Err(StripError::AlreadyOff(Some(id.to_string()))),
            _ => {
                section.is_on = on;
                Ok(())
            }
        }
    }

    /// Remove all listed sections, or none of them if any id is unknown.
    pub fn remove<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<()> {
        let ids: Vec<&str> = ids.iter().map(|id| id.as_ref()).collect();
        if let Some(missing) = ids.iter().find(|id| !self.sections.contains_key(**id)) {
            return Err(StripError::NotFound(missing.to_string()));
        }

        for id in ids {
            if let Some(section) = self.sections.remove(id) {
                self.by_start.remove(&section.start);
            }
        }
        debug!(remaining = self.sections.len(), "sections removed");
        Ok(())
    }

    pub fn remove_all(&mut self) {
        self.sections.clear();
        self.by_start.clear();
    }

    pub fn get(&self, id: &str) -> Result<&Section> {
        self.sections
            .get(id)
            .ok_or_else(|| StripError::NotFound(id.to_string()))
    }

    /// Sections in ascending `start` order.
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.by_start
            .values()
            .filter_map(|id| self.sections.get(id))
    }

    /// Sections in ascending `start` order.
    pub fn list(&self) -> Vec<&Section> {
        self.iter().collect()
    }

    /// Colors for every pixel of the strip.
    ///
    /// Gaps and sections that are off show `background`.
    pub fn render_frame(&self, background: Color) -> Vec<Color> {
        let mut frame = vec![background; self.strip_length];
        for section in self.iter().filter(|s| s.is_on) {
            frame[section.start..=section.end].copy_from_slice(&section.colors);
        }
        frame
    }

    fn insert(&mut self, start: usize, end: usize, color: Color) -> String {
        let id = next_section_id();
        self.by_start.insert(start, id.clone());
        self.sections
            .insert(id.clone(), Section::new(id.clone(), start, end, color));
        debug!(id = %id, start, end, "section created");
        id
    }

    fn section_mut(&mut self, id: &str) -> Result<&mut Section> {
        self.sections
            .get_mut(id)
            .ok_or_else(|| StripError::NotFound(id.to_string()))
    }

    fn check_bounds(&self, start: usize, end: usize) -> Result<()> {
        if start > end || end >= self.strip_length {
            return Err(StripError::InvalidRange {
                start,
                end,
                strip_length: self.strip_length,
            });
        }
        Ok(())
    }

    // The nearest section starting at or before `end` is the only one that
    // can reach into [start, end]: any earlier section ends before it starts.
    fn check_free(&self, start: usize, end: usize, exclude: Option<&str>) -> Result<()> {
        let nearest = self
            .by_start
            .range(..=end)
            .rev()
            .find(|(_, id)| Some(id.as_str()) != exclude)
            .and_then(|(_, id)| self.sections.get(id));

        match nearest {
            Some(section) if section.end >= start => Err(StripError::Overlap { start, end }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
}

impl Span {
    fn overlaps(self, other: Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Sort spans by start while proving them pairwise disjoint.
///
/// Each half is sorted and checked recursively; while merging, the span
/// taken next only has to be compared with the head of the other half.
/// On failure returns the span that overlaps an earlier one.
fn sorted_disjoint(spans: &[Span]) -> std::result::Result<Vec<Span>, Span> {
    if spans.len() <= 1 {
        return Ok(spans.to_vec());
    }
    let mid = spans.len() / 2;
    let left = sorted_disjoint(&spans[..mid])?;
    let right = sorted_disjoint(&spans[mid..])?;

    let mut merged = Vec::with_capacity(spans.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if left[i].overlaps(right[j]) {
            return Err(right[j]);
        }
        if left[i].start < right[j].start {
            merged.push(left[i]);
            i += 1;
        } else {
            merged.push(right[j]);
            j += 1;
        }
    }
    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    Ok(merged)
}
