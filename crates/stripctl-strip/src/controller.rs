use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::color::Color;
use crate::error::{Result, StripError};
use crate::section::NewSection;
use crate::sink::PixelSink;
use crate::store::{Recolor, SectionStore};

/// Bounds of a section as reported by [`Controller::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionStatus {
    pub id: String,
    pub is_on: bool,
    /// First-pixel color.
    pub color: Color,
    pub limits: Limits,
}

/// Snapshot of the whole strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripStatus {
    pub strip_length: usize,
    pub is_on: bool,
    pub background: Color,
    /// Ordered by start.
    pub sections: Vec<SectionStatus>,
}

/// Owns the section model and the pixel sink it renders to.
pub struct Controller {
    store: SectionStore,
    background: Color,
    is_on: bool,
    sink: Box<dyn PixelSink + Send>,
}

impl Controller {
    /// Start the sink and create an empty, lit strip with a black background.
    pub fn new(strip_length: usize, mut sink: Box<dyn PixelSink + Send>) -> Result<Self> {
        sink.begin(strip_length)?;
        info!(strip_length, "controller ready");
        Ok(Self {
            store: SectionStore::new(strip_length),
            background: Color::BLACK,
            is_on: true,
            sink,
        })
    }

    pub fn strip_length(&self) -> usize {
        self.store.strip_length()
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn store(&self) -> &SectionStore {
        &self.store
    }

    pub fn new_section(&mut self, start: usize, end: usize, color: Color) -> Result<String> {
        self.store.create(start, end, color)
    }

    /// Add a batch of sections; nothing is added unless all of them fit.
    pub fn new_sections(&mut self, batch: &[NewSection]) -> Result<Vec<String>> {
        self.store.create_many(batch)
    }

    /// Move and/or recolor a section. Without `color` the current
    /// first-pixel color is spread over the new bounds.
    pub fn edit_section(
        &mut self,
        id: &str,
        start: Option<usize>,
        end: Option<usize>,
        color: Option<Color>,
    ) -> Result<()> {
        let recolor = color.map_or(Recolor::Keep, Recolor::Fill);
        self.store.edit(id, start, end, recolor)
    }

    /// Set the background (no id) or fill one section.
    pub fn set_color(&mut self, color: Color, section_id: Option<&str>) -> Result<()> {
        match section_id {
            Some(id) => self.store.fill(id, color),
            None => {
                self.background = color;
                Ok(())
            }
        }
    }

    /// Replace a section's per-pixel colors.
    pub fn set_section_colors(&mut self, id: &str, colors: Vec<Color>) -> Result<()> {
        self.store.set_color(id, colors)
    }

    pub fn remove_sections<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<()> {
        self.store.remove(ids)
    }

    pub fn remove_all_sections(&mut self) {
        self.store.remove_all();
    }

    pub fn turn_on(&mut self, section_id: Option<&str>) -> Result<()> {
        self.switch(section_id, true)
    }

    pub fn turn_off(&mut self, section_id: Option<&str>) -> Result<()> {
        self.switch(section_id, false)
    }

    fn switch(&mut self, section_id: Option<&str>, on: bool) -> Result<()> {
        match section_id {
            Some(id) => self.store.set_on(id, on),
            None if self.is_on == on => Err(if on {
                StripError::AlreadyOn(None)
            } else {
                StripError::AlreadyOff(None)
            }),
            None => {
                self.is_on = on;
                Ok(())
            }
        }
    }

    pub fn status(&self) -> StripStatus {
        StripStatus {
            strip_length: self.store.strip_length(),
            is_on: self.is_on,
            background: self.background,
            sections: self
                .store
                .iter()
                .map(|section| SectionStatus {
                    id: section.id().to_string(),
                    is_on: section.is_on(),
                    color: section.color(),
                    limits: Limits {
                        start: section.start(),
                        end: section.end(),
                    },
                })
                .collect(),
        }
    }

    /// The frame [`render`](Self::render) would push.
    pub fn frame(&self) -> Vec<Color> {
        if self.is_on {
            self.store.render_frame(self.background)
        } else {
            vec![Color::BLACK; self.store.strip_length()]
        }
    }

    /// Apply `change` and render the result.
    ///
    /// If either step fails, the sections, background and on/off state
    /// are restored to what they were before the call.
    pub fn commit<T>(&mut self, change: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let store = self.store.clone();
        let background = self.background;
        let is_on = self.is_on;

        let outcome = change(&mut *self).and_then(|value| self.render().map(|()| value));
        if let Err(err) = &outcome {
            if matches!(err, StripError::Sink(_)) {
                warn!(error = %err, "render failed, change rolled back");
            }
            self.store = store;
            self.background = background;
            self.is_on = is_on;
        }
        outcome
    }

    /// Push the current frame to the sink and show it.
    pub fn render(&mut self) -> Result<()> {
        let frame = self.frame();
        for (index, color) in frame.into_iter().enumerate() {
            self.sink.set_pixel(index, color)?;
        }
        self.sink.show()?;
        debug!(sections = self.store.len(), on = self.is_on, "rendered");
        Ok(())
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("store", &self.store)
            .field("background", &self.background)
            .field("is_on", &self.is_on)
            .finish_non_exhaustive()
    }
}
