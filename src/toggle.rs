//! Visibility toggling for rendered tooltips.
//!
//! [`TOOLTIP_SCRIPT`] is the browser behavior shipped with annotated pages. The
//! types here model the same contract so it can be exercised without a DOM:
//! a region is initialized once, and activating a label flips the hidden state
//! of the description that immediately follows it.

use crate::render::LABEL_CLASS;
use std::collections::HashSet;
use tracing::debug;

pub const TOOLTIP_SCRIPT: &str = include_str!("../assets/glossary_tooltip.js");

/// Attribute that marks a region for automatic initialization in the browser.
pub const REGION_ATTRIBUTE: &str = "data-glossary-region";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Activation {
    Click,
    Enter,
    Space,
    /// Any other key; ignored.
    OtherKey,
}

impl Activation {
    pub fn toggles(self) -> bool {
        !matches!(self, Activation::OtherKey)
    }
}

/// Label/description pair inside a region.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TooltipState {
    hidden: bool,
}

impl TooltipState {
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Mirrors `aria-expanded` on the label.
    pub fn expanded(&self) -> bool {
        !self.hidden
    }
}

impl Default for TooltipState {
    fn default() -> Self {
        Self { hidden: true }
    }
}

/// A rendered block of annotated markup.
#[derive(Debug, Clone)]
pub struct Region {
    id: String,
    tooltips: Vec<TooltipState>,
}

impl Region {
    pub fn new(id: impl Into<String>, tooltip_count: usize) -> Self {
        Self {
            id: id.into(),
            tooltips: vec![TooltipState::default(); tooltip_count],
        }
    }

    /// One tooltip per label marker found in `markup`, all initially hidden.
    pub fn from_markup(id: impl Into<String>, markup: &str) -> Self {
        let marker = format!(r#"class="{LABEL_CLASS}""#);
        Self::new(id, markup.matches(marker.as_str()).count())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tooltips(&self) -> &[TooltipState] {
        &self.tooltips
    }

    pub fn tooltip(&self, index: usize) -> Option<TooltipState> {
        self.tooltips.get(index).copied()
    }

    fn flip(&mut self, index: usize) -> Option<bool> {
        let state = self.tooltips.get_mut(index)?;
        state.hidden = !state.hidden;
        Some(state.hidden)
    }
}

/// Tracks which regions have been initialized.
#[derive(Debug, Default)]
pub struct TooltipBehavior {
    initialized: HashSet<String>,
}

impl TooltipBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the region was already initialized.
    pub fn attach(&mut self, region: &Region) -> bool {
        let fresh = self.initialized.insert(region.id.clone());
        debug!(region = %region.id, fresh, tooltips = region.tooltips.len(), "attach tooltip behavior");
        fresh
    }

    pub fn is_attached(&self, region_id: &str) -> bool {
        self.initialized.contains(region_id)
    }

    /// Handles an activation of the label at `index`. Returns the new hidden
    /// state, or `None` when nothing is bound or the activation is ignored.
    pub fn activate(
        &self,
        region: &mut Region,
        index: usize,
        activation: Activation,
    ) -> Option<bool> {
        if !activation.toggles() || !self.is_attached(&region.id) {
            return None;
        }
        region.flip(index)
    }
}
