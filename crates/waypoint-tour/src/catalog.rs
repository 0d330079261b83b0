#![forbid(unsafe_code)]

//! Static step catalog.
//!
//! A catalog is an ordered list of [`Step`]s grouped into contiguous
//! [`Phase`]s, plus the [`ActionTable`] that says which host-reported
//! actions complete which step. It carries no behavior: the controller
//! interprets it.
//!
//! # Invariants
//!
//! 1. Step ids are unique.
//! 2. Phase numbers never decrease in catalog order, so each phase occupies
//!    one contiguous index range.
//! 3. Every phase used by a step has descriptive [`Phase`] metadata.
//! 4. Every action rule names an existing step.
//!
//! # File format
//!
//! ```toml
//! [[phases]]
//! id = 1
//! title = "Create a posting"
//!
//! [[steps]]
//! id = "open-generator"
//! phase = 1
//! page_key = "dashboard"
//! target_key = "sidebar-chat"
//! position = "right"
//! wait_for_click = true
//!
//! [[actions]]
//! step_id = "open-generator"
//! action = "generator-opened"
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::config::ConfigError;

/// Preferred side of the target on which the tooltip is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TooltipSide {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl TooltipSide {
    /// The side across the target from this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// True for `Top`/`Bottom`, where the main placement axis is vertical.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// How a step expects the user to complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// The user clicks the highlighted element.
    #[default]
    Click,
    /// The user types into the highlighted element.
    Input,
    /// The host finishes something on its own and reports it.
    Wait,
    /// The step advances on a timer.
    Auto,
}

/// One unit of tour content bound to a page and a target element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub phase: u32,
    /// View this step expects to be visible.
    pub page_key: String,
    /// Key the host uses to mark the element to highlight.
    pub target_key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position: TooltipSide,
    #[serde(default)]
    pub interaction: InteractionMode,
    /// Advancing requires the highlighted element (or its proxy) to be activated.
    #[serde(default)]
    pub wait_for_click: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_advance_ms: Option<u64>,
    /// Navigation request sent instead of `page_key` when this step is entered from another page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate_action: Option<String>,
    /// Host signal emitted each time the step becomes current.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enter_signal: Option<String>,
}

impl Step {
    pub fn new(
        id: impl Into<String>,
        phase: u32,
        page_key: impl Into<String>,
        target_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            phase,
            page_key: page_key.into(),
            target_key: target_key.into(),
            title: String::new(),
            description: String::new(),
            position: TooltipSide::default(),
            interaction: InteractionMode::default(),
            wait_for_click: false,
            auto_advance_ms: None,
            navigate_action: None,
            enter_signal: None,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn position(mut self, position: TooltipSide) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn interaction(mut self, interaction: InteractionMode) -> Self {
        self.interaction = interaction;
        self
    }

    #[must_use]
    pub fn wait_for_click(mut self, wait: bool) -> Self {
        self.wait_for_click = wait;
        self
    }

    #[must_use]
    pub fn auto_advance_ms(mut self, ms: u64) -> Self {
        self.auto_advance_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn navigate_action(mut self, action: impl Into<String>) -> Self {
        self.navigate_action = Some(action.into());
        self
    }

    #[must_use]
    pub fn enter_signal(mut self, signal: impl Into<String>) -> Self {
        self.enter_signal = Some(signal.into());
        self
    }

    /// Delay after which the step advances by itself, if it does.
    ///
    /// `wait_for_click` wins over any timer. An `auto` step without an
    /// explicit delay uses `default_ms`.
    #[must_use]
    pub fn auto_advance_delay(&self, default_ms: u64) -> Option<Duration> {
        if self.wait_for_click {
            return None;
        }
        match (self.auto_advance_ms, self.interaction) {
            (Some(ms), _) => Some(Duration::from_millis(ms)),
            (None, InteractionMode::Auto) => Some(Duration::from_millis(default_ms)),
            (None, _) => None,
        }
    }

    /// What to hand the host's navigator when entering this step from another page.
    #[must_use]
    pub fn navigation_target(&self) -> &str {
        self.navigate_action.as_deref().unwrap_or(&self.page_key)
    }
}

/// Descriptive metadata shown on the interstitial between phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Phase {
    pub fn new(id: u32, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// "When `step_id` is current and the host reports `action`, advance."
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionRule {
    pub step_id: String,
    pub action: String,
}

impl ActionRule {
    pub fn new(step_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            action: action.into(),
        }
    }
}

/// Lookup table from step id to the actions that complete it.
///
/// Lookups are step-scoped: the same action name may appear under several
/// steps and only ever matches the one that is current.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionTable {
    by_step: HashMap<String, Vec<String>>,
}

impl ActionTable {
    pub fn new(rules: impl IntoIterator<Item = ActionRule>) -> Self {
        let mut by_step: HashMap<String, Vec<String>> = HashMap::new();
        for rule in rules {
            let actions = by_step.entry(rule.step_id).or_default();
            if !actions.contains(&rule.action) {
                actions.push(rule.action);
            }
        }
        Self { by_step }
    }

    /// Whether `action` completes `step_id`.
    #[must_use]
    pub fn matches(&self, step_id: &str, action: &str) -> bool {
        self.by_step
            .get(step_id)
            .is_some_and(|actions| actions.iter().any(|a| a == action))
    }

    #[must_use]
    pub fn actions_for(&self, step_id: &str) -> &[String] {
        self.by_step.get(step_id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn has_rule(&self, step_id: &str) -> bool {
        self.by_step.contains_key(step_id)
    }

    fn step_ids(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.by_step.iter()
    }
}

/// Immutable, validated step catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCatalog {
    phases: Vec<Phase>,
    steps: Vec<Step>,
    actions: ActionTable,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    phases: Vec<Phase>,
    #[serde(default)]
    steps: Vec<Step>,
    #[serde(default)]
    actions: Vec<ActionRule>,
}

impl StepCatalog {
    /// Build and validate a catalog.
    pub fn new(
        phases: Vec<Phase>,
        steps: Vec<Step>,
        actions: impl IntoIterator<Item = ActionRule>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self {
            phases,
            steps,
            actions: ActionTable::new(actions),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml::from_str(s).map_err(ConfigError::Toml)?;
        Self::from_file(file)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = serde_json::from_str(s).map_err(ConfigError::Json)?;
        Self::from_file(file)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    fn from_file(file: CatalogFile) -> Result<Self, ConfigError> {
        Self::new(file.phases, file.steps, file.actions).map_err(ConfigError::Catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.steps.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut phase_ids = HashSet::new();
        for phase in &self.phases {
            if !phase_ids.insert(phase.id) {
                return Err(CatalogError::DuplicatePhase(phase.id));
            }
        }

        let mut step_ids = HashSet::new();
        let mut previous: Option<u32> = None;
        for step in &self.steps {
            if !step_ids.insert(step.id.as_str()) {
                return Err(CatalogError::DuplicateStepId(step.id.clone()));
            }
            if !phase_ids.contains(&step.phase) {
                return Err(CatalogError::UnknownPhase {
                    step_id: step.id.clone(),
                    phase: step.phase,
                });
            }
            match previous {
                Some(prev) if step.phase < prev => {
                    return Err(CatalogError::PhaseOrder {
                        step_id: step.id.clone(),
                        phase: step.phase,
                        previous: prev,
                    });
                }
                _ => {}
            }
            if step.auto_advance_ms == Some(0) {
                return Err(CatalogError::ZeroAutoAdvance(step.id.clone()));
            }
            previous = Some(step.phase);
        }

        let mut unknown: Vec<(&String, &Vec<String>)> = self
            .actions
            .step_ids()
            .filter(|(id, _)| !step_ids.contains(id.as_str()))
            .collect();
        unknown.sort();
        if let Some((step_id, actions)) = unknown.first() {
            return Err(CatalogError::UnknownActionStep {
                step_id: (*step_id).clone(),
                action: actions.first().cloned().unwrap_or_default(),
            });
        }

        Ok(())
    }

    /// Number of steps (never zero).
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    #[must_use]
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    #[must_use]
    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    /// Actions that complete `step_id`.
    #[must_use]
    pub fn actions_for(&self, step_id: &str) -> &[String] {
        self.actions.actions_for(step_id)
    }

    /// Whether `step_id` waits for a host action rather than a plain click.
    #[must_use]
    pub fn has_action_rule(&self, step_id: &str) -> bool {
        self.actions.has_rule(step_id)
    }

    #[must_use]
    pub fn index_of(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    #[must_use]
    pub fn phase(&self, id: u32) -> Option<&Phase> {
        self.phases.iter().find(|p| p.id == id)
    }

    /// Index range occupied by a phase (empty if the phase has no steps).
    #[must_use]
    pub fn phase_range(&self, phase: u32) -> Range<usize> {
        let start = self.steps.iter().position(|s| s.phase == phase);
        match start {
            Some(start) => {
                let len = self.steps[start..]
                    .iter()
                    .take_while(|s| s.phase == phase)
                    .count();
                start..start + len
            }
            None => 0..0,
        }
    }

    /// Distinct phase ids in catalog order.
    #[must_use]
    pub fn phase_order(&self) -> Vec<u32> {
        let mut order: Vec<u32> = self.steps.iter().map(|s| s.phase).collect();
        order.dedup();
        order
    }
}

/// Reasons a catalog is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A tour needs at least one step.
    Empty,
    DuplicateStepId(String),
    DuplicatePhase(u32),
    /// A step belongs to a phase with no metadata.
    UnknownPhase { step_id: String, phase: u32 },
    /// A step's phase is lower than the one before it.
    PhaseOrder {
        step_id: String,
        phase: u32,
        previous: u32,
    },
    /// An action rule refers to a step that does not exist.
    UnknownActionStep { step_id: String, action: String },
    ZeroAutoAdvance(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "catalog has no steps"),
            Self::DuplicateStepId(id) => write!(f, "duplicate step id '{id}'"),
            Self::DuplicatePhase(id) => write!(f, "phase {id} is defined twice"),
            Self::UnknownPhase { step_id, phase } => {
                write!(f, "step '{step_id}' uses undefined phase {phase}")
            }
            Self::PhaseOrder {
                step_id,
                phase,
                previous,
            } => write!(
                f,
                "step '{step_id}' is in phase {phase} but follows phase {previous}"
            ),
            Self::UnknownActionStep { step_id, action } => {
                write!(f, "action '{action}' refers to unknown step '{step_id}'")
            }
            Self::ZeroAutoAdvance(id) => {
                write!(f, "step '{id}' has a zero auto-advance delay")
            }
        }
    }
}

impl std::error::Error for CatalogError {}
