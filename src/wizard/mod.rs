//! Agent creation wizard.
//!
//! Create flow: `AgentType → VoiceSelect → Language → Prompt`.
//! Edit flow drops `AgentType` since the type cannot change once saved.
//! Every step is its own route; [`WizardRoute`] carries the context a step
//! needs so it can be opened from the URL alone.

mod route;
mod submit;

pub use route::{agents_list_route, WizardRoute};
pub use submit::{load_catalog, load_clients, resolve_llm_model, submit, SubmitOutcome};

use std::fmt;

use crate::entity::{AgentId, Role};
use crate::error::{DeskError, Result};

/// Whether the wizard creates a new agent or edits a saved one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Edit(AgentId),
}

impl Mode {
    pub fn agent_id(&self) -> Option<AgentId> {
        match self {
            Mode::Create => None,
            Mode::Edit(id) => Some(*id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    AgentType,
    VoiceSelect,
    Language,
    Prompt,
}

const CREATE_STEPS: &[Step] = &[Step::AgentType, Step::VoiceSelect, Step::Language, Step::Prompt];
const EDIT_STEPS: &[Step] = &[Step::VoiceSelect, Step::Language, Step::Prompt];

/// Steps of a flow, in order.
pub fn steps(mode: &Mode) -> &'static [Step] {
    match mode {
        Mode::Create => CREATE_STEPS,
        Mode::Edit(_) => EDIT_STEPS,
    }
}

impl Step {
    pub fn slug(&self) -> &'static str {
        match self {
            Step::AgentType => "add-agent",
            Step::VoiceSelect => "add-agent-voice",
            Step::Language => "add-agent-language",
            Step::Prompt => "add-prompt-agent",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "add-agent" => Some(Step::AgentType),
            "add-agent-voice" => Some(Step::VoiceSelect),
            "add-agent-language" => Some(Step::Language),
            "add-prompt-agent" => Some(Step::Prompt),
            _ => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::AgentType => "Agent type",
            Step::VoiceSelect => "Voice",
            Step::Language => "Language",
            Step::Prompt => "Prompt",
        };
        write!(f, "{}", name)
    }
}

/// Sequencer over the steps of one flow.
#[derive(Debug, Clone)]
pub struct WizardController {
    role: Role,
    mode: Mode,
    current: Step,
    is_inbound: Option<bool>,
    prompts_title: Option<String>,
}

impl WizardController {
    /// Start at the first step of the flow.
    pub fn new(role: Role, mode: Mode) -> Self {
        Self {
            role,
            mode,
            current: steps(&mode)[0],
            is_inbound: None,
            prompts_title: None,
        }
    }

    /// Rebuild the controller from a step route.
    pub fn resume(route: &WizardRoute) -> Result<Self> {
        let mode = match route.agent_id {
            Some(id) => Mode::Edit(id),
            None => Mode::Create,
        };
        if !steps(&mode).contains(&route.step) {
            return Err(DeskError::InvalidRoute(route.to_url()));
        }
        Ok(Self {
            role: route.role,
            mode,
            current: route.step,
            is_inbound: route.is_inbound,
            prompts_title: route.prompts_title.clone(),
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn current(&self) -> Step {
        self.current
    }

    /// Zero-based position of the current step.
    pub fn step_index(&self) -> usize {
        steps(&self.mode)
            .iter()
            .position(|s| *s == self.current)
            .unwrap_or(0)
    }

    pub fn step_count(&self) -> usize {
        steps(&self.mode).len()
    }

    pub fn is_last(&self) -> bool {
        self.step_index() + 1 == self.step_count()
    }

    pub fn is_inbound(&self) -> Option<bool> {
        self.is_inbound
    }

    pub fn set_is_inbound(&mut self, is_inbound: bool) {
        self.is_inbound = Some(is_inbound);
    }

    pub fn prompts_title(&self) -> Option<&str> {
        self.prompts_title.as_deref()
    }

    pub fn set_prompts_title(&mut self, title: Option<String>) {
        self.prompts_title = title.filter(|t| !t.trim().is_empty());
    }

    fn route_for(&self, step: Step) -> WizardRoute {
        WizardRoute {
            role: self.role,
            step,
            agent_id: self.mode.agent_id(),
            is_inbound: self.is_inbound,
            prompts_title: self.prompts_title.clone(),
        }
    }

    /// Route of the current step.
    pub fn route(&self) -> WizardRoute {
        self.route_for(self.current)
    }

    /// Route of the following step, `None` on the last one.
    pub fn next_route(&self) -> Option<WizardRoute> {
        steps(&self.mode)
            .get(self.step_index() + 1)
            .map(|step| self.route_for(*step))
    }

    /// Move to the following step.
    pub fn advance(&mut self) -> Result<WizardRoute> {
        let next = self.next_route().ok_or(DeskError::NoNextStep)?;
        self.current = next.step;
        Ok(next)
    }

    /// Where a successful submission lands.
    pub fn finish_route(&self) -> String {
        agents_list_route(self.role)
    }
}
