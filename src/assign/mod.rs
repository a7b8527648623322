//! Select a row, confirm in a modal, patch, refetch.
//!
//! Used for number-to-client and number-to-agent assignment. The modal type
//! only picks the confirmation copy; the mutation is always a PATCH of the
//! number with whichever field the flow targets.

use serde::{Deserialize, Serialize};

use crate::api::{resources, ApiResult, Backend};
use crate::cache::ResourceCache;
use crate::entity::{NumberPatch, PurchasedNumber, Role};
use crate::error::{DeskError, Result};

/// Query value marking a flow opened from the business approval wizard.
pub const BUSINESS_APPROVAL: &str = "business-approval";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalType {
    New,
    Update,
    Delete,
    #[default]
    #[serde(rename = "")]
    None,
}

impl ModalType {
    pub fn title(&self) -> &'static str {
        match self {
            ModalType::New => "Assign number",
            ModalType::Update => "Change assignment",
            ModalType::Delete => "Remove assignment",
            ModalType::None => "",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ModalType::New => "Are you sure you want to assign this number?",
            ModalType::Update => "Are you sure you want to change this number's assignment?",
            ModalType::Delete => "Are you sure you want to remove this number's assignment?",
            ModalType::None => "",
        }
    }

    pub fn confirm_label(&self) -> &'static str {
        match self {
            ModalType::New => "Assign",
            ModalType::Update => "Update",
            ModalType::Delete => "Remove",
            ModalType::None => "",
        }
    }
}

/// `is_open == false` means nothing is waiting for confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalState {
    pub is_open: bool,
    pub selected_entity_id: Option<i64>,
    pub selected_related_id: Option<i64>,
    pub modal_type: ModalType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Idle,
    Selecting,
    Confirming,
    Mutating,
}

/// Field of the number the flow assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignTarget {
    Client,
    Agent,
}

/// Where the flow was opened from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationContext {
    BusinessApproval,
    #[default]
    Standalone,
}

impl NavigationContext {
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(BUSINESS_APPROVAL) => NavigationContext::BusinessApproval,
            _ => NavigationContext::Standalone,
        }
    }

    /// Screen shown after a new assignment.
    pub fn redirect(&self, role: Role) -> String {
        let prefix = role.route_prefix();
        match self {
            NavigationContext::BusinessApproval => {
                format!("/{}/{}?step=assign-agent", prefix, BUSINESS_APPROVAL)
            }
            NavigationContext::Standalone => format!("/{}/purchased-numbers", prefix),
        }
    }
}

/// A confirmed mutation waiting for its response.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAssignment {
    pub number_id: i64,
    pub patch: NumberPatch,
    modal_type: ModalType,
}

#[derive(Debug, Clone)]
pub struct AssignOutcome {
    pub number: PurchasedNumber,
    /// Set only after a new assignment.
    pub redirect: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AssignmentFlow {
    role: Role,
    target: AssignTarget,
    context: NavigationContext,
    modal: ModalState,
    phase: FlowPhase,
}

impl AssignmentFlow {
    pub fn new(role: Role, target: AssignTarget, context: NavigationContext) -> Self {
        Self {
            role,
            target,
            context,
            modal: ModalState::default(),
            phase: FlowPhase::Idle,
        }
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.phase == FlowPhase::Mutating {
            return Err(DeskError::MutationInFlight);
        }
        Ok(())
    }

    /// Pick a number and, unless unassigning, what to assign to it.
    pub fn select(&mut self, number_id: i64, related_id: Option<i64>) -> Result<()> {
        self.ensure_idle()?;
        self.modal.selected_entity_id = Some(number_id);
        self.modal.selected_related_id = related_id;
        self.modal.is_open = false;
        self.modal.modal_type = ModalType::None;
        self.phase = FlowPhase::Selecting;
        Ok(())
    }

    /// Open the confirmation modal for the current selection.
    pub fn open(&mut self, modal_type: ModalType) -> Result<()> {
        self.ensure_idle()?;
        if self.modal.selected_entity_id.is_none() || modal_type == ModalType::None {
            return Err(DeskError::NoSelection);
        }
        if modal_type != ModalType::Delete && self.modal.selected_related_id.is_none() {
            return Err(DeskError::NoSelection);
        }
        self.modal.is_open = true;
        self.modal.modal_type = modal_type;
        self.phase = FlowPhase::Confirming;
        Ok(())
    }

    /// Close the modal and forget the selection.
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.modal = ModalState::default();
        self.phase = FlowPhase::Idle;
        Ok(())
    }

    /// Confirm the open modal. Only one mutation may be pending at a time.
    pub fn begin(&mut self) -> Result<PendingAssignment> {
        self.ensure_idle()?;
        if !self.modal.is_open {
            return Err(DeskError::NoPendingConfirm);
        }
        let number_id = self.modal.selected_entity_id.ok_or(DeskError::NoSelection)?;
        let value = match self.modal.modal_type {
            ModalType::Delete => None,
            _ => Some(self.modal.selected_related_id.ok_or(DeskError::NoSelection)?),
        };
        let patch = match self.target {
            AssignTarget::Client => NumberPatch {
                client: Some(value),
                agent: None,
            },
            AssignTarget::Agent => NumberPatch {
                client: None,
                agent: Some(value),
            },
        };
        self.phase = FlowPhase::Mutating;
        Ok(PendingAssignment {
            number_id,
            patch,
            modal_type: self.modal.modal_type,
        })
    }

    /// Apply the mutation response.
    ///
    /// Success resets the modal and invalidates cached number lists. Failure
    /// returns to the open modal so the user can retry or cancel.
    pub fn complete(
        &mut self,
        pending: PendingAssignment,
        result: ApiResult<PurchasedNumber>,
        cache: &ResourceCache,
    ) -> Result<AssignOutcome> {
        match result {
            Ok(number) => {
                self.modal = ModalState::default();
                self.phase = FlowPhase::Idle;
                cache.invalidate_resource(resources::PURCHASED_NUMBERS);
                tracing::info!(
                    number_id = pending.number_id,
                    modal_type = ?pending.modal_type,
                    "number assignment saved"
                );
                let redirect = match pending.modal_type {
                    ModalType::New => Some(self.context.redirect(self.role)),
                    _ => None,
                };
                Ok(AssignOutcome { number, redirect })
            }
            Err(e) => {
                self.phase = FlowPhase::Confirming;
                tracing::warn!(
                    number_id = pending.number_id,
                    error = %e,
                    error_type = e.error_type(),
                    retryable = e.is_retryable(),
                    "number assignment failed"
                );
                Err(e.into())
            }
        }
    }

    /// Confirm, send the patch and apply the response.
    pub async fn confirm(
        &mut self,
        backend: &dyn Backend,
        cache: &ResourceCache,
    ) -> Result<AssignOutcome> {
        let pending = self.begin()?;
        let result = backend
            .update_purchased_number(pending.number_id, &pending.patch)
            .await;
        self.complete(pending, result, cache)
    }
}
