//! Load lifecycle of a document's diagram, as seen by a rendering surface.
//!
//! `Idle -> Loading -> Ready | Failed`. Selecting another document restarts
//! from `Loading`; results for a document that is no longer loading are
//! rejected rather than silently applied.

use thiserror::Error;

use crate::config::LayoutConfig;
use crate::ir::DocumentStructureResponse;
use crate::layout::{Diagram, compute_layout, placeholder_diagram};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DiagramState {
    #[default]
    Idle,
    Loading {
        document_id: String,
    },
    Ready {
        document_id: String,
        diagram: Diagram,
    },
    Failed {
        document_id: String,
        reason: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("result for `{got}` arrived while loading `{expected}`")]
    StaleResult { expected: String, got: String },
}

impl DiagramState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading { .. } => "loading",
            Self::Ready { .. } => "ready",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn document_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading { document_id }
            | Self::Ready { document_id, .. }
            | Self::Failed { document_id, .. } => Some(document_id),
        }
    }

    /// Starts loading a document. Allowed from every state.
    pub fn begin(&mut self, document_id: &str) {
        *self = Self::Loading {
            document_id: document_id.to_string(),
        };
    }

    /// Finishes a load with the extractor's response, building the diagram.
    pub fn complete(
        &mut self,
        document_id: &str,
        response: &DocumentStructureResponse,
        config: &LayoutConfig,
    ) -> Result<(), StateError> {
        self.expect_loading("complete", document_id)?;
        *self = Self::Ready {
            document_id: document_id.to_string(),
            diagram: compute_layout(response, document_id, config),
        };
        Ok(())
    }

    /// Records an upstream failure for the document being loaded.
    pub fn fail(&mut self, document_id: &str, reason: &str) -> Result<(), StateError> {
        self.expect_loading("fail", document_id)?;
        *self = Self::Failed {
            document_id: document_id.to_string(),
            reason: reason.to_string(),
        };
        Ok(())
    }

    /// Diagram to show for the current state: the built one when ready, the
    /// placeholder when failed, nothing otherwise.
    pub fn diagram(&self) -> Option<Diagram> {
        match self {
            Self::Ready { diagram, .. } => Some(diagram.clone()),
            Self::Failed {
                document_id,
                reason,
            } => Some(placeholder_diagram(document_id, reason)),
            Self::Idle | Self::Loading { .. } => None,
        }
    }

    fn expect_loading(&self, action: &'static str, document_id: &str) -> Result<(), StateError> {
        match self {
            Self::Loading { document_id: expected } if expected == document_id => Ok(()),
            Self::Loading { document_id: expected } => Err(StateError::StaleResult {
                expected: expected.clone(),
                got: document_id.to_string(),
            }),
            other => Err(StateError::InvalidTransition {
                action,
                state: other.name(),
            }),
        }
    }
}
