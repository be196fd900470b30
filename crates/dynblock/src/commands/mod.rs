//! # Command Layer
//!
//! The operations a host performs on dynamic-block metadata. Each command is a
//! plain function over an [`AttributeStore`](crate::store::AttributeStore):
//! it validates, stages every record it touches in one
//! [`Batch`](crate::store::Batch), commits, and returns a structured
//! [`CmdResult`].
//!
//! Commands never print and never prompt. Messages carry a level and the UI
//! decides how to show them.
//!
//! ## Command Modules
//!
//! - [`parameter`]: create, rename, relabel, describe and delete parameters
//! - [`action`]: create, load, update, enable/disable and delete lookup actions
//! - [`resolve`]: resolve an input through an action's lookup table
//! - [`scan`]: list every parameter or action, skipping unreadable ones

use crate::model::Handle;
use crate::records::{LookupAction, ParameterRecord};
use serde::Serialize;

pub mod action;
pub mod parameter;
pub mod resolve;
pub mod scan;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// Records touched by a command, keyed by their host object.
#[derive(Debug, Default)]
pub struct CmdResult {
    pub parameters: Vec<(Handle, ParameterRecord)>,
    pub actions: Vec<(Handle, LookupAction)>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_parameter(mut self, handle: Handle, record: ParameterRecord) -> Self {
        self.parameters.push((handle, record));
        self
    }

    pub fn with_action(mut self, handle: Handle, action: LookupAction) -> Self {
        self.actions.push((handle, action));
        self
    }
}
