//! User-visible outcomes and the interactive thread's inbox messages.

use std::fmt;
use std::path::PathBuf;

use crate::{AuthorizationState, Capability, ExportError, ExportResult, Rationale};

/// A message for the interactive thread's single-consumer queue.
///
/// Background work never touches the screen; it posts one of these and the
/// interactive thread handles it when it next drains its queue.
#[derive(Debug)]
pub enum UiMessage {
    /// An export attempt finished.
    ExportFinished(ExportResult<PathBuf>),
    /// A permission prompt was answered.
    AuthorizationResolved {
        /// The capability that was requested.
        capability: Capability,
        /// The user's decision.
        state: AuthorizationState,
    },
}

/// A transient message or dialog shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The snapshot was written to this path.
    FileSaved(PathBuf),
    /// Any non-permission failure.
    SomethingWentWrong,
    /// Access to a capability was refused.
    PermissionDenied(Capability),
    /// Explain why access is needed before asking again.
    Rationale(Rationale),
}

impl Notification {
    /// Map an export result to what the user sees.
    ///
    /// Only permission failures are reported specifically; every other
    /// failure becomes [`Notification::SomethingWentWrong`].
    #[must_use]
    pub fn from_export(result: &ExportResult<PathBuf>) -> Self {
        match result {
            Ok(path) => Self::FileSaved(path.clone()),
            Err(ExportError::PermissionDenied(capability)) => Self::PermissionDenied(*capability),
            Err(_) => Self::SomethingWentWrong,
        }
    }

    /// Dialog title, for notifications shown as a dialog.
    #[must_use]
    pub fn title(&self) -> Option<&'static str> {
        match self {
            Self::Rationale(rationale) => Some(rationale.title()),
            _ => None,
        }
    }

    /// Whether this is a dialog rather than a transient toast.
    #[must_use]
    pub fn is_dialog(&self) -> bool {
        matches!(self, Self::Rationale(_))
    }

    /// The text shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::FileSaved(path) => format!("File Saved Successfully: {}", path.display()),
            Self::SomethingWentWrong => "Something Went Wrong".to_string(),
            Self::PermissionDenied(capability) => {
                format!("Permission Denied for Storage {}", capability.label())
            }
            Self::Rationale(rationale) => rationale.message(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
