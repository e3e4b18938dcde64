use super::domain::LandlordId;

/// Outbound hook invoked after every committed state transition so the
/// read model (aggregate analytics pushed to subscribed sessions) can be
/// recomputed. Calls are fire-and-forget: a failure is logged by the
/// engine and never rolls back the transition.
pub trait ReadModelNotifier: Send + Sync {
    fn notify(&self, owner: &LandlordId) -> Result<(), NotifyError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("read model transport unavailable: {0}")]
    Transport(String),
}

/// Notifier that drops every notification; useful where no read model is
/// attached (CLI one-shots, some tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl ReadModelNotifier for NullNotifier {
    fn notify(&self, _owner: &LandlordId) -> Result<(), NotifyError> {
        Ok(())
    }
}
