/// Errors surfaced by the installer and the re-exported checks.
#[derive(Debug, thiserror::Error)]
pub enum GatehouseError {
    #[error("identity client is not configured")]
    NotConfigured,
    #[error("failed to construct identity client")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl GatehouseError {
    pub fn client<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Client(Box::new(error))
    }
}
