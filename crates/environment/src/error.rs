use crate::descriptor::ExtensionRole;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvironmentError {
    /// Extension classification requested but no host API is bound.
    #[error("context declared as extension {role:?} but no extension host API is present")]
    HostMissing { role: ExtensionRole },
}
