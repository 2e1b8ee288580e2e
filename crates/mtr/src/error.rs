//! Error types for filter registration and markup replacement.

/// Error code reported when filtered markup cannot be rendered.
pub const ERROR_CANNOT_RENDER_MARKUP: u32 = 128_501;

/// Error when registering a filter.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// The filter declared an empty name list.
    #[error("filter {filter} declares no names and is not registered for all")]
    EmptyScope {
        /// Name of the rejected filter.
        filter: String,
    },

    /// The filter declared an empty or blank name.
    #[error("filter {filter} declares a blank name")]
    BlankName {
        /// Name of the rejected filter.
        filter: String,
    },
}

/// Error from [`MarkupReplacer`](crate::MarkupReplacer).
#[derive(Debug, thiserror::Error)]
pub enum ReplaceError {
    /// The filtered markup could not be rendered.
    #[error("cannot render markup (code {code})")]
    Render {
        /// Always [`ERROR_CANNOT_RENDER_MARKUP`].
        code: u32,
        #[source]
        source: mtr_dom::DomError,
    },

    /// Filter registration failed.
    #[error("filter registration failed")]
    Registration(#[from] RegistrationError),
}

impl ReplaceError {
    /// Numeric error code, if the error carries one.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Render { code, .. } => Some(*code),
            Self::Registration(_) => None,
        }
    }
}
