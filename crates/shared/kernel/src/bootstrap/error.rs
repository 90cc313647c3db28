use std::borrow::Cow;

/// Error type returned by configuration units and lifecycle hooks.
///
/// Units may fail with anything; the bootstrap wraps the failure with the unit name.
pub type UnitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias for configuration units and lifecycle hooks.
pub type UnitResult<T = ()> = Result<T, UnitError>;

#[bootkit_derive::bootkit_error]
pub enum BootstrapError {
    #[error("Missing required argument{}: {name}", format_context(.context))]
    MissingArgument { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Configuration unit failed{}: {source}", format_context(.context))]
    Unit { source: UnitError, context: Option<Cow<'static, str>> },

    #[error("Lifecycle hook failed{}: {source}", format_context(.context))]
    Hook { source: UnitError, context: Option<Cow<'static, str>> },

    #[error("{bootstrap} has not produced a mapper yet; call `initialize` first{}", format_context(.context))]
    NotInitialized { bootstrap: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("{bootstrap} has already been initialized{}", format_context(.context))]
    AlreadyInitialized { bootstrap: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal bootstrap error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl BootstrapError {
    pub(crate) fn missing(name: &'static str) -> Self {
        Self::MissingArgument { name: Cow::Borrowed(name), context: None }
    }
}
