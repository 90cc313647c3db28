use std::borrow::Cow;

/// A specialized [`SecretsError`] enum of this crate.
#[bootkit_derive::bootkit_error]
pub enum SecretsError {
    /// A required Vault option is blank.
    #[error("Missing required argument{}: {name}", format_context(.context))]
    MissingArgument { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The secret path holds no data.
    #[error("No secret data found at the specified Vault path{}: {path}", format_context(.context))]
    NoData { path: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Vault answered with a non-success status.
    #[error("Vault request failed{}: {message}", format_context(.context))]
    Vault { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for HTTP transport errors.
    #[error("HTTP error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("Internal secrets error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<SecretsError> for config::ConfigError {
    fn from(err: SecretsError) -> Self {
        Self::Foreign(Box::new(err))
    }
}
