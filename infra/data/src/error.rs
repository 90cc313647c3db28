use std::borrow::Cow;

/// A specialized [`DataError`] enum of this crate.
#[bootkit_derive::bootkit_error]
pub enum DataError {
    /// A required builder value was not supplied.
    #[error("Missing required argument{}: {name}", format_context(.context))]
    MissingArgument { name: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Invalid or incomplete database configuration.
    #[error("Database configuration error{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Opening or closing a connection failed.
    #[error("Database connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The driver rejected or failed a command.
    #[error("Database command failed{}: {message}", format_context(.context))]
    Command { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The caller cancelled the operation.
    #[error("Database operation cancelled{}", format_context(.context))]
    Cancelled { context: Option<Cow<'static, str>> },

    /// A split column was not found in the result set.
    #[error("Split mapping failed{}: {message}", format_context(.context))]
    Split { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A row did not fit the requested shape.
    #[error("Row deserialization failed{}: {source}", format_context(.context))]
    Deserialize { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// The connection does not support the requested executor kind.
    #[error("Unsupported operation{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Settings error{}: {source}", format_context(.context))]
    Settings { source: bootkit_kernel::SettingsError, context: Option<Cow<'static, str>> },

    #[error("Service container error{}: {source}", format_context(.context))]
    Container {
        source: bootkit_kernel::container::ContainerError,
        context: Option<Cow<'static, str>>,
    },

    /// A wrapper for underlying `sqlx` driver errors.
    #[cfg(feature = "sqlite")]
    #[error("SQLx error{}: {source}", format_context(.context))]
    Sqlx { source: sqlx::Error, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal database error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
