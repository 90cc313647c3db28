use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How a database executor interprets its command text.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ExecutorKind {
    /// Plain SQL text.
    #[default]
    Default,
    /// The command text names a stored procedure.
    StoredProc,
}
