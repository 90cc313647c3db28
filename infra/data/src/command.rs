use crate::params::Parameters;
use bootkit_domain::ExecutorKind;
use std::borrow::Cow;

/// Text, parameters and interpretation of a single database call.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub text: Cow<'static, str>,
    pub params: Parameters,
    pub kind: ExecutorKind,
}

impl Command {
    pub fn new(text: impl Into<Cow<'static, str>>, params: Parameters, kind: ExecutorKind) -> Self {
        Self { text: text.into(), params, kind }
    }
}
