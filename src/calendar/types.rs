use thiserror::Error;

/// Date reçue qui n'est pas au format `YYYY-MM-DD`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid date {input:?}: expected YYYY-MM-DD")]
pub struct InvalidDate {
    pub input: String,
}

impl InvalidDate {
    pub(crate) fn new<S: Into<String>>(input: S) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Politique appliquée quand une date d'entrée est absente ou illisible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFallback {
    /// Remplace silencieusement par la date du jour.
    #[default]
    Today,
    /// Remonte l'erreur `InvalidDate`.
    Strict,
}
