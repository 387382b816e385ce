//! Enveloppes JSON du backend MiniStore.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `errors` arrive soit en chaîne unique, soit en liste.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorList {
    One(String),
    Many(Vec<String>),
}

impl Default for ErrorList {
    fn default() -> Self {
        ErrorList::Many(Vec::new())
    }
}

impl ErrorList {
    pub fn messages(&self) -> Vec<&str> {
        match self {
            ErrorList::One(msg) if msg.is_empty() => Vec::new(),
            ErrorList::One(msg) => vec![msg.as_str()],
            ErrorList::Many(list) => list.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("server responded with status {status}: {}", .messages.join("; "))]
pub struct ApiError {
    pub status: u16,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub content: Option<T>,
    #[serde(default)]
    pub errors: ErrorList,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default = "ok_status")]
    pub status: u16,
}

fn ok_status() -> u16 {
    200
}

impl<T> DataResponse<T> {
    /// Contenu si la réponse ne porte aucune erreur.
    pub fn into_result(self) -> Result<T, ApiError> {
        let failed = !self.errors.is_empty() || self.status >= 400;
        match self.content {
            Some(content) if !failed => Ok(content),
            _ => Err(ApiError {
                status: self.status,
                messages: self
                    .errors
                    .messages()
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub last: bool,
    pub first: bool,
    pub empty: bool,
    pub total_elements: u64,
    pub total_pages: u32,
    pub size: u32,
    pub number: u32,
    pub number_of_elements: u32,
}
