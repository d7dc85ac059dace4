//! Render-ready view state handed to the presentation layer.

use serde::Serialize;

use crate::domain::types::TempId;
use crate::repository::errors::ApiError;

/// Lifecycle of a view's data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Fetching the list failed; the view offers a retry.
    LoadFailed,
    /// A write was rejected or could not be sent.
    MutationFailed,
    Success,
}

/// Toast-style message for the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn load_failed(error: &ApiError) -> Self {
        Self {
            kind: NoticeKind::LoadFailed,
            message: format!("Could not load data: {error}"),
        }
    }

    pub fn mutation_failed(action: &str, error: &ApiError) -> Self {
        Self {
            kind: NoticeKind::MutationFailed,
            message: format!("Could not {action}: {error}"),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }
}

/// A record shown before the backend confirmed it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PendingItem<T> {
    pub temp_id: TempId,
    pub item: T,
    /// The backend accepted the record; the view is re-fetching.
    pub confirmed: bool,
}

/// Everything a list screen needs to render one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewSnapshot<T> {
    pub status: ViewStatus,
    /// Items of the current page after client-side refinement.
    pub items: Vec<T>,
    pub pending: Vec<PendingItem<T>>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    /// Items on the server page before refinement.
    pub fetched: usize,
    /// Client-side filters narrowed the current page.
    pub refined: bool,
    /// Pager links; `None` marks a gap.
    pub links: Vec<Option<u32>>,
    /// Loaded and nothing to show.
    pub is_empty: bool,
    #[serde(skip)]
    pub error: Option<ApiError>,
    pub can_retry: bool,
    pub notice: Option<Notice>,
}
