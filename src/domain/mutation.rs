//! Write operations against the backend and the collections they touch.

use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::campaign::GenerateCampaign;
use crate::domain::product::{FetchProductClients, GenerateProductCampaign};
use crate::domain::resource::ResourceKind;
use crate::domain::types::{ProductId, TypeConstraintError};

/// HTTP verb of a mutation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
    Delete,
}

/// Command endpoint invoked on a single record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Start,
    Stop,
    Resume,
    RunNow,
    StartNow,
    SendBatch,
    Send,
    SendWhatsapp,
    /// Checks that an email account can reach its SMTP server.
    TestConnection,
}

impl Action {
    pub const fn path(self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Resume => "resume",
            Action::RunNow => "run-now",
            Action::StartNow => "start-now",
            Action::SendBatch => "send-batch",
            Action::Send => "send",
            Action::SendWhatsapp => "send-whatsapp",
            Action::TestConnection => "test",
        }
    }

    /// Resource whose records accept this action.
    pub const fn target(self) -> ResourceKind {
        match self {
            Action::Start | Action::Stop | Action::Resume | Action::RunNow => {
                ResourceKind::Automations
            }
            Action::StartNow | Action::SendBatch => ResourceKind::Campaigns,
            Action::Send | Action::SendWhatsapp => ResourceKind::Messages,
            Action::TestConnection => ResourceKind::EmailAccounts,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// A write against the backend.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    Create {
        resource: ResourceKind,
        body: Value,
    },
    Update {
        resource: ResourceKind,
        id: i64,
        body: Value,
    },
    Delete {
        resource: ResourceKind,
        id: i64,
    },
    DeleteBatch {
        resource: ResourceKind,
        ids: Vec<i64>,
    },
    Act {
        id: i64,
        action: Action,
    },
    /// Moves failed messages back to draft.
    RetryMessages {
        ids: Vec<i64>,
    },
    GenerateCampaign(GenerateCampaign),
    /// Pulls companies matching the product's profile and links them to it.
    FetchProductClients {
        product: ProductId,
        request: FetchProductClients,
    },
    GenerateProductCampaign {
        product: ProductId,
        request: GenerateProductCampaign,
    },
    /// Pulls WhatsApp templates from the provider.
    SyncTemplates,
}

/// Wire form of a [`Mutation`].
#[derive(Clone, Debug, PartialEq)]
pub struct MutationRequest {
    pub method: Method,
    /// Path relative to the API base url, without a leading slash.
    pub path: String,
    pub body: Option<Value>,
}

fn to_body<B: Serialize>(body: &B) -> Result<Value, TypeConstraintError> {
    serde_json::to_value(body).map_err(|err| TypeConstraintError::InvalidValue(err.to_string()))
}

impl Mutation {
    pub fn create<B: Serialize>(resource: ResourceKind, body: &B) -> Result<Self, TypeConstraintError> {
        Ok(Mutation::Create {
            resource,
            body: to_body(body)?,
        })
    }

    pub fn update<B: Serialize>(
        resource: ResourceKind,
        id: i64,
        body: &B,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Mutation::Update {
            resource,
            id,
            body: to_body(body)?,
        })
    }

    /// Batch delete; duplicate ids are collapsed and an empty selection is
    /// rejected.
    pub fn delete_batch(
        resource: ResourceKind,
        ids: impl IntoIterator<Item = i64>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Mutation::DeleteBatch {
            resource,
            ids: selection(ids)?,
        })
    }

    pub fn retry_messages(ids: impl IntoIterator<Item = i64>) -> Result<Self, TypeConstraintError> {
        Ok(Mutation::RetryMessages {
            ids: selection(ids)?,
        })
    }

    /// Resource the request is addressed to.
    pub fn resource(&self) -> ResourceKind {
        match self {
            Mutation::Create { resource, .. }
            | Mutation::Update { resource, .. }
            | Mutation::Delete { resource, .. }
            | Mutation::DeleteBatch { resource, .. } => *resource,
            Mutation::Act { action, .. } => action.target(),
            Mutation::RetryMessages { .. } => ResourceKind::Messages,
            Mutation::GenerateCampaign(_) => ResourceKind::Campaigns,
            Mutation::FetchProductClients { .. } | Mutation::GenerateProductCampaign { .. } => {
                ResourceKind::Products
            }
            Mutation::SyncTemplates => ResourceKind::Templates,
        }
    }

    /// Builds the wire request. Fails only when a typed body cannot be
    /// serialized.
    pub fn request(&self) -> Result<MutationRequest, TypeConstraintError> {
        let resource = self.resource();
        let base = resource.path();
        let (method, path, body) = match self {
            Mutation::Create { body, .. } => (Method::Post, base.to_string(), Some(body.clone())),
            Mutation::Update { id, body, .. } => {
                (Method::Put, resource.record_path(*id), Some(body.clone()))
            }
            Mutation::Delete { id, .. } => (Method::Delete, resource.record_path(*id), None),
            Mutation::DeleteBatch { ids, .. } => (
                Method::Delete,
                format!("{base}/batch"),
                Some(json!({ "ids": ids })),
            ),
            Mutation::Act { id, action } => (
                Method::Post,
                resource.action_path(*id, action.path()),
                None,
            ),
            Mutation::RetryMessages { ids } => (
                Method::Post,
                format!("{base}/batch/retry"),
                Some(json!({ "ids": ids })),
            ),
            Mutation::GenerateCampaign(request) => (
                Method::Post,
                format!("{base}/generate"),
                Some(to_body(request)?),
            ),
            Mutation::FetchProductClients { product, request } => (
                Method::Post,
                resource.action_path(product.get(), "fetch-clients"),
                Some(to_body(request)?),
            ),
            Mutation::GenerateProductCampaign { product, request } => (
                Method::Post,
                resource.action_path(product.get(), "campaigns/generate"),
                Some(to_body(request)?),
            ),
            Mutation::SyncTemplates => (Method::Post, format!("{base}/sync"), None),
        };
        Ok(MutationRequest { method, path, body })
    }

    /// Collections whose cached pages are stale once this mutation succeeds.
    pub fn affected(&self) -> Vec<ResourceKind> {
        use ResourceKind::*;

        let resource = self.resource();
        match self {
            // Company names are denormalized into message and lead rows, and
            // deleting a company removes its messages.
            Mutation::Update { .. } | Mutation::Delete { .. } | Mutation::DeleteBatch { .. }
                if resource == Companies =>
            {
                vec![Companies, Messages, Leads]
            }
            Mutation::Delete { .. } | Mutation::DeleteBatch { .. } if resource == Campaigns => {
                vec![Campaigns, Messages]
            }
            Mutation::Act { action, .. } => match action {
                Action::Start | Action::Stop | Action::Resume => vec![Automations],
                Action::RunNow => vec![Automations, Companies, Campaigns, Messages],
                Action::StartNow | Action::SendBatch => vec![Campaigns, Messages],
                Action::Send | Action::SendWhatsapp => vec![Messages, Unsubscribes],
                Action::TestConnection => Vec::new(),
            },
            Mutation::GenerateCampaign(_) => vec![Campaigns, Messages],
            // Product rows carry company and campaign counts.
            Mutation::FetchProductClients { .. } => vec![Products, Companies],
            Mutation::GenerateProductCampaign { .. } => vec![Products, Campaigns, Messages],
            _ => vec![resource],
        }
    }

    /// Short label for notices and logs.
    pub fn describe(&self) -> String {
        let resource = self.resource();
        match self {
            Mutation::Create { .. } => format!("create {resource}"),
            Mutation::Update { id, .. } => format!("update {resource} #{id}"),
            Mutation::Delete { id, .. } => format!("delete {resource} #{id}"),
            Mutation::DeleteBatch { ids, .. } => format!("delete {} {resource}", ids.len()),
            Mutation::Act { id, action } => format!("{action} {resource} #{id}"),
            Mutation::RetryMessages { ids } => format!("retry {} messages", ids.len()),
            Mutation::GenerateCampaign(request) => {
                format!("generate campaign `{}`", request.campaign_name)
            }
            Mutation::FetchProductClients { product, request } => {
                format!("fetch {} clients for product #{product}", request.limit)
            }
            Mutation::GenerateProductCampaign { product, .. } => {
                format!("generate campaign for product #{product}")
            }
            Mutation::SyncTemplates => "sync templates".to_string(),
        }
    }
}

fn selection(ids: impl IntoIterator<Item = i64>) -> Result<Vec<i64>, TypeConstraintError> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    if ids.iter().any(|id| *id <= 0) {
        return Err(TypeConstraintError::NonPositiveId);
    }
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Err(TypeConstraintError::InvalidValue(
            "selection is empty".to_string(),
        ));
    }
    Ok(ids)
}
