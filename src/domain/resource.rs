//! The remote collections exposed by the outreach backend.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::filters::{FilterField, FilterKind};

/// A named remote collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Companies,
    Campaigns,
    Messages,
    Leads,
    Templates,
    Automations,
    Unsubscribes,
    EmailOpens,
    Products,
    EmailAccounts,
}

const COMPANY_FILTERS: &[FilterField] = &[
    FilterField::server("search", FilterKind::Text),
    FilterField::client("industry", FilterKind::Choice),
    FilterField::client("country", FilterKind::Choice),
    FilterField::client("created", FilterKind::DateRange),
];

const CAMPAIGN_FILTERS: &[FilterField] = &[
    FilterField::server("search", FilterKind::Text),
    FilterField::client("industry", FilterKind::Choice),
    FilterField::client("created", FilterKind::DateRange),
];

const MESSAGE_FILTERS: &[FilterField] = &[
    FilterField::server("search", FilterKind::Text),
    FilterField::server("type", FilterKind::Choice),
    FilterField::server("status", FilterKind::Choice),
    FilterField::client("stage", FilterKind::Choice),
    FilterField::client("sent", FilterKind::DateRange),
];

const LEAD_FILTERS: &[FilterField] = &[
    FilterField::client("search", FilterKind::Text),
    FilterField::client("intent", FilterKind::Choice),
    FilterField::client("created", FilterKind::DateRange),
];

const TEMPLATE_FILTERS: &[FilterField] = &[
    FilterField::server("type", FilterKind::Choice),
    FilterField::client("search", FilterKind::Text),
];

const AUTOMATION_FILTERS: &[FilterField] = &[
    FilterField::client("status", FilterKind::Choice),
    FilterField::client("industry", FilterKind::Choice),
    FilterField::client("active", FilterKind::Flag),
];

const UNSUBSCRIBE_FILTERS: &[FilterField] = &[
    FilterField::server("product_id", FilterKind::Choice),
    FilterField::client("search", FilterKind::Text),
];

const EMAIL_OPEN_FILTERS: &[FilterField] = &[
    FilterField::server("product_id", FilterKind::Choice),
    FilterField::client("opened", FilterKind::DateRange),
];

const PRODUCT_FILTERS: &[FilterField] = &[
    FilterField::server("search", FilterKind::Text),
    FilterField::server("active_only", FilterKind::Flag),
    FilterField::client("industry", FilterKind::Choice),
];

const EMAIL_ACCOUNT_FILTERS: &[FilterField] = &[
    FilterField::server("active_only", FilterKind::Flag),
    FilterField::client("search", FilterKind::Text),
];

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Companies,
        ResourceKind::Campaigns,
        ResourceKind::Messages,
        ResourceKind::Leads,
        ResourceKind::Templates,
        ResourceKind::Automations,
        ResourceKind::Unsubscribes,
        ResourceKind::EmailOpens,
        ResourceKind::Products,
        ResourceKind::EmailAccounts,
    ];

    /// Human readable name used in notices and logs.
    pub const fn name(self) -> &'static str {
        match self {
            ResourceKind::Companies => "companies",
            ResourceKind::Campaigns => "campaigns",
            ResourceKind::Messages => "messages",
            ResourceKind::Leads => "leads",
            ResourceKind::Templates => "templates",
            ResourceKind::Automations => "automations",
            ResourceKind::Unsubscribes => "unsubscribes",
            ResourceKind::EmailOpens => "email opens",
            ResourceKind::Products => "products",
            ResourceKind::EmailAccounts => "email accounts",
        }
    }

    /// Listing endpoint relative to the API base url. New records are
    /// posted to the same path.
    pub const fn path(self) -> &'static str {
        match self {
            ResourceKind::Companies => "companies",
            ResourceKind::Campaigns => "campaigns",
            ResourceKind::Messages => "messages",
            ResourceKind::Leads => "services/leads",
            ResourceKind::Templates => "templates",
            ResourceKind::Automations => "automation/config",
            ResourceKind::Unsubscribes => "products/unsubscribes",
            ResourceKind::EmailOpens => "products/email-opens",
            ResourceKind::Products => "products",
            ResourceKind::EmailAccounts => "email-accounts",
        }
    }

    /// Endpoint of a single record.
    pub fn record_path(self, id: i64) -> String {
        format!("{}/{id}", self.path())
    }

    /// Endpoint of a command on a single record. Automation commands live
    /// beside the config collection rather than under it.
    pub fn action_path(self, id: i64, action: &str) -> String {
        match self {
            ResourceKind::Automations => format!("automation/{id}/{action}"),
            _ => format!("{}/{action}", self.record_path(id)),
        }
    }

    /// Filter fields accepted by views over this resource.
    pub const fn filter_schema(self) -> &'static [FilterField] {
        match self {
            ResourceKind::Companies => COMPANY_FILTERS,
            ResourceKind::Campaigns => CAMPAIGN_FILTERS,
            ResourceKind::Messages => MESSAGE_FILTERS,
            ResourceKind::Leads => LEAD_FILTERS,
            ResourceKind::Templates => TEMPLATE_FILTERS,
            ResourceKind::Automations => AUTOMATION_FILTERS,
            ResourceKind::Unsubscribes => UNSUBSCRIBE_FILTERS,
            ResourceKind::EmailOpens => EMAIL_OPEN_FILTERS,
            ResourceKind::Products => PRODUCT_FILTERS,
            ResourceKind::EmailAccounts => EMAIL_ACCOUNT_FILTERS,
        }
    }

    pub fn filter_field(self, name: &str) -> Option<&'static FilterField> {
        self.filter_schema().iter().find(|field| field.name == name)
    }

    /// CSV export endpoint, for the resources the backend can export.
    pub const fn export_path(self) -> Option<&'static str> {
        match self {
            ResourceKind::Companies => Some("companies/export"),
            ResourceKind::Messages => Some("messages/export"),
            ResourceKind::Leads => Some("leads/export"),
            _ => None,
        }
    }

    pub const fn supports_export(self) -> bool {
        self.export_path().is_some()
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterScope;

    #[test]
    fn every_schema_has_unique_field_names() {
        for kind in ResourceKind::ALL {
            let schema = kind.filter_schema();
            for (i, field) in schema.iter().enumerate() {
                assert!(
                    schema[i + 1..].iter().all(|other| other.name != field.name),
                    "{kind} declares `{}` twice",
                    field.name
                );
            }
        }
    }

    #[test]
    fn message_type_and_status_are_server_side() {
        let status = ResourceKind::Messages.filter_field("status").unwrap();
        assert_eq!(status.scope, FilterScope::Server);
        let stage = ResourceKind::Messages.filter_field("stage").unwrap();
        assert_eq!(stage.scope, FilterScope::Client);
    }

    #[test]
    fn export_is_limited_to_backend_endpoints() {
        let exportable: Vec<_> = ResourceKind::ALL
            .into_iter()
            .filter(|kind| kind.supports_export())
            .collect();
        assert_eq!(
            exportable,
            vec![
                ResourceKind::Companies,
                ResourceKind::Messages,
                ResourceKind::Leads
            ]
        );
    }

    #[test]
    fn listing_paths_follow_backend_routes() {
        assert_eq!(ResourceKind::Automations.path(), "automation/config");
        assert_eq!(ResourceKind::Leads.path(), "services/leads");
        assert_eq!(ResourceKind::Unsubscribes.path(), "products/unsubscribes");
        assert_eq!(ResourceKind::EmailOpens.path(), "products/email-opens");
        assert_eq!(ResourceKind::EmailAccounts.path(), "email-accounts");
        assert_eq!(ResourceKind::Leads.export_path(), Some("leads/export"));
    }

    #[test]
    fn automation_records_and_commands_use_separate_routes() {
        assert_eq!(
            ResourceKind::Automations.record_path(4),
            "automation/config/4"
        );
        assert_eq!(
            ResourceKind::Automations.action_path(4, "stop"),
            "automation/4/stop"
        );
        assert_eq!(
            ResourceKind::EmailAccounts.action_path(2, "test"),
            "email-accounts/2/test"
        );
    }

    #[test]
    fn display_uses_readable_names() {
        assert_eq!(ResourceKind::EmailOpens.to_string(), "email opens");
        assert_eq!(ResourceKind::Leads.to_string(), "leads");
    }
}
