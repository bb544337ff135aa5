//! Entity and sub-entity descriptors.
//!
//! Record attributes are schema-free, so these descriptors carry only what
//! is fixed: which remote collection an entity lives in, where a customer's
//! sub-collections sit inside its attribute tree, and the default shape of a
//! new customer.

use crate::field::EntityField;
use crate::Tree;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Top-level remote entities that can be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Customer,
    Event,
}

impl EntityKind {
    /// URL segment of the remote collection.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customers",
            EntityKind::Event => "events",
        }
    }

    /// Start a field path on this entity.
    pub fn field(self, name: impl Into<String>) -> EntityField {
        EntityField::new(self, name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Customer => write!(f, "Customer"),
            EntityKind::Event => write!(f, "Event"),
        }
    }
}

/// Sub-entities stored as lists under a customer's `base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Job,
    Education,
    Like,
    Subscription,
}

impl EntryKind {
    pub const ALL: [EntryKind; 4] = [
        EntryKind::Job,
        EntryKind::Education,
        EntryKind::Like,
        EntryKind::Subscription,
    ];

    /// Key of the list inside `base`, which is also the URL segment.
    pub fn collection(&self) -> &'static str {
        match self {
            EntryKind::Job => "jobs",
            EntryKind::Education => "educations",
            EntryKind::Like => "likes",
            EntryKind::Subscription => "subscriptions",
        }
    }

    /// Dotted path of the list in the customer's attributes.
    pub fn collection_path(&self) -> String {
        format!("base.{}", self.collection())
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Job => write!(f, "Job"),
            EntryKind::Education => write!(f, "Education"),
            EntryKind::Like => write!(f, "Like"),
            EntryKind::Subscription => write!(f, "Subscription"),
        }
    }
}

/// Attribute skeleton of a customer built locally.
pub fn customer_defaults() -> Tree {
    match json!({
        "base": {"contacts": {}},
        "extended": {},
        "tags": {"auto": [], "manual": []},
        "consents": {}
    }) {
        Value::Object(tree) => tree,
        _ => Tree::new(),
    }
}

/// Values accepted for `schoolType` on an education entry.
pub mod school_type {
    pub const PRIMARY_SCHOOL: &str = "PRIMARY_SCHOOL";
    pub const SECONDARY_SCHOOL: &str = "SECONDARY_SCHOOL";
    pub const HIGH_SCHOOL: &str = "HIGH_SCHOOL";
    pub const COLLEGE: &str = "COLLEGE";
    pub const OTHER: &str = "OTHER";
}

/// Event `type` values.
pub mod event_type {
    pub const ABANDONED_CART: &str = "abandonedCart";
    pub const ADDED_COMPARE: &str = "addedCompare";
    pub const ADDED_PRODUCT: &str = "addedProduct";
    pub const ADDED_WISHLIST: &str = "addedWishlist";
    pub const CAMPAIGN_BLACKLISTED: &str = "campaignBlacklisted";
    pub const CAMPAIGN_BOUNCED: &str = "campaignBounced";
    pub const CAMPAIGN_LINK_CLICKED: &str = "campaignLinkClicked";
    pub const CAMPAIGN_MARKED_SPAM: &str = "campaignMarkedSpam";
    pub const CAMPAIGN_OPENED: &str = "campaignOpened";
    pub const CAMPAIGN_SENT: &str = "campaignSent";
    pub const CAMPAIGN_SUBSCRIBED: &str = "campaignSubscribed";
    pub const CAMPAIGN_UNSUBSCRIBED: &str = "campaignUnsubscribed";
    pub const CHANGED_SETTING: &str = "changedSetting";
    pub const CLICKED_LINK: &str = "clickedLink";
    pub const CLOSED_TICKET: &str = "closedTicket";
    pub const COMPLETED_ORDER: &str = "completedOrder";
    pub const EVENT_INVITED: &str = "eventInvited";
    pub const EVENT_PARTICIPATED: &str = "eventParticipated";
    pub const FORM_COMPILED: &str = "formCompiled";
    pub const GENERIC_ACTIVE_EVENT: &str = "genericActiveEvent";
    pub const GENERIC_PASSIVE_EVENT: &str = "genericPassiveEvent";
    pub const LOGGED_IN: &str = "loggedIn";
    pub const LOGGED_OUT: &str = "loggedOut";
    pub const OPENED_TICKET: &str = "openedTicket";
    pub const ORDER_SHIPPED: &str = "orderShipped";
    pub const REMOVED_COMPARE: &str = "removedCompare";
    pub const REMOVED_PRODUCT: &str = "removedProduct";
    pub const REMOVED_WISHLIST: &str = "removedWishlist";
    pub const REPLIED_TICKET: &str = "repliedTicket";
    pub const REVIEWED_PRODUCT: &str = "reviewedProduct";
    pub const SEARCHED: &str = "searched";
    pub const SERVICE_SUBSCRIBED: &str = "serviceSubscribed";
    pub const SERVICE_UNSUBSCRIBED: &str = "serviceUnsubscribed";
    pub const VIEWED_PAGE: &str = "viewedPage";
    pub const VIEWED_PRODUCT: &str = "viewedProduct";
    pub const VIEWED_PRODUCT_CATEGORY: &str = "viewedProductCategory";
}

/// Event `context` values.
pub mod event_context {
    pub const CONTACT_CENTER: &str = "CONTACT_CENTER";
    pub const WEB: &str = "WEB";
    pub const MOBILE: &str = "MOBILE";
    pub const ECOMMERCE: &str = "ECOMMERCE";
    pub const RETAIL: &str = "RETAIL";
    pub const IOT: &str = "IOT";
    pub const SOCIAL: &str = "SOCIAL";
    pub const DIGITAL_CAMPAIGN: &str = "DIGITAL_CAMPAIGN";
    pub const OTHER: &str = "OTHER";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_paths() {
        assert_eq!(EntryKind::Job.collection_path(), "base.jobs");
        assert_eq!(EntryKind::Education.collection(), "educations");
        assert_eq!(EntryKind::Subscription.to_string(), "Subscription");
        assert_eq!(EntityKind::Event.collection(), "events");
    }

    #[test]
    fn customer_skeleton() {
        let defaults = customer_defaults();
        assert_eq!(
            Value::Object(defaults),
            json!({
                "base": {"contacts": {}},
                "extended": {},
                "tags": {"auto": [], "manual": []},
                "consents": {}
            })
        );
    }

    #[test]
    fn kind_serialization() {
        assert_eq!(serde_json::to_value(EntryKind::Like).unwrap(), json!("like"));
        let kind: EntityKind = serde_json::from_str("\"customer\"").unwrap();
        assert_eq!(kind, EntityKind::Customer);
    }
}
