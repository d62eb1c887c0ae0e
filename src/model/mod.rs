//! Domain model: tenants, feeds and permissions.

pub mod feed;
pub mod permissions;
pub mod tenant;

pub use feed::{Feed, DEFAULT_FEED_HISTORY};
pub use permissions::Permissions;
pub use tenant::{Channel, Tenant, TenantDocument, TenantInfo};
