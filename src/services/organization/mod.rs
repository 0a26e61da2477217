pub mod http;
pub mod resolver;

pub use http::HttpOrganizationResolver;
pub use resolver::{Organization, OrganizationError, OrganizationResolver};
