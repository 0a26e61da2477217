/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Cheap to clone: everything inside is behind an Arc
 */
use std::sync::Arc;

use crate::repos::ItemStore;
use crate::services::{auth::AuthService, organization::OrganizationResolver};

#[derive(Clone)]
pub struct AppState {
    pub items: Arc<dyn ItemStore>,
    pub organizations: Arc<dyn OrganizationResolver>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        items: Arc<dyn ItemStore>,
        organizations: Arc<dyn OrganizationResolver>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self {
            items,
            organizations,
            auth,
        }
    }
}
