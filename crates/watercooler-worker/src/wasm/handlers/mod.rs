pub mod admin;
pub mod admin_auth;
pub mod claim;
pub mod migrations;
