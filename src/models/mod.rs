pub mod authz;
pub mod menu;
pub mod permission;
