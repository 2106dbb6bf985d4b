//! This module defines traits for the Administration API endpoints and the file system, so commands
//! can be tested against mocks. Every trait is implemented by [`crate::client::AtlasClient`].
pub mod access_lists;
pub mod alerts;
pub mod backups;
pub mod clusters;
pub mod data_federation;
pub mod database_users;
pub mod private_endpoints;
pub mod projects;
pub mod request_files;
pub mod teams;

pub use access_lists::*;
pub use alerts::*;
pub use backups::*;
pub use clusters::*;
pub use data_federation::*;
pub use database_users::*;
pub use private_endpoints::*;
pub use projects::*;
pub use request_files::*;
pub use teams::*;
