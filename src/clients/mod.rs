pub mod directory_client;

pub use directory_client::{build_form_body, DirectoryClient};
