pub mod address_parser;
pub mod lookup_service;

pub use address_parser::AddressParser;
pub use lookup_service::LookupService;
