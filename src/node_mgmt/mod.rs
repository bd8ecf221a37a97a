pub mod adoption;
mod firmware;
mod identity;
pub mod schema;

pub use adoption::AdoptionDocument;
pub use firmware::FirmwareInfo;
pub use identity::Identity;
pub use schema::SchemaStore;
