pub mod directory;
pub mod resolver;

pub use directory::{DirectoryService, InsertOutcome};
pub use resolver::{EndpointResolver, ResolvedAddress};
