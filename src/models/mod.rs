mod acl;
mod devices;
mod inventory;
mod services;

pub use acl::*;
pub use devices::*;
pub use inventory::*;
pub use services::*;
