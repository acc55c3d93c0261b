pub mod name_port;

pub use name_port::{extract, PortTable};
