// Domain-layer modules and shared errors/models
pub mod payload {
    pub use crate::payload::*;
}

pub mod field_resolver {
    pub use crate::field_resolver::*;
}

pub mod validation {
    pub use crate::validation::*;
}

pub mod errors {
    pub use crate::errors::*;
}
