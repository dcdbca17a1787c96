//! External service integrations.

pub mod openrouter {
    pub use crate::openrouter::*;
}

pub mod ortto {
    pub use crate::ortto::*;
}

pub mod webhook_models {
    pub use crate::webhook_models::*;
}
