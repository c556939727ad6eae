//! Service layer for business logic
//!
//! Shared by the HTTP handlers; the handlers only parse requests and
//! translate results into responses.

pub mod code_generator;
mod link_service;

pub use code_generator::{
    CodeGenerator, DEFAULT_CODE_LENGTH, MAX_CODE_LENGTH, RandomCodeGenerator, is_valid_code,
};
pub use link_service::*;
