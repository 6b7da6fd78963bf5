pub mod aggregate;
pub mod attribute;
pub mod cli;
pub mod convert;
pub mod error;
pub mod json;
pub mod locate;
pub mod model;
pub mod module;
pub mod profile;
pub mod source;
pub mod syntax;
pub mod xml;
