//! Input validation and limits shared by the parsers and the web server.

pub mod validation;
