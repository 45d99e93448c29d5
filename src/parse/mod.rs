pub mod attributes;
pub mod batch;
pub mod document_parser;
pub mod line;

pub use attributes::{Extracted, compose, extract};
pub use batch::{parse_documents, read_and_parse};
pub use document_parser::parse_document;
pub use line::{LineStructure, parse_line, serialize_line};
