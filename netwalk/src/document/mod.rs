//! XML documents: the crawl input and the topology output.

pub mod input;
pub mod output;
pub mod tags;
mod tree;

pub use input::InputDocument;
pub use output::{read_type_payload, render, write_document, write_file};
