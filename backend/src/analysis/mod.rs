pub mod extractor;
pub mod parser;
