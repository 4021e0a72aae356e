pub mod document;
pub mod lexical;
pub mod projections;
pub mod token_sequence;
