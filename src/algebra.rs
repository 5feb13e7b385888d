//! Textual relational algebra language.
//!
//! Scripts are sequences of `;`-terminated statements: relation definitions,
//! data changes, and algebra expressions such as
//! `project[name](select[country = 'USA'](Artist))`. Every operator keyword
//! also has its conventional symbol (`σ π ρ ∪ ∩ − × ⋈`).

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{RelationExpression, Renaming, Statement};
pub use error::ParseError;
pub use lexer::Lexer;
pub use parser::{parse_predicate, parse_query, parse_script, Parser};
pub use token::Token;
