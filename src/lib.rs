pub mod cli;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod shared;
