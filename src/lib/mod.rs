pub mod ast;
pub mod builtins;
pub mod environment;
pub mod interpreter;
pub mod object;
pub mod parser;
pub mod scanner;
