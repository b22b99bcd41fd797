pub mod ast;
pub mod cli;
pub mod evaluator;
pub mod interpreter;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod relation;
pub mod value;

pub use ast::{AttrRef, Comparator, Condition, Expr, Literal, Operand, SetOp, Statement, Token};
pub use evaluator::{AttributeOp, Environment, EvalError, EvalOptions, Evaluator};
pub use interpreter::{Error, Interpreter, run};
pub use lexer::{LexError, Lexer, Position, Span};
pub use output::to_table;
pub use parser::{ParseError, Parser, parse_line};
pub use relation::{Attribute, Record, Relation, RelationError, Row, Schema, TypeMismatch};
pub use value::{AttributeType, Value};
