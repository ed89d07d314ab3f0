pub mod span;
pub mod tree;
pub mod parser;
pub mod printer;

pub use parser::{parse_call, parse_expr, parse_file, parse_package_clause, ParseError};
pub use printer::{format_source, print_file, print_node};
