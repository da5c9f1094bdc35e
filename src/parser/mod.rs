// Parser module for turning Python source into a syntax tree

mod python;

pub use python::PythonParser;
