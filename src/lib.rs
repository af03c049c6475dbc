//! classc - front end for a small class-based language
//!
//! Source text flows through [`frontend::lexer`], [`frontend::parser`] and
//! [`frontend::semantic`]; [`frontend::run`] drives all three.

pub mod display;
pub mod feedback;
pub mod frontend;
pub mod utils;
