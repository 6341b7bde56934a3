//! Tag value types
//!
//! This module defines the value types stored in directories.

pub mod rational;
pub mod string_value;
pub mod value;

pub use rational::Rational;
pub use string_value::{StringValue, TextEncoding};
pub use value::DynValue;
