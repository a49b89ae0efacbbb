//! An ActionScript Virtual Machine 2 execution runtime.
//!
//! This crate takes a decoded [`abc::AbcFile`] and runs it: operand stack,
//! registers, scope chains, property resolution, exception unwinding, and
//! class/function object creation all live here. Decoding the ABC byte
//! format itself is the `abc` crate's job; this crate never reads raw
//! bytes, only [`abc`]'s typed structures.
//!
//! Embedding a program:
//!
//! ```no_run
//! use avm2::Avm2;
//!
//! # fn main() -> avm2::error::Result<()> {
//! let bytes = std::fs::read("program.abc").unwrap();
//! let mut vm = Avm2::load(&bytes)?;
//! vm.execute_entry_point()?;
//! # Ok(())
//! # }
//! ```
//!
//! The host class library (`Object`, `Array`, `String`, display objects,
//! and the rest of the Flash Player's built-ins) is out of scope: a host
//! embedding this crate supplies its own classes through [`vm::HostRegistry`]
//! and native functions through [`Avm2::make_native_function`].

pub mod activation;
pub mod error;
mod interpreter;
pub mod method;
pub mod namespace;
pub mod object;
pub mod op;
pub mod property;
pub mod resolver;
pub mod scope;
pub mod script;
pub mod value;
pub mod vm;

pub use activation::Activation;
pub use error::{Error, Result};
pub use method::BytecodeMethod;
pub use namespace::Namespace;
pub use object::{BytecodeFunction, ClassData, FunctionKind, NativeFn, Object, ObjectKind};
pub use op::Op;
pub use property::{Property, PropertyKey, PropertyMap};
pub use resolver::{ResolvedName, SearchKind, SearchSlot};
pub use scope::{Scope, ScopeChain};
pub use script::TranslationUnit;
pub use value::Value;
pub use vm::{Avm2, EmptyHostRegistry, HostRegistry};
