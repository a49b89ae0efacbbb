//! Binary decoder for ActionScript Bytecode (ABC), the program container
//! format embedded in a SWF's `DoABC`/`DoABC2` tags.
//!
//! This crate decodes the bytes into an index-addressable, read-only
//! program (an [`AbcFile`]) and nothing more: it has no notion of an
//! operand stack, a scope chain, or a running method. That lives in the
//! `avm2` crate, which takes an `AbcFile` and executes it.
//!
//! Everything here is total over well-formed input: decoding never panics,
//! and a malformed byte stream produces a [`DecodeError`], not a crash.
//! Semantic well-formedness (does this program respect its own declared
//! `max_stack`, are multiname kinds used where the instruction that
//! references them expects) is not checked at decode time; see the `avm2`
//! crate's runtime errors for that.

mod class;
mod constant_pool;
mod error;
mod metadata;
mod method;
mod method_body;
mod multiname;
mod namespace;
mod reader;
mod script;
mod trait_;

pub use class::{ClassInfo, InstanceFlags, InstanceInfo};
pub use constant_pool::ConstantPool;
pub use error::DecodeError;
pub use metadata::MetadataInfo;
pub use method::{MethodFlags, MethodInfo, OptionDetail};
pub use method_body::{ExceptionInfo, MethodBody};
pub use multiname::Multiname;
pub use namespace::{Namespace, NamespaceKind, NamespaceSet};
pub use reader::Reader;
pub use script::ScriptInfo;
pub use trait_::{Trait, TraitAttributes, TraitKind};

mod file;
pub use file::AbcFile;
