//! Exported-value model for module namespaces.
//!
//! A module's namespace maps attribute names to [`Symbol`]s. Primitive
//! symbols compare by value; functions and module bindings are shared
//! handles and compare by identity, which is what makes the
//! attribute-forwarding guarantees of proxy resolution observable: after a
//! proxy resolves, its entries are the same handles the real module holds.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::module::Module;

/// A shared native function exported by a module.
pub type NativeFn = Arc<dyn Fn(&[Symbol]) -> Result<Symbol> + Send + Sync>;

/// A value exported under a name in a module namespace.
#[derive(Clone, Default)]
pub enum Symbol {
    /// The unit value, returned by functions with nothing to report.
    #[default]
    None,
    Str(String),
    Int(i64),
    Bool(bool),
    /// A callable exported by the module.
    Func(NativeFn),
    /// A submodule binding.
    Module(Module),
}

impl Symbol {
    /// Wrap a string value.
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// Wrap a native function.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&[Symbol]) -> Result<Symbol> + Send + Sync + 'static,
    {
        Self::Func(Arc::new(f))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&Module> {
        match self {
            Self::Module(m) => Some(m),
            _ => None,
        }
    }

    /// Short kind label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Bool(_) => "boolean",
            Self::Func(_) => "function",
            Self::Module(_) => "module",
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            // Shared handles compare by identity, not by behavior.
            (Self::Func(a), Self::Func(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
            }
            (Self::Module(a), Self::Module(b)) => Module::same(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Func(_) => write!(f, "<function>"),
            Self::Module(m) => write!(f, "<module '{}'>", m.name()),
        }
    }
}
