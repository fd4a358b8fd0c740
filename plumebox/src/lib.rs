//! Local-variable renaming for class rewriting.
//!
//! An external bytecode rewriter drives this crate one class at a time: a [`LocalRenamer`] per
//! method hands out collision-free local-variable names, a [`LambdaRegistry`] per class carries
//! renamers from an enclosing method over to the synthetic methods backing its lambdas, and a
//! [`ParameterRecorder`] keeps an optional log of the parameter names synthesized for abstract
//! methods.

pub mod locals;
pub mod lambdas;
pub mod params;

pub use locals::LocalRenamer;
pub use lambdas::LambdaRegistry;
pub use params::ParameterRecorder;
