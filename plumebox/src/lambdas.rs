//! Sharing renamers between an enclosing method and its lambda-implementation methods.

use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use log::trace;
use plume::descriptor::MethodDescriptor;
use plume::error::MappingError;
use plume::tree::names::MethodName;
use crate::locals::LocalRenamer;

/// The pending renamers for one class's rewrite.
///
/// When a method's code constructs a synthetic lambda-implementation method, the slots captured
/// by the closure must keep the names the enclosing method already picked. The enclosing method
/// registers a [seeded][LocalRenamer::seeded] renamer under the synthetic method's name and
/// descriptor; when the synthetic method is visited it [claims][Self::claim] that renamer
/// instead of starting fresh.
///
/// The synthetic method's declaration may come before the instruction that creates it. A claim
/// that finds nothing records the key as already visited so a late [`Self::register`] keeps the
/// entry around for the driver's next pass over the class.
///
/// Methods within one class file are visited sequentially, so this needs no synchronization.
#[derive(Debug, Default)]
pub struct LambdaRegistry {
	pending: IndexMap<(MethodName, MethodDescriptor), LocalRenamer>,
	visited_early: Vec<(MethodName, MethodDescriptor)>,
}

impl LambdaRegistry {
	pub fn new() -> LambdaRegistry {
		LambdaRegistry::default()
	}

	/// Registers a renamer for a synthetic method that the current method's code creates.
	///
	/// Registering the same synthetic method twice is a usage error.
	pub fn register(&mut self, name: MethodName, desc: MethodDescriptor, renamer: LocalRenamer) -> Result<()> {
		if self.pending.contains_key(&(name.clone(), desc.clone())) {
			return Err(anyhow!(MappingError::RenamerState(
				format!("a renamer for the synthetic method {name} {desc} is already registered")
			)));
		}

		trace!("registered pending renamer for {name} {desc}");
		self.pending.insert((name, desc), renamer);
		Ok(())
	}

	/// Claims the pending renamer for a synthetic method that is about to be visited, if its
	/// enclosing method registered one.
	pub fn claim(&mut self, name: &MethodName, desc: &MethodDescriptor) -> Option<LocalRenamer> {
		let key = (name.clone(), desc.clone());
		match self.pending.shift_remove(&key) {
			Some(renamer) => {
				trace!("claimed pending renamer for {name} {desc}");
				Some(renamer)
			},
			None => {
				self.visited_early.push(key);
				None
			},
		}
	}

	/// Like [`Self::claim`], starting a fresh renamer when none is pending.
	pub fn claim_or_fresh(&mut self, name: &MethodName, desc: &MethodDescriptor) -> LocalRenamer {
		self.claim(name, desc).unwrap_or_default()
	}

	/// The methods that were visited before their renamer was registered; a driver that sees
	/// any of these makes a second pass over the class.
	pub fn visited_early(&self) -> impl Iterator<Item = (&MethodName, &MethodDescriptor)> {
		self.visited_early.iter()
			.filter(|key| self.pending.contains_key(*key))
			.map(|(name, desc)| (name, desc))
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use plume::descriptor::MethodDescriptor;
	use plume::tree::names::MethodName;
	use crate::locals::LocalRenamer;
	use super::LambdaRegistry;

	fn key() -> (MethodName, MethodDescriptor) {
		("lambda$run$0".into(), "(I)V".into())
	}

	#[test]
	fn register_then_claim() {
		let (name, desc) = key();

		let mut enclosing = LocalRenamer::new();
		enclosing.assign(1, "I", Some("count")).unwrap();

		let mut registry = LambdaRegistry::new();
		registry.register(name.clone(), desc.clone(), LocalRenamer::seeded(&enclosing, 0)).unwrap();

		let renamer = registry.claim(&name, &desc).unwrap();
		assert_eq!(renamer.get(1), Some("count"));
		assert!(registry.claim(&name, &desc).is_none());
	}

	#[test]
	fn claim_before_registration_is_remembered() {
		let (name, desc) = key();

		let mut registry = LambdaRegistry::new();
		assert!(registry.claim(&name, &desc).is_none());

		registry.register(name.clone(), desc.clone(), LocalRenamer::new()).unwrap();
		let early: Vec<_> = registry.visited_early().collect();
		assert_eq!(early, vec![(&name, &desc)]);

		// the second pass claims it
		assert!(registry.claim(&name, &desc).is_some());
	}

	#[test]
	fn double_registration_fails() {
		let (name, desc) = key();

		let mut registry = LambdaRegistry::new();
		registry.register(name.clone(), desc.clone(), LocalRenamer::new()).unwrap();
		assert!(registry.register(name, desc, LocalRenamer::new()).is_err());
	}
}
