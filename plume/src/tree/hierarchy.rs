//! Collection-wide traits that do not belong to one symbol: the inheritance graph, access-flag
//! edits, and free-form properties.

use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use crate::descriptor::MethodDescriptor;
use crate::tree::names::{ClassName, FieldName, MethodName};

/// The static inheritance graph: a class's unmapped name to the unmapped names of its direct
/// superclass and implemented interfaces.
///
/// Built by a prior whole-codebase scan of class declarations (out of scope here) and attached
/// to a collection before a remapper is constructed from it. The graph reaches into unknown
/// external ancestors; walks stop at names absent from the mapping index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hierarchy {
	pub super_classes: IndexMap<ClassName, IndexSet<ClassName>>,
}

impl Hierarchy {
	/// Rewrites every class name through the given table; names absent from it are kept.
	pub(crate) fn rename_classes(&self, map: impl Fn(&str) -> Option<String>) -> Hierarchy {
		let rename = |class: &ClassName| -> ClassName {
			map(class.as_str()).map_or_else(|| class.clone(), ClassName::from)
		};

		let mut super_classes = IndexMap::new();
		for (class, supers) in &self.super_classes {
			let supers = supers.iter().map(rename).collect();
			super_classes.insert(rename(class), supers);
		}
		Hierarchy { super_classes }
	}
}

pub trait SuperClassProvider {
	fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<ClassName>>>;
}

impl SuperClassProvider for Hierarchy {
	fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<ClassName>>> {
		Ok(self.super_classes.get(class))
	}
}

impl<S: SuperClassProvider> SuperClassProvider for Vec<S> {
	fn get_super_classes(&self, class: &str) -> Result<Option<&IndexSet<ClassName>>> {
		for i in self {
			if let Some(x) = i.get_super_classes(class)? {
				return Ok(Some(x));
			}
		}
		Ok(None)
	}
}

pub struct NoSuperClassProvider;

impl NoSuperClassProvider {
	pub fn new() -> &'static NoSuperClassProvider {
		static INSTANCE: NoSuperClassProvider = NoSuperClassProvider;
		&INSTANCE
	}
}

impl SuperClassProvider for NoSuperClassProvider {
	fn get_super_classes(&self, _class: &str) -> Result<Option<&IndexSet<ClassName>>> {
		Ok(None)
	}
}

/// A symbol an access-flag edit applies to, keyed in unmapped names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccessTarget {
	Class(ClassName),
	Field { class: ClassName, name: FieldName },
	Method { class: ClassName, name: MethodName, desc: MethodDescriptor },
}

/// Additional access-flag edits to apply during rewriting, e.g. widening members to `public`.
///
/// Duplicate keys OR their flag bits together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessTransforms {
	entries: IndexMap<AccessTarget, u16>,
}

impl AccessTransforms {
	pub fn add(&mut self, target: AccessTarget, flags: u16) {
		*self.entries.entry(target).or_insert(0) |= flags;
	}

	pub fn get(&self, target: &AccessTarget) -> u16 {
		self.entries.get(target).copied().unwrap_or(0)
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&AccessTarget, u16)> {
		self.entries.iter().map(|(target, &flags)| (target, flags))
	}

	pub(crate) fn rename_targets(&mut self, rename: impl Fn(AccessTarget) -> AccessTarget) {
		let entries = std::mem::take(&mut self.entries);
		for (target, flags) in entries {
			self.add(rename(target), flags);
		}
	}
}

/// Free-form key/value and key-only tags a format carries but does not otherwise model, e.g. the
/// Tiny v2 header property section. Round-tripped verbatim, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Properties {
	entries: IndexMap<String, Option<String>>,
}

impl Properties {
	pub fn insert(&mut self, key: String, value: Option<String>) {
		self.entries.insert(key, value);
	}

	pub fn get(&self, key: &str) -> Option<Option<&str>> {
		self.entries.get(key).map(|value| value.as_deref())
	}

	pub fn contains(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
		self.entries.iter().map(|(key, value)| (key.as_str(), value.as_deref()))
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::{AccessTarget, AccessTransforms};

	#[test]
	fn duplicate_targets_or_their_flags() {
		let target = AccessTarget::Field {
			class: "com/example/Foo".into(),
			name: "count".into(),
		};

		let mut transforms = AccessTransforms::default();
		transforms.add(target.clone(), 0x0001);
		transforms.add(target.clone(), 0x0008);
		transforms.add(AccessTarget::Class("com/example/Foo".into()), 0x0010);

		assert_eq!(transforms.get(&target), 0x0009);
		assert_eq!(transforms.get(&AccessTarget::Class("com/example/Foo".into())), 0x0010);
		assert_eq!(transforms.iter().count(), 2);
	}
}
