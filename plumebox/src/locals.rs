//! Per-method local-variable name allocation.

use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use indexmap::map::Entry;
use plume::descriptor::descriptor_to_type_name;

/// Hands out the names for one method's local-variable slots.
///
/// A proposed name is taken as-is unless it collides with a name already assigned in the same
/// method; collisions and absent proposals fall back to a placeholder derived from the slot's
/// type, with the slot index appended if even the placeholder is taken. Once a slot has a name
/// it keeps it, later proposals for the same slot are ignored.
#[derive(Debug, Clone, Default)]
pub struct LocalRenamer {
	names: IndexMap<usize, String>,
	used: IndexSet<String>,
}

impl LocalRenamer {
	pub fn new() -> LocalRenamer {
		LocalRenamer::default()
	}

	/// Creates a renamer for a synthetic lambda-implementation method, seeded with the
	/// enclosing method's slot names. The first `captured` slots are skipped; those hold the
	/// closure's captured arguments and keep their caller-assigned names only when the
	/// synthetic method reuses them positionally.
	pub fn seeded(enclosing: &LocalRenamer, captured: usize) -> LocalRenamer {
		let mut renamer = LocalRenamer::new();
		for (&slot, name) in &enclosing.names {
			if slot >= captured {
				renamer.names.insert(slot, name.clone());
				renamer.used.insert(name.clone());
			}
		}
		renamer
	}

	/// Assigns a name to a slot and returns it.
	///
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// use plumebox::LocalRenamer;
	///
	/// let mut renamer = LocalRenamer::new();
	/// assert_eq!(renamer.assign(1, "I", Some("count")).unwrap(), "count");
	/// // the second `count` collides and falls back to the type-derived placeholder
	/// assert_eq!(renamer.assign(2, "Ljava/util/List;", Some("count")).unwrap(), "list");
	/// assert_eq!(renamer.assign(3, "Ljava/util/List;", None).unwrap(), "list3");
	/// ```
	pub fn assign(&mut self, slot: usize, desc: &str, proposed: Option<&str>) -> Result<&str> {
		match self.names.entry(slot) {
			Entry::Occupied(e) => Ok(e.into_mut().as_str()),
			Entry::Vacant(e) => {
				let name = match proposed {
					Some(name) if !self.used.contains(name) => name.to_owned(),
					_ => {
						let placeholder = placeholder_name(desc)?;
						if self.used.contains(&placeholder) {
							format!("{placeholder}{slot}")
						} else {
							placeholder
						}
					},
				};

				self.used.insert(name.clone());
				Ok(e.insert(name).as_str())
			},
		}
	}

	/// The name assigned to a slot, if any.
	pub fn get(&self, slot: usize) -> Option<&str> {
		self.names.get(&slot).map(|name| name.as_str())
	}

	/// The assigned bindings, in assignment order.
	pub fn names(&self) -> impl Iterator<Item = (usize, &str)> {
		self.names.iter().map(|(&slot, name)| (slot, name.as_str()))
	}
}

/// Derives a placeholder local-variable name from a type descriptor: the readable type name's
/// last segment, lowercased, with array brackets dropped.
fn placeholder_name(desc: &str) -> Result<String> {
	let type_name = descriptor_to_type_name(desc)?;

	let base = type_name.trim_end_matches("[]");
	let base = base.rsplit('.').next().unwrap_or(base);

	Ok(base.to_lowercase())
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::LocalRenamer;

	#[test]
	fn slots_keep_their_first_name() {
		let mut renamer = LocalRenamer::new();
		assert_eq!(renamer.assign(1, "I", Some("count")).unwrap(), "count");
		assert_eq!(renamer.assign(1, "I", Some("other")).unwrap(), "count");
	}

	#[test]
	fn placeholders() {
		let mut renamer = LocalRenamer::new();
		assert_eq!(renamer.assign(0, "Lcom/example/FooBar;", None).unwrap(), "foobar");
		assert_eq!(renamer.assign(1, "[[I", None).unwrap(), "int");
		assert_eq!(renamer.assign(2, "I", None).unwrap(), "int2");
	}

	#[test]
	fn seeding_skips_captured_slots() {
		let mut enclosing = LocalRenamer::new();
		enclosing.assign(0, "Lcom/example/Foo;", Some("self")).unwrap();
		enclosing.assign(1, "I", Some("count")).unwrap();
		enclosing.assign(2, "J", Some("stamp")).unwrap();

		let seeded = LocalRenamer::seeded(&enclosing, 1);
		assert_eq!(seeded.get(0), None);
		assert_eq!(seeded.get(1), Some("count"));
		assert_eq!(seeded.get(2), Some("stamp"));
	}
}
