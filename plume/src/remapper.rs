//! Remappers for remapping class names, descriptors, fields and methods.
//!
//! For remapping just classes and descriptors, you're interested in [`ClassRemapper`].
//! If you also want to remap field names and method names, use the [`MemberRemapper`].
//!
//! Note that implementors of these traits can be created by the methods
//! [`Mappings::remapper`] and [`Mappings::remapper_full`] for remapping
//! between given namespaces.
//!
//! In case you want to implement a remapper yourself, you only need to define the trait methods
//! that don't have a default implementation.
//!
//! # What is a "remapper"?
//! A remapper answers the question for you "what is the name of X in namespace Y?"

use std::hash::{Hash, Hasher};
use anyhow::{bail, Result};
use indexmap::IndexMap;
use crate::descriptor::{FieldDescriptor, MethodDescriptor};
use crate::error::MappingError;
use crate::tree::hierarchy::SuperClassProvider;
use crate::tree::mappings::{DescriptorDef, Mappings};
use crate::tree::names::{ClassName, FieldName, MethodName, Namespace};

/// Unmapped name prefixes of compiler-generated members. These are never inherited, so a name
/// carrying one ends an ancestor search early.
const SYNTHETIC_PREFIXES: [&str; 2] = ["lambda$", "access$"];

fn is_synthetic(name: &str) -> bool {
	SYNTHETIC_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// A remapper supporting remapping of class names and descriptors.
pub trait ClassRemapper {
	/// Maps a class name to a new one, if the mapping exists.
	///
	/// If the mapping doesn't exist, returns `Ok(None)`.
	fn map_class_fail(&self, class: &str) -> Result<Option<ClassName>>;

	/// The inverse direction: finds the unmapped name of an already-mapped class name, if the
	/// mapping exists.
	fn unmap_class_fail(&self, class: &str) -> Result<Option<ClassName>>;

	/// Maps a class name to a new one, if the mapping doesn't exist, return the old one.
	///
	/// Unknown classes (JDK and other external ones) pass through unchanged on purpose.
	///
	/// Do not implement this yourself.
	fn map_class(&self, class: &str) -> Result<ClassName> {
		Ok(self.map_class_fail(class)?.unwrap_or_else(|| ClassName::from(class)))
	}

	/// Like [`Self::map_class`], in the inverse direction.
	///
	/// Do not implement this yourself.
	fn unmap_class(&self, class: &str) -> Result<ClassName> {
		Ok(self.unmap_class_fail(class)?.unwrap_or_else(|| ClassName::from(class)))
	}

	/// Maps a field descriptor to a new one.
	///
	/// Note that this relies on the fact that for non-existing class mappings class names are
	/// just copied over.
	///
	/// Do not implement this yourself.
	fn map_field_desc(&self, desc: &str) -> Result<FieldDescriptor> {
		map_desc(self, desc).map(FieldDescriptor::from)
	}

	/// Maps a method descriptor to a new one.
	///
	/// Note that this relies on the fact that for non-existing class mappings class names are
	/// just copied over.
	///
	/// Do not implement this yourself.
	fn map_method_desc(&self, desc: &str) -> Result<MethodDescriptor> {
		// the most common descriptor by far, and it never contains a class name
		if desc == "()V" {
			return Ok(MethodDescriptor::from("()V"));
		}
		map_desc(self, desc).map(MethodDescriptor::from)
	}

	/// Rewrites a method descriptor written in mapped names back into unmapped names, through the
	/// inverse class table.
	///
	/// Do not implement this yourself.
	fn map_method_desc_to_unmapped(&self, desc: &str) -> Result<MethodDescriptor> {
		if desc == "()V" {
			return Ok(MethodDescriptor::from("()V"));
		}
		map_desc(&InverseView(self), desc).map(MethodDescriptor::from)
	}
}

/// A view of a remapper with both directions exchanged.
struct InverseView<'a, R: ?Sized>(&'a R);

impl<R: ClassRemapper + ?Sized> ClassRemapper for InverseView<'_, R> {
	fn map_class_fail(&self, class: &str) -> Result<Option<ClassName>> {
		self.0.unmap_class_fail(class)
	}

	fn unmap_class_fail(&self, class: &str) -> Result<Option<ClassName>> {
		self.0.map_class_fail(class)
	}
}

/// Maps every `L`...`;` class name inside a descriptor.
fn map_desc(remapper: &(impl ClassRemapper + ?Sized), desc: &str) -> Result<String> {
	let mut s = String::new();

	let mut iter = desc.chars();

	while let Some(ch) = iter.next() {
		s.push(ch);

		if ch == 'L' {
			let mut class_name = String::new();
			let mut terminated = false;
			for ch in iter.by_ref() {
				if ch == ';' {
					terminated = true;
					break;
				}
				class_name.push(ch);
			}
			if !terminated {
				return Err(MappingError::MalformedDescriptor {
					input: desc.to_owned(),
					reason: "has a missing semicolon somewhere".to_owned(),
				}.into());
			}

			let new_class_name = remapper.map_class(&class_name)?;

			s.push_str(new_class_name.as_str());
			s.push(';');
		}
	}

	Ok(s)
}

struct FnRemapper<F>(F);

impl<F: Fn(&str) -> Option<String>> ClassRemapper for FnRemapper<F> {
	fn map_class_fail(&self, class: &str) -> Result<Option<ClassName>> {
		Ok((self.0)(class).map(ClassName::from))
	}

	fn unmap_class_fail(&self, _class: &str) -> Result<Option<ClassName>> {
		Ok(None)
	}
}

/// Rewrites every class name occurring in a descriptor through the given table; names absent
/// from it are kept.
pub(crate) fn rewrite_descriptor(desc: &str, map: impl Fn(&str) -> Option<String>) -> Result<String> {
	map_desc(&FnRemapper(map), desc)
}

/// A [`ClassRemapper`] backed by the class table of a mapping collection, created by
/// [`Mappings::remapper`].
#[derive(Debug)]
pub struct SimpleRemapper<'a> {
	classes: IndexMap<&'a str, &'a ClassName>,
	inverse: IndexMap<&'a str, &'a ClassName>,
}

impl ClassRemapper for SimpleRemapper<'_> {
	fn map_class_fail(&self, class: &str) -> Result<Option<ClassName>> {
		Ok(self.classes.get(class).map(|&class| class.clone()))
	}

	fn unmap_class_fail(&self, class: &str) -> Result<Option<ClassName>> {
		Ok(self.inverse.get(class).map(|&class| class.clone()))
	}
}

/// The key a method candidate is indexed by: its name and descriptor, both written in the
/// remapper's `from` namespace.
#[derive(Debug, PartialEq, Eq)]
struct MethodIndexKey<'a>(&'a str, String);

impl Hash for MethodIndexKey<'_> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.0.hash(state);
		self.1.as_str().hash(state);
	}
}

/// A borrowed lookup key, so that [`MemberRemapper::map_method_fail`] doesn't allocate.
#[derive(Debug, PartialEq, Eq, Hash)]
struct MethodQuery<'q>(&'q str, &'q str);

impl indexmap::Equivalent<MethodIndexKey<'_>> for MethodQuery<'_> {
	fn equivalent(&self, key: &MethodIndexKey<'_>) -> bool {
		self.0 == key.0 && self.1 == key.1.as_str()
	}
}

#[derive(Debug)]
struct MethodTarget<'a> {
	name: &'a MethodName,
	desc: MethodDescriptor,
}

#[derive(Debug)]
struct FullRemapperClass<'a> {
	name: &'a ClassName,
	fields: IndexMap<&'a str, &'a FieldName>,
	methods: IndexMap<MethodIndexKey<'a>, MethodTarget<'a>>,
}

/// A remapper supporting remapping fields and methods, as well as class names and descriptors,
/// created by [`Mappings::remapper_full`].
///
/// If you only want to remap class names and descriptors, consider using [`SimpleRemapper`]
/// instead.
#[derive(Debug)]
pub struct FullRemapper<'a, 'i, I> {
	classes: IndexMap<&'a str, FullRemapperClass<'a>>,
	inverse: IndexMap<&'a str, &'a ClassName>,
	inheritance: &'i I,
}

impl<I> ClassRemapper for FullRemapper<'_, '_, I> {
	fn map_class_fail(&self, class: &str) -> Result<Option<ClassName>> {
		Ok(self.classes.get(class).map(|class| class.name.clone()))
	}

	fn unmap_class_fail(&self, class: &str) -> Result<Option<ClassName>> {
		Ok(self.inverse.get(class).map(|&class| class.clone()))
	}
}

/// A remapper supporting remapping fields and methods, as well as class names and descriptors.
pub trait MemberRemapper: ClassRemapper {
	/// Maps a field name to a new one, if the mapping exists: a direct hit on the owner first,
	/// then the hierarchy walk.
	///
	/// If the mapping doesn't exist, returns `Ok(None)`. Two distinct candidates on unrelated
	/// ancestor branches fail with
	/// [`AmbiguousInheritedSymbol`][MappingError::AmbiguousInheritedSymbol].
	fn map_field_fail(&self, owner: &str, field_name: &str) -> Result<Option<FieldName>>;

	/// Maps a field name to a new one, if the mapping doesn't exist returns the old name.
	///
	/// Do not implement this yourself.
	fn map_field(&self, owner: &str, field_name: &str) -> Result<FieldName> {
		Ok(self.map_field_fail(owner, field_name)?
			.unwrap_or_else(|| FieldName::from(field_name)))
	}

	/// Maps a method name and method descriptor to new ones, if the mapping exists. The
	/// descriptor must be written in the remapper's `from` namespace.
	///
	/// If the mapping doesn't exist, returns `Ok(None)`.
	///
	/// Note that in the `None` case you must map the method descriptor manually. See
	/// [`Self::map_method`] for a method that just takes the old name if no mapping exists (but
	/// yet maps the method descriptor).
	fn map_method_fail(&self, owner: &str, method_name: &str, method_desc: &str) -> Result<Option<(MethodName, MethodDescriptor)>>;

	/// Maps a method name and method descriptor to new ones, if the mapping doesn't exist
	/// returns the old name with a mapped descriptor.
	///
	/// Constructors and static initializers keep their names without any lookup.
	///
	/// Do not implement this yourself.
	fn map_method(&self, owner: &str, method_name: &str, method_desc: &str) -> Result<(MethodName, MethodDescriptor)> {
		if method_name == "<init>" || method_name == "<clinit>" {
			return Ok((MethodName::from(method_name), self.map_method_desc(method_desc)?));
		}
		self.map_method_fail(owner, method_name, method_desc)?
			.map(Ok)
			.unwrap_or_else(|| Ok((
				MethodName::from(method_name),
				self.map_method_desc(method_desc)?,
			)))
	}
}

impl<I: SuperClassProvider> MemberRemapper for FullRemapper<'_, '_, I> {
	fn map_field_fail(&self, owner: &str, field_name: &str) -> Result<Option<FieldName>> {
		let Some(class) = self.classes.get(owner) else {
			// an ancestor outside the mapping index ends this branch
			return Ok(None);
		};

		if let Some(&name) = class.fields.get(field_name) {
			return Ok(Some(name.clone()));
		}

		if is_synthetic(field_name) {
			return Ok(None);
		}

		let mut found: Option<FieldName> = None;
		if let Some(super_classes) = self.inheritance.get_super_classes(owner)? {
			for super_class in super_classes {
				if let Some(remapped) = self.map_field_fail(super_class.as_str(), field_name)? {
					match &found {
						None => found = Some(remapped),
						Some(first) if *first == remapped => {},
						Some(first) => return Err(MappingError::AmbiguousInheritedSymbol {
							owner: owner.to_owned(),
							name: field_name.to_owned(),
							desc: String::new(),
							first: first.as_str().to_owned(),
							second: remapped.as_str().to_owned(),
						}.into()),
					}
				}
			}
		}

		Ok(found)
	}

	fn map_method_fail(&self, owner: &str, method_name: &str, method_desc: &str) -> Result<Option<(MethodName, MethodDescriptor)>> {
		if method_name == "<init>" || method_name == "<clinit>" {
			return Ok(None);
		}

		let Some(class) = self.classes.get(owner) else {
			return Ok(None);
		};

		let query = MethodQuery(method_name, method_desc);
		if let Some(target) = class.methods.get(&query) {
			return Ok(Some((target.name.clone(), target.desc.clone())));
		}

		if is_synthetic(method_name) {
			return Ok(None);
		}

		let mut found: Option<(MethodName, MethodDescriptor)> = None;
		if let Some(super_classes) = self.inheritance.get_super_classes(owner)? {
			for super_class in super_classes {
				if let Some(remapped) = self.map_method_fail(super_class.as_str(), method_name, method_desc)? {
					match &found {
						None => found = Some(remapped),
						Some(first) if *first == remapped => {},
						Some(first) => return Err(MappingError::AmbiguousInheritedSymbol {
							owner: owner.to_owned(),
							name: method_name.to_owned(),
							desc: method_desc.to_owned(),
							first: first.0.as_str().to_owned(),
							second: remapped.0.as_str().to_owned(),
						}.into()),
					}
				}
			}
		}

		Ok(found)
	}
}

impl Mappings {
	/// The class name translation table between two namespaces; classes missing a name on
	/// either side don't take part.
	fn class_names_table(&self, from: Namespace, to: Namespace) -> IndexMap<&str, &str> {
		let mut table = IndexMap::new();
		for class in self.classes.values() {
			if let (Some(from), Some(to)) = (&class.info.names[from], &class.info.names[to]) {
				table.insert(from.as_str(), to.as_str());
			}
		}
		table
	}

	fn check_namespace_bounds(&self, from: Namespace, to: Namespace) -> Result<()> {
		let width = self.width();
		if from.id() >= width || to.id() >= width {
			bail!("namespaces {from:?} and {to:?} must both be within the collection width {width}");
		}
		Ok(())
	}

	/// Creates a remapper for class names and descriptors, between the two given namespaces.
	/// Paired collections use `Namespace(0)` and `Namespace(1)` here.
	pub fn remapper(&self, from: Namespace, to: Namespace) -> Result<SimpleRemapper<'_>> {
		self.check_namespace_bounds(from, to)?;

		let mut classes = IndexMap::new();
		let mut inverse = IndexMap::new();
		for class in self.classes.values() {
			if let (Some(from), Some(to)) = (&class.info.names[from], &class.info.names[to]) {
				classes.insert(from.as_str(), to);
				inverse.insert(to.as_str(), from);
			}
		}
		Ok(SimpleRemapper { classes, inverse })
	}

	/// Creates a remapper for fields and methods as well as class names and descriptors,
	/// between the two given namespaces, resolving inherited members through the given
	/// [`SuperClassProvider`].
	///
	/// All lookup indices are built here, once; afterwards the remapper only reads them, so
	/// sharing it between lookups is free. Member descriptors are normalized into the `from`
	/// namespace at this point, whichever namespace the format stored them in.
	pub fn remapper_full<'i, I: SuperClassProvider>(&self, from: Namespace, to: Namespace, inheritance: &'i I) -> Result<FullRemapper<'_, 'i, I>> {
		self.check_namespace_bounds(from, to)?;

		let width = self.width();
		let tables_from: Vec<IndexMap<&str, &str>> = (0..width)
			.map(|x| self.class_names_table(Namespace(x), from))
			.collect();
		let tables_to: Vec<IndexMap<&str, &str>> = (0..width)
			.map(|x| self.class_names_table(Namespace(x), to))
			.collect();

		let rewrite = |tables: &[IndexMap<&str, &str>], stored: Namespace, desc: &str| -> Result<String> {
			rewrite_descriptor(desc, |class| tables[stored.id()].get(class).map(|&x| x.to_owned()))
		};

		let mut classes = IndexMap::new();
		let mut inverse = IndexMap::new();
		for class in self.classes.values() {
			if let (Some(name_from), Some(name_to)) = (&class.info.names[from], &class.info.names[to]) {
				let mut fields = IndexMap::new();
				for field in class.fields.values() {
					if let (Some(name_from), Some(name_to)) = (&field.info.names[from], &field.info.names[to]) {
						fields.insert(name_from.as_str(), name_to);
					}
				}

				let mut methods = IndexMap::new();
				for method in class.methods.values() {
					if let (Some(name_from), Some(name_to)) = (&method.info.names[from], &method.info.names[to]) {
						let stored = stored_namespace_for(&method.info.desc, width)?;
						let desc = method.info.desc.stored().as_str();

						let desc_from = rewrite(&tables_from, stored, desc)?;
						let desc_to = MethodDescriptor::from(rewrite(&tables_to, stored, desc)?);

						methods.insert(
							MethodIndexKey(name_from.as_str(), desc_from),
							MethodTarget { name: name_to, desc: desc_to },
						);
					}
				}

				classes.insert(name_from.as_str(), FullRemapperClass { name: name_to, fields, methods });
				inverse.insert(name_to.as_str(), name_from);
			}
		}
		Ok(FullRemapper { classes, inverse, inheritance })
	}
}

fn stored_namespace_for(desc: &DescriptorDef<MethodDescriptor>, width: usize) -> Result<Namespace> {
	let stored = desc.stored_namespace();
	if stored.id() >= width {
		bail!("descriptor {desc:?} is tagged with a namespace outside the collection width {width}");
	}
	Ok(stored)
}
