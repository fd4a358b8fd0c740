//! Name newtypes and the per-namespace name storage.

use std::fmt::{Debug, Formatter};
use std::ops::{Index, IndexMut};
use anyhow::{anyhow, bail, Context, Error, Result};
use crate::error::MappingError;

macro_rules! make_name_type {
	(
		$( #[$doc:meta] )*
		$name:ident
	) => {
		$( #[$doc] )*
		#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
		pub struct $name(String);

		impl $name {
			pub fn as_str(&self) -> &str {
				&self.0
			}

			pub fn into_inner(self) -> String {
				self.0
			}
		}

		impl From<String> for $name {
			fn from(s: String) -> $name {
				$name(s)
			}
		}

		impl From<&str> for $name {
			fn from(s: &str) -> $name {
				$name(s.to_owned())
			}
		}

		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}

		impl std::borrow::Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}

		impl std::fmt::Debug for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				write!(f, concat!(stringify!($name), "({:?})"), self.0)
			}
		}

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				write!(f, "{}", self.0)
			}
		}
	};
}

make_name_type!(
	/// A class name in internal (slash-separated) form, e.g. `java/lang/Object`.
	ClassName
);
make_name_type!(
	/// A package name in internal form, e.g. `com/example`.
	PackageName
);
make_name_type!(FieldName);
make_name_type!(MethodName);
make_name_type!(ParameterName);

pub(crate) use make_name_type;

/// Describes a given namespace of a namespaced mapping collection.
///
/// This object exists to remove out of bounds checks. If it was obtained from
/// [`Namespaces::get_namespace`] or checked by [`Namespace::new`] against the collection width,
/// no range checking is necessary at the use site.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace(pub(crate) usize);

impl Namespace {
	pub fn new(id: usize, width: usize) -> Result<Namespace> {
		if id >= width {
			bail!("cannot create namespace with id larger or equal to the collection width: {id} >= {width}");
		}
		Ok(Namespace(id))
	}

	pub fn id(&self) -> usize {
		self.0
	}
}

/// The ordered, named namespaces declared by a namespaced mapping collection.
///
/// The first namespace is the unmapped/obfuscated one. Names are unique and non-empty, and the
/// declaration order is meaningful: it is the column order of namespaced formats.
#[derive(Clone, PartialEq, Eq)]
pub struct Namespaces {
	names: Vec<String>,
}

impl Index<Namespace> for Namespaces {
	type Output = String;

	fn index(&self, index: Namespace) -> &String {
		&self.names[index.0]
	}
}

impl Namespaces {
	pub fn names(&self) -> &[String] {
		&self.names
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	pub fn get_namespace(&self, name: &str) -> Result<Namespace> {
		for (id, namespace) in self.names.iter().enumerate() {
			if namespace == name {
				return Ok(Namespace(id));
			}
		}
		bail!("cannot find namespace with name {name:?}, only got {self:?}");
	}

	/// Returns an error if the names of `self` aren't the names given in the argument.
	/// This can be used to check that after reading mappings, you have the correct namespaces.
	pub fn check_that<const N: usize>(&self, names: [&str; N]) -> Result<()> {
		if self.names != names {
			bail!("expected namespaces {names:?}, got {self:?}");
		}
		Ok(())
	}

	/// The namespace to translate into when the caller names none.
	///
	/// With exactly one namespace besides the unmapped one, that one is picked. With more, the
	/// choice is ambiguous and this fails with [`MappingError::TargetNamespaceRequired`].
	pub fn target_namespace(&self) -> Result<Namespace> {
		match self.names.len() {
			2 => Ok(Namespace(1)),
			_ => Err(MappingError::TargetNamespaceRequired.into()),
		}
	}
}

impl Debug for Namespaces {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_list()
			.entries(&self.names)
			.finish()
	}
}

impl TryFrom<Vec<String>> for Namespaces {
	type Error = Error;

	fn try_from(value: Vec<String>) -> Result<Namespaces> {
		if value.len() < 2 {
			bail!("expected at least two namespaces, got {value:?}");
		}
		if value.iter().any(|i| i.is_empty()) {
			bail!("found empty namespace name in {value:?}, every namespace name must be non-empty");
		}
		for (id, name) in value.iter().enumerate() {
			if value[..id].contains(name) {
				bail!("namespace name {name:?} declared twice in {value:?}");
			}
		}

		Ok(Namespaces { names: value })
	}
}

impl From<Namespaces> for Vec<String> {
	fn from(value: Namespaces) -> Vec<String> {
		value.names
	}
}

/// Whether a collection is a plain unmapped→mapped table or declares namespaces.
///
/// This is the shape distinction behind the
/// [`UnsupportedOperationOnShape`][MappingError::UnsupportedOperationOnShape] errors: reversing
/// only exists on paired collections, namespace swapping only on namespaced ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceInfo {
	/// Two columns, unmapped and mapped, with no declared namespace names.
	Paired,
	/// As many columns as there are declared namespaces.
	Namespaced(Namespaces),
}

impl NamespaceInfo {
	/// The number of name columns every entry of the collection carries.
	pub fn width(&self) -> usize {
		match self {
			NamespaceInfo::Paired => 2,
			NamespaceInfo::Namespaced(namespaces) => namespaces.len(),
		}
	}

	pub fn is_namespaced(&self) -> bool {
		matches!(self, NamespaceInfo::Namespaced(_))
	}

	pub(crate) fn shape_name(&self) -> &'static str {
		match self {
			NamespaceInfo::Paired => "paired",
			NamespaceInfo::Namespaced(_) => "namespaced",
		}
	}
}

/// Per-namespace names of one mapping entry.
///
/// Invariants: the width is at least `2` and matches the collection's
/// [`NamespaceInfo::width`]; present names are non-empty (empty input strings normalize to
/// `None`).
#[derive(Clone, PartialEq, PartialOrd, Eq, Ord)]
pub struct Names<T> {
	names: Vec<Option<T>>,
}

impl<T> Index<Namespace> for Names<T> {
	type Output = Option<T>;

	fn index(&self, index: Namespace) -> &Option<T> {
		&self.names[index.0]
	}
}

impl<T> IndexMut<Namespace> for Names<T> {
	fn index_mut(&mut self, index: Namespace) -> &mut Option<T> {
		&mut self.names[index.0]
	}
}

impl<T> Names<T> {
	/// An unmapped→mapped pair, the only width the paired shape allows.
	pub fn pair(src: T, dst: Option<T>) -> Names<T> {
		Names { names: vec![Some(src), dst] }
	}

	pub fn from_first_name(src: T, width: usize) -> Names<T> {
		let mut names: Vec<Option<T>> = std::iter::repeat_with(|| None).take(width.max(2)).collect();
		names[0] = Some(src);
		Names { names }
	}

	/// The name in the first (unmapped) namespace; entries are keyed by it.
	pub fn first_name(&self) -> Result<&T> where T: Debug {
		self.names.first()
			.context("zero-width names cannot exist")?
			.as_ref()
			.with_context(|| anyhow!("no name for the first namespace: {self:?}"))
	}

	pub fn names(&self) -> &[Option<T>] {
		&self.names
	}

	pub fn width(&self) -> usize {
		self.names.len()
	}

	/// Exchanges the names stored under the two namespaces.
	pub fn swap(&mut self, a: Namespace, b: Namespace) {
		self.names.swap(a.0, b.0);
	}

	pub(crate) fn map<U>(self, f: impl Fn(T) -> U) -> Names<U> {
		Names { names: self.names.into_iter().map(|x| x.map(&f)).collect() }
	}

	pub(crate) fn try_map<U>(self, f: impl Fn(T) -> Result<U>) -> Result<Names<U>> {
		let names = self.names.into_iter()
			.map(|x| x.map(&f).transpose())
			.collect::<Result<Vec<Option<U>>>>()?;
		Ok(Names { names })
	}
}

impl<T: Debug> Debug for Names<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_list()
			.entries(&self.names)
			.finish()
	}
}

/// Note that empty inputs are converted into `None`.
impl<T> From<Vec<T>> for Names<T> where T: AsRef<str> {
	fn from(value: Vec<T>) -> Names<T> {
		let names = value.into_iter()
			.map(|x| if x.as_ref().is_empty() { None } else { Some(x) })
			.collect();
		Names { names }
	}
}

impl<T> TryFrom<Vec<Option<T>>> for Names<T> where T: AsRef<str> + Debug {
	type Error = Error;

	fn try_from(value: Vec<Option<T>>) -> Result<Names<T>> {
		if value.len() < 2 {
			bail!("names need at least two namespaces, got {value:?}");
		}
		if value.iter().any(|i| i.as_ref().is_some_and(|i| i.as_ref().is_empty())) {
			bail!("cannot create names where an existing name is an empty string: {value:?}");
		}

		Ok(Names { names: value })
	}
}

impl<T> From<Names<T>> for Vec<Option<T>> {
	fn from(value: Names<T>) -> Vec<Option<T>> {
		value.names
	}
}
