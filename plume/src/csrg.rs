//! Functions to read and write mappings in the CSRG and TSRG formats.
//!
//! CSRG is the columnar cousin of SRG: the line kind follows from the column count alone, and
//! every member row embeds its owner. TSRG folds the owner column away instead: an un-indented
//! row opens a class, a row with one leading tab belongs to the most recently opened class.
//! Both use `#` comments.
//!
//! CSRG reading/writing lives in [`read`]/[`write`] (and friends), the TSRG variant in
//! [`read_tsrg`]/[`write_tsrg`].

use std::fs::File;
use anyhow::{anyhow, bail, Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use indexmap::map::Entry;
use crate::error::MappingError;
use crate::lines::{Line, TokenLine};
use crate::tree::mappings::{ClassMapping, ClassNowodeMapping, DescriptorDef, FieldMapping, FieldNowodeMapping, MappingInfo, Mappings, MethodMapping, MethodNowodeMapping, PackageMapping, PackageNowodeMapping};
use crate::tree::names::{ClassName, Names, NamespaceInfo};
use crate::tree::{FromKey, NodeInfo, ToKey};

pub(crate) const COMMENT_CHAR: char = '#';

/// Reads a `.csrg` file, by opening the file given by the path.
pub fn read_file(path: impl AsRef<Path>) -> Result<Mappings> {
	read(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as csrg file", path.as_ref()))
}

/// Reads the CSRG format, from the given reader.
///
/// Package rows are the 2-column rows with a trailing slash on the first column. Member rows
/// may precede the class row of their owner; classes never named on their own row get an entry
/// carrying only the unmapped name.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use plume::tree::mappings::Mappings;
/// let string = "\
/// a/ com/example/
/// a com/example/Foo
/// a b count
/// a c (I)V setCount
/// ";
///
/// let reader = &mut string.as_bytes();
/// let mappings: Mappings = plume::csrg::read(reader).unwrap();
///
/// assert_eq!(mappings.packages.len(), 1);
/// assert_eq!(mappings.classes.len(), 1);
/// ```
pub fn read(reader: impl Read) -> Result<Mappings> {
	let mut mappings = Mappings::new(MappingInfo {
		namespaces: NamespaceInfo::Paired,
	});

	for (line_number, line) in BufReader::new(reader).lines().enumerate() {
		let line_number = line_number + 1;
		let Some(line) = TokenLine::new(line_number, &line?, COMMENT_CHAR)? else {
			continue;
		};

		(|| -> Result<()> {
			let first = line.first_field.as_str();
			match line.fields.as_slice() {
				[dst] if first.ends_with('/') => {
					let src = first.strip_suffix('/').unwrap_or(first);
					let dst = dst.strip_suffix('/').unwrap_or(dst);
					mappings.add_package(PackageNowodeMapping::new(PackageMapping {
						names: Names::pair(src.into(), Some(dst.into())),
					}))?;
				},
				[dst] => {
					declare_class(&mut mappings, ClassMapping {
						names: Names::pair(first.into(), Some(dst.as_str().into())),
					})?;
				},
				[src, dst] => {
					let class = class_entry(&mut mappings, ClassName::from(first));
					class.add_field(FieldNowodeMapping::new(FieldMapping {
						desc: None,
						names: Names::pair(src.as_str().into(), Some(dst.as_str().into())),
					}))?;
				},
				[src, desc, dst] => {
					let class = class_entry(&mut mappings, ClassName::from(first));
					class.add_method(MethodNowodeMapping::new(MethodMapping {
						desc: DescriptorDef::Unmapped(desc.as_str().into()),
						names: Names::pair(src.as_str().into(), Some(dst.as_str().into())),
					}))?;
				},
				_ => return Err(line.truncated()),
			}
			Ok(())
		})().with_context(|| anyhow!("in line {line_number}"))?;
	}

	Ok(mappings)
}

/// Reads a `.tsrg` file, by opening the file given by the path.
pub fn read_tsrg_file(path: impl AsRef<Path>) -> Result<Mappings> {
	read_tsrg(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as tsrg file", path.as_ref()))
}

#[allow(clippy::tabs_in_doc_comments)]
/// Reads the TSRG format, from the given reader.
///
/// A member row before any class row fails with
/// [`UnknownClassReference`][MappingError::UnknownClassReference].
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use plume::tree::mappings::Mappings;
/// let string = "\
/// a com/example/Foo
/// 	b count
/// 	c (I)V setCount
/// ";
///
/// let reader = &mut string.as_bytes();
/// let mappings: Mappings = plume::csrg::read_tsrg(reader).unwrap();
///
/// assert_eq!(mappings.classes.len(), 1);
/// assert_eq!(mappings.classes["a"].fields.len(), 1);
/// ```
pub fn read_tsrg(reader: impl Read) -> Result<Mappings> {
	let mut mappings = Mappings::new(MappingInfo {
		namespaces: NamespaceInfo::Paired,
	});

	let mut current: Option<ClassName> = None;

	for (line_number, line) in BufReader::new(reader).lines().enumerate() {
		let line_number = line_number + 1;
		let Some(line) = TokenLine::new(line_number, &line?, COMMENT_CHAR)? else {
			continue;
		};

		(|| -> Result<()> {
			let first = line.first_field.as_str();
			match line.get_indents() {
				0 => match line.fields.as_slice() {
					[dst] if first.ends_with('/') => {
						let src = first.strip_suffix('/').unwrap_or(first);
						let dst = dst.strip_suffix('/').unwrap_or(dst);
						mappings.add_package(PackageNowodeMapping::new(PackageMapping {
							names: Names::pair(src.into(), Some(dst.into())),
						}))?;
						current = None;
					},
					[dst] => {
						let class = mappings.add_class(ClassNowodeMapping::new(ClassMapping {
							names: Names::pair(first.into(), Some(dst.as_str().into())),
						}))?;
						current = Some(class.info.get_key()?);
					},
					_ => return Err(line.truncated()),
				},
				1 => {
					let owner = current.as_ref().ok_or_else(|| MappingError::UnknownClassReference {
						line: line.get_line_number(),
						class: first.to_owned(),
					})?;
					let class = mappings.classes.get_mut(owner)
						.with_context(|| anyhow!("no entry for class {owner:?}"))?;

					match line.fields.as_slice() {
						[dst] => {
							class.add_field(FieldNowodeMapping::new(FieldMapping {
								desc: None,
								names: Names::pair(first.into(), Some(dst.as_str().into())),
							}))?;
						},
						[desc, dst] => {
							class.add_method(MethodNowodeMapping::new(MethodMapping {
								desc: DescriptorDef::Unmapped(desc.as_str().into()),
								names: Names::pair(first.into(), Some(dst.as_str().into())),
							}))?;
						},
						_ => return Err(line.truncated()),
					}
				},
				depth => bail!("unexpected indentation {depth} in a tsrg file"),
			}
			Ok(())
		})().with_context(|| anyhow!("in line {line_number}"))?;
	}

	Ok(mappings)
}

fn declare_class(mappings: &mut Mappings, mapping: ClassMapping) -> Result<()> {
	match mappings.classes.entry(mapping.get_key()?) {
		Entry::Occupied(e) => {
			let class = e.into_mut();
			if class.info.names.names().iter().skip(1).all(Option::is_none) {
				class.info = mapping;
				Ok(())
			} else {
				Err(MappingError::DuplicateEntry { key: class.info.get_key()?.as_str().to_owned() })
					.with_context(|| anyhow!("second class row for {:?}", class.info))
			}
		},
		Entry::Vacant(e) => {
			e.insert(ClassNowodeMapping::new(mapping));
			Ok(())
		},
	}
}

fn class_entry(mappings: &mut Mappings, owner: ClassName) -> &mut ClassNowodeMapping {
	mappings.classes.entry(owner.clone())
		.or_insert_with(|| ClassNowodeMapping::new(ClassMapping::from_key(owner, 2)))
}

/// Writes the given mappings into a `String`, in the CSRG format.
pub fn write_string(mappings: &Mappings) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the CSRG format.
pub fn write_vec(mappings: &Mappings) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

/// Writes the given mappings into a `String`, in the TSRG format.
pub fn write_tsrg_string(mappings: &Mappings) -> Result<String> {
	let vec = write_tsrg_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the TSRG format.
pub fn write_tsrg_vec(mappings: &Mappings) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write_tsrg(mappings, &mut vec)?;
	Ok(vec)
}

fn both_names<'a>(names: &'a Names<impl AsRef<str>>) -> Result<(&'a str, &'a str)> {
	let src = names.names()[0].as_ref()
		.with_context(|| anyhow!("no unmapped name"))?
		.as_ref();
	let dst = names.names()[1].as_ref().map(|x| x.as_ref()).unwrap_or(src);
	Ok((src, dst))
}

fn unmapped_desc(desc: &DescriptorDef<impl AsRef<str>>) -> Result<&str> {
	match desc {
		DescriptorDef::Unmapped(d) => Ok(d.as_ref()),
		DescriptorDef::Both { unmapped, .. } => Ok(unmapped.as_ref()),
		_ => bail!("the csrg and tsrg formats require a descriptor in the unmapped namespace, got {:?}", desc.stored_namespace()),
	}
}

/// Writes the given mappings to the given writer, in the CSRG format.
///
/// Only paired collections can be written in this format. The lines are sorted, packages and
/// classes first.
pub fn write(mappings: &Mappings, w: &mut impl Write) -> Result<()> {
	if mappings.info.namespaces.is_namespaced() {
		bail!("cannot write a namespaced mapping collection in the csrg format");
	}

	let mut w = BufWriter::new(w);
	let w = &mut w;

	let mut packages: Vec<_> = mappings.packages.values().collect();
	packages.sort_by_key(|x| &x.info);
	for package in packages {
		let (src, dst) = both_names(&package.info.names)?;
		writeln!(w, "{src}/ {dst}/")?;
	}

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by_key(|x| &x.info);
	for class in &classes {
		let (src, dst) = both_names(&class.info.names)?;
		writeln!(w, "{src} {dst}")?;
	}

	for class in &classes {
		let (class_src, _) = both_names(&class.info.names)?;

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by_key(|x| &x.info);
		for field in fields {
			let (src, dst) = both_names(&field.info.names)?;
			writeln!(w, "{class_src} {src} {dst}")?;
		}

		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by_key(|x| &x.info);
		for method in methods {
			let (src, dst) = both_names(&method.info.names)?;
			let desc = unmapped_desc(&method.info.desc)?;
			writeln!(w, "{class_src} {src} {desc} {dst}")?;
		}
	}

	Ok(())
}

/// Writes the given mappings to the given writer, in the TSRG format.
///
/// Only paired collections can be written in this format. The lines are sorted.
pub fn write_tsrg(mappings: &Mappings, w: &mut impl Write) -> Result<()> {
	if mappings.info.namespaces.is_namespaced() {
		bail!("cannot write a namespaced mapping collection in the tsrg format");
	}

	let mut w = BufWriter::new(w);
	let w = &mut w;

	let mut packages: Vec<_> = mappings.packages.values().collect();
	packages.sort_by_key(|x| &x.info);
	for package in packages {
		let (src, dst) = both_names(&package.info.names)?;
		writeln!(w, "{src}/ {dst}/")?;
	}

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by_key(|x| &x.info);
	for class in classes {
		let (src, dst) = both_names(&class.info.names)?;
		writeln!(w, "{src} {dst}")?;

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by_key(|x| &x.info);
		for field in fields {
			let (src, dst) = both_names(&field.info.names)?;
			writeln!(w, "\t{src} {dst}")?;
		}

		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by_key(|x| &x.info);
		for method in methods {
			let (src, dst) = both_names(&method.info.names)?;
			let desc = unmapped_desc(&method.info.desc)?;
			writeln!(w, "\t{src} {desc} {dst}")?;
		}
	}

	Ok(())
}
