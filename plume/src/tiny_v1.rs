//! Functions to read and write mappings in the "Tiny v1" format.
//!
//! Unlike tiny v2, this format is tabular: `CLASS`, `FIELD` and `METHOD` rows stand on their
//! own, members naming their owner by its unmapped class name. There is no nesting and no
//! comments. Unknown row kinds are skipped.

use std::fs::File;
use anyhow::{anyhow, bail, Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use indexmap::map::Entry;
use crate::error::MappingError;
use crate::lines::TabLine;
use crate::tree::mappings::{ClassMapping, ClassNowodeMapping, DescriptorDef, FieldMapping, FieldNowodeMapping, MappingInfo, Mappings, MethodMapping, MethodNowodeMapping};
use crate::tree::names::{ClassName, FieldName, MethodName, Names, Namespace, NamespaceInfo};
use crate::tree::{FromKey, NodeInfo, ToKey};

/// Reads a `.tiny` file (tiny v1), by opening the file given by the path.
pub fn read_file(path: impl AsRef<Path>) -> Result<Mappings> {
	read(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as tiny v1 file", path.as_ref()))
}

#[allow(clippy::tabs_in_doc_comments)]
/// Reads the tiny v1 format, from the given reader.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use plume::tree::mappings::Mappings;
/// let string = "\
/// v1	official	named
/// CLASS	a	com/example/Foo
/// FIELD	a	I	b	count
/// METHOD	a	(I)V	c	setCount
/// ";
///
/// let reader = &mut string.as_bytes();
/// let mappings: Mappings = plume::tiny_v1::read(reader).unwrap();
///
/// assert_eq!(mappings.classes.len(), 1);
/// assert_eq!(mappings.classes["a"].fields.len(), 1);
/// assert_eq!(mappings.classes["a"].methods.len(), 1);
/// ```
pub fn read(reader: impl Read) -> Result<Mappings> {
	let mut lines = BufReader::new(reader)
		.lines()
		.enumerate()
		.map(|(line_number, line)| -> Result<TabLine> {
			TabLine::new(line_number + 1, &line?)
		});

	let header = lines.next().context("no header line")??;

	if header.first_field != "v1" {
		bail!("header version isn't tiny v1, in line {header:?}");
	}

	let namespaces = header.into_namespaces()?;
	let width = namespaces.len();

	let mut mappings = Mappings::new(MappingInfo {
		namespaces: NamespaceInfo::Namespaced(namespaces),
	});

	for line in lines {
		let mut line = line?;

		match line.first_field.as_str() {
			"CLASS" => {
				let names = line.into_names_exact::<String>(width)?.map(ClassName::from);
				declare_class(&mut mappings, ClassMapping { names })?;
			},
			"FIELD" => {
				let owner = ClassName::from(line.next()?);
				let desc = if line.remaining() == width + 1 {
					Some(DescriptorDef::Namespaced {
						namespace: Namespace(0),
						desc: line.next()?.into(),
					})
				} else {
					// some tools leave the descriptor column out on fields
					None
				};
				let names = line.into_names_exact::<String>(width)?.map(FieldName::from);

				let class = class_entry(&mut mappings, owner, width);
				class.add_field(FieldNowodeMapping::new(FieldMapping { desc, names }))?;
			},
			"METHOD" => {
				let owner = ClassName::from(line.next()?);
				let desc = DescriptorDef::Namespaced {
					namespace: Namespace(0),
					desc: line.next()?.into(),
				};
				let names = line.into_names_exact::<String>(width)?.map(MethodName::from);

				let class = class_entry(&mut mappings, owner, width);
				class.add_method(MethodNowodeMapping::new(MethodMapping { desc, names }))?;
			},
			_ => {}, // unknown row kinds are skipped
		}
	}

	Ok(mappings)
}

/// Inserts a `CLASS` row, also accepting one that completes a stub created by an earlier member
/// row. A second `CLASS` row with actual names is a duplicate.
fn declare_class(mappings: &mut Mappings, mapping: ClassMapping) -> Result<()> {
	match mappings.classes.entry(mapping.get_key()?) {
		Entry::Occupied(e) => {
			let class = e.into_mut();
			if class.info.names.names().iter().skip(1).all(Option::is_none) {
				class.info = mapping;
				Ok(())
			} else {
				Err(MappingError::DuplicateEntry { key: class.info.get_key()?.as_str().to_owned() })
					.with_context(|| anyhow!("second CLASS row for {:?}", class.info))
			}
		},
		Entry::Vacant(e) => {
			e.insert(ClassNowodeMapping::new(mapping));
			Ok(())
		},
	}
}

fn class_entry(mappings: &mut Mappings, owner: ClassName, width: usize) -> &mut ClassNowodeMapping {
	mappings.classes.entry(owner.clone())
		.or_insert_with(|| ClassNowodeMapping::new(ClassMapping::from_key(owner, width)))
}

/// Writes the given mappings into a `String`, in the tiny v1 format.
pub fn write_string(mappings: &Mappings) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the tiny v1 format.
pub fn write_vec(mappings: &Mappings) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

fn write_names(w: &mut impl Write, names: &Names<impl AsRef<str>>) -> Result<()> {
	for name in names.names() {
		let name = name.as_ref().map(|x| x.as_ref()).unwrap_or("");
		write!(w, "\t{name}")?;
	}
	writeln!(w)?;
	Ok(())
}

/// Writes the given mappings to the given writer, in the tiny v1 format.
///
/// Only namespaced collections can be written in this format. Javadoc and parameters have no
/// place in tiny v1 and are dropped. The classes, fields and methods are sorted.
pub fn write(mappings: &Mappings, w: &mut impl Write) -> Result<()> {
	let NamespaceInfo::Namespaced(ref namespaces) = mappings.info.namespaces else {
		bail!("cannot write a paired mapping collection in the tiny v1 format");
	};

	let mut w = BufWriter::new(w);
	let w = &mut w;

	write!(w, "v1")?;
	for namespace in namespaces.names() {
		write!(w, "\t{namespace}")?;
	}
	writeln!(w)?;

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by_key(|x| &x.info);
	for class in &classes {
		write!(w, "CLASS")?;
		write_names(w, &class.info.names)?;
	}

	for class in &classes {
		let owner = class.info.get_key()?;

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by_key(|x| &x.info);
		for field in fields {
			write!(w, "FIELD\t{owner}")?;
			if let Some(ref desc) = field.info.desc {
				write!(w, "\t{}", desc.stored().as_str())?;
			}
			write_names(w, &field.info.names)?;
		}

		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by_key(|x| &x.info);
		for method in methods {
			write!(w, "METHOD\t{owner}\t{}", method.info.desc.stored().as_str())?;
			write_names(w, &method.info.names)?;
		}
	}

	Ok(())
}
