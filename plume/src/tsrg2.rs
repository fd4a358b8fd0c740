//! Functions to read and write mappings in the TSRG2 format.
//!
//! TSRG2 is the namespaced, hierarchical successor of TSRG: a `tsrg2 ns…` header declares the
//! namespaces, class rows carry one name per namespace, members sit one tab deep, and method
//! sub-entries (two tabs deep) record `static` markers and parameter names.

use std::fs::File;
use anyhow::{anyhow, bail, Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use crate::error::MappingError;
use crate::lines::{Line, TokenLine};
use crate::tree::mappings::{ClassMapping, ClassNowodeMapping, DescriptorDef, FieldMapping, FieldNowodeMapping, MappingInfo, Mappings, MethodKey, MethodMapping, MethodNowodeMapping, ParameterMapping, ParameterNowodeMapping};
use crate::tree::names::{ClassName, FieldName, MethodName, Names, Namespace, NamespaceInfo, Namespaces, ParameterName};
use crate::tree::{NodeInfo, ToKey};

pub(crate) const HEADER_PREFIX: &str = "tsrg2 ";

/// Reads a `.tsrg` file (v2), by opening the file given by the path.
pub fn read_file(path: impl AsRef<Path>) -> Result<Mappings> {
	read(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as tsrg2 file", path.as_ref()))
}

#[allow(clippy::tabs_in_doc_comments)]
/// Reads the TSRG2 format, from the given reader.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use plume::tree::mappings::Mappings;
/// let string = "\
/// tsrg2 obf srg id
/// a com/example/Foo net/minecraft/Foo_
/// 	b count f_1_
/// 	c (I)V setCount m_1_
/// 		static
/// 		0 i value p_1_
/// ";
///
/// let reader = &mut string.as_bytes();
/// let mappings: Mappings = plume::tsrg2::read(reader).unwrap();
///
/// let method = &mappings.classes["a"].methods.values().next().unwrap();
/// assert!(method.is_static);
/// assert_eq!(method.parameters.len(), 1);
/// ```
pub fn read(reader: impl Read) -> Result<Mappings> {
	let mut lines = BufReader::new(reader)
		.lines()
		.enumerate();

	let (_, header) = lines.next().context("no header line")?;
	let header = header?;
	let Some(namespaces) = header.strip_prefix(HEADER_PREFIX) else {
		bail!("header isn't tsrg2, in line {header:?}");
	};
	let namespaces: Namespaces = namespaces.split(' ')
		.map(|x| x.to_owned())
		.collect::<Vec<String>>()
		.try_into()?;
	let width = namespaces.len();

	let mut mappings = Mappings::new(MappingInfo {
		namespaces: NamespaceInfo::Namespaced(namespaces),
	});

	let mut current_class: Option<ClassName> = None;
	let mut current_method: Option<MethodKey> = None;

	for (line_number, line) in lines {
		let line_number = line_number + 1;
		// tsrg2 has no comment syntax
		let Some(line) = TokenLine::new(line_number, &line?, '\0')? else {
			continue;
		};

		(|| -> Result<()> {
			match line.get_indents() {
				0 => {
					let names = class_names(&line, width)?;
					let class = mappings.add_class(ClassNowodeMapping::new(ClassMapping { names }))?;
					current_class = Some(class.info.get_key()?);
					current_method = None;
				},
				1 => {
					let class = lookup_class(&mut mappings, &current_class, &line)?;

					if line.fields.len() == width {
						// a descriptor column makes it a method row
						let desc = DescriptorDef::Namespaced {
							namespace: Namespace(0),
							desc: line.fields[0].as_str().into(),
						};
						let mut parts = vec![line.first_field.clone()];
						parts.extend(line.fields.iter().skip(1).cloned());
						let names = names_from::<MethodName>(parts, width, &line)?;
						let method = class.add_method(MethodNowodeMapping::new(MethodMapping { desc, names }))?;
						current_method = Some(method.info.get_key()?);
					} else if line.fields.len() == width - 1 {
						let mut parts = vec![line.first_field.clone()];
						parts.extend(line.fields.iter().cloned());
						let names = names_from::<FieldName>(parts, width, &line)?;
						class.add_field(FieldNowodeMapping::new(FieldMapping { desc: None, names }))?;
						current_method = None;
					} else {
						return Err(line.truncated());
					}
				},
				2 => {
					let class = lookup_class(&mut mappings, &current_class, &line)?;
					let key = current_method.as_ref()
						.with_context(|| anyhow!("sub-entry row without a method, in line {}", line.get_line_number()))?;
					let method = class.methods.get_mut(key)
						.with_context(|| anyhow!("no entry for method {key:?}"))?;

					if line.first_field == "static" && line.fields.is_empty() {
						method.is_static = true;
					} else {
						let index: usize = line.first_field.parse()
							.with_context(|| anyhow!("illegal parameter index {:?}", line.first_field))?;
						let names = names_from::<ParameterName>(line.fields.clone(), width, &line)?;
						method.add_parameter(ParameterNowodeMapping::new(ParameterMapping { index, names }))?;
					}
				},
				depth => bail!("unexpected indentation {depth} in a tsrg2 file"),
			}
			Ok(())
		})().with_context(|| anyhow!("in line {line_number}"))?;
	}

	Ok(mappings)
}

fn class_names(line: &TokenLine, width: usize) -> Result<Names<ClassName>> {
	let mut parts = vec![line.first_field.clone()];
	parts.extend(line.fields.iter().cloned());
	names_from(parts, width, line)
}

fn names_from<T: From<String>>(parts: Vec<String>, width: usize, line: &TokenLine) -> Result<Names<T>> {
	if parts.len() != width {
		return Err(line.truncated());
	}
	Ok(Names::from(parts).map(T::from))
}

fn lookup_class<'m>(mappings: &'m mut Mappings, current: &Option<ClassName>, line: &TokenLine) -> Result<&'m mut ClassNowodeMapping> {
	let owner = current.as_ref().ok_or_else(|| MappingError::UnknownClassReference {
		line: line.get_line_number(),
		class: line.first_field.clone(),
	})?;
	mappings.classes.get_mut(owner)
		.with_context(|| anyhow!("no entry for class {owner:?}"))
}

/// Writes the given mappings into a `String`, in the TSRG2 format.
pub fn write_string(mappings: &Mappings) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the TSRG2 format.
pub fn write_vec(mappings: &Mappings) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

/// Joins the names from index `skip` on with spaces, absent names becoming empty columns.
fn join_names(names: &Names<impl AsRef<str>>, skip: usize) -> String {
	names.names().iter()
		.skip(skip)
		.map(|name| name.as_ref().map(|x| x.as_ref()).unwrap_or(""))
		.collect::<Vec<&str>>()
		.join(" ")
}

/// Writes the given mappings to the given writer, in the TSRG2 format.
///
/// Only namespaced collections can be written in this format. Descriptors are written in the
/// first namespace; the rows are sorted.
pub fn write(mappings: &Mappings, w: &mut impl Write) -> Result<()> {
	let NamespaceInfo::Namespaced(ref namespaces) = mappings.info.namespaces else {
		bail!("cannot write a paired mapping collection in the tsrg2 format");
	};

	let mut w = BufWriter::new(w);
	let w = &mut w;

	write!(w, "tsrg2")?;
	for namespace in namespaces.names() {
		write!(w, " {namespace}")?;
	}
	writeln!(w)?;

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by_key(|x| &x.info);
	for class in classes {
		writeln!(w, "{}", join_names(&class.info.names, 0))?;

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by_key(|x| &x.info);
		for field in fields {
			writeln!(w, "\t{}", join_names(&field.info.names, 0))?;
		}

		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by_key(|x| &x.info);
		for method in methods {
			let name = method.info.names.first_name()?;
			let desc = unmapped_namespaced_desc(&method.info.desc)?;
			writeln!(w, "\t{name} {desc} {}", join_names(&method.info.names, 1))?;

			if method.is_static {
				writeln!(w, "\t\tstatic")?;
			}

			let mut parameters: Vec<_> = method.parameters.values().collect();
			parameters.sort_by_key(|x| &x.info);
			for parameter in parameters {
				writeln!(w, "\t\t{} {}", parameter.info.index, join_names(&parameter.info.names, 0))?;
			}
		}
	}

	Ok(())
}

fn unmapped_namespaced_desc(desc: &DescriptorDef<impl AsRef<str>>) -> Result<&str> {
	match desc {
		DescriptorDef::Namespaced { namespace: Namespace(0), desc } => Ok(desc.as_ref()),
		_ => bail!("the tsrg2 format requires a descriptor in the first namespace, got {:?}", desc.stored_namespace()),
	}
}
