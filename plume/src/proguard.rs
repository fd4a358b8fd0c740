//! Functions to read and write mappings in the Proguard format.
//!
//! This is the `mapping.txt` format Proguard and R8 emit: class headers like
//! `com.example.Foo -> a:` with dotted readable names, member lines indented with four spaces,
//! Java-source types instead of descriptors, and optional `start:end:` line-number prefixes on
//! methods. Everything after `#` is a comment.
//!
//! The readable names are on the left, so the unmapped (obfuscated) name of every entry is the
//! right-hand side, and descriptors are stored in the mapped namespace.

use std::fs::File;
use anyhow::{anyhow, bail, Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use crate::descriptor::{method_descriptor_from_signature, method_descriptor_to_signature, descriptor_to_type_name, type_name_to_descriptor};
use crate::error::MappingError;
use crate::lines::{Line, TokenLine};
use crate::tree::mappings::{ClassMapping, ClassNowodeMapping, DescriptorDef, FieldMapping, FieldNowodeMapping, MappingInfo, Mappings, MethodMapping, MethodNowodeMapping};
use crate::tree::names::{ClassName, Names, NamespaceInfo};
use crate::tree::NodeInfo;

pub(crate) const COMMENT_CHAR: char = '#';
pub(crate) const ARROW: &str = "->";

/// Reads a Proguard `mapping.txt` file, by opening the file given by the path.
pub fn read_file(path: impl AsRef<Path>) -> Result<Mappings> {
	read(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as proguard file", path.as_ref()))
}

/// Reads the Proguard format, from the given reader.
///
/// A member line before any class header fails with
/// [`UnknownClassReference`][MappingError::UnknownClassReference].
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use plume::tree::mappings::Mappings;
/// let string = "\
/// com.example.Foo -> a:
///     int count -> b
///     12:34:void setCount(int) -> c
/// ";
///
/// let reader = &mut string.as_bytes();
/// let mappings: Mappings = plume::proguard::read(reader).unwrap();
///
/// let class = &mappings.classes["a"];
/// assert_eq!(class.fields.len(), 1);
/// let method = class.methods.values().next().unwrap();
/// assert_eq!(method.line_range, Some((12, 34)));
/// ```
pub fn read(reader: impl Read) -> Result<Mappings> {
	let mut mappings = Mappings::new(MappingInfo {
		namespaces: NamespaceInfo::Paired,
	});

	let mut current: Option<ClassName> = None;

	for (line_number, line) in BufReader::new(reader).lines().enumerate() {
		let line_number = line_number + 1;
		let raw = line?;
		let Some(line) = TokenLine::new(line_number, &raw, COMMENT_CHAR)? else {
			continue;
		};

		(|| -> Result<()> {
			if raw.starts_with(' ') {
				// a member line
				let owner = current.as_ref().ok_or_else(|| MappingError::UnknownClassReference {
					line: line.get_line_number(),
					class: line.first_field.clone(),
				})?;
				let class = mappings.classes.get_mut(owner)
					.with_context(|| anyhow!("no entry for class {owner:?}"))?;

				match line.fields.as_slice() {
					[name, arrow, obf] if arrow == ARROW => {
						if line.first_field.contains('(') || name.contains('(') {
							read_method(class, &line.first_field, name, obf)?;
						} else {
							let desc = type_name_to_descriptor(&line.first_field)?;
							class.add_field(FieldNowodeMapping::new(FieldMapping {
								desc: Some(DescriptorDef::Mapped(desc.into())),
								names: Names::pair(obf.as_str().into(), Some(name.as_str().into())),
							}))?;
						}
						Ok(())
					},
					_ => Err(line.truncated()),
				}
			} else {
				// a class header: `readable -> obf:`
				match line.fields.as_slice() {
					[arrow, obf] if arrow == ARROW && obf.ends_with(':') => {
						// both sides use dotted names, R8 keeps packaged names on the right too
						let obf = obf.strip_suffix(':').unwrap_or(obf.as_str()).replace('.', "/");
						let readable = line.first_field.replace('.', "/");
						let class = mappings.add_class(ClassNowodeMapping::new(ClassMapping {
							names: Names::pair(obf.into(), Some(readable.into())),
						}))?;
						current = Some(class.info.names.first_name()?.clone());
						Ok(())
					},
					_ => bail!("expected a class header `readable -> obf:`, got {line:?}"),
				}
			}
		})().with_context(|| anyhow!("in line {line_number}"))?;
	}

	Ok(mappings)
}

/// Parses a method line's pieces: an optional `start:end:` prefix glued to the return type, and
/// the readable name with its parenthesized parameter list.
fn read_method(class: &mut ClassNowodeMapping, head: &str, name_and_args: &str, obf: &str) -> Result<()> {
	let (line_range, return_type) = match head.splitn(3, ':').collect::<Vec<&str>>().as_slice() {
		[start, end, ret] => {
			let start = start.parse().with_context(|| anyhow!("illegal line number {start:?}"))?;
			let end = end.parse().with_context(|| anyhow!("illegal line number {end:?}"))?;
			(Some((start, end)), *ret)
		},
		[ret] => (None, *ret),
		_ => bail!("illegal line number prefix in {head:?}"),
	};

	let (name, args) = name_and_args.split_once('(')
		.with_context(|| anyhow!("method signature {name_and_args:?} has no parameter list"))?;
	let args = args.strip_suffix(')')
		.with_context(|| anyhow!("method signature {name_and_args:?} has an unclosed parameter list"))?;
	let parameters: Vec<&str> = if args.is_empty() {
		Vec::new()
	} else {
		args.split(',').collect()
	};

	let desc = method_descriptor_from_signature(return_type, &parameters)?;

	let method = class.add_method(MethodNowodeMapping::new(MethodMapping {
		desc: DescriptorDef::Mapped(desc),
		names: Names::pair(obf.into(), Some(name.into())),
	}))?;
	method.line_range = line_range;

	Ok(())
}

/// Writes the given mappings into a `String`, in the Proguard format.
pub fn write_string(mappings: &Mappings) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the Proguard format.
pub fn write_vec(mappings: &Mappings) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

fn both_names<'a>(names: &'a Names<impl AsRef<str>>) -> Result<(&'a str, &'a str)> {
	let src = names.names()[0].as_ref()
		.with_context(|| anyhow!("no unmapped name"))?
		.as_ref();
	let dst = names.names()[1].as_ref().map(|x| x.as_ref()).unwrap_or(src);
	Ok((src, dst))
}

fn mapped_desc<'a>(desc: &'a DescriptorDef<impl AsRef<str>>) -> Result<&'a str> {
	match desc {
		DescriptorDef::Mapped(d) => Ok(d.as_ref()),
		DescriptorDef::Both { mapped, .. } => Ok(mapped.as_ref()),
		_ => bail!("the proguard format requires a descriptor in the mapped namespace, got {:?}", desc.stored_namespace()),
	}
}

/// Writes the given mappings to the given writer, in the Proguard format.
///
/// Only paired collections whose member descriptors are stored in the mapped namespace can be
/// written in this format. The classes, fields and methods are sorted.
pub fn write(mappings: &Mappings, w: &mut impl Write) -> Result<()> {
	if mappings.info.namespaces.is_namespaced() {
		bail!("cannot write a namespaced mapping collection in the proguard format");
	}

	let mut w = BufWriter::new(w);
	let w = &mut w;

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by_key(|x| &x.info);
	for class in classes {
		let (obf, readable) = both_names(&class.info.names)?;
		writeln!(w, "{} -> {}:", readable.replace('/', "."), obf.replace('/', "."))?;

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by_key(|x| &x.info);
		for field in fields {
			let (obf, readable) = both_names(&field.info.names)?;
			let desc = field.info.desc.as_ref()
				.with_context(|| anyhow!("field {:?} has no descriptor, the proguard format requires one", field.info))?;
			let type_name = descriptor_to_type_name(mapped_desc(desc)?)?;
			writeln!(w, "    {type_name} {readable} -> {obf}")?;
		}

		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by_key(|x| &x.info);
		for method in methods {
			let (obf, readable) = both_names(&method.info.names)?;
			let (return_type, parameters) = method_descriptor_to_signature(mapped_desc(&method.info.desc)?)?;

			write!(w, "    ")?;
			if let Some((start, end)) = method.line_range {
				write!(w, "{start}:{end}:")?;
			}
			writeln!(w, "{return_type} {readable}({}) -> {obf}", parameters.join(","))?;
		}
	}

	Ok(())
}
