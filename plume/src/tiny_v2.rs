//! Functions to read and write mappings in the "Tiny v2" format.
//!
//! # Reading
//! You can read a `.tiny` file using the [`read_file`] method, by passing a path.
//! If you already have a [`Read`]er, you can use the [`read`] method.
//!
//! It's recommended to check that the namespaces are indeed the ones expected.
//! See [`Namespaces::check_that`](crate::tree::names::Namespaces::check_that) for more info.
//!
//! # Writing
//! For writing `.tiny` files, there are the [`write`][fn@write] as well as the [`write_vec`] and
//! [`write_string`] methods.
//!
//! Note that all writing sorts the tiny files.

use std::fs::File;
use anyhow::{anyhow, bail, Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use crate::lines::{Line, TabLine, WithMoreIndentIter};
use crate::tree::mappings::{ClassMapping, ClassNowodeMapping, DescriptorDef, FieldMapping, FieldNowodeMapping, JavadocMapping, MappingInfo, Mappings, MethodMapping, MethodNowodeMapping, ParameterMapping, ParameterNowodeMapping};
use crate::tree::names::{ClassName, FieldName, MethodName, Names, Namespace, NamespaceInfo, ParameterName};
use crate::tree::NodeInfo;

/// The header property that marks all names in the file as escaped.
const ESCAPED_NAMES: &str = "escaped-names";

/// Reads a `.tiny` file (tiny v2), by opening the file given by the path.
///
/// It's recommended to check that the namespaces are indeed the ones expected.
/// See [`Namespaces::check_that`](crate::tree::names::Namespaces::check_that) for more info.
pub fn read_file(path: impl AsRef<Path>) -> Result<Mappings> {
	read(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as tiny v2 file", path.as_ref()))
}

#[allow(clippy::tabs_in_doc_comments)]
/// Reads the tiny v2 format, from the given reader.
///
/// It's recommended to check that the namespaces are indeed the ones expected.
/// See [`Namespaces::check_that`](crate::tree::names::Namespaces::check_that) for more info.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use plume::tree::mappings::Mappings;
/// use plume::tree::names::NamespaceInfo;
/// let string = "\
/// tiny	2	0	namespaceA	namespaceB	namespaceC
/// c	A	B	C
/// 	f	LA;	a	b	c
/// 	m	(LA;)V	a	b	c
/// ";
///
/// let reader = &mut string.as_bytes();
/// let mappings: Mappings = plume::tiny_v2::read(reader).unwrap();
///
/// let NamespaceInfo::Namespaced(ref namespaces) = mappings.info.namespaces else { panic!() };
/// namespaces.check_that(["namespaceA", "namespaceB", "namespaceC"]).unwrap();
/// assert_eq!(mappings.classes.len(), 1);
/// ```
pub fn read(reader: impl Read) -> Result<Mappings> {
	let mut lines = BufReader::new(reader)
		.lines()
		.enumerate()
		.map(|(line_number, line)| -> Result<TabLine> {
			TabLine::new(line_number + 1, &line?)
		})
		.peekable();

	let mut header = lines.next().context("no header line")??;

	if header.first_field != "tiny" || header.next()? != "2" || header.next()? != "0" {
		bail!("header version isn't tiny v2.0, in line {header:?}");
	}

	let namespaces = header.into_namespaces()?;
	let width = namespaces.len();

	let mut mappings = Mappings::new(MappingInfo {
		namespaces: NamespaceInfo::Namespaced(namespaces),
	});

	// property lines follow the header directly, one tab deep, before any class
	while let Some(Ok(line)) = lines.peek() {
		if line.get_indents() != 1 {
			break;
		}
		let line = lines.next().context("peeked line vanished")??;
		let key = line.first_field.clone();
		let value = line.end_optional()?;
		mappings.properties.insert(key, value);
	}

	let escaped = mappings.properties.contains(ESCAPED_NAMES);
	let name = |string: String| -> Result<String> {
		if escaped { unescape(&string) } else { Ok(string) }
	};

	WithMoreIndentIter::new(&mut lines).on_every_line(|iter, line| {
		if line.first_field == "c" {
			let names = line.into_names_exact::<String>(width)?
				.try_map(&name)?
				.map(ClassName::from);
			let mapping = ClassMapping { names };
			let class = mappings.add_class(ClassNowodeMapping::new(mapping))?;

			iter.next_level().on_every_line(|iter, mut line| {
				if line.first_field == "f" {
					let desc = DescriptorDef::Namespaced {
						namespace: Namespace(0),
						desc: line.next()?.into(),
					};
					let names = line.into_names::<String>(width)?
						.try_map(&name)?
						.map(FieldName::from);
					let mapping = FieldMapping { desc: Some(desc), names };
					let field = class.add_field(FieldNowodeMapping::new(mapping))?;

					iter.next_level().on_every_line(|_, line| {
						if line.first_field == "c" {
							add_comment(&mut field.javadoc, line)
						} else {
							Ok(())
						}
					}).context("reading field sub-sections")
				} else if line.first_field == "m" {
					let desc = DescriptorDef::Namespaced {
						namespace: Namespace(0),
						desc: line.next()?.into(),
					};
					let names = line.into_names::<String>(width)?
						.try_map(&name)?
						.map(MethodName::from);
					let mapping = MethodMapping { desc, names };
					let method = class.add_method(MethodNowodeMapping::new(mapping))?;

					iter.next_level().on_every_line(|iter, mut line| {
						if line.first_field == "p" {
							let index = line.next()?.parse()?;
							let names = line.into_names::<String>(width)?
								.try_map(&name)?
								.map(ParameterName::from);
							let mapping = ParameterMapping { index, names };
							let parameter = method.add_parameter(ParameterNowodeMapping::new(mapping))?;

							iter.next_level().on_every_line(|_, line| {
								if line.first_field == "c" {
									add_comment(&mut parameter.javadoc, line)
								} else {
									Ok(())
								}
							}).context("reading parameter sub-sections")
						} else if line.first_field == "c" {
							add_comment(&mut method.javadoc, line)
						} else {
							Ok(())
						}
					}).context("reading method sub-sections")
				} else if line.first_field == "c" {
					add_comment(&mut class.javadoc, line)
				} else {
					Ok(())
				}
			}).context("reading class sub-sections")
		} else {
			Ok(())
		}
	}).context("reading lines")?;

	if let Some(line) = lines.next() {
		bail!("expected end of input, got: {line:?}");
	}

	Ok(mappings)
}

fn add_comment(javadoc: &mut Option<JavadocMapping>, line: TabLine) -> Result<()> {
	let comment = JavadocMapping(unescape(&line.end()?)?);
	if let Some(javadoc) = javadoc {
		bail!("only one comment is allowed, got {javadoc:?} and {comment:?}")
	} else {
		*javadoc = Some(comment);
		Ok(())
	}
}

/// Applies the tiny v2 escape sequences: `\\`, `\n`, `\r`, `\0` and `\t`.
fn escape(string: &str) -> String {
	let mut s = String::with_capacity(string.len());
	for ch in string.chars() {
		match ch {
			'\\' => s.push_str("\\\\"),
			'\n' => s.push_str("\\n"),
			'\r' => s.push_str("\\r"),
			'\0' => s.push_str("\\0"),
			'\t' => s.push_str("\\t"),
			ch => s.push(ch),
		}
	}
	s
}

fn unescape(string: &str) -> Result<String> {
	let mut s = String::with_capacity(string.len());
	let mut iter = string.chars();
	while let Some(ch) = iter.next() {
		if ch == '\\' {
			match iter.next() {
				Some('\\') => s.push('\\'),
				Some('n') => s.push('\n'),
				Some('r') => s.push('\r'),
				Some('0') => s.push('\0'),
				Some('t') => s.push('\t'),
				x => bail!("unknown escape sequence {x:?} in {string:?}"),
			}
		} else {
			s.push(ch);
		}
	}
	Ok(s)
}

/// Writes the given mappings into a `String`, in the tiny v2 format.
///
/// If the mapping somehow produces invalid UTF-8, then this method fails.
///
/// This is equivalent to first calling [`write_vec`] and then [`String::from_utf8`].
///
/// This method is of most use in test cases, where you also use the `pretty_assertions` crate
/// for viewing string diffs.
pub fn write_string(mappings: &Mappings) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the tiny v2 format.
///
/// This is equivalent to letting [`write`][fn@write] write into a `Vec<u8>`.
///
/// Note that there's also the helper method [`write_string`] that also tries to convert the
/// `Vec<u8>` into a `String`.
pub fn write_vec(mappings: &Mappings) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

fn write_names(w: &mut impl Write, names: &Names<impl AsRef<str>>, escaped: bool) -> Result<()> {
	for name in names.names() {
		let name = name.as_ref().map(|x| x.as_ref()).unwrap_or("");
		if escaped {
			write!(w, "\t{}", escape(name))?;
		} else {
			write!(w, "\t{name}")?;
		}
	}
	writeln!(w)?;
	Ok(())
}

#[allow(clippy::tabs_in_doc_comments)]
/// Writes the given mappings to the given writer, in the tiny v2 format.
///
/// Only namespaced collections can be written in this format.
///
/// Note that this currently sorts the classes, fields, methods and parameters.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use plume::tree::mappings::Mappings;
/// let input = "\
/// tiny	2	0	namespaceA	namespaceB
/// c	D	E
/// c	A	B
/// 	f	I	bIsAfterA	e
/// 	f	I	aIsBeforeB	c
/// 	m	(I)V	methodXb	a
/// 	m	(I)V	methodXa	b
/// ";
///
/// let reader = &mut input.as_bytes();
/// let mappings: Mappings = plume::tiny_v2::read(reader).unwrap();
///
/// let mut buf: Vec<u8> = Vec::new();
/// plume::tiny_v2::write(&mappings, &mut buf).unwrap();
/// let written = String::from_utf8(buf).unwrap();
///
/// let output = "\
/// tiny	2	0	namespaceA	namespaceB
/// c	A	B
/// 	f	I	aIsBeforeB	c
/// 	f	I	bIsAfterA	e
/// 	m	(I)V	methodXa	b
/// 	m	(I)V	methodXb	a
/// c	D	E
/// ";
///
/// assert_eq!(written, output);
/// ```
///
/// Note that there are also the helper methods [`write_vec`] for writing into a `Vec<u8>`
/// directly, and the helper method [`write_string`] that also tries to convert that `Vec<u8>`
/// into a `String`.
pub fn write(mappings: &Mappings, w: &mut impl Write) -> Result<()> {
	let NamespaceInfo::Namespaced(ref namespaces) = mappings.info.namespaces else {
		bail!("cannot write a paired mapping collection in the tiny v2 format");
	};

	// the buffering makes it much faster
	let mut w = BufWriter::new(w);
	let w = &mut w;

	write!(w, "tiny\t2\t0")?;
	for namespace in namespaces.names() {
		write!(w, "\t{namespace}")?;
	}
	writeln!(w)?;

	for (key, value) in mappings.properties.iter() {
		match value {
			Some(value) => writeln!(w, "\t{key}\t{value}")?,
			None => writeln!(w, "\t{key}")?,
		}
	}

	let escaped = mappings.properties.contains(ESCAPED_NAMES);

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by_key(|x| &x.info);
	for class in classes {
		write!(w, "c")?;
		write_names(w, &class.info.names, escaped)?;

		if let Some(ref comment) = class.javadoc {
			writeln!(w, "\tc\t{}", escape(&comment.0))?;
		}

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by_key(|x| &x.info);
		for field in fields {
			let desc = field.info.desc.as_ref()
				.with_context(|| anyhow!("field {:?} has no descriptor, the tiny v2 format requires one", field.info))?;
			write!(w, "\tf\t{}", desc.stored().as_str())?;
			write_names(w, &field.info.names, escaped)?;

			if let Some(ref comment) = field.javadoc {
				writeln!(w, "\t\tc\t{}", escape(&comment.0))?;
			}
		}

		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by_key(|x| &x.info);
		for method in methods {
			write!(w, "\tm\t{}", method.info.desc.stored().as_str())?;
			write_names(w, &method.info.names, escaped)?;

			if let Some(ref comment) = method.javadoc {
				writeln!(w, "\t\tc\t{}", escape(&comment.0))?;
			}

			let mut parameters: Vec<_> = method.parameters.values().collect();
			parameters.sort_by_key(|x| &x.info);
			for parameter in parameters {
				write!(w, "\t\tp\t{}", parameter.info.index)?;
				write_names(w, &parameter.info.names, escaped)?;

				if let Some(ref comment) = parameter.javadoc {
					writeln!(w, "\t\t\tc\t{}", escape(&comment.0))?;
				}
			}
		}
	}

	Ok(())
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use super::{escape, unescape};

	#[test]
	fn escaping() {
		assert_eq!(escape("a\tb\nc\\d"), "a\\tb\\nc\\\\d");
		assert_eq!(unescape("a\\tb\\nc\\\\d").unwrap(), "a\tb\nc\\d");
		assert!(unescape("bad\\q").is_err());
	}
}
