//! Functions to read and write mappings in the SRG format.
//!
//! Lines are tagged `PK:`, `CL:`, `FD:` or `MD:`; members name their owner by embedding the
//! unmapped class name in a path (`owner/member`), and method lines carry the descriptor on both
//! sides. Everything after `#` is a comment.

use std::fs::File;
use anyhow::{anyhow, bail, Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use indexmap::IndexMap;
use crate::error::MappingError;
use crate::lines::{Line, TokenLine};
use crate::remapper::rewrite_descriptor;
use crate::descriptor::MethodDescriptor;
use crate::tree::mappings::{ClassMapping, ClassNowodeMapping, DescriptorDef, FieldMapping, FieldNowodeMapping, MappingInfo, Mappings, MethodMapping, MethodNowodeMapping, PackageMapping, PackageNowodeMapping};
use crate::tree::names::{Names, NamespaceInfo};
use crate::tree::NodeInfo;

pub(crate) const COMMENT_CHAR: char = '#';

/// Reads a `.srg` file, by opening the file given by the path.
pub fn read_file(path: impl AsRef<Path>) -> Result<Mappings> {
	read(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as srg file", path.as_ref()))
}

/// Reads the SRG format, from the given reader.
///
/// A member line whose owner class was never declared by an earlier `CL:` line fails with
/// [`UnknownClassReference`][MappingError::UnknownClassReference].
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use plume::tree::mappings::Mappings;
/// let string = "\
/// CL: a com/example/Foo
/// FD: a/b com/example/Foo/count
/// MD: a/c (I)V com/example/Foo/setCount (I)V
/// ";
///
/// let reader = &mut string.as_bytes();
/// let mappings: Mappings = plume::srg::read(reader).unwrap();
///
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
			match line.first_field.as_str() {
				"PK:" => {
					let [src, dst] = two_fields(&line)?;
					mappings.add_package(PackageNowodeMapping::new(PackageMapping {
						names: Names::pair(src.as_str().into(), Some(dst.as_str().into())),
					}))?;
				},
				"CL:" => {
					let [src, dst] = two_fields(&line)?;
					mappings.add_class(ClassNowodeMapping::new(ClassMapping {
						names: Names::pair(src.as_str().into(), Some(dst.as_str().into())),
					}))?;
				},
				"FD:" => {
					let [src, dst] = two_fields(&line)?;
					let (owner, src_name) = split_member_path(src, &line)?;
					let (_, dst_name) = split_member_path(dst, &line)?;

					let class = declared_class(&mut mappings, owner, &line)?;
					class.add_field(FieldNowodeMapping::new(FieldMapping {
						desc: None,
						names: Names::pair(src_name.into(), Some(dst_name.into())),
					}))?;
				},
				"MD:" => {
					let [src, src_desc, dst, _dst_desc] = four_fields(&line)?;
					let (owner, src_name) = split_member_path(src, &line)?;
					let (_, dst_name) = split_member_path(dst, &line)?;

					let class = declared_class(&mut mappings, owner, &line)?;
					class.add_method(MethodNowodeMapping::new(MethodMapping {
						desc: DescriptorDef::Unmapped(src_desc.as_str().into()),
						names: Names::pair(src_name.into(), Some(dst_name.into())),
					}))?;
				},
				tag => bail!("unknown line tag {tag:?}"),
			}
			Ok(())
		})().with_context(|| anyhow!("in line {line_number}"))?;
	}

	Ok(mappings)
}

fn two_fields<'a>(line: &'a TokenLine) -> Result<[&'a String; 2]> {
	match line.fields.as_slice() {
		[a, b] => Ok([a, b]),
		_ => Err(line.truncated()),
	}
}

fn four_fields<'a>(line: &'a TokenLine) -> Result<[&'a String; 4]> {
	match line.fields.as_slice() {
		[a, b, c, d] => Ok([a, b, c, d]),
		_ => Err(line.truncated()),
	}
}

/// Splits `owner/member` at the last slash.
fn split_member_path<'a>(path: &'a str, line: &TokenLine) -> Result<(&'a str, &'a str)> {
	path.rsplit_once('/')
		.with_context(|| anyhow!("member path {path:?} has no owner class, in line {}", line.get_line_number()))
}

fn declared_class<'m>(mappings: &'m mut Mappings, owner: &str, line: &TokenLine) -> Result<&'m mut ClassNowodeMapping> {
	if !mappings.classes.contains_key(owner) {
		return Err(MappingError::UnknownClassReference {
			line: line.get_line_number(),
			class: owner.to_owned(),
		}.into());
	}
	mappings.classes.get_mut(owner)
		.with_context(|| anyhow!("no entry for class {owner:?}"))
}

/// Writes the given mappings into a `String`, in the SRG format.
pub fn write_string(mappings: &Mappings) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the SRG format.
pub fn write_vec(mappings: &Mappings) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

fn both_names<'a>(names: &'a Names<impl AsRef<str>>) -> Result<(&'a str, &'a str)> {
	let src = names.names()[0].as_ref()
		.with_context(|| anyhow!("no unmapped name"))?
		.as_ref();
	// entries without a mapped name map to themselves
	let dst = names.names()[1].as_ref().map(|x| x.as_ref()).unwrap_or(src);
	Ok((src, dst))
}

/// Writes the given mappings to the given writer, in the SRG format.
///
/// Only paired collections can be written in this format. The mapped-side descriptor of `MD:`
/// lines is derived from the class table. The lines are sorted.
pub fn write(mappings: &Mappings, w: &mut impl Write) -> Result<()> {
	if mappings.info.namespaces.is_namespaced() {
		bail!("cannot write a namespaced mapping collection in the srg format");
	}

	let mut w = BufWriter::new(w);
	let w = &mut w;

	let forward: IndexMap<&str, &str> = mappings.classes.values()
		.filter_map(|class| both_names(&class.info.names).ok())
		.collect();
	let backward: IndexMap<&str, &str> = forward.iter()
		.map(|(&src, &dst)| (dst, src))
		.collect();

	let both_descs = |desc: &DescriptorDef<MethodDescriptor>| -> Result<(String, String)> {
		Ok(match desc {
			DescriptorDef::Unmapped(d) => {
				let mapped = rewrite_descriptor(d.as_str(), |class| forward.get(class).map(|&x| x.to_owned()))?;
				(d.as_str().to_owned(), mapped)
			},
			DescriptorDef::Mapped(d) => {
				let unmapped = rewrite_descriptor(d.as_str(), |class| backward.get(class).map(|&x| x.to_owned()))?;
				(unmapped, d.as_str().to_owned())
			},
			DescriptorDef::Both { unmapped, mapped } => (unmapped.as_str().to_owned(), mapped.as_str().to_owned()),
			DescriptorDef::Namespaced { .. } => bail!("paired collections cannot store namespaced descriptors"),
		})
	};

	let mut packages: Vec<_> = mappings.packages.values().collect();
	packages.sort_by_key(|x| &x.info);
	for package in packages {
		let (src, dst) = both_names(&package.info.names)?;
		writeln!(w, "PK: {src} {dst}")?;
	}

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by_key(|x| &x.info);
	for class in &classes {
		let (src, dst) = both_names(&class.info.names)?;
		writeln!(w, "CL: {src} {dst}")?;
	}

	for class in &classes {
		let (class_src, class_dst) = both_names(&class.info.names)?;

		let mut fields: Vec<_> = class.fields.values().collect();
		fields.sort_by_key(|x| &x.info);
		for field in fields {
			let (src, dst) = both_names(&field.info.names)?;
			writeln!(w, "FD: {class_src}/{src} {class_dst}/{dst}")?;
		}

		let mut methods: Vec<_> = class.methods.values().collect();
		methods.sort_by_key(|x| &x.info);
		for method in methods {
			let (src, dst) = both_names(&method.info.names)?;
			let (src_desc, dst_desc) = both_descs(&method.info.desc)?;
			writeln!(w, "MD: {class_src}/{src} {src_desc} {class_dst}/{dst} {dst_desc}")?;
		}
	}

	Ok(())
}
