//! Functions to read and write mappings in the Parchment JSON format.
//!
//! Unlike the line-based formats this one is a structured document: entries are looked up by key
//! rather than column position, and javadoc comes as arrays of lines. The document carries a
//! `major.minor.patch` version; we accept any document whose major version matches ours,
//! regardless of minor and patch.
//!
//! Parchment attaches parameter names and documentation to names that are already readable, so
//! all entry names land in the first column of a paired collection, with no mapped side.

use std::fs::File;
use anyhow::{anyhow, bail, Context, Result};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::tree::mappings::{ClassMapping, ClassNowodeMapping, DescriptorDef, FieldMapping, FieldNowodeMapping, JavadocMapping, MappingInfo, Mappings, MethodMapping, MethodNowodeMapping, PackageMapping, PackageNowodeMapping, ParameterMapping, ParameterNowodeMapping};
use crate::tree::names::{Names, NamespaceInfo};
use crate::tree::NodeInfo;

/// The major version of the Parchment documents this codec understands.
const CURRENT_MAJOR: u64 = 1;
/// The version written into generated documents.
const WRITTEN_VERSION: &str = "1.1.0";

/// Checks if a document version is one this codec can read: any `major.minor.patch` whose major
/// version equals [`CURRENT_MAJOR`]. The detector uses this as well.
pub(crate) fn version_compatible(version: &str) -> bool {
	version.split('.').next()
		.and_then(|major| major.parse::<u64>().ok())
		.is_some_and(|major| major == CURRENT_MAJOR)
}

#[derive(Debug, Deserialize, Serialize)]
struct ParchmentFile {
	version: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	packages: Vec<ParchmentPackage>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	classes: Vec<ParchmentClass>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ParchmentPackage {
	name: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	javadoc: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ParchmentClass {
	name: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	javadoc: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	fields: Vec<ParchmentField>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	methods: Vec<ParchmentMethod>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ParchmentField {
	name: String,
	descriptor: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	javadoc: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ParchmentMethod {
	name: String,
	descriptor: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	javadoc: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	parameters: Vec<ParchmentParameter>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ParchmentParameter {
	index: usize,
	name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	javadoc: Option<String>,
}

fn join_javadoc(javadoc: Vec<String>) -> Option<JavadocMapping> {
	if javadoc.is_empty() {
		None
	} else {
		Some(JavadocMapping(javadoc.join("\n")))
	}
}

/// Reads a Parchment file, by opening the file given by the path.
pub fn read_file(path: impl AsRef<Path>) -> Result<Mappings> {
	read(File::open(&path)?)
		.with_context(|| anyhow!("failed to read mappings file {:?} as parchment file", path.as_ref()))
}

/// Reads the Parchment format, from the given reader.
///
/// Documents whose major version differs from the codec's current major version are rejected.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use plume::tree::mappings::Mappings;
/// let string = r#"{
///     "version": "1.1.0",
///     "classes": [
///         {
///             "name": "com/example/Foo",
///             "fields": [ { "name": "count", "descriptor": "I", "javadoc": [ "The count." ] } ],
///             "methods": [
///                 {
///                     "name": "setCount", "descriptor": "(I)V",
///                     "parameters": [ { "index": 1, "name": "value" } ]
///                 }
///             ]
///         }
///     ]
/// }"#;
///
/// let reader = &mut string.as_bytes();
/// let mappings: Mappings = plume::parchment::read(reader).unwrap();
///
/// let class = &mappings.classes["com/example/Foo"];
/// assert_eq!(class.fields.len(), 1);
/// assert_eq!(class.methods.len(), 1);
/// ```
pub fn read(reader: impl Read) -> Result<Mappings> {
	let file: ParchmentFile = serde_json::from_reader(BufReader::new(reader))
		.context("failed to parse parchment document")?;

	if !version_compatible(&file.version) {
		bail!("unsupported parchment document version {:?}, this codec understands major version {CURRENT_MAJOR}", file.version);
	}

	let mut mappings = Mappings::new(MappingInfo {
		namespaces: NamespaceInfo::Paired,
	});

	for package in file.packages {
		let package_node = mappings.add_package(PackageNowodeMapping::new(PackageMapping {
			names: Names::pair(package.name.into(), None),
		}))?;
		package_node.javadoc = join_javadoc(package.javadoc);
	}

	for class in file.classes {
		(|| -> Result<()> {
			let class_node = mappings.add_class(ClassNowodeMapping::new(ClassMapping {
				names: Names::pair(class.name.as_str().into(), None),
			}))?;
			class_node.javadoc = join_javadoc(class.javadoc);

			for field in class.fields {
				let field_node = class_node.add_field(FieldNowodeMapping::new(FieldMapping {
					desc: Some(DescriptorDef::Unmapped(field.descriptor.into())),
					names: Names::pair(field.name.into(), None),
				}))?;
				field_node.javadoc = join_javadoc(field.javadoc);
			}

			for method in class.methods {
				let method_node = class_node.add_method(MethodNowodeMapping::new(MethodMapping {
					desc: DescriptorDef::Unmapped(method.descriptor.into()),
					names: Names::pair(method.name.into(), None),
				}))?;
				method_node.javadoc = join_javadoc(method.javadoc);

				for parameter in method.parameters {
					let parameter_node = method_node.add_parameter(ParameterNowodeMapping::new(ParameterMapping {
						index: parameter.index,
						names: Names::pair(parameter.name.into(), None),
					}))?;
					parameter_node.javadoc = parameter.javadoc.map(JavadocMapping);
				}
			}

			Ok(())
		})().with_context(|| anyhow!("in class {:?}", class.name))?;
	}

	Ok(mappings)
}

fn split_javadoc(javadoc: &Option<JavadocMapping>) -> Vec<String> {
	javadoc.as_ref()
		.map(|jav| jav.0.lines().map(|x| x.to_owned()).collect())
		.unwrap_or_default()
}

fn entry_name(names: &Names<impl AsRef<str>>) -> Result<String> {
	let name = names.names()[0].as_ref()
		.with_context(|| anyhow!("no name in the first column"))?;
	Ok(name.as_ref().to_owned())
}

fn unmapped_desc(desc: &DescriptorDef<impl AsRef<str>>) -> Result<String> {
	match desc {
		DescriptorDef::Unmapped(d) => Ok(d.as_ref().to_owned()),
		DescriptorDef::Both { unmapped, .. } => Ok(unmapped.as_ref().to_owned()),
		_ => bail!("the parchment format requires a descriptor in the unmapped namespace, got {:?}", desc.stored_namespace()),
	}
}

/// Writes the given mappings into a `String`, in the Parchment format.
pub fn write_string(mappings: &Mappings) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the Parchment format.
pub fn write_vec(mappings: &Mappings) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

/// Writes the given mappings to the given writer, in the Parchment format.
///
/// Only paired collections can be written in this format; only the first-column names are used.
/// The packages, classes, fields and methods are sorted.
pub fn write(mappings: &Mappings, w: &mut impl Write) -> Result<()> {
	if mappings.info.namespaces.is_namespaced() {
		bail!("cannot write a namespaced mapping collection in the parchment format");
	}

	let mut packages: Vec<_> = mappings.packages.values().collect();
	packages.sort_by_key(|x| &x.info);
	let packages = packages.into_iter()
		.map(|package| Ok(ParchmentPackage {
			name: entry_name(&package.info.names)?,
			javadoc: split_javadoc(&package.javadoc),
		}))
		.collect::<Result<Vec<ParchmentPackage>>>()?;

	let mut classes: Vec<_> = mappings.classes.values().collect();
	classes.sort_by_key(|x| &x.info);
	let classes = classes.into_iter()
		.map(|class| {
			let mut fields: Vec<_> = class.fields.values().collect();
			fields.sort_by_key(|x| &x.info);
			let fields = fields.into_iter()
				.map(|field| {
					let desc = field.info.desc.as_ref()
						.with_context(|| anyhow!("field {:?} has no descriptor, the parchment format requires one", field.info))?;
					Ok(ParchmentField {
						name: entry_name(&field.info.names)?,
						descriptor: unmapped_desc(desc)?,
						javadoc: split_javadoc(&field.javadoc),
					})
				})
				.collect::<Result<Vec<ParchmentField>>>()?;

			let mut methods: Vec<_> = class.methods.values().collect();
			methods.sort_by_key(|x| &x.info);
			let methods = methods.into_iter()
				.map(|method| {
					let parameters = method.parameters.values()
						.map(|parameter| Ok(ParchmentParameter {
							index: parameter.info.index,
							name: entry_name(&parameter.info.names)?,
							javadoc: parameter.javadoc.as_ref().map(|jav| jav.0.clone()),
						}))
						.collect::<Result<Vec<ParchmentParameter>>>()?;
					Ok(ParchmentMethod {
						name: entry_name(&method.info.names)?,
						descriptor: unmapped_desc(&method.info.desc)?,
						javadoc: split_javadoc(&method.javadoc),
						parameters,
					})
				})
				.collect::<Result<Vec<ParchmentMethod>>>()?;

			Ok(ParchmentClass {
				name: entry_name(&class.info.names)?,
				javadoc: split_javadoc(&class.javadoc),
				fields,
				methods,
			})
		})
		.collect::<Result<Vec<ParchmentClass>>>()?;

	let file = ParchmentFile {
		version: WRITTEN_VERSION.to_owned(),
		packages,
		classes,
	};

	let mut w = BufWriter::new(w);
	serde_json::to_writer_pretty(&mut w, &file).context("failed to serialise parchment document")?;
	writeln!(w)?;

	Ok(())
}

#[cfg(test)]
mod testing {
	use super::version_compatible;

	#[test]
	fn version_gate() {
		assert!(version_compatible("1.0.0"));
		assert!(version_compatible("1.1.0"));
		assert!(version_compatible("1.23.456"));
		assert!(!version_compatible("2.0.0"));
		assert!(!version_compatible("0.9.1"));
		assert!(!version_compatible("nonsense"));
	}
}
