use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use crate::descriptor::{FieldDescriptor, MethodDescriptor};
use crate::error::MappingError;
use crate::tree::hierarchy::{AccessTarget, AccessTransforms, Hierarchy, Properties};
use crate::tree::names::{ClassName, FieldName, MethodName, Names, Namespace, NamespaceInfo, PackageName, ParameterName};
use crate::tree::{FromKey, NodeInfo, ToKey};

/// Where the descriptor stored on a member mapping is written.
///
/// Formats disagree on this: most store the descriptor in the unmapped namespace, line-numbered
/// Proguard files store the already-translated one, and namespaced formats store exactly one
/// descriptor tagged with its namespace. Reversal produces the `Both` variant.
#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub enum DescriptorDef<D> {
	Unmapped(D),
	Mapped(D),
	Both { unmapped: D, mapped: D },
	Namespaced { namespace: Namespace, desc: D },
}

impl<D> DescriptorDef<D> {
	/// The descriptor string as stored, regardless of which namespace it is written in.
	/// This is what member keys are built from.
	pub fn stored(&self) -> &D {
		match self {
			DescriptorDef::Unmapped(desc) => desc,
			DescriptorDef::Mapped(desc) => desc,
			DescriptorDef::Both { unmapped, .. } => unmapped,
			DescriptorDef::Namespaced { desc, .. } => desc,
		}
	}

	/// The namespace the stored descriptor is written in, as an index into the collection's
	/// namespaces. `Mapped` counts as the second column, which only exists on paired shapes.
	pub fn stored_namespace(&self) -> Namespace {
		match self {
			DescriptorDef::Unmapped(_) => Namespace(0),
			DescriptorDef::Both { .. } => Namespace(0),
			DescriptorDef::Mapped(_) => Namespace(1),
			DescriptorDef::Namespaced { namespace, .. } => *namespace,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct JavadocMapping(pub String);

impl From<String> for JavadocMapping {
	fn from(value: String) -> JavadocMapping {
		JavadocMapping(value)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingInfo {
	pub namespaces: NamespaceInfo,
}

/// A mapping collection in the classified shape: packages and classes, with fields, methods and
/// parameters grouped under their owning class.
#[derive(Debug, Clone, PartialEq)]
pub struct Mappings {
	pub info: MappingInfo,
	pub packages: IndexMap<PackageName, PackageNowodeMapping>,
	pub classes: IndexMap<ClassName, ClassNowodeMapping>,
	pub javadoc: Option<JavadocMapping>,
	/// Free-form tags carried through format round-trips, see [`Properties`].
	pub properties: Properties,
	/// The inheritance trait; required for resolving inherited members in the remapper.
	pub hierarchy: Option<Hierarchy>,
	/// Access-flag edits to apply during rewriting.
	pub access_transforms: AccessTransforms,
}

impl NodeInfo<MappingInfo> for Mappings {
	fn get_node_info(&self) -> &MappingInfo {
		&self.info
	}

	fn get_node_info_mut(&mut self) -> &mut MappingInfo {
		&mut self.info
	}

	fn new(info: MappingInfo) -> Mappings {
		Mappings {
			info,
			packages: IndexMap::new(),
			classes: IndexMap::new(),
			javadoc: None,
			properties: Properties::default(),
			hierarchy: None,
			access_transforms: AccessTransforms::default(),
		}
	}
}

impl Mappings {
	pub fn width(&self) -> usize {
		self.info.namespaces.width()
	}

	pub fn add_class(&mut self, child: ClassNowodeMapping) -> Result<&mut ClassNowodeMapping> {
		if child.info.names.width() != self.width() {
			bail!("class {:?} has {} name columns, the collection declares {}",
				child.info, child.info.names.width(), self.width());
		}
		match self.classes.entry(child.info.get_key()?) {
			Entry::Occupied(e) => {
				Err(MappingError::DuplicateEntry { key: e.key().as_str().to_owned() })
					.with_context(|| anyhow!("cannot add class for key {:?}, as there's already one: {:?}", e.key(), e.get().info))
			},
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}

	pub fn add_package(&mut self, child: PackageNowodeMapping) -> Result<&mut PackageNowodeMapping> {
		match self.packages.entry(child.info.get_key()?) {
			Entry::Occupied(e) => {
				Err(MappingError::DuplicateEntry { key: e.key().as_str().to_owned() })
					.with_context(|| anyhow!("cannot add package for key {:?}, as there's already one: {:?}", e.key(), e.get().info))
			},
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}

	pub fn get_class_name(&self, class: &str, namespace: Namespace) -> Result<&ClassName> {
		self.classes.get(class)
			.with_context(|| anyhow!("no entry for class {class:?}"))?
			.info
			.names[namespace]
			.as_ref()
			.with_context(|| anyhow!("no name for namespace {namespace:?} for class {class:?}"))
	}

	pub fn get_namespace(&self, name: &str) -> Result<Namespace> {
		match &self.info.namespaces {
			NamespaceInfo::Paired => bail!("paired collections have no named namespaces, cannot look up {name:?}"),
			NamespaceInfo::Namespaced(namespaces) => namespaces.get_namespace(name),
		}
	}

	fn unsupported(&self, operation: &'static str) -> MappingError {
		MappingError::UnsupportedOperationOnShape {
			operation,
			shape: self.info.namespaces.shape_name(),
		}
	}

	/// Swaps the unmapped and mapped sides of every entry, so that translating a name that
	/// previously mapped forward now maps backward.
	///
	/// Only paired collections can be reversed. Descriptors are kept consistent: a `Both`
	/// descriptor trades places, a single-sided one is re-derived through the class table.
	/// Reversing twice restores the original collection.
	pub fn reverse(&mut self) -> Result<()> {
		if self.info.namespaces.is_namespaced() {
			return Err(self.unsupported("reverse").into());
		}

		// the class table, captured before any names are touched
		let forward: IndexMap<String, String> = self.classes.values()
			.filter_map(|class| match (&class.info.names.names()[0], &class.info.names.names()[1]) {
				(Some(src), Some(dst)) => Some((src.as_str().to_owned(), dst.as_str().to_owned())),
				_ => None,
			})
			.collect();
		let backward: IndexMap<String, String> = forward.iter()
			.map(|(src, dst)| (dst.clone(), src.clone()))
			.collect();

		let map_forward = |desc: &str| crate::remapper::rewrite_descriptor(desc, &|class: &str| forward.get(class).cloned());
		let map_backward = |desc: &str| crate::remapper::rewrite_descriptor(desc, &|class: &str| backward.get(class).cloned());

		// access targets are keyed in unmapped names on both sides of the reversal, so members
		// with a mapping entry translate exactly, before any names are touched
		let mut target_renames: IndexMap<AccessTarget, AccessTarget> = IndexMap::new();
		for class in self.classes.values() {
			let [Some(src_class), Some(dst_class)] = class.info.names.names() else {
				continue;
			};
			target_renames.insert(
				AccessTarget::Class(src_class.clone()),
				AccessTarget::Class(dst_class.clone()),
			);

			for field in class.fields.values() {
				if let [Some(src), Some(dst)] = field.info.names.names() {
					target_renames.insert(
						AccessTarget::Field { class: src_class.clone(), name: src.clone() },
						AccessTarget::Field { class: dst_class.clone(), name: dst.clone() },
					);
				}
			}

			for method in class.methods.values() {
				let [Some(src), Some(dst)] = method.info.names.names() else {
					continue;
				};
				let (src_desc, dst_desc) = match &method.info.desc {
					DescriptorDef::Unmapped(desc) =>
						(desc.clone(), map_forward(desc.as_str())?.into()),
					DescriptorDef::Mapped(desc) =>
						(map_backward(desc.as_str())?.into(), desc.clone()),
					DescriptorDef::Both { unmapped, mapped } =>
						(unmapped.clone(), mapped.clone()),
					DescriptorDef::Namespaced { .. } =>
						bail!("paired collections cannot store namespaced descriptors"),
				};
				target_renames.insert(
					AccessTarget::Method { class: src_class.clone(), name: src.clone(), desc: src_desc },
					AccessTarget::Method { class: dst_class.clone(), name: dst.clone(), desc: dst_desc },
				);
			}
		}

		let a = Namespace(0);
		let b = Namespace(1);

		let packages = std::mem::take(&mut self.packages);
		for (_, mut package) in packages {
			package.info.names.swap(a, b);
			self.add_package(package)?;
		}

		let classes = std::mem::take(&mut self.classes);
		for (_, mut class) in classes {
			class.info.names.swap(a, b);
			let owner = class.info.get_key()?;

			let fields = std::mem::take(&mut class.fields);
			for (_, mut field) in fields {
				field.info.names.swap(a, b);
				field.info.desc = match field.info.desc.take() {
					None => None,
					Some(DescriptorDef::Unmapped(desc)) =>
						Some(DescriptorDef::Unmapped(map_forward(desc.as_str())?.into())),
					Some(DescriptorDef::Mapped(desc)) =>
						Some(DescriptorDef::Mapped(map_backward(desc.as_str())?.into())),
					Some(DescriptorDef::Both { unmapped, mapped }) =>
						Some(DescriptorDef::Both { unmapped: mapped, mapped: unmapped }),
					Some(DescriptorDef::Namespaced { .. }) =>
						bail!("paired collections cannot store namespaced descriptors"),
				};
				field.owner = Some(owner.clone());
				class.add_field_rekeyed(field)?;
			}

			let methods = std::mem::take(&mut class.methods);
			for (_, mut method) in methods {
				method.info.names.swap(a, b);
				method.info.desc = match method.info.desc.clone() {
					DescriptorDef::Unmapped(desc) =>
						DescriptorDef::Unmapped(map_forward(desc.as_str())?.into()),
					DescriptorDef::Mapped(desc) =>
						DescriptorDef::Mapped(map_backward(desc.as_str())?.into()),
					DescriptorDef::Both { unmapped, mapped } =>
						DescriptorDef::Both { unmapped: mapped, mapped: unmapped },
					DescriptorDef::Namespaced { .. } =>
						bail!("paired collections cannot store namespaced descriptors"),
				};
				for parameter in method.parameters.values_mut() {
					parameter.info.names.swap(a, b);
				}
				method.owner = Some(owner.clone());
				class.add_method_rekeyed(method)?;
			}

			self.classes.insert(owner, class);
		}

		if let Some(hierarchy) = self.hierarchy.take() {
			self.hierarchy = Some(hierarchy.rename_classes(&|class: &str| forward.get(class).cloned()));
		}
		self.access_transforms.rename_targets(|target| {
			if let Some(renamed) = target_renames.get(&target) {
				return renamed.clone();
			}
			// no mapping entry for the member itself, rename the owner only
			let rename_class = |class: ClassName| -> ClassName {
				forward.get(class.as_str()).map_or(class, |dst| dst.as_str().into())
			};
			match target {
				AccessTarget::Class(class) => AccessTarget::Class(rename_class(class)),
				AccessTarget::Field { class, name } =>
					AccessTarget::Field { class: rename_class(class), name },
				AccessTarget::Method { class, name, desc } =>
					AccessTarget::Method { class: rename_class(class), name, desc },
			}
		});

		Ok(())
	}

	/// Exchanges the names stored under namespace `a` with those under `b`, on every entry
	/// including parameter tables. Namespace-tagged descriptors written in `a` or `b` are
	/// re-tagged so they keep describing the names they were written in.
	///
	/// Only namespaced collections support this; swapping twice is the identity. The declared
	/// namespace names keep their positions.
	pub fn swap_namespaces(&mut self, a: Namespace, b: Namespace) -> Result<()> {
		let width = match &self.info.namespaces {
			NamespaceInfo::Paired => return Err(self.unsupported("swap_namespaces").into()),
			NamespaceInfo::Namespaced(namespaces) => namespaces.len(),
		};
		if a.0 >= width || b.0 >= width {
			bail!("namespaces {a:?} and {b:?} must both be within the collection width {width}");
		}

		let retag = |namespace: Namespace| {
			if namespace == a { b } else if namespace == b { a } else { namespace }
		};

		let classes = std::mem::take(&mut self.classes);
		for (_, mut class) in classes {
			class.info.names.swap(a, b);
			let owner = class.info.get_key()?;

			let fields = std::mem::take(&mut class.fields);
			for (_, mut field) in fields {
				field.info.names.swap(a, b);
				if let Some(DescriptorDef::Namespaced { namespace, .. }) = &mut field.info.desc {
					*namespace = retag(*namespace);
				}
				field.owner = Some(owner.clone());
				class.add_field_rekeyed(field)?;
			}

			let methods = std::mem::take(&mut class.methods);
			for (_, mut method) in methods {
				method.info.names.swap(a, b);
				if let DescriptorDef::Namespaced { namespace, .. } = &mut method.info.desc {
					*namespace = retag(*namespace);
				}
				for parameter in method.parameters.values_mut() {
					parameter.info.names.swap(a, b);
				}
				method.owner = Some(owner.clone());
				class.add_method_rekeyed(method)?;
			}

			self.classes.insert(owner, class);
		}

		let packages = std::mem::take(&mut self.packages);
		for (_, mut package) in packages {
			package.info.names.swap(a, b);
			self.add_package(package)?;
		}

		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageNowodeMapping {
	pub info: PackageMapping,
	pub javadoc: Option<JavadocMapping>,
}

impl NodeInfo<PackageMapping> for PackageNowodeMapping {
	fn get_node_info(&self) -> &PackageMapping {
		&self.info
	}

	fn get_node_info_mut(&mut self) -> &mut PackageMapping {
		&mut self.info
	}

	fn new(info: PackageMapping) -> PackageNowodeMapping {
		PackageNowodeMapping {
			info,
			javadoc: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassNowodeMapping {
	pub info: ClassMapping,
	pub fields: IndexMap<FieldName, FieldNowodeMapping>,
	pub methods: IndexMap<MethodKey, MethodNowodeMapping>,
	pub javadoc: Option<JavadocMapping>,
}

impl NodeInfo<ClassMapping> for ClassNowodeMapping {
	fn get_node_info(&self) -> &ClassMapping {
		&self.info
	}

	fn get_node_info_mut(&mut self) -> &mut ClassMapping {
		&mut self.info
	}

	fn new(info: ClassMapping) -> ClassNowodeMapping {
		ClassNowodeMapping {
			info,
			fields: IndexMap::new(),
			methods: IndexMap::new(),
			javadoc: None,
		}
	}
}

impl ClassNowodeMapping {
	/// Attaches a field. Fields are keyed by their unmapped name; a second field under the same
	/// unmapped name is a construction error.
	pub fn add_field(&mut self, mut child: FieldNowodeMapping) -> Result<&mut FieldNowodeMapping> {
		if child.info.names.width() != self.info.names.width() {
			bail!("field {:?} has {} name columns, its class has {}",
				child.info, child.info.names.width(), self.info.names.width());
		}
		if let Some(owner) = &child.owner {
			bail!("field {:?} is already attached to class {owner:?}", child.info);
		}
		child.owner = Some(self.info.get_key()?);
		self.add_field_rekeyed(child)
	}

	fn add_field_rekeyed(&mut self, child: FieldNowodeMapping) -> Result<&mut FieldNowodeMapping> {
		match self.fields.entry(child.info.get_key()?) {
			Entry::Occupied(e) => {
				Err(MappingError::DuplicateEntry { key: e.key().as_str().to_owned() })
					.with_context(|| anyhow!("cannot add field for key {:?}, as there's already one: {:?}", e.key(), e.get().info))
			},
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}

	/// Attaches a method. The method list is ordered and append-only; a second method under the
	/// same unmapped name and descriptor is a construction error.
	pub fn add_method(&mut self, mut child: MethodNowodeMapping) -> Result<&mut MethodNowodeMapping> {
		if child.info.names.width() != self.info.names.width() {
			bail!("method {:?} has {} name columns, its class has {}",
				child.info, child.info.names.width(), self.info.names.width());
		}
		if let Some(owner) = &child.owner {
			bail!("method {:?} is already attached to class {owner:?}", child.info);
		}
		child.owner = Some(self.info.get_key()?);
		self.add_method_rekeyed(child)
	}

	fn add_method_rekeyed(&mut self, child: MethodNowodeMapping) -> Result<&mut MethodNowodeMapping> {
		match self.methods.entry(child.info.get_key()?) {
			Entry::Occupied(e) => {
				Err(MappingError::DuplicateEntry { key: format!("{} {}", e.key().name, e.key().desc) })
					.with_context(|| anyhow!("cannot add method for key {:?}, as there's already one: {:?}", e.key(), e.get().info))
			},
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldNowodeMapping {
	pub info: FieldMapping,
	pub javadoc: Option<JavadocMapping>,
	/// The owning class's key name; set exactly once when the field is attached.
	pub(crate) owner: Option<ClassName>,
}

impl FieldNowodeMapping {
	pub fn owner(&self) -> Option<&ClassName> {
		self.owner.as_ref()
	}
}

impl NodeInfo<FieldMapping> for FieldNowodeMapping {
	fn get_node_info(&self) -> &FieldMapping {
		&self.info
	}

	fn get_node_info_mut(&mut self) -> &mut FieldMapping {
		&mut self.info
	}

	fn new(info: FieldMapping) -> FieldNowodeMapping {
		FieldNowodeMapping {
			info,
			javadoc: None,
			owner: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodNowodeMapping {
	pub info: MethodMapping,
	pub parameters: IndexMap<usize, ParameterNowodeMapping>,
	pub javadoc: Option<JavadocMapping>,
	/// The owning class's key name; set exactly once when the method is attached.
	pub(crate) owner: Option<ClassName>,
	/// TSRG2 `static` marker rows.
	pub is_static: bool,
	/// Proguard `start:end:` source line ranges.
	pub line_range: Option<(u32, u32)>,
}

impl MethodNowodeMapping {
	pub fn owner(&self) -> Option<&ClassName> {
		self.owner.as_ref()
	}

	pub fn add_parameter(&mut self, child: ParameterNowodeMapping) -> Result<&mut ParameterNowodeMapping> {
		match self.parameters.entry(child.info.index) {
			Entry::Occupied(e) => {
				Err(MappingError::DuplicateEntry { key: e.key().to_string() })
					.with_context(|| anyhow!("cannot add parameter for index {:?}, as there's already one: {:?}", e.key(), e.get().info))
			},
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}
}

impl NodeInfo<MethodMapping> for MethodNowodeMapping {
	fn get_node_info(&self) -> &MethodMapping {
		&self.info
	}

	fn get_node_info_mut(&mut self) -> &mut MethodMapping {
		&mut self.info
	}

	fn new(info: MethodMapping) -> MethodNowodeMapping {
		MethodNowodeMapping {
			info,
			parameters: IndexMap::new(),
			javadoc: None,
			owner: None,
			is_static: false,
			line_range: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterNowodeMapping {
	pub info: ParameterMapping,
	pub javadoc: Option<JavadocMapping>,
}

impl NodeInfo<ParameterMapping> for ParameterNowodeMapping {
	fn get_node_info(&self) -> &ParameterMapping {
		&self.info
	}

	fn get_node_info_mut(&mut self) -> &mut ParameterMapping {
		&mut self.info
	}

	fn new(info: ParameterMapping) -> ParameterNowodeMapping {
		ParameterNowodeMapping {
			info,
			javadoc: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord)]
pub struct PackageMapping {
	pub names: Names<PackageName>,
}

impl ToKey<PackageName> for PackageMapping {
	fn get_key(&self) -> Result<PackageName> {
		Ok(self.names.first_name()?.clone())
	}
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord)]
pub struct ClassMapping {
	pub names: Names<ClassName>,
}

impl ToKey<ClassName> for ClassMapping {
	fn get_key(&self) -> Result<ClassName> {
		Ok(self.names.first_name()?.clone())
	}
}

impl FromKey<ClassName> for ClassMapping {
	fn from_key(key: ClassName, width: usize) -> ClassMapping {
		ClassMapping {
			names: Names::from_first_name(key, width),
		}
	}
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord)]
pub struct FieldMapping {
	/// Absent for formats that do not record field types.
	pub desc: Option<DescriptorDef<FieldDescriptor>>,
	pub names: Names<FieldName>,
}

impl ToKey<FieldName> for FieldMapping {
	fn get_key(&self) -> Result<FieldName> {
		Ok(self.names.first_name()?.clone())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
	pub name: MethodName,
	pub desc: MethodDescriptor,
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord)]
pub struct MethodMapping {
	pub desc: DescriptorDef<MethodDescriptor>,
	pub names: Names<MethodName>,
}

impl ToKey<MethodKey> for MethodMapping {
	fn get_key(&self) -> Result<MethodKey> {
		Ok(MethodKey {
			name: self.names.first_name()?.clone(),
			desc: self.desc.stored().clone(),
		})
	}
}

impl FromKey<MethodKey> for MethodMapping {
	fn from_key(key: MethodKey, width: usize) -> MethodMapping {
		MethodMapping {
			desc: DescriptorDef::Unmapped(key.desc),
			names: Names::from_first_name(key.name, width),
		}
	}
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Ord)]
pub struct ParameterMapping {
	pub index: usize,
	pub names: Names<ParameterName>,
}
