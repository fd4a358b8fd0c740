//! The flat "unique" collection shape: independent field/method/parameter lists, used for
//! mapping sources that do not group members by class (legacy CSV-style tables).

use anyhow::{anyhow, Context, Result};
use crate::tree::mappings::{ClassMapping, ClassNowodeMapping, FieldMapping, FieldNowodeMapping, JavadocMapping, MappingInfo, Mappings, MethodKey, MethodMapping, MethodNowodeMapping, ParameterMapping, ParameterNowodeMapping};
use crate::tree::names::ClassName;
use crate::tree::{FromKey, NodeInfo, ToKey};

#[derive(Debug, Clone, PartialEq)]
pub struct UniqueFieldMapping {
	pub owner: ClassName,
	pub field: FieldMapping,
	pub javadoc: Option<JavadocMapping>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniqueMethodMapping {
	pub owner: ClassName,
	pub method: MethodMapping,
	pub javadoc: Option<JavadocMapping>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniqueParameterMapping {
	pub owner: ClassName,
	pub method: MethodKey,
	pub parameter: ParameterMapping,
	pub javadoc: Option<JavadocMapping>,
}

/// A mapping collection without class grouping. Members reference their owner by unmapped class
/// name; [`UniqueMappings::classify`] turns this into the classified shape.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueMappings {
	pub info: MappingInfo,
	pub fields: Vec<UniqueFieldMapping>,
	pub methods: Vec<UniqueMethodMapping>,
	pub parameters: Vec<UniqueParameterMapping>,
}

impl NodeInfo<MappingInfo> for UniqueMappings {
	fn get_node_info(&self) -> &MappingInfo {
		&self.info
	}

	fn get_node_info_mut(&mut self) -> &mut MappingInfo {
		&mut self.info
	}

	fn new(info: MappingInfo) -> UniqueMappings {
		UniqueMappings {
			info,
			fields: Vec::new(),
			methods: Vec::new(),
			parameters: Vec::new(),
		}
	}
}

impl UniqueMappings {
	/// Groups the flat lists under their owning classes. Classes never named on the left-hand
	/// side get a stub entry carrying only the unmapped name; methods referenced solely by a
	/// parameter row get a stub the same way.
	pub fn classify(self) -> Result<Mappings> {
		let width = self.info.namespaces.width();
		let mut mappings = Mappings::new(self.info);

		for field in self.fields {
			let class = class_entry(&mut mappings, field.owner, width);
			let node = class.add_field(FieldNowodeMapping::new(field.field))
				.context("classifying a flat field list")?;
			node.javadoc = field.javadoc;
		}

		for method in self.methods {
			let class = class_entry(&mut mappings, method.owner, width);
			let node = class.add_method(MethodNowodeMapping::new(method.method))
				.context("classifying a flat method list")?;
			node.javadoc = method.javadoc;
		}

		for parameter in self.parameters {
			let class = class_entry(&mut mappings, parameter.owner, width);
			if !class.methods.contains_key(&parameter.method) {
				let stub = MethodNowodeMapping::new(MethodMapping::from_key(parameter.method.clone(), width));
				class.add_method(stub)
					.with_context(|| anyhow!("classifying a parameter of method {:?}", parameter.method))?;
			}
			let method = class.methods.get_mut(&parameter.method)
				.with_context(|| anyhow!("no method entry for {:?}", parameter.method))?;
			let node = method.add_parameter(ParameterNowodeMapping::new(parameter.parameter))
				.context("classifying a flat parameter list")?;
			node.javadoc = parameter.javadoc;
		}

		Ok(mappings)
	}
}

fn class_entry(mappings: &mut Mappings, owner: ClassName, width: usize) -> &mut ClassNowodeMapping {
	mappings.classes.entry(owner.clone())
		.or_insert_with(|| ClassNowodeMapping::new(ClassMapping::from_key(owner, width)))
}

impl TryFrom<Mappings> for UniqueMappings {
	type Error = anyhow::Error;

	fn try_from(mappings: Mappings) -> Result<UniqueMappings> {
		let mut unique = UniqueMappings::new(mappings.info);

		for (_, class) in mappings.classes {
			let owner = class.info.get_key()?;

			for (_, field) in class.fields {
				unique.fields.push(UniqueFieldMapping {
					owner: owner.clone(),
					field: field.info,
					javadoc: field.javadoc,
				});
			}

			for (_, method) in class.methods {
				let key = method.info.get_key()?;

				for (_, parameter) in method.parameters {
					unique.parameters.push(UniqueParameterMapping {
						owner: owner.clone(),
						method: key.clone(),
						parameter: parameter.info,
						javadoc: parameter.javadoc,
					});
				}

				unique.methods.push(UniqueMethodMapping {
					owner: owner.clone(),
					method: method.info,
					javadoc: method.javadoc,
				});
			}
		}

		Ok(unique)
	}
}
