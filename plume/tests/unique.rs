//! Converting between the flat "unique" shape and the classified shape.

use anyhow::Result;
use pretty_assertions::assert_eq;
use plume::tree::mappings::{DescriptorDef, FieldMapping, MappingInfo, MethodKey, MethodMapping, ParameterMapping};
use plume::tree::names::{Names, NamespaceInfo};
use plume::tree::unique::{UniqueFieldMapping, UniqueMappings, UniqueMethodMapping, UniqueParameterMapping};
use plume::tree::NodeInfo;

fn paired() -> MappingInfo {
	MappingInfo { namespaces: NamespaceInfo::Paired }
}

#[test]
fn classifying_creates_stub_owners() -> Result<()> {
	// a parameter row whose class and method are never named anywhere else
	let mut unique = UniqueMappings::new(paired());
	unique.parameters.push(UniqueParameterMapping {
		owner: "a".into(),
		method: MethodKey { name: "c".into(), desc: "(I)V".into() },
		parameter: ParameterMapping {
			index: 1,
			names: Names::pair("p_1".into(), Some("value".into())),
		},
		javadoc: None,
	});

	let mappings = unique.classify()?;

	let class = &mappings.classes["a"];
	assert_eq!(class.info.names.names(), [Some("a".into()), None]);

	let method = &class.methods[&MethodKey { name: "c".into(), desc: "(I)V".into() }];
	assert_eq!(method.info.desc, DescriptorDef::Unmapped("(I)V".into()));
	assert_eq!(method.parameters.len(), 1);
	Ok(())
}

#[test]
fn flat_and_classified_shapes_convert_both_ways() -> Result<()> {
	let mut unique = UniqueMappings::new(paired());
	unique.fields.push(UniqueFieldMapping {
		owner: "a".into(),
		field: FieldMapping {
			desc: Some(DescriptorDef::Unmapped("I".into())),
			names: Names::pair("b".into(), Some("count".into())),
		},
		javadoc: Some("The count.".to_owned().into()),
	});
	unique.methods.push(UniqueMethodMapping {
		owner: "a".into(),
		method: MethodMapping {
			desc: DescriptorDef::Unmapped("(I)V".into()),
			names: Names::pair("c".into(), Some("setCount".into())),
		},
		javadoc: None,
	});
	unique.parameters.push(UniqueParameterMapping {
		owner: "a".into(),
		method: MethodKey { name: "c".into(), desc: "(I)V".into() },
		parameter: ParameterMapping {
			index: 1,
			names: Names::pair("p_1".into(), Some("value".into())),
		},
		javadoc: None,
	});

	let classified = unique.clone().classify()?;
	assert_eq!(classified.classes.len(), 1);

	let back = UniqueMappings::try_from(classified)?;
	assert_eq!(back, unique);
	Ok(())
}
