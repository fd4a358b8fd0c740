//! Collection surgery: reversing paired collections and swapping namespace columns.

use anyhow::Result;
use pretty_assertions::assert_eq;
use plume::error::MappingError;
use plume::tree::hierarchy::AccessTarget;
use plume::tree::mappings::DescriptorDef;
use plume::tree::names::Namespaces;

#[test]
fn reversing_swaps_names_and_rewrites_descriptors() -> Result<()> {
	let input = "\
CL: a com/example/Foo
FD: a/b com/example/Foo/count
MD: a/c (La;)La; com/example/Foo/copy (Lcom/example/Foo;)Lcom/example/Foo;
";

	let mut mappings = plume::srg::read(input.as_bytes())?;
	mappings.reverse()?;

	// entries are re-keyed under what used to be the mapped name
	let class = &mappings.classes["com/example/Foo"];
	let names: Vec<_> = class.info.names.names().iter()
		.map(|name| name.as_ref().map(|name| name.as_str()))
		.collect();
	assert_eq!(names, [Some("com/example/Foo"), Some("a")]);

	let method = class.methods.values().next().expect("one method");
	assert_eq!(method.info.desc, DescriptorDef::Unmapped("(Lcom/example/Foo;)Lcom/example/Foo;".into()));

	let expected = "\
CL: com/example/Foo a
FD: com/example/Foo/count a/b
MD: com/example/Foo/copy (Lcom/example/Foo;)Lcom/example/Foo; a/c (La;)La;
";
	assert_eq!(plume::srg::write_string(&mappings)?, expected);
	Ok(())
}

#[test]
fn reversing_twice_is_the_identity() -> Result<()> {
	let input = "\
PK: a com/example
CL: a com/example/Foo
CL: b com/example/Bar
FD: a/b com/example/Foo/count
MD: a/c (La;Lb;)V com/example/Foo/take (Lcom/example/Foo;Lcom/example/Bar;)V
";

	let original = plume::srg::read(input.as_bytes())?;
	let mut mappings = original.clone();
	mappings.reverse()?;
	assert_ne!(mappings, original);
	mappings.reverse()?;
	assert_eq!(mappings, original);
	Ok(())
}

#[test]
fn reversing_renames_access_transform_targets() -> Result<()> {
	let input = "\
CL: a com/example/Foo
FD: a/b com/example/Foo/count
MD: a/c (La;)La; com/example/Foo/copy (Lcom/example/Foo;)Lcom/example/Foo;
";

	let mut mappings = plume::srg::read(input.as_bytes())?;
	mappings.access_transforms.add(AccessTarget::Class("a".into()), 0x0001);
	mappings.access_transforms.add(
		AccessTarget::Field { class: "a".into(), name: "b".into() },
		0x0008,
	);
	mappings.access_transforms.add(
		AccessTarget::Method { class: "a".into(), name: "c".into(), desc: "(La;)La;".into() },
		0x0010,
	);
	// a member with no mapping entry, only its owner is renamed
	mappings.access_transforms.add(
		AccessTarget::Field { class: "a".into(), name: "x".into() },
		0x0400,
	);

	mappings.reverse()?;

	let transforms = &mappings.access_transforms;
	assert_eq!(transforms.get(&AccessTarget::Class("com/example/Foo".into())), 0x0001);
	assert_eq!(
		transforms.get(&AccessTarget::Field { class: "com/example/Foo".into(), name: "count".into() }),
		0x0008,
	);
	assert_eq!(
		transforms.get(&AccessTarget::Method {
			class: "com/example/Foo".into(),
			name: "copy".into(),
			desc: "(Lcom/example/Foo;)Lcom/example/Foo;".into(),
		}),
		0x0010,
	);
	assert_eq!(
		transforms.get(&AccessTarget::Field { class: "com/example/Foo".into(), name: "x".into() }),
		0x0400,
	);
	// nothing is left under the old unmapped names
	assert_eq!(transforms.get(&AccessTarget::Class("a".into())), 0);
	assert_eq!(transforms.iter().count(), 4);
	Ok(())
}

#[test]
fn reverse_rejects_namespaced_collections() -> Result<()> {
	let input = "\
tiny\t2\t0\tofficial\tnamed
c\ta\tcom/example/Foo
";

	let mut mappings = plume::tiny_v2::read(input.as_bytes())?;
	let err = mappings.reverse().unwrap_err();
	assert!(err.downcast_ref().is_some_and(|e| matches!(e,
		MappingError::UnsupportedOperationOnShape { operation: "reverse", .. }
	)), "{err:#}");
	Ok(())
}

#[test]
fn swapping_namespaces_exchanges_columns_and_retags_descriptors() -> Result<()> {
	let input = "\
tiny\t2\t0\tofficial\tintermediary\tnamed
c\ta\tclass_1\tcom/example/Foo
\tm\t(La;)V\tc\tmethod_1\ttakeFoo
";

	let mut mappings = plume::tiny_v2::read(input.as_bytes())?;
	let official = mappings.get_namespace("official")?;
	let named = mappings.get_namespace("named")?;
	mappings.swap_namespaces(official, named)?;

	// the entry is re-keyed under the name now in the first column
	let class = &mappings.classes["com/example/Foo"];
	let names: Vec<_> = class.info.names.names().iter()
		.map(|name| name.as_ref().map(|name| name.as_str()))
		.collect();
	assert_eq!(names, [Some("com/example/Foo"), Some("class_1"), Some("a")]);

	// the descriptor was written in "official", which the swap moved to the last column
	let method = class.methods.values().next().expect("one method");
	assert_eq!(method.info.desc, DescriptorDef::Namespaced { namespace: named, desc: "(La;)V".into() });
	Ok(())
}

#[test]
fn swapping_twice_is_the_identity() -> Result<()> {
	let input = "\
tiny\t2\t0\tofficial\tintermediary\tnamed
c\ta\tclass_1\tcom/example/Foo
\tf\tI\tb\tfield_1\tcount
\tm\t(I)V\tc\tmethod_1\tsetCount
\t\tp\t1\t\t\tvalue
";

	let original = plume::tiny_v2::read(input.as_bytes())?;
	let a = original.get_namespace("intermediary")?;
	let b = original.get_namespace("named")?;

	let mut mappings = original.clone();
	mappings.swap_namespaces(a, b)?;
	assert_ne!(mappings, original);
	mappings.swap_namespaces(a, b)?;
	assert_eq!(mappings, original);
	Ok(())
}

#[test]
fn swap_rejects_paired_collections() -> Result<()> {
	let input = "CL: a com/example/Foo\n";

	let mut mappings = plume::srg::read(input.as_bytes())?;
	let namespaces = Namespaces::try_from(vec!["official".to_owned(), "named".to_owned()])?;
	let a = namespaces.get_namespace("official")?;
	let b = namespaces.get_namespace("named")?;

	let err = mappings.swap_namespaces(a, b).unwrap_err();
	assert!(err.downcast_ref().is_some_and(|e| matches!(e,
		MappingError::UnsupportedOperationOnShape { operation: "swap_namespaces", .. }
	)), "{err:#}");
	Ok(())
}

#[test]
fn two_namespaces_have_an_implied_target() -> Result<()> {
	let namespaces = Namespaces::try_from(vec!["official".to_owned(), "named".to_owned()])?;
	assert_eq!(namespaces.target_namespace()?, namespaces.get_namespace("named")?);
	Ok(())
}

#[test]
fn three_namespaces_need_an_explicit_target() -> Result<()> {
	let namespaces = Namespaces::try_from(vec![
		"official".to_owned(),
		"intermediary".to_owned(),
		"named".to_owned(),
	])?;
	let err = namespaces.target_namespace().unwrap_err();
	assert!(err.downcast_ref().is_some_and(|e| matches!(e, MappingError::TargetNamespaceRequired)), "{err:#}");
	Ok(())
}
