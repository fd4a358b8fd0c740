use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use pretty_assertions::assert_eq;
use plume::error::MappingError;
use plume::remapper::{ClassRemapper, MemberRemapper};
use plume::tree::hierarchy::{Hierarchy, NoSuperClassProvider};
use plume::tree::names::Namespace;

fn ns(id: usize) -> Namespace {
	Namespace::new(id, 2).unwrap()
}

fn hierarchy(entries: &[(&str, &[&str])]) -> Hierarchy {
	let super_classes = entries.iter()
		.map(|&(class, supers)| (
			class.into(),
			supers.iter().map(|&x| x.into()).collect::<IndexSet<_>>(),
		))
		.collect::<IndexMap<_, _>>();
	Hierarchy { super_classes }
}

const INPUT: &str = "\
tiny\t2\t0\tofficial\tnamed
c\ta\tcom/example/A
\tf\tI\tfieldA\tcounter
\tm\t()V\tfoo\tbar
c\tb\tcom/example/B
c\tx\tcom/example/X
\tm\t()V\tfoo\tfromX
c\ty\tcom/example/Y
\tm\t()V\tfoo\tfromY
c\tz\tcom/example/Z
\tm\t()V\tfoo\tfromX
c\tc\tcom/example/C
c\td\tcom/example/D
\tm\t(La;)La;\tcopy\tduplicate
";

#[test]
fn inherited_method_resolution() -> Result<()> {
	let mappings = plume::tiny_v2::read(INPUT.as_bytes())?;

	// b extends a
	let inheritance = hierarchy(&[("b", &["a"]), ("a", &["java/lang/Object"])]);

	let from = mappings.get_namespace("official")?;
	let to = mappings.get_namespace("named")?;
	let remapper = mappings.remapper_full(from, to, &inheritance)?;

	// declared on a, inherited by b
	assert_eq!(remapper.map_method("b", "foo", "()V")?, ("bar".into(), "()V".into()));
	assert_eq!(remapper.map_field("b", "fieldA")?, "counter".into());

	// and still resolved directly on a
	assert_eq!(remapper.map_method("a", "foo", "()V")?, ("bar".into(), "()V".into()));
	Ok(())
}

#[test]
fn unrelated_branches_with_distinct_mappings_are_ambiguous() -> Result<()> {
	let mappings = plume::tiny_v2::read(INPUT.as_bytes())?;

	// c implements x and y, which both declare foo()V with different mapped names
	let inheritance = hierarchy(&[("c", &["x", "y"])]);

	let remapper = mappings.remapper_full(ns(0), ns(1), &inheritance)?;

	let err = remapper.map_method("c", "foo", "()V").unwrap_err();
	assert!(matches!(err.downcast_ref(), Some(MappingError::AmbiguousInheritedSymbol { .. })), "{err:#}");
	Ok(())
}

#[test]
fn identical_results_from_unrelated_branches_are_not_ambiguous() -> Result<()> {
	let mappings = plume::tiny_v2::read(INPUT.as_bytes())?;

	// x and z both map foo()V to fromX
	let inheritance = hierarchy(&[("c", &["x", "z"])]);

	let remapper = mappings.remapper_full(ns(0), ns(1), &inheritance)?;

	assert_eq!(remapper.map_method("c", "foo", "()V")?, ("fromX".into(), "()V".into()));
	Ok(())
}

#[test]
fn unknown_symbols_pass_through() -> Result<()> {
	let mappings = plume::tiny_v2::read(INPUT.as_bytes())?;
	let remapper = mappings.remapper_full(ns(0), ns(1), NoSuperClassProvider::new())?;

	// classes absent from the mapping, e.g. JDK ones, map to themselves
	assert_eq!(remapper.map_class("java/util/List")?, "java/util/List".into());
	assert_eq!(remapper.map_field("java/util/List", "size")?, "size".into());
	assert_eq!(
		remapper.map_method("java/util/List", "isEmpty", "()Z")?,
		("isEmpty".into(), "()Z".into()),
	);

	// but the fail variants report the miss
	assert_eq!(remapper.map_class_fail("java/util/List")?, None);
	Ok(())
}

#[test]
fn constructors_are_never_looked_up() -> Result<()> {
	let mappings = plume::tiny_v2::read(INPUT.as_bytes())?;
	let remapper = mappings.remapper_full(ns(0), ns(1), NoSuperClassProvider::new())?;

	// the descriptor is still mapped
	assert_eq!(
		remapper.map_method("a", "<init>", "(La;)V")?,
		("<init>".into(), "(Lcom/example/A;)V".into()),
	);
	assert_eq!(remapper.map_method_fail("a", "<clinit>", "()V")?, None);
	Ok(())
}

#[test]
fn synthetic_members_do_not_search_ancestors() -> Result<()> {
	let mappings = plume::tiny_v2::read(INPUT.as_bytes())?;
	let inheritance = hierarchy(&[("b", &["a"])]);
	let remapper = mappings.remapper_full(ns(0), ns(1), &inheritance)?;

	assert_eq!(remapper.map_method_fail("b", "lambda$foo$0", "()V")?, None);
	assert_eq!(remapper.map_field_fail("b", "access$000")?, None);
	Ok(())
}

#[test]
fn descriptors_are_rewritten() -> Result<()> {
	let mappings = plume::tiny_v2::read(INPUT.as_bytes())?;
	let remapper = mappings.remapper(ns(0), ns(1))?;

	assert_eq!(remapper.map_class("a")?, "com/example/A".into());
	assert_eq!(remapper.unmap_class("com/example/A")?, "a".into());
	assert_eq!(remapper.map_field_desc("[La;")?, "[Lcom/example/A;".into());
	assert_eq!(remapper.map_method_desc("(La;I)Lb;")?, "(Lcom/example/A;I)Lcom/example/B;".into());
	assert_eq!(remapper.map_method_desc("()V")?, "()V".into());
	assert_eq!(remapper.map_method_desc_to_unmapped("(Lcom/example/B;)V")?, "(Lb;)V".into());

	// an unterminated class name inside a descriptor must not be silently accepted
	let err = remapper.map_method_desc("(La)V").unwrap_err();
	assert!(matches!(err.downcast_ref(), Some(MappingError::MalformedDescriptor { .. })), "{err:#}");
	Ok(())
}

#[test]
fn method_keys_use_the_from_namespace_descriptor() -> Result<()> {
	let mappings = plume::tiny_v2::read(INPUT.as_bytes())?;
	let remapper = mappings.remapper_full(ns(0), ns(1), NoSuperClassProvider::new())?;

	// the descriptor of copy is stored as (La;)La; in the official namespace
	assert_eq!(
		remapper.map_method("d", "copy", "(La;)La;")?,
		("duplicate".into(), "(Lcom/example/A;)Lcom/example/A;".into()),
	);
	// a named-side descriptor is not a valid key in the official direction
	assert_eq!(remapper.map_method_fail("d", "copy", "(Lcom/example/A;)Lcom/example/A;")?, None);
	Ok(())
}

#[test]
fn mapped_descriptors_are_normalized_at_index_build_time() -> Result<()> {
	// proguard stores descriptors on the mapped side
	let input = "\
com.example.A -> a:
com.example.D -> d:
    com.example.A copy(com.example.A) -> c
";

	let mappings = plume::proguard::read(input.as_bytes())?;
	let remapper = mappings.remapper_full(ns(0), ns(1), NoSuperClassProvider::new())?;

	// lookups use the unmapped descriptor, even though only the mapped one was stored
	assert_eq!(
		remapper.map_method("d", "c", "(La;)La;")?,
		("copy".into(), "(Lcom/example/A;)Lcom/example/A;".into()),
	);
	Ok(())
}

#[test]
fn reversed_direction_through_a_full_remapper() -> Result<()> {
	let mappings = plume::tiny_v2::read(INPUT.as_bytes())?;

	// swapping from and to swaps the lookup direction
	let remapper = mappings.remapper_full(ns(1), ns(0), NoSuperClassProvider::new())?;
	assert_eq!(remapper.map_class("com/example/A")?, "a".into());
	assert_eq!(
		remapper.map_method("com/example/D", "duplicate", "(Lcom/example/A;)Lcom/example/A;")?,
		("copy".into(), "(La;)La;".into()),
	);
	Ok(())
}
