//! Read/write round-trips and failure modes for every line-based format.

use anyhow::Result;
use pretty_assertions::assert_eq;
use plume::error::MappingError;
use plume::remapper::ClassRemapper;
use plume::tree::mappings::{DescriptorDef, Mappings};
use plume::tree::names::Namespace;

fn root_cause_is(err: &anyhow::Error, check: impl Fn(&MappingError) -> bool) -> bool {
	err.downcast_ref().is_some_and(check)
}

#[test]
fn srg_round_trip() -> Result<()> {
	let input = "\
PK: a com/example
CL: a com/example/Foo
CL: b com/example/Bar
FD: a/b com/example/Foo/count
MD: a/c (La;)La; com/example/Foo/copy (Lcom/example/Foo;)Lcom/example/Foo;
MD: b/d ()V com/example/Bar/run ()V
";

	let mappings = plume::srg::read(input.as_bytes())?;
	assert_eq!(mappings.packages.len(), 1);
	assert_eq!(mappings.classes.len(), 2);

	// the mapped-side descriptor of MD: lines is derived from the class table
	assert_eq!(plume::srg::write_string(&mappings)?, input);
	Ok(())
}

#[test]
fn srg_member_for_undeclared_class() {
	let input = "FD: a/b com/example/Foo/count\n";

	let err = plume::srg::read(input.as_bytes()).unwrap_err();
	assert!(root_cause_is(&err, |e| matches!(e,
		MappingError::UnknownClassReference { line: 1, class } if class == "a"
	)), "{err:#}");
}

#[test]
fn srg_truncated_line() {
	let input = "CL: a\n";

	let err = plume::srg::read(input.as_bytes()).unwrap_err();
	assert!(root_cause_is(&err, |e| matches!(e, MappingError::TruncatedRecord { line: 1 })), "{err:#}");
}

#[test]
fn csrg_round_trip() -> Result<()> {
	let input = "\
a/ com/example/
a com/example/Foo
a b count
a c (I)V setCount
";

	let mappings = plume::csrg::read(input.as_bytes())?;
	assert_eq!(plume::csrg::write_string(&mappings)?, input);
	Ok(())
}

#[test]
fn csrg_member_before_class_row() -> Result<()> {
	// members may precede the class row of their owner
	let input = "\
a b count
a com/example/Foo
";

	let mappings = plume::csrg::read(input.as_bytes())?;
	let class = &mappings.classes["a"];
	assert_eq!(class.info.names.names()[1].as_ref().map(|x| x.as_str()), Some("com/example/Foo"));
	assert_eq!(class.fields.len(), 1);
	Ok(())
}

#[test]
fn csrg_duplicate_class_row() {
	let input = "\
a com/example/Foo
a com/example/Bar
";

	let err = plume::csrg::read(input.as_bytes()).unwrap_err();
	assert!(root_cause_is(&err, |e| matches!(e, MappingError::DuplicateEntry { .. })), "{err:#}");
}

#[test]
fn tsrg_round_trip() -> Result<()> {
	let input = "\
a/ com/example/
a com/example/Foo
\tb count
\tc (I)V setCount
";

	let mappings = plume::csrg::read_tsrg(input.as_bytes())?;
	assert_eq!(plume::csrg::write_tsrg_string(&mappings)?, input);
	Ok(())
}

#[test]
fn tsrg_member_before_any_class() {
	let input = "\tb count\n";

	let err = plume::csrg::read_tsrg(input.as_bytes()).unwrap_err();
	assert!(root_cause_is(&err, |e| matches!(e, MappingError::UnknownClassReference { line: 1, .. })), "{err:#}");
}

#[test]
fn tsrg2_round_trip() -> Result<()> {
	let input = "\
tsrg2 obf srg id
a com/example/Foo net/minecraft/Foo_
\tb count f_1_
\tc (La;)V setOther m_1_
\t\tstatic
\t\t0 i value p_1_
";

	let mappings = plume::tsrg2::read(input.as_bytes())?;

	let method = mappings.classes["a"].methods.values().next()
		.map(|method| method.info.clone())
		.expect("one method");
	assert_eq!(method.desc, DescriptorDef::Namespaced { namespace: Namespace::new(0, 3)?, desc: "(La;)V".into() });

	assert_eq!(plume::tsrg2::write_string(&mappings)?, input);
	Ok(())
}

#[test]
fn tsrg2_member_before_any_class() {
	let input = "tsrg2 obf srg id\n\tb count f_1_\n";

	let err = plume::tsrg2::read(input.as_bytes()).unwrap_err();
	assert!(root_cause_is(&err, |e| matches!(e, MappingError::UnknownClassReference { line: 2, .. })), "{err:#}");
}

#[test]
fn proguard_round_trip() -> Result<()> {
	let input = "\
com.example.Foo -> a:
    int count -> b
    com.example.Foo[] values() -> d
    12:34:void setCount(int) -> c
";

	let mappings = plume::proguard::read(input.as_bytes())?;

	let class = &mappings.classes["a"];
	let field = class.fields.values().next().expect("one field");
	assert_eq!(field.info.desc, Some(DescriptorDef::Mapped("I".into())));
	let method = class.methods.values()
		.find(|method| method.info.names.names()[0].as_ref().is_some_and(|name| name.as_str() == "c"))
		.expect("the setCount method");
	assert_eq!(method.line_range, Some((12, 34)));

	assert_eq!(plume::proguard::write_string(&mappings)?, input);
	Ok(())
}

#[test]
fn proguard_member_before_any_class() {
	let input = "    int count -> b\n";

	let err = plume::proguard::read(input.as_bytes()).unwrap_err();
	assert!(root_cause_is(&err, |e| matches!(e, MappingError::UnknownClassReference { line: 1, .. })), "{err:#}");
}

#[test]
fn proguard_packaged_obfuscated_names() -> Result<()> {
	// R8 keeps some classes under their packaged name, dotted on both sides of the arrow
	let input = "\
com.example.Foo -> a.b.C:
com.mojang.logging.LogUtils -> com.mojang.logging.LogUtils:
";

	let mappings = plume::proguard::read(input.as_bytes())?;

	// stored in internal slash form, like every other format
	assert!(mappings.classes.contains_key("a/b/C"));
	assert!(mappings.classes.contains_key("com/mojang/logging/LogUtils"));

	let remapper = mappings.remapper(Namespace::new(0, 2)?, Namespace::new(1, 2)?)?;
	assert_eq!(remapper.map_class_fail("a/b/C")?.map(|name| name.as_str().to_owned()), Some("com/example/Foo".to_owned()));
	assert!(remapper.map_class_fail("com/mojang/logging/LogUtils")?.is_some());

	assert_eq!(plume::proguard::write_string(&mappings)?, input);
	Ok(())
}

#[test]
fn tiny_v1_round_trip() -> Result<()> {
	let input = "\
v1\tofficial\tintermediary\tnamed
CLASS\ta\tclass_1\tcom/example/Foo
FIELD\ta\tI\tb\tfield_1\tcount
METHOD\ta\t(I)V\tc\tmethod_1\tsetCount
";

	let mappings = plume::tiny_v1::read(input.as_bytes())?;
	assert_eq!(mappings.width(), 3);
	assert_eq!(plume::tiny_v1::write_string(&mappings)?, input);
	Ok(())
}

#[test]
fn tiny_v1_field_descriptor_is_optional() -> Result<()> {
	let input = "\
v1\tofficial\tnamed
CLASS\ta\tcom/example/Foo
FIELD\ta\tb\tcount
";

	let mappings = plume::tiny_v1::read(input.as_bytes())?;
	let field = mappings.classes["a"].fields.values().next().expect("one field");
	assert_eq!(field.info.desc, None);

	assert_eq!(plume::tiny_v1::write_string(&mappings)?, input);
	Ok(())
}

#[test]
fn tiny_v2_round_trip() -> Result<()> {
	let input = "\
tiny\t2\t0\tofficial\tnamed
\tescaped-names
c\ta\tcom/example/Foo
\tc\tA\\nclass comment.
\tf\tI\tb\tcount
\tm\t(I)V\tc\tsetCount
\t\tp\t1\t\tvalue
";

	let mappings = plume::tiny_v2::read(input.as_bytes())?;

	let class = &mappings.classes["a"];
	assert_eq!(class.javadoc.as_ref().map(|jav| jav.0.as_str()), Some("A\nclass comment."));

	assert_eq!(plume::tiny_v2::write_string(&mappings)?, input);
	Ok(())
}

#[test]
fn tiny_v2_rejects_wrong_header() {
	let input = "tiny\t1\t0\tofficial\tnamed\n";
	assert!(plume::tiny_v2::read(input.as_bytes()).is_err());
}

#[test]
fn parchment_round_trip() -> Result<()> {
	let input = r#"{
    "version": "1.1.0",
    "classes": [
        {
            "name": "com/example/Foo",
            "javadoc": [ "Line one.", "Line two." ],
            "fields": [ { "name": "count", "descriptor": "I" } ],
            "methods": [
                {
                    "name": "setCount", "descriptor": "(I)V",
                    "parameters": [ { "index": 1, "name": "value", "javadoc": "The new count." } ]
                }
            ]
        }
    ]
}"#;

	let mappings = plume::parchment::read(input.as_bytes())?;
	let class = &mappings.classes["com/example/Foo"];
	assert_eq!(class.javadoc.as_ref().map(|jav| jav.0.as_str()), Some("Line one.\nLine two."));

	let written = plume::parchment::write_string(&mappings)?;
	let reread = plume::parchment::read(written.as_bytes())?;
	assert_eq!(reread, mappings);
	Ok(())
}

#[test]
fn parchment_rejects_other_majors() {
	let input = r#"{ "version": "2.0.0", "classes": [] }"#;
	assert!(plume::parchment::read(input.as_bytes()).is_err());
}

#[test]
fn format_dispatch_matches_the_modules() -> Result<()> {
	use plume::format::Format;

	let input = "\
a com/example/Foo
a b count
";

	let mappings = Format::Csrg.read(input.as_bytes())?;
	let mut written = Vec::new();
	Format::Csrg.write(&mappings, &mut written)?;
	assert_eq!(String::from_utf8(written)?, input);

	assert!(Format::TinyV2.is_namespaced());
	assert!(!Format::Proguard.is_namespaced());
	assert_eq!(Format::Srg.comment_char(), '#');
	assert_eq!(Format::TinyV2.comment_char(), '\0');
	Ok(())
}
