use anyhow::Result;
use pretty_assertions::assert_eq;
use plume::detect::{detect, read_detect};
use plume::error::MappingError;
use plume::format::Format;

#[test]
fn headers_short_circuit() -> Result<()> {
	assert_eq!(detect("tiny\t2\t0\tofficial\tnamed\n")?, Format::TinyV2);
	assert_eq!(detect("v1\tofficial\tnamed\n")?, Format::TinyV1);
	assert_eq!(detect("tsrg2 obf srg id\n")?, Format::Tsrg2);
	Ok(())
}

#[test]
fn srg_tags() -> Result<()> {
	let sample = "\
# a comment, skipped before sampling
PK: a com/example
CL: a com/example/Foo
MD: a/c ()V com/example/Foo/run ()V
";
	assert_eq!(detect(sample)?, Format::Srg);
	Ok(())
}

#[test]
fn proguard_is_never_mistaken_for_tsrg() -> Result<()> {
	let sample = "\
com.example.Foo -> a:
    int count -> b
    void run() -> c
";
	assert_eq!(detect(sample)?, Format::Proguard);
	Ok(())
}

#[test]
fn parchment_json() -> Result<()> {
	let sample = r#"{ "version": "1.2.3", "classes": [] }"#;
	assert_eq!(detect(sample)?, Format::Parchment);

	// an incompatible version is no longer a parchment opinion
	let sample = r#"{ "version": "2.0.0", "classes": [] }"#;
	assert!(detect(sample).is_err());
	Ok(())
}

#[test]
fn columnar_fallbacks() -> Result<()> {
	let csrg = "\
a com/example/Foo
a b count
";
	assert_eq!(detect(csrg)?, Format::Csrg);

	let tsrg = "\
a com/example/Foo
\tb count
";
	assert_eq!(detect(tsrg)?, Format::Tsrg);
	Ok(())
}

#[test]
fn undetectable_input() {
	let err = detect("certainly -> not : a mapping ( format anyone knows").unwrap_err();
	assert!(matches!(err.downcast_ref(), Some(MappingError::FormatUndetected)), "{err:#}");
}

#[test]
fn read_detect_dispatches() -> Result<()> {
	let bytes = b"\
CL: a com/example/Foo
FD: a/b com/example/Foo/count
";

	let (mappings, format) = read_detect(bytes)?;
	assert_eq!(format, Format::Srg);
	assert_eq!(mappings.classes.len(), 1);
	assert_eq!(mappings.classes["a"].fields.len(), 1);
	Ok(())
}
