use anyhow::Result;
use pretty_assertions::assert_eq;
use plume::descriptor::{descriptor_to_type_name, method_descriptor_from_signature, method_descriptor_to_signature, return_descriptor_to_type_name, return_type_name_to_descriptor, type_name_to_descriptor};
use plume::error::MappingError;

#[test]
fn round_trip_all_array_depths() -> Result<()> {
	for base in ["byte", "char", "double", "float", "int", "long", "short", "boolean", "com.example.Foo"] {
		for depth in 0..=8 {
			let name = format!("{base}{}", "[]".repeat(depth));
			let desc = type_name_to_descriptor(&name)?;
			assert_eq!(descriptor_to_type_name(&desc)?, name);
		}
	}
	Ok(())
}

#[test]
fn object_names() -> Result<()> {
	assert_eq!(type_name_to_descriptor("java.lang.Object")?, "Ljava/lang/Object;");
	assert_eq!(descriptor_to_type_name("Ljava/lang/Object;")?, "java.lang.Object");
	assert_eq!(type_name_to_descriptor("Foo[][]")?, "[[LFoo;");
	Ok(())
}

#[test]
fn void_is_only_a_return_type() -> Result<()> {
	assert!(type_name_to_descriptor("void").is_err());
	assert!(descriptor_to_type_name("V").is_err());
	assert_eq!(return_type_name_to_descriptor("void")?, "V");
	assert_eq!(return_descriptor_to_type_name("V")?, "void");
	Ok(())
}

#[test]
fn malformed_inputs() {
	for input in ["", "Lcom/example/Foo", "[", "X", "I[", "com.example.F;oo", "int[", "int[]]"] {
		let err = type_name_to_descriptor(input).err()
			.or_else(|| descriptor_to_type_name(input).err());
		let err = err.unwrap_or_else(|| panic!("{input:?} decoded on both sides"));
		assert!(
			matches!(err.downcast_ref(), Some(MappingError::MalformedDescriptor { .. })),
			"wrong error kind for {input:?}: {err:#}",
		);
	}
}

#[test]
fn method_signatures() -> Result<()> {
	let desc = method_descriptor_from_signature("void", &["int", "com.example.Foo", "long[]"])?;
	assert_eq!(desc.as_str(), "(ILcom/example/Foo;[J)V");

	let (ret, parameters) = method_descriptor_to_signature("(ILcom/example/Foo;[J)V")?;
	assert_eq!(ret, "void");
	assert_eq!(parameters, ["int", "com.example.Foo", "long[]"]);

	let (ret, parameters) = method_descriptor_to_signature("()Ljava/util/List;")?;
	assert_eq!(ret, "java.util.List");
	assert_eq!(parameters, Vec::<String>::new());
	Ok(())
}
