//! Conversion between JVM descriptors and human-readable type names.
//!
//! Pure functions, no state. Readable names use dots and trailing bracket pairs
//! (`java.lang.Object[][]`), descriptors use slashes and leading array markers
//! (`[[Ljava/lang/Object;`).
//!
//! Malformed input of either kind fails with
//! [`MalformedDescriptor`][crate::error::MappingError::MalformedDescriptor]; nothing here ever
//! silently truncates.

use std::iter::Peekable;
use std::str::Chars;
use anyhow::{Error, Result};
use crate::error::MappingError;
use crate::tree::names::{make_name_type, ClassName};

make_name_type!(
	/// A field descriptor, e.g. `[Ljava/lang/Object;`.
	FieldDescriptor
);
make_name_type!(
	/// A method descriptor, e.g. `(IJLjava/lang/Object;)V`.
	MethodDescriptor
);

/// Represents a field type.
///
/// In case of an array, use the [`Type::Array`] variant. Never construct [`Type::Array`] with a
/// dimension of zero; the equality implementations don't respect that.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Type {
	/// A `byte`.
	B,
	/// A `char`.
	C,
	/// A `double`.
	D,
	/// A `float`.
	F,
	/// An `int`.
	I,
	/// A `long`.
	J,
	/// A `short`.
	S,
	/// A `boolean`.
	Z,
	/// An instance of the class specified by [`ClassName`].
	Object(ClassName),
	/// An array type, represented by the dimension and the inner [`ArrayType`].
	Array(u8, ArrayType),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ArrayType {
	B,
	C,
	D,
	F,
	I,
	J,
	S,
	Z,
	Object(ClassName),
}

fn malformed(input: &str, reason: impl Into<String>) -> Error {
	MappingError::MalformedDescriptor {
		input: input.to_owned(),
		reason: reason.into(),
	}.into()
}

// The grammar for descriptors is:
//   FieldDescriptor:
//     FieldType
//
//   MethodDescriptor:
//     "(" FieldType* ")" ReturnDescriptor
//
//   ReturnDescriptor:
//     FieldType | "V"
//
//   FieldType:
//     "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z" |
//     "L" ClassName ";" |
//     "[" FieldType
fn read_field_type(chars: &mut Peekable<Chars>, original: &str) -> Result<Type> {
	let mut array_dimension: usize = 0;
	while chars.next_if_eq(&'[').is_some() {
		array_dimension += 1;
	}
	let array_dimension: u8 = array_dimension.try_into()
		.map_err(|_| malformed(original, "array dimension larger than 255"))?;

	let char = chars.next().ok_or_else(|| malformed(original, "unexpected abrupt ending"))?;

	if array_dimension == 0 {
		Ok(match char {
			'B' => Type::B,
			'C' => Type::C,
			'D' => Type::D,
			'F' => Type::F,
			'I' => Type::I,
			'J' => Type::J,
			'S' => Type::S,
			'Z' => Type::Z,
			'L' => Type::Object(read_object_name(chars, original)?),
			x => return Err(malformed(original, format!("unexpected char {x:?}"))),
		})
	} else {
		Ok(match char {
			'B' => Type::Array(array_dimension, ArrayType::B),
			'C' => Type::Array(array_dimension, ArrayType::C),
			'D' => Type::Array(array_dimension, ArrayType::D),
			'F' => Type::Array(array_dimension, ArrayType::F),
			'I' => Type::Array(array_dimension, ArrayType::I),
			'J' => Type::Array(array_dimension, ArrayType::J),
			'S' => Type::Array(array_dimension, ArrayType::S),
			'Z' => Type::Array(array_dimension, ArrayType::Z),
			'L' => Type::Array(array_dimension, ArrayType::Object(read_object_name(chars, original)?)),
			x => return Err(malformed(original, format!("unexpected char {x:?}"))),
		})
	}
}

fn read_object_name(chars: &mut Peekable<Chars>, original: &str) -> Result<ClassName> {
	let mut s = String::new();

	loop {
		let char = chars.next()
			.ok_or_else(|| malformed(original, "missing `;` terminator on object descriptor"))?;
		if char == ';' {
			break;
		}
		s.push(char);
	}

	if s.is_empty() {
		return Err(malformed(original, "empty class name in object descriptor"));
	}
	Ok(ClassName::from(s))
}

/// Parses a full field descriptor; trailing garbage is an error, and `V` is rejected since
/// fields cannot be `void`.
pub fn parse_field_descriptor(desc: &str) -> Result<Type> {
	let mut chars = desc.chars().peekable();
	let t = read_field_type(&mut chars, desc)?;
	if chars.next().is_some() {
		return Err(malformed(desc, "trailing characters after field type"));
	}
	Ok(t)
}

/// Parses a full method descriptor into parameter types and a return type, `None` standing for
/// `void`.
pub fn parse_method_descriptor(desc: &str) -> Result<(Vec<Type>, Option<Type>)> {
	let mut chars = desc.chars().peekable();

	if chars.next() != Some('(') {
		return Err(malformed(desc, "method descriptor must start with `(`"));
	}

	let mut parameters = Vec::new();
	loop {
		if chars.next_if_eq(&')').is_some() {
			break;
		}
		if chars.peek().is_none() {
			return Err(malformed(desc, "missing `)` in method descriptor"));
		}
		parameters.push(read_field_type(&mut chars, desc)?);
	}

	let ret = if chars.next_if_eq(&'V').is_some() {
		None
	} else {
		Some(read_field_type(&mut chars, desc)?)
	};
	if chars.next().is_some() {
		return Err(malformed(desc, "trailing characters after return type"));
	}

	Ok((parameters, ret))
}

fn primitive_name(t: &Type) -> Option<&'static str> {
	Some(match t {
		Type::B => "byte",
		Type::C => "char",
		Type::D => "double",
		Type::F => "float",
		Type::I => "int",
		Type::J => "long",
		Type::S => "short",
		Type::Z => "boolean",
		_ => return None,
	})
}

fn type_to_name(t: &Type) -> String {
	match t {
		Type::Object(class_name) => class_name.as_str().replace('/', "."),
		Type::Array(dimension, array_type) => {
			let base = match array_type {
				ArrayType::B => "byte".to_owned(),
				ArrayType::C => "char".to_owned(),
				ArrayType::D => "double".to_owned(),
				ArrayType::F => "float".to_owned(),
				ArrayType::I => "int".to_owned(),
				ArrayType::J => "long".to_owned(),
				ArrayType::S => "short".to_owned(),
				ArrayType::Z => "boolean".to_owned(),
				ArrayType::Object(class_name) => class_name.as_str().replace('/', "."),
			};
			let mut s = base;
			for _ in 0..*dimension {
				s.push_str("[]");
			}
			s
		},
		primitive => primitive_name(primitive).unwrap_or_default().to_owned(),
	}
}

/// Converts a readable type name into a field descriptor: `int[][]` becomes `[[I`,
/// `java.lang.Object` becomes `Ljava/lang/Object;`.
///
/// `void` is not a field type and is rejected; use [`return_type_name_to_descriptor`] where
/// `void` is legal.
pub fn type_name_to_descriptor(name: &str) -> Result<String> {
	let mut dimension: usize = 0;
	let mut base = name;
	while let Some(stripped) = base.strip_suffix("[]") {
		dimension += 1;
		base = stripped;
	}
	if dimension > 255 {
		return Err(malformed(name, "array dimension larger than 255"));
	}
	if base.is_empty() {
		return Err(malformed(name, "empty type name"));
	}

	let code = match base {
		"byte" => "B".to_owned(),
		"char" => "C".to_owned(),
		"double" => "D".to_owned(),
		"float" => "F".to_owned(),
		"int" => "I".to_owned(),
		"long" => "J".to_owned(),
		"short" => "S".to_owned(),
		"boolean" => "Z".to_owned(),
		"void" => return Err(malformed(name, "`void` is not a field type")),
		object => {
			if object.contains(['[', ']', '(', ')', ';', '/']) {
				return Err(malformed(name, "illegal character in class name"));
			}
			format!("L{};", object.replace('.', "/"))
		},
	};

	Ok(format!("{}{}", "[".repeat(dimension), code))
}

/// Like [`type_name_to_descriptor`], for positions where `void` is legal (method return types).
pub fn return_type_name_to_descriptor(name: &str) -> Result<String> {
	if name == "void" {
		Ok("V".to_owned())
	} else {
		type_name_to_descriptor(name)
	}
}

/// Converts a field descriptor into a readable type name: `[[I` becomes `int[][]`,
/// `Ljava/lang/Object;` becomes `java.lang.Object`.
///
/// `V` is rejected when decoding a field descriptor; use [`return_descriptor_to_type_name`]
/// where `void` is legal.
pub fn descriptor_to_type_name(desc: &str) -> Result<String> {
	let t = parse_field_descriptor(desc)?;
	Ok(type_to_name(&t))
}

/// Like [`descriptor_to_type_name`], for return descriptors, where `V` decodes to `void`.
pub fn return_descriptor_to_type_name(desc: &str) -> Result<String> {
	if desc == "V" {
		Ok("void".to_owned())
	} else {
		descriptor_to_type_name(desc)
	}
}

/// Builds a method descriptor out of a Java-source signature: a readable return type name and
/// readable parameter type names.
pub fn method_descriptor_from_signature(return_type: &str, parameters: &[&str]) -> Result<MethodDescriptor> {
	let mut s = String::from("(");
	for parameter in parameters {
		s.push_str(&type_name_to_descriptor(parameter)?);
	}
	s.push(')');
	s.push_str(&return_type_name_to_descriptor(return_type)?);
	Ok(MethodDescriptor::from(s))
}

/// Splits a method descriptor into the readable return type name and readable parameter type
/// names of a Java-source signature.
pub fn method_descriptor_to_signature(desc: &str) -> Result<(String, Vec<String>)> {
	let (parameters, ret) = parse_method_descriptor(desc)?;
	let ret = match ret {
		None => "void".to_owned(),
		Some(t) => type_to_name(&t),
	};
	let parameters = parameters.iter().map(type_to_name).collect();
	Ok((ret, parameters))
}

#[cfg(test)]
mod testing {
	use super::*;

	#[test]
	fn primitives() {
		assert_eq!(type_name_to_descriptor("int").unwrap(), "I");
		assert_eq!(type_name_to_descriptor("boolean").unwrap(), "Z");
		assert_eq!(descriptor_to_type_name("J").unwrap(), "long");
	}

	#[test]
	fn no_silent_truncation() {
		assert!(parse_field_descriptor("II").is_err());
		assert!(parse_field_descriptor("Ljava/lang/Object;I").is_err());
		assert!(parse_method_descriptor("()VV").is_err());
	}
}
