//! Recording the parameter names synthesized for abstract methods.

use anyhow::{anyhow, Result};
use std::io::Write;
use plume::descriptor::MethodDescriptor;
use plume::error::MappingError;
use plume::tree::names::{ClassName, MethodName, ParameterName};

/// An ordered, append-only log of synthesized abstract-method parameter names.
///
/// Recording has an explicit lifecycle: [`Self::start`] before the first method, [`Self::end`]
/// after the last; calling either out of order, or [`Self::record`]ing outside the two, is a
/// usage error. The log is only persisted on request, via [`Self::write`].
#[derive(Debug, Default)]
pub struct ParameterRecorder {
	active: bool,
	rows: Vec<String>,
}

impl ParameterRecorder {
	pub fn new() -> ParameterRecorder {
		ParameterRecorder::default()
	}

	pub fn start(&mut self) -> Result<()> {
		if self.active {
			return Err(anyhow!(MappingError::RenamerState("parameter recording started twice".to_owned())));
		}
		self.active = true;
		Ok(())
	}

	pub fn end(&mut self) -> Result<()> {
		if !self.active {
			return Err(anyhow!(MappingError::RenamerState("parameter recording ended without being started".to_owned())));
		}
		self.active = false;
		Ok(())
	}

	/// Appends one `class name descriptor name…` row for an abstract method's parameters.
	pub fn record(&mut self, class: &ClassName, name: &MethodName, desc: &MethodDescriptor, parameters: &[ParameterName]) -> Result<()> {
		if !self.active {
			return Err(anyhow!(MappingError::RenamerState(
				format!("parameter names for {class} {name} {desc} recorded outside start/end")
			)));
		}

		let mut row = format!("{class} {name} {desc}");
		for parameter in parameters {
			row.push(' ');
			row.push_str(parameter.as_str());
		}
		self.rows.push(row);

		Ok(())
	}

	/// The recorded rows, in recording order.
	pub fn rows(&self) -> &[String] {
		&self.rows
	}

	/// Writes the recorded rows to the given writer, one per line.
	pub fn write(&self, w: &mut impl Write) -> Result<()> {
		for row in &self.rows {
			writeln!(w, "{row}")?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use plume::error::MappingError;
	use super::ParameterRecorder;

	#[test]
	fn lifecycle() {
		let mut recorder = ParameterRecorder::new();

		let err = recorder.end().unwrap_err();
		assert!(matches!(err.downcast_ref(), Some(MappingError::RenamerState(_))));

		recorder.start().unwrap();
		assert!(recorder.start().is_err());

		recorder.record(&"com/example/Foo".into(), &"setCount".into(), &"(I)V".into(), &["value".into()]).unwrap();
		recorder.end().unwrap();

		assert_eq!(recorder.rows(), ["com/example/Foo setCount (I)V value"]);
	}

	#[test]
	fn recording_outside_the_lifecycle_fails() {
		let mut recorder = ParameterRecorder::new();
		assert!(recorder.record(&"a".into(), &"b".into(), &"()V".into(), &[]).is_err());
	}
}
