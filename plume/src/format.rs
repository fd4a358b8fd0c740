//! The set of supported mapping formats, with their per-format properties and a reader/writer
//! dispatch.

use std::fmt::{Display, Formatter};
use std::io::{Read, Write};
use anyhow::Result;
use crate::tree::mappings::Mappings;
use crate::{csrg, parchment, proguard, srg, tiny_v1, tiny_v2, tsrg2};

/// A supported mapping format.
///
/// Every variant advertises its canonical name, whether it is namespaced, whether it can carry
/// package-level mappings, and its comment marker, and dispatches to the format's codec module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
	Srg,
	Csrg,
	Tsrg,
	Tsrg2,
	Proguard,
	TinyV1,
	TinyV2,
	Parchment,
}

impl Format {
	pub fn name(self) -> &'static str {
		match self {
			Format::Srg => "srg",
			Format::Csrg => "csrg",
			Format::Tsrg => "tsrg",
			Format::Tsrg2 => "tsrg2",
			Format::Proguard => "proguard",
			Format::TinyV1 => "tiny-v1",
			Format::TinyV2 => "tiny-v2",
			Format::Parchment => "parchment",
		}
	}

	/// Whether collections in this format declare their namespaces up front, as opposed to the
	/// paired unmapped/mapped shape.
	pub fn is_namespaced(self) -> bool {
		matches!(self, Format::Tsrg2 | Format::TinyV1 | Format::TinyV2)
	}

	/// Whether this format can carry package-level mappings.
	pub fn supports_packages(self) -> bool {
		matches!(self, Format::Srg | Format::Csrg | Format::Tsrg | Format::Parchment)
	}

	/// The comment marker character of this format, `'\0'` if it has none.
	pub fn comment_char(self) -> char {
		match self {
			Format::Srg | Format::Csrg | Format::Tsrg | Format::Proguard => '#',
			Format::Tsrg2 | Format::TinyV1 | Format::TinyV2 | Format::Parchment => '\0',
		}
	}

	/// Reads mappings in this format, from the given reader.
	pub fn read(self, reader: impl Read) -> Result<Mappings> {
		match self {
			Format::Srg => srg::read(reader),
			Format::Csrg => csrg::read(reader),
			Format::Tsrg => csrg::read_tsrg(reader),
			Format::Tsrg2 => tsrg2::read(reader),
			Format::Proguard => proguard::read(reader),
			Format::TinyV1 => tiny_v1::read(reader),
			Format::TinyV2 => tiny_v2::read(reader),
			Format::Parchment => parchment::read(reader),
		}
	}

	/// Writes the given mappings in this format, to the given writer.
	pub fn write(self, mappings: &Mappings, w: &mut impl Write) -> Result<()> {
		match self {
			Format::Srg => srg::write(mappings, w),
			Format::Csrg => csrg::write(mappings, w),
			Format::Tsrg => csrg::write_tsrg(mappings, w),
			Format::Tsrg2 => tsrg2::write(mappings, w),
			Format::Proguard => proguard::write(mappings, w),
			Format::TinyV1 => tiny_v1::write(mappings, w),
			Format::TinyV2 => tiny_v2::write(mappings, w),
			Format::Parchment => parchment::write(mappings, w),
		}
	}
}

impl Display for Format {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}
