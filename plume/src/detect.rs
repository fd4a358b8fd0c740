//! Format auto-detection for unlabeled mapping files.
//!
//! An ordered registry of detection units runs over a small sample of the input. A unit may offer
//! a header test (a fixed prefix match on the first content line, which short-circuits the whole
//! scan) and always offers content detection returning a [`Confidence`]. This is a heuristic, not
//! a parser: malformed samples never raise, they score [`Confidence::Zero`].

use anyhow::{anyhow, Context, Result};
use log::trace;
use crate::error::MappingError;
use crate::format::Format;
use crate::parchment;
use crate::tree::mappings::Mappings;

/// How sure a detection unit is that a sample is in its format.
///
/// `Zero` is "no opinion" and never participates in tie-breaking; `OneHundred` short-circuits
/// the scan.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub enum Confidence {
	Zero,
	Fifty,
	Ninety,
	NinetyNine,
	OneHundred,
}

/// At most this many content lines are sampled per unit.
const SAMPLE_SIZE: usize = 10;

struct DetectionUnit {
	format: Format,
	/// A fixed prefix of the first content line. A match returns this unit's format immediately.
	header: Option<&'static str>,
	content: fn(&[&str], &str) -> Confidence,
}

/// The registry. Registration order is a primary sort key: on equal confidence, the earlier
/// unit wins.
const UNITS: &[DetectionUnit] = &[
	DetectionUnit { format: Format::TinyV2, header: Some("tiny\t"), content: detect_by_header },
	DetectionUnit { format: Format::TinyV1, header: Some("v1\t"), content: detect_by_header },
	DetectionUnit { format: Format::Tsrg2, header: Some("tsrg2 "), content: detect_by_header },
	DetectionUnit { format: Format::Srg, header: None, content: detect_srg },
	DetectionUnit { format: Format::Proguard, header: None, content: detect_proguard },
	DetectionUnit { format: Format::Parchment, header: None, content: detect_parchment },
	DetectionUnit { format: Format::Csrg, header: None, content: detect_csrg },
	DetectionUnit { format: Format::Tsrg, header: None, content: detect_tsrg },
];

/// Takes up to [`SAMPLE_SIZE`] content lines, skipping blank lines and, when the format has a
/// comment marker, pure comment lines.
fn sample_lines(text: &str, comment_char: char) -> Vec<&str> {
	text.lines()
		.filter(|line| {
			let trimmed = line.trim_start();
			!trimmed.is_empty() && !(comment_char != '\0' && trimmed.starts_with(comment_char))
		})
		.take(SAMPLE_SIZE)
		.collect()
}

fn detect_by_header(_sample: &[&str], _text: &str) -> Confidence {
	// header units are handled by the prefix test, running this means the prefix didn't match
	Confidence::Zero
}

fn detect_srg(sample: &[&str], _text: &str) -> Confidence {
	const TAGS: [&str; 4] = ["PK: ", "CL: ", "FD: ", "MD: "];

	if !sample.is_empty() && sample.iter().all(|line| TAGS.iter().any(|tag| line.starts_with(tag))) {
		Confidence::NinetyNine
	} else {
		Confidence::Zero
	}
}

fn detect_proguard(sample: &[&str], _text: &str) -> Confidence {
	match sample.first() {
		Some(first) if first.ends_with(':') && first.contains(" -> ") => Confidence::Ninety,
		_ => Confidence::Zero,
	}
}

fn detect_parchment(_sample: &[&str], text: &str) -> Confidence {
	let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
		return Confidence::Zero;
	};

	match value.get("version").and_then(|version| version.as_str()) {
		Some(version) if parchment::version_compatible(version) => Confidence::OneHundred,
		_ => Confidence::Zero,
	}
}

fn detect_csrg(sample: &[&str], _text: &str) -> Confidence {
	let plausible = !sample.is_empty() && sample.iter().all(|line| {
		let columns = line.split_whitespace().count();
		!line.contains('\t') && !line.contains(" -> ") && (2..=4).contains(&columns)
	});

	if plausible {
		Confidence::Fifty
	} else {
		Confidence::Zero
	}
}

fn detect_tsrg(sample: &[&str], _text: &str) -> Confidence {
	let any_member = sample.iter().any(|line| line.starts_with('\t'));
	let plausible = any_member && sample.iter().all(|line| {
		let columns = line.split_whitespace().count();
		!line.contains(" -> ") && (1..=4).contains(&columns)
	});

	if plausible {
		Confidence::Fifty
	} else {
		Confidence::Zero
	}
}

/// Detects the format of the given mapping text.
///
/// Header matches win immediately. Otherwise every unit scores the sample, the highest
/// confidence wins, and registration order breaks ties. If no unit has an opinion, this fails
/// with [`FormatUndetected`][MappingError::FormatUndetected].
///
/// ```
/// # use pretty_assertions::assert_eq;
/// use plume::format::Format;
///
/// let format = plume::detect::detect("CL: a com/example/Foo\n").unwrap();
/// assert_eq!(format, Format::Srg);
/// ```
pub fn detect(text: &str) -> Result<Format> {
	let mut best: Option<(Format, Confidence)> = None;

	for unit in UNITS {
		let sample = sample_lines(text, unit.format.comment_char());

		if let Some(header) = unit.header {
			if sample.first().is_some_and(|first| first.starts_with(header)) {
				trace!("unit {} matched by header", unit.format);
				return Ok(unit.format);
			}
		}

		let confidence = (unit.content)(&sample, text);
		trace!("unit {} scored {confidence:?}", unit.format);

		if confidence == Confidence::OneHundred {
			return Ok(unit.format);
		}

		if confidence > Confidence::Zero && best.map_or(true, |(_, b)| confidence > b) {
			best = Some((unit.format, confidence));
		}
	}

	match best {
		Some((format, _)) => Ok(format),
		None => Err(anyhow!(MappingError::FormatUndetected)),
	}
}

/// Detects the format of the given bytes and reads them with the winning codec.
pub fn read_detect(bytes: &[u8]) -> Result<(Mappings, Format)> {
	let text = std::str::from_utf8(bytes).context("mapping input is not valid utf8")?;

	let format = detect(text)?;
	let mappings = format.read(bytes)
		.with_context(|| anyhow!("failed to read detected {format} mappings"))?;

	Ok((mappings, format))
}
