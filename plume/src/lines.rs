use std::cmp::Ordering;
use std::fmt::Debug;
use std::iter::Peekable;
use anyhow::{anyhow, Context, Result};
use crate::error::MappingError;
use crate::tree::names::{Names, Namespaces};

pub(crate) trait Line: Debug {
	fn get_indents(&self) -> usize;
	fn get_line_number(&self) -> usize;
}

/// Walks lines grouped by indentation depth, one level at a time.
///
/// [`Self::next`] only yields lines of exactly the current depth. A shallower line ends the
/// current level (without consuming the line), a deeper line is an error unless an inner
/// [`Self::next_level`] iterator picked it up first.
pub(crate) struct WithMoreIndentIter<'a, I: Iterator> {
	depth: usize,
	iter: &'a mut Peekable<I>,
}

impl<'a, I, L> WithMoreIndentIter<'a, I>
where
	I: Iterator<Item=Result<L>>,
	L: Line,
{
	pub(crate) fn new(iter: &'a mut Peekable<I>) -> WithMoreIndentIter<'a, I> {
		WithMoreIndentIter { depth: 0, iter }
	}

	pub(crate) fn next_level(&mut self) -> WithMoreIndentIter<'_, I> {
		WithMoreIndentIter {
			depth: self.depth + 1,
			iter: self.iter,
		}
	}

	pub(crate) fn on_every_line(mut self, mut f: impl FnMut(&mut Self, L) -> Result<()>) -> Result<()> {
		while let Some(line) = self.next() {
			let line = line?;
			let line_number = line.get_line_number();

			f(&mut self, line)
				.with_context(|| anyhow!("in line {line_number}"))?;
		}
		Ok(())
	}
}

impl<I, L> Iterator for WithMoreIndentIter<'_, I>
where
	I: Iterator<Item=Result<L>>,
	L: Line,
{
	type Item = Result<L>;

	fn next(&mut self) -> Option<Self::Item> {
		match self.iter.peek()? {
			Ok(line) => {
				match line.get_indents().cmp(&self.depth) {
					Ordering::Less => None, // cancel an inner loop
					Ordering::Equal => self.iter.next(), // actually give back the value
					Ordering::Greater => Some(Err(anyhow!("expected an indentation of {} for line {}: {:#?}", self.depth, line.get_line_number(), line))),
				}
			},
			Err(_) => self.iter.next(),
		}
	}
}

/// A tab separated line, as used by the tiny formats and TSRG.
#[derive(Debug)]
pub(crate) struct TabLine {
	line_number: usize,
	indents: usize,
	pub(crate) first_field: String,
	fields: std::vec::IntoIter<String>,
}

impl TabLine {
	pub(crate) fn new(line_number: usize, line: &str) -> Result<TabLine> {
		let indents = line.chars().take_while(|x| *x == '\t').count();
		// tab is ascii, so the count is a valid byte index here
		let line = &line[indents..];

		let mut fields = line.split('\t').map(|x| x.to_owned());

		let first_field = fields.next()
			.with_context(|| anyhow!("no first field in line {line_number}"))?;

		let vec: Vec<String> = fields.collect();

		Ok(TabLine {
			line_number,
			indents,
			first_field,
			fields: vec.into_iter(),
		})
	}

	pub(crate) fn remaining(&self) -> usize {
		self.fields.as_slice().len()
	}

	pub(crate) fn next(&mut self) -> Result<String> {
		self.fields.next()
			.ok_or_else(|| anyhow!(MappingError::TruncatedRecord { line: self.line_number }))
			.with_context(|| anyhow!("expected another field in line {}: {self:?}", self.line_number))
	}

	/// Takes the next field, and checks that it was the last one.
	pub(crate) fn end(mut self) -> Result<String> {
		let next = self.next()?;

		if !self.fields.as_slice().is_empty() {
			bail_remaining(self.line_number, &self)?;
		}

		Ok(next)
	}

	/// Takes an optional next field, and checks that it was the last one.
	pub(crate) fn end_optional(mut self) -> Result<Option<String>> {
		let next = self.fields.next();

		if !self.fields.as_slice().is_empty() {
			bail_remaining(self.line_number, &self)?;
		}

		Ok(next)
	}

	pub(crate) fn into_namespaces(self) -> Result<Namespaces> {
		let line_number = self.line_number;
		Namespaces::try_from(self.fields.collect::<Vec<String>>())
			.with_context(|| anyhow!("on line {line_number}"))
	}

	/// Reads the remaining fields as the names of an entry, the empty string standing for "no
	/// name in this namespace".
	pub(crate) fn into_names<T>(self, width: usize) -> Result<Names<T>>
	where
		T: From<String> + AsRef<str> + Debug,
	{
		let vec: Vec<Option<T>> = self.fields
			.map(|string| if string.is_empty() { None } else { Some(T::from(string)) })
			.collect();

		if vec.len() > width {
			bail_count(self.line_number, vec.len(), width)?;
		}
		let mut vec = vec;
		vec.resize_with(width, || None);

		Names::try_from(vec)
			.with_context(|| anyhow!("on line {}", self.line_number))
	}

	/// Like [`Self::into_names`], but requires every namespace to be filled in.
	pub(crate) fn into_names_exact<T>(self, width: usize) -> Result<Names<T>>
	where
		T: From<String> + AsRef<str> + Debug,
	{
		let vec: Vec<Option<T>> = self.fields
			.map(|string| if string.is_empty() { None } else { Some(T::from(string)) })
			.collect();

		if vec.len() != width {
			bail_count(self.line_number, vec.len(), width)?;
		}

		Names::try_from(vec)
			.with_context(|| anyhow!("on line {}", self.line_number))
	}
}

fn bail_remaining(line_number: usize, line: &impl Debug) -> Result<()> {
	Err(anyhow!(MappingError::TruncatedRecord { line: line_number }))
		.with_context(|| anyhow!("line {line_number} contained more fields than expected: {line:?}"))
}

fn bail_count(line_number: usize, got: usize, expected: usize) -> Result<()> {
	Err(anyhow!(MappingError::TruncatedRecord { line: line_number }))
		.with_context(|| anyhow!("line {line_number} contained more or less fields ({got}) than the expected {expected}"))
}

impl Line for TabLine {
	fn get_indents(&self) -> usize {
		self.indents
	}
	fn get_line_number(&self) -> usize {
		self.line_number
	}
}

/// A whitespace separated line, as used by the SRG family and Proguard.
///
/// Everything after the comment character is dropped; [`Self::new`] returns `Ok(None)` for
/// lines that are blank once comments are stripped.
#[derive(Debug)]
pub(crate) struct TokenLine {
	line_number: usize,
	indents: usize,
	pub(crate) first_field: String,
	pub(crate) fields: Vec<String>,
}

impl TokenLine {
	pub(crate) fn new(line_number: usize, line: &str, comment_char: char) -> Result<Option<TokenLine>> {
		let indents = line.chars().take_while(|x| *x == '\t').count();
		// tab is ascii, so the count is a valid byte index here
		let line = &line[indents..];

		let line = if let Some((non_comment, _)) = line.split_once(comment_char) {
			non_comment
		} else {
			line
		};

		let mut fields = line.split_whitespace().map(|x| x.to_owned());

		let Some(first_field) = fields.next() else {
			return Ok(None);
		};

		Ok(Some(TokenLine {
			line_number,
			indents,
			first_field,
			fields: fields.collect(),
		}))
	}

	pub(crate) fn truncated(&self) -> anyhow::Error {
		anyhow!(MappingError::TruncatedRecord { line: self.line_number })
			.context(anyhow!("line {} is missing fields: {self:?}", self.line_number))
	}
}

impl Line for TokenLine {
	fn get_indents(&self) -> usize {
		self.indents
	}
	fn get_line_number(&self) -> usize {
		self.line_number
	}
}
