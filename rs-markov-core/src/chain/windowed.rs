use std::collections::VecDeque;

use crate::error::MarkovError;

/// Returns a lazy sliding-window iterator over the source.
///
/// Each produced window is an ordered list of `window_size` consecutive
/// tokens, advancing by one token per step. A source of length `L` produces
/// `max(0, L - window_size + 1)` windows; a source shorter than the window
/// produces none.
///
/// A single forward pass over the source is sufficient: the iterator
/// buffers at most `window_size` tokens at a time and never requires
/// random access.
///
/// # Errors
/// Returns `MarkovError::InvalidArgument` if `window_size < 1`.
pub fn windowed<I>(source: I, window_size: usize) -> Result<Windows<I::IntoIter>, MarkovError>
where
	I: IntoIterator,
{
	if window_size < 1 {
		return Err(MarkovError::InvalidArgument(
			"window size may not be < 1".to_owned(),
		));
	}
	Ok(Windows {
		source: source.into_iter(),
		window_size,
		buffer: VecDeque::with_capacity(window_size),
		initialized: false,
	})
}

/// Lazy stride-1 sliding window over an arbitrary token source.
///
/// Construct with [`windowed`].
#[derive(Debug)]
pub struct Windows<I: Iterator> {
	source: I,
	window_size: usize,
	buffer: VecDeque<I::Item>,
	initialized: bool,
}

impl<I> Iterator for Windows<I>
where
	I: Iterator,
	I::Item: Clone,
{
	type Item = Vec<I::Item>;

	fn next(&mut self) -> Option<Self::Item> {
		if !self.initialized {
			self.initialized = true;
			while self.buffer.len() < self.window_size {
				match self.source.next() {
					Some(token) => self.buffer.push_back(token),
					None => break,
				}
			}
		}
		if self.buffer.len() < self.window_size {
			return None;
		}
		let window: Vec<I::Item> = self.buffer.iter().cloned().collect();
		self.buffer.pop_front();
		if let Some(token) = self.source.next() {
			self.buffer.push_back(token);
		}
		Some(window)
	}
}
