use serde::Serialize;
use tracing::debug;

use crate::models::QuoteCandidate;

/// Marker the generator emits before each quote
pub const START_OF_TEXT: &str = "<|startoftext|>";
/// Marker the generator emits after each quote
pub const END_OF_TEXT: &str = "<|endoftext|>";

/// Opening/closing markers around generated quotes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinels {
    pub open: String,
    pub close: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            open: START_OF_TEXT.to_string(),
            close: END_OF_TEXT.to_string(),
        }
    }
}

/// Iterator over the sentinel-delimited spans of one block
///
/// Each span runs from an opening sentinel to the first closing sentinel
/// after it, on the same line. Clone it to restart.
#[derive(Debug, Clone)]
pub struct QuoteSpans<'a> {
    rest: &'a str,
    open: &'a str,
    close: &'a str,
    unterminated: usize,
}

impl<'a> QuoteSpans<'a> {
    /// Opening sentinels skipped so far because no closing one followed on their line
    pub fn unterminated(&self) -> usize {
        self.unterminated
    }
}

impl<'a> Iterator for QuoteSpans<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.open.is_empty() || self.close.is_empty() {
            return None;
        }

        loop {
            let start = self.rest.find(self.open)? + self.open.len();
            let after_open = &self.rest[start..];

            if let Some(end) = after_open.find(self.close) {
                let span = &after_open[..end];
                if !span.contains('\n') {
                    self.rest = &after_open[end + self.close.len()..];
                    return Some(span);
                }
            }

            // Truncated output: drop the dangling sentinel and keep scanning
            self.unterminated += 1;
            self.rest = after_open;
        }
    }
}

/// Spans of `block` delimited by `sentinels`, left to right
pub fn extract_quotes<'a>(block: &'a str, sentinels: &'a Sentinels) -> QuoteSpans<'a> {
    QuoteSpans {
        rest: block,
        open: &sentinels.open,
        close: &sentinels.close,
        unterminated: 0,
    }
}

/// Counters for anomalies seen while extracting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    /// Blocks scanned
    pub blocks: usize,
    /// Blocks that yielded no quotes
    pub empty_blocks: usize,
    /// Opening sentinels left without a closing one
    pub unterminated_spans: usize,
}

/// Result of Stage 2 extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Candidates in block order, then left-to-right order
    pub candidates: Vec<QuoteCandidate>,
    pub stats: ExtractionStats,
}

/// Execute Stage 2: pull quote candidates out of every generated block
pub fn extract_all<S: AsRef<str>>(blocks: &[S], sentinels: &Sentinels) -> ExtractionResult {
    let mut result = ExtractionResult::default();

    for (block_index, block) in blocks.iter().enumerate() {
        let block = block.as_ref();
        debug!("SAMPLE: [{}]", block);
        result.stats.blocks += 1;

        let mut spans = extract_quotes(block, sentinels);
        let before = result.candidates.len();
        for text in spans.by_ref() {
            debug!("QUOTE: [{}]", text);
            let index = result.candidates.len();
            result
                .candidates
                .push(QuoteCandidate::new(index, block_index, text));
        }

        if spans.unterminated() > 0 {
            debug!("Block {}: dropped {} unterminated quote spans", block_index, spans.unterminated());
            result.stats.unterminated_spans += spans.unterminated();
        }
        if result.candidates.len() == before {
            debug!("Block {}: no quotes found", block_index);
            result.stats.empty_blocks += 1;
        }
    }

    result
}
