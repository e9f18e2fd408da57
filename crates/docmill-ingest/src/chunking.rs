//! Chunking engine: re-segment normalized elements under five strategies.
//!
//! Elements are assembled into one canonical character stream and every
//! strategy works in character offsets against it. Overlap semantics are
//! deliberately per-strategy: `fixed_size` overlap falls out of the sliding
//! window step with no boundary alignment, while `by_sentences` and
//! `by_separators` duplicate real text. The two must not be unified, since
//! that would silently move chunk boundaries for persisted data.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use docmill_core::{
    Chunk, ChunkingOptions, ChunkingStrategy, Element, Error, Metadata, Result,
};

/// Join inserted between element texts in the canonical stream.
const ELEMENT_JOIN: &str = "\n\n";

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

/// Re-segment elements according to the selected strategy.
///
/// Parameter validation is the orchestrator's job (`ChunkingOptions::
/// validate`, a caller error); the engine re-checks the invariants it
/// depends on and reports violations as fatal [`Error::Chunking`] bugs.
/// Empty input yields an empty chunk sequence, not an error.
pub fn chunk_elements(elements: &[Element], options: &ChunkingOptions) -> Result<Vec<Chunk>> {
    if options.strategy.is_size_based()
        && (options.chunk_size == 0 || options.chunk_overlap >= options.chunk_size)
    {
        return Err(Error::Chunking(format!(
            "degenerate window parameters reached the engine: size={} overlap={}",
            options.chunk_size, options.chunk_overlap
        )));
    }

    let stream = DocumentStream::assemble(elements);
    if stream.is_empty() {
        return Ok(Vec::new());
    }

    let drafts = match options.strategy {
        ChunkingStrategy::ByPages => by_pages(&stream),
        ChunkingStrategy::FixedSize => {
            windows(&stream, 0, stream.len(), options.chunk_size, options.chunk_overlap)
        }
        ChunkingStrategy::ByParagraphs => {
            by_paragraphs(&stream, options.chunk_size, options.chunk_overlap)
        }
        ChunkingStrategy::BySentences => {
            by_sentences(&stream, options.chunk_size, options.chunk_overlap)
        }
        ChunkingStrategy::BySeparators => by_separators(
            &stream,
            &options.separators(),
            options.chunk_size,
            options.chunk_overlap,
        ),
    };

    tracing::debug!(
        "Chunked {} elements into {} chunks with {}",
        elements.len(),
        drafts.len(),
        options.strategy
    );

    Ok(finalize(drafts, &stream))
}

/// Span of one element's text inside the canonical stream.
struct ElementSpan {
    start: usize,
    end: usize,
    page_number: Option<u32>,
}

/// The canonical character stream with page attribution.
struct DocumentStream {
    text: String,
    chars: Vec<char>,
    element_spans: Vec<ElementSpan>,
}

impl DocumentStream {
    /// Join non-empty element texts with [`ELEMENT_JOIN`], recording where
    /// each element lands so offsets can be attributed to pages.
    fn assemble(elements: &[Element]) -> Self {
        let mut text = String::new();
        let mut chars: Vec<char> = Vec::new();
        let mut element_spans = Vec::new();

        for element in elements {
            if element.text.trim().is_empty() {
                continue;
            }
            if !chars.is_empty() {
                text.push_str(ELEMENT_JOIN);
                chars.extend(ELEMENT_JOIN.chars());
            }
            let start = chars.len();
            text.push_str(&element.text);
            chars.extend(element.text.chars());
            element_spans.push(ElementSpan {
                start,
                end: chars.len(),
                page_number: element.page_number,
            });
        }

        Self {
            text,
            chars,
            element_spans,
        }
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    /// Page of the character at `offset`. Join characters between elements
    /// attribute to the preceding element.
    fn page_at(&self, offset: usize) -> Option<u32> {
        let mut page = None;
        for span in &self.element_spans {
            if span.start > offset {
                break;
            }
            page = span.page_number;
        }
        page
    }

    /// Human-readable page range of a span, e.g. `"3"` or `"2-4"`.
    fn page_range(&self, start: usize, end: usize) -> Option<String> {
        let first = self.page_at(start)?;
        let last = self
            .page_at(end.saturating_sub(1).max(start))
            .unwrap_or(first);
        if last > first {
            Some(format!("{first}-{last}"))
        } else {
            Some(first.to_string())
        }
    }
}

/// One produced chunk before ids, pages, and metadata are attached.
struct ChunkDraft {
    text: String,
    char_start: usize,
    char_end: usize,
    overlap: usize,
}

/// Shrink `[start, end)` to its non-whitespace core.
fn trimmed_span(chars: &[char], start: usize, end: usize) -> Option<(usize, usize)> {
    let mut s = start;
    let mut e = end;
    while s < e && chars[s].is_whitespace() {
        s += 1;
    }
    while e > s && chars[e - 1].is_whitespace() {
        e -= 1;
    }
    (s < e).then_some((s, e))
}

/// Sliding character windows over `[start, end)`.
///
/// Window text stays raw (untrimmed) so offsets are exact; windows that
/// are pure whitespace are skipped. Overlap is positional: boundaries may
/// fall mid-word, which is the deliberate speed/simplicity trade of the
/// fixed-size strategy.
fn windows(
    stream: &DocumentStream,
    start: usize,
    end: usize,
    size: usize,
    overlap: usize,
) -> Vec<ChunkDraft> {
    let step = size - overlap;
    let mut drafts = Vec::new();
    let mut prev_end: Option<usize> = None;

    let mut s = start;
    while s < end {
        let e = (s + size).min(end);
        if trimmed_span(&stream.chars, s, e).is_some() {
            let ov = prev_end
                .map(|pe| pe.saturating_sub(s).min(e - s))
                .unwrap_or(0);
            drafts.push(ChunkDraft {
                text: stream.slice(s, e),
                char_start: s,
                char_end: e,
                overlap: ov,
            });
            prev_end = Some(e);
        }
        // Windows advance by step while any start remains in range, so the
        // tail still gets its own (shorter) window.
        s += step;
    }

    drafts
}

/// One chunk per page group: consecutive elements sharing a page number
/// are concatenated in order. No overlap applies.
fn by_pages(stream: &DocumentStream) -> Vec<ChunkDraft> {
    let spans = &stream.element_spans;
    let mut drafts = Vec::new();

    let mut i = 0;
    while i < spans.len() {
        let page = spans[i].page_number;
        let group_start = spans[i].start;
        let mut group_end = spans[i].end;
        let mut j = i + 1;
        while j < spans.len() && spans[j].page_number == page {
            group_end = spans[j].end;
            j += 1;
        }
        if let Some((ts, te)) = trimmed_span(&stream.chars, group_start, group_end) {
            drafts.push(ChunkDraft {
                text: stream.slice(ts, te),
                char_start: ts,
                char_end: te,
                overlap: 0,
            });
        }
        i = j;
    }

    drafts
}

/// Split on blank lines; oversized paragraphs fall back to fixed windows.
fn by_paragraphs(stream: &DocumentStream, size: usize, overlap: usize) -> Vec<ChunkDraft> {
    let mut byte_spans = Vec::new();
    let mut last = 0;
    for m in BLANK_LINE.find_iter(&stream.text) {
        if m.start() > last {
            byte_spans.push((last, m.start()));
        }
        last = m.end();
    }
    if last < stream.text.len() {
        byte_spans.push((last, stream.text.len()));
    }

    let mut offsets = CharOffsets::new(&stream.text);
    let mut drafts = Vec::new();
    for (bs, be) in byte_spans {
        let cs = offsets.at(bs);
        let ce = offsets.at(be);
        let Some((ts, te)) = trimmed_span(&stream.chars, cs, ce) else {
            continue;
        };
        if te - ts <= size {
            drafts.push(ChunkDraft {
                text: stream.slice(ts, te),
                char_start: ts,
                char_end: te,
                overlap: 0,
            });
        } else {
            drafts.extend(windows(stream, ts, te, size, overlap));
        }
    }

    drafts
}

/// Greedy sentence packing with exact carried-sentence overlap.
fn by_sentences(stream: &DocumentStream, size: usize, overlap: usize) -> Vec<ChunkDraft> {
    let mut offsets = CharOffsets::new(&stream.text);
    let sentences: Vec<(usize, usize)> = stream
        .text
        .split_sentence_bound_indices()
        .map(|(b, s)| {
            let cs = offsets.at(b);
            let ce = offsets.at(b + s.len());
            (cs, ce)
        })
        .collect();

    let mut drafts: Vec<ChunkDraft> = Vec::new();
    // Sentence spans currently accumulated; contiguous in the stream.
    let mut current: Vec<(usize, usize)> = Vec::new();

    let emit = |drafts: &mut Vec<ChunkDraft>, spans: &[(usize, usize)]| {
        let start = spans[0].0;
        let end = spans[spans.len() - 1].1;
        if let Some((ts, te)) = trimmed_span(&stream.chars, start, end) {
            let ov = drafts
                .last()
                .map(|p: &ChunkDraft| p.char_end.saturating_sub(ts).min(te - ts))
                .unwrap_or(0);
            drafts.push(ChunkDraft {
                text: stream.slice(ts, te),
                char_start: ts,
                char_end: te,
                overlap: ov,
            });
        }
    };

    for &(cs, ce) in &sentences {
        let sentence_len = ce - cs;
        let current_len = current
            .last()
            .map(|&(_, end)| end - current[0].0)
            .unwrap_or(0);

        if !current.is_empty() && current_len + sentence_len > size {
            emit(&mut drafts, &current);

            // Carry the maximal sentence suffix not exceeding the overlap
            // budget; drop oldest-first if the next sentence would not fit
            // beside it.
            let mut carried: Vec<(usize, usize)> = Vec::new();
            let mut carried_len = 0;
            for &(s2, e2) in current.iter().rev() {
                if carried_len + (e2 - s2) > overlap {
                    break;
                }
                carried_len += e2 - s2;
                carried.push((s2, e2));
            }
            carried.reverse();
            while !carried.is_empty() && carried_len + sentence_len > size {
                let (s2, e2) = carried.remove(0);
                carried_len -= e2 - s2;
            }
            current = carried;
        }
        current.push((cs, ce));
    }

    if !current.is_empty() {
        emit(&mut drafts, &current);
    }

    drafts
}

/// A piece produced by recursive separator splitting.
struct SeparatorSpan {
    start: usize,
    end: usize,
    /// Positional overlap already embedded by the windowing fallback;
    /// such spans are exempt from the prepend rule.
    inherent_overlap: Option<usize>,
}

/// Recursive splitting over a priority-ordered separator list, falling
/// back to character windows once separators are exhausted.
fn by_separators(
    stream: &DocumentStream,
    separators: &[String],
    size: usize,
    overlap: usize,
) -> Vec<ChunkDraft> {
    let mut spans = Vec::new();
    split_on_separators(stream, 0, stream.len(), separators, size, overlap, &mut spans);

    let mut drafts: Vec<ChunkDraft> = Vec::new();
    for span in spans {
        let Some((ts, te)) = trimmed_span(&stream.chars, span.start, span.end) else {
            continue;
        };
        let piece_len = te - ts;
        let piece = stream.slice(ts, te);

        match span.inherent_overlap {
            Some(_) => {
                // Window spans share stream text positionally with their
                // predecessor; measure it instead of duplicating more.
                let ov = drafts
                    .last()
                    .map(|p| p.char_end.saturating_sub(ts).min(piece_len))
                    .unwrap_or(0);
                drafts.push(ChunkDraft {
                    text: piece,
                    char_start: ts,
                    char_end: te,
                    overlap: ov,
                });
            }
            None => {
                // Real overlap: prepend the previous chunk's tail, truncated
                // so the chunk never exceeds the size budget.
                let (text, allowed) = match drafts.last() {
                    Some(prev) => {
                        let prev_len = prev.text.chars().count();
                        let allowed = overlap
                            .min(size.saturating_sub(piece_len))
                            .min(prev_len);
                        if allowed > 0 {
                            let tail: String =
                                prev.text.chars().skip(prev_len - allowed).collect();
                            (format!("{tail}{piece}"), allowed)
                        } else {
                            (piece, 0)
                        }
                    }
                    None => (piece, 0),
                };
                drafts.push(ChunkDraft {
                    text,
                    char_start: ts,
                    char_end: te,
                    overlap: allowed,
                });
            }
        }
    }

    drafts
}

#[allow(clippy::too_many_arguments)]
fn split_on_separators(
    stream: &DocumentStream,
    start: usize,
    end: usize,
    separators: &[String],
    size: usize,
    overlap: usize,
    out: &mut Vec<SeparatorSpan>,
) {
    if end - start <= size {
        out.push(SeparatorSpan {
            start,
            end,
            inherent_overlap: None,
        });
        return;
    }

    let Some((separator, rest)) = separators.split_first() else {
        for w in windows(stream, start, end, size, overlap) {
            out.push(SeparatorSpan {
                start: w.char_start,
                end: w.char_end,
                inherent_overlap: Some(w.overlap),
            });
        }
        return;
    };

    let region = stream.slice(start, end);
    let region_len = end - start;
    let mut offsets = CharOffsets::new(&region);
    let mut pieces = Vec::new();
    let mut last = 0;
    let mut found = false;
    for (b, m) in region.match_indices(separator.as_str()) {
        found = true;
        let cs = offsets.at(b);
        let ce = offsets.at(b + m.len());
        if cs > last {
            pieces.push((last, cs));
        }
        last = ce;
    }
    if last < region_len {
        pieces.push((last, region_len));
    }

    if !found {
        split_on_separators(stream, start, end, rest, size, overlap, out);
        return;
    }

    for (ps, pe) in pieces {
        let abs_start = start + ps;
        let abs_end = start + pe;
        if pe - ps > size {
            split_on_separators(stream, abs_start, abs_end, rest, size, overlap, out);
        } else {
            out.push(SeparatorSpan {
                start: abs_start,
                end: abs_end,
                inherent_overlap: None,
            });
        }
    }
}

/// Attach ids, dense indices, page attribution, and chunk metadata.
fn finalize(drafts: Vec<ChunkDraft>, stream: &DocumentStream) -> Vec<Chunk> {
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            let mut metadata = Metadata::new();
            metadata.insert(
                "word_count".into(),
                serde_json::json!(draft.text.split_whitespace().count()),
            );
            if let Some(range) = stream.page_range(draft.char_start, draft.char_end) {
                metadata.insert("page_range".into(), serde_json::json!(range));
            }
            Chunk {
                id: index + 1,
                chunk_index: index,
                text: draft.text,
                char_start: draft.char_start,
                char_end: draft.char_end,
                page_number: stream.page_at(draft.char_start),
                overlap_with_previous: draft.overlap,
                metadata,
            }
        })
        .collect()
}

/// Monotonic byte-to-char offset conversion over one string.
struct CharOffsets<'a> {
    text: &'a str,
    byte_pos: usize,
    char_pos: usize,
}

impl<'a> CharOffsets<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte_pos: 0,
            char_pos: 0,
        }
    }

    /// Char offset of `byte_offset`. Queries must be non-decreasing.
    fn at(&mut self, byte_offset: usize) -> usize {
        debug_assert!(byte_offset >= self.byte_pos);
        self.char_pos += self.text[self.byte_pos..byte_offset].chars().count();
        self.byte_pos = byte_offset;
        self.char_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmill_core::ElementKind;

    fn narrative(text: &str, page: u32) -> Element {
        Element::narrative(text, page)
    }

    fn opts(strategy: ChunkingStrategy, size: usize, overlap: usize) -> ChunkingOptions {
        ChunkingOptions::new(strategy).with_size(size, overlap)
    }

    fn squash_ws(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunks = chunk_elements(&[], &ChunkingOptions::default()).unwrap();
        assert!(chunks.is_empty());

        let blank = vec![narrative("   \n\n  ", 1)];
        let chunks = chunk_elements(&blank, &ChunkingOptions::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunk_index_is_dense_for_all_strategies() {
        let elements = vec![
            narrative("First page prose. More prose here.\n\nSecond paragraph.", 1),
            narrative("Second page prose, also split. Into sentences.", 2),
        ];
        for strategy in [
            ChunkingStrategy::ByPages,
            ChunkingStrategy::FixedSize,
            ChunkingStrategy::ByParagraphs,
            ChunkingStrategy::BySentences,
            ChunkingStrategy::BySeparators,
        ] {
            let chunks = chunk_elements(&elements, &opts(strategy, 30, 5)).unwrap();
            assert!(!chunks.is_empty(), "{strategy} produced nothing");
            for (i, chunk) in chunks.iter().enumerate() {
                assert_eq!(chunk.chunk_index, i, "{strategy} index not dense");
                assert_eq!(chunk.id, i + 1);
            }
        }
    }

    #[test]
    fn test_fixed_size_window_offsets() {
        // 2500 chars, no whitespace: window starts land at 0/800/1600/2400.
        let text = "abcde".repeat(500);
        let elements = vec![narrative(&text, 1)];
        let chunks =
            chunk_elements(&elements, &opts(ChunkingStrategy::FixedSize, 1000, 200)).unwrap();

        let starts: Vec<_> = chunks.iter().map(|c| c.char_start).collect();
        assert_eq!(starts, vec![0, 800, 1600, 2400]);
        assert_eq!(chunks[0].text.chars().count(), 1000);
        assert!(chunks.last().unwrap().text.chars().count() < 1000);
        assert_eq!(chunks[0].overlap_with_previous, 0);
        assert_eq!(chunks[1].overlap_with_previous, 200);
    }

    #[test]
    fn test_fixed_size_page_attribution_crosses_pages() {
        let elements = vec![
            narrative(&"a".repeat(600), 1),
            narrative(&"b".repeat(600), 2),
        ];
        let chunks =
            chunk_elements(&elements, &opts(ChunkingStrategy::FixedSize, 1000, 200)).unwrap();

        // First window starts on page 1 and spills into page 2.
        assert_eq!(chunks[0].page_number, Some(1));
        assert_eq!(
            chunks[0].metadata.get("page_range"),
            Some(&serde_json::json!("1-2"))
        );
        // Second window starts inside page 2 text.
        assert_eq!(chunks[1].page_number, Some(2));
    }

    #[test]
    fn test_by_pages_groups_and_round_trips() {
        let elements = vec![
            narrative("Alpha.", 1),
            narrative("Beta.", 1),
            narrative("Gamma.", 2),
            Element::new("", Some(3), ElementKind::Narrative),
            narrative("Delta.", 4),
        ];
        let chunks = chunk_elements(&elements, &opts(ChunkingStrategy::ByPages, 0, 0)).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].page_number, Some(1));
        assert_eq!(squash_ws(&chunks[0].text), "Alpha. Beta.");
        assert!(chunks.iter().all(|c| c.overlap_with_previous == 0));

        // Lossless in text content, whitespace joins aside.
        let reassembled = squash_ws(
            &chunks
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        );
        let source = squash_ws(
            &elements
                .iter()
                .map(|e| e.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        );
        assert_eq!(reassembled, source);
    }

    #[test]
    fn test_by_paragraphs_splits_on_blank_lines() {
        let elements = vec![narrative("Short one.\n\nShort two.\n\n\nShort three.", 1)];
        let chunks =
            chunk_elements(&elements, &opts(ChunkingStrategy::ByParagraphs, 100, 20)).unwrap();

        let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Short one.", "Short two.", "Short three."]);
    }

    #[test]
    fn test_by_paragraphs_windows_oversized_paragraph() {
        let long = "x".repeat(250);
        let elements = vec![narrative(&format!("Small lead.\n\n{long}"), 1)];
        let chunks =
            chunk_elements(&elements, &opts(ChunkingStrategy::ByParagraphs, 100, 20)).unwrap();

        assert_eq!(chunks[0].text, "Small lead.");
        assert_eq!(chunks[0].overlap_with_previous, 0);
        // 250 chars under size 100 / step 80: windows at +0, +80, +160, +240.
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[1].overlap_with_previous, 0);
        assert_eq!(chunks[2].overlap_with_previous, 20);
        assert!(chunks[1..].iter().all(|c| c.text.chars().count() <= 100));
    }

    #[test]
    fn test_by_sentences_exact_overlap() {
        let elements = vec![narrative(
            "Aaaa aaaa aaaa. Bbbb bbbb bbbb. Cccc cccc cccc. Dddd dddd dddd.",
            1,
        )];
        let chunks =
            chunk_elements(&elements, &opts(ChunkingStrategy::BySentences, 40, 20)).unwrap();
        assert!(chunks.len() >= 2);

        for pair in chunks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            assert!(next.overlap_with_previous > 0, "expected carried sentences");
            // The carried text is an exact substring of both chunks.
            let carried: String = next
                .text
                .chars()
                .take(next.overlap_with_previous)
                .collect();
            assert!(prev.text.ends_with(carried.trim_end()));
            assert!(next.text.starts_with(&carried));
        }
    }

    #[test]
    fn test_by_sentences_oversized_sentence_is_its_own_chunk() {
        let long_sentence = format!("{} end.", "word ".repeat(30)); // > 100 chars
        let elements = vec![narrative(&format!("Tiny. {long_sentence} Tail."), 1)];
        let chunks =
            chunk_elements(&elements, &opts(ChunkingStrategy::BySentences, 100, 30)).unwrap();

        assert!(chunks.iter().any(|c| c.text.chars().count() > 100));
        let texts: Vec<_> = chunks.iter().map(|c| squash_ws(&c.text)).collect();
        assert!(texts.last().unwrap().ends_with("Tail."));
    }

    #[test]
    fn test_by_separators_priority_order() {
        let elements = vec![narrative(
            "A.\n\nB is a much longer sentence that clearly exceeds the limit here. C.",
            1,
        )];
        let options = opts(ChunkingStrategy::BySeparators, 50, 10);
        let chunks = chunk_elements(&elements, &options).unwrap();

        // First split on "\n\n" keeps "A." whole; the long piece exceeds 50
        // and re-splits on ". " (no "\n" present).
        assert_eq!(chunks[0].text, "A.");
        assert!(chunks.len() >= 3);
        assert!(chunks
            .iter()
            .all(|c| c.text.chars().count() <= 50 + options.chunk_overlap));
        assert!(squash_ws(&chunks.last().unwrap().text).ends_with("C."));
    }

    #[test]
    fn test_by_separators_prepends_real_overlap() {
        let elements = vec![narrative("First piece here.\n\nSecond piece there.", 1)];
        let chunks =
            chunk_elements(&elements, &opts(ChunkingStrategy::BySeparators, 30, 8)).unwrap();

        assert_eq!(chunks.len(), 2);
        let ov = chunks[1].overlap_with_previous;
        assert_eq!(ov, 8);
        let prefix: String = chunks[1].text.chars().take(ov).collect();
        assert!(chunks[0].text.ends_with(&prefix));
        assert!(chunks[1].text.ends_with("Second piece there."));
    }

    #[test]
    fn test_by_separators_overlap_truncated_to_size() {
        // Both pieces sit just under the size budget, leaving room for only
        // part of the requested overlap.
        let elements = vec![narrative("abcdefghij\n\nklmnopqr", 1)];
        let chunks =
            chunk_elements(&elements, &opts(ChunkingStrategy::BySeparators, 10, 9)).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].overlap_with_previous, 2);
        assert_eq!(chunks[1].text, "ijklmnopqr");
        assert!(chunks[1].text.chars().count() <= 10);
    }

    #[test]
    fn test_by_separators_window_fallback_when_exhausted() {
        let elements = vec![narrative(&"z".repeat(120), 1)];
        let options = ChunkingOptions::new(ChunkingStrategy::BySeparators)
            .with_size(50, 10)
            .with_separators(vec!["\n\n".into()]);
        let chunks = chunk_elements(&elements, &options).unwrap();

        // No separator matches; character windows bound the chunk length.
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 50));
        assert_eq!(chunks[1].overlap_with_previous, 10);
    }

    #[test]
    fn test_degenerate_parameters_are_a_chunking_bug() {
        let elements = vec![narrative("text", 1)];
        let err =
            chunk_elements(&elements, &opts(ChunkingStrategy::FixedSize, 100, 100)).unwrap_err();
        assert!(matches!(err, Error::Chunking(_)));
    }

    #[test]
    fn test_output_is_deterministic() {
        let elements = vec![
            narrative("Repeatable text, page one. With sentences.", 1),
            narrative("And page two follows.\n\nWith a paragraph.", 2),
        ];
        for strategy in [
            ChunkingStrategy::ByPages,
            ChunkingStrategy::FixedSize,
            ChunkingStrategy::ByParagraphs,
            ChunkingStrategy::BySentences,
            ChunkingStrategy::BySeparators,
        ] {
            let a = chunk_elements(&elements, &opts(strategy, 25, 5)).unwrap();
            let b = chunk_elements(&elements, &opts(strategy, 25, 5)).unwrap();
            assert_eq!(a, b, "{strategy} not deterministic");
        }
    }

    #[test]
    fn test_chunk_metadata_word_count() {
        let elements = vec![narrative("four words right here", 1)];
        let chunks = chunk_elements(&elements, &opts(ChunkingStrategy::ByPages, 0, 0)).unwrap();
        assert_eq!(
            chunks[0].metadata.get("word_count"),
            Some(&serde_json::json!(4))
        );
        assert_eq!(
            chunks[0].metadata.get("page_range"),
            Some(&serde_json::json!("1"))
        );
    }
}
