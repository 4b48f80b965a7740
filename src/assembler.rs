//! Folds streamed text chunks into one growing string.

/// Append-only accumulator over a caller-owned buffer.
///
/// The buffer is borrowed so the accumulated text can live wherever the caller renders from,
/// e.g. [`ChatState::streaming_message`](crate::ChatState::streaming_message).  Chunks are
/// never reordered or dropped; the text after `n` pushes is the buffer's initial contents
/// followed by the `n` chunks in push order.
#[derive(Debug)]
pub struct StreamAssembler<'a> {
    text: &'a mut String,
    chunks: usize,
}

impl<'a> StreamAssembler<'a> {
    /// Starts accumulating onto `text`.
    pub fn new(text: &'a mut String) -> Self {
        Self { text, chunks: 0 }
    }

    /// Appends `chunk` and returns the accumulated text.
    pub fn push(&mut self, chunk: &str) -> &str {
        if !chunk.is_empty() {
            self.text.push_str(chunk);
            self.chunks += 1;
        }
        self.text.as_str()
    }

    /// The text accumulated so far.
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Number of non-empty chunks appended.
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_is_ordered_concatenation() {
        let chunks = ["Par", "is ", "is the ", "capital", " of France."];
        let mut buffer = String::new();
        let mut assembler = StreamAssembler::new(&mut buffer);
        let mut expected = String::new();
        for chunk in chunks {
            expected.push_str(chunk);
            assert_eq!(assembler.push(chunk), expected);
        }
        assert_eq!(assembler.chunk_count(), chunks.len());
        assert_eq!(buffer, "Paris is the capital of France.");
    }

    #[test]
    fn continues_from_existing_text() {
        let mut buffer = "partial ".to_string();
        let mut assembler = StreamAssembler::new(&mut buffer);
        assembler.push("answer");
        assert_eq!(assembler.text(), "partial answer");
    }

    #[test]
    fn empty_chunks_are_not_counted() {
        let mut buffer = String::new();
        let mut assembler = StreamAssembler::new(&mut buffer);
        assembler.push("");
        assembler.push("x");
        assembler.push("");
        assert_eq!(assembler.chunk_count(), 1);
        assert_eq!(assembler.text(), "x");
    }
}
