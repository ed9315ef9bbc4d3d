//! Streaming reader for tag filter documents
//!
//! Input is a sequence of concatenated JSON documents, each of the form
//! `{"TagFilters": [...]}`, read lazily from a file or stdin.

use crate::console::Console;
use serde_json::Value;
use serde_json::de::IoRead;
use std::io::Read;
use tagsweep_common::TagFilterDocument;
use thiserror::Error;

/// Why a document could not be read
#[derive(Debug, Error)]
pub enum ReadError {
    /// Not valid JSON; the stream cannot be resynchronised after this
    #[error("malformed tag filter input: {0}")]
    Syntax(#[source] serde_json::Error),

    /// Valid JSON of the wrong shape; the next document is still readable
    #[error("invalid tag filter document: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("failed to read tag filter input: {0}")]
    Io(#[source] serde_json::Error),
}

/// Iterator over the tag filter documents in a stream.
///
/// With `ignore_errors`, shape errors are reported to the console and
/// skipped, and a syntax error is reported and ends the stream. Without
/// it, the first error is yielded and the iterator is exhausted.
pub struct TagFilterReader<R: Read> {
    stream: serde_json::StreamDeserializer<'static, IoRead<R>, Value>,
    ignore_errors: bool,
    console: Console,
    done: bool,
}

impl<R: Read> TagFilterReader<R> {
    pub fn new(input: R, ignore_errors: bool, console: Console) -> Self {
        Self {
            stream: serde_json::Deserializer::from_reader(input).into_iter::<Value>(),
            ignore_errors,
            console,
            done: false,
        }
    }

    fn fail(&mut self, error: ReadError, fatal: bool) -> Option<Result<TagFilterDocument, ReadError>> {
        if self.ignore_errors {
            self.console.error(&error);
            if fatal {
                self.done = true;
            }
            None
        } else {
            self.done = true;
            Some(Err(error))
        }
    }
}

impl<R: Read> Iterator for TagFilterReader<R> {
    type Item = Result<TagFilterDocument, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.stream.next() {
                None => self.done = true,
                Some(Err(e)) => {
                    let error = if e.is_io() {
                        ReadError::Io(e)
                    } else {
                        ReadError::Syntax(e)
                    };
                    if let Some(item) = self.fail(error, true) {
                        return Some(item);
                    }
                }
                Some(Ok(value)) => match serde_json::from_value::<TagFilterDocument>(value) {
                    Ok(doc) => return Some(Ok(doc)),
                    Err(e) => {
                        if let Some(item) = self.fail(ReadError::Shape(e), false) {
                            return Some(item);
                        }
                    }
                },
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsweep_common::TagFilter;

    fn read_all(input: &str, ignore_errors: bool) -> (Vec<Result<TagFilterDocument, ReadError>>, Vec<String>) {
        let (console, output) = Console::capture();
        let docs = TagFilterReader::new(input.as_bytes(), ignore_errors, console).collect();
        (docs, output.diagnostics())
    }

    #[test]
    fn test_reads_concatenated_documents() {
        let input = r#"{"TagFilters":[{"Key":"env","Values":["staging"]}]}
            {"TagFilters":[{"Key":"team"}]}"#;
        let (docs, diagnostics) = read_all(input, false);
        let docs: Vec<_> = docs.into_iter().map(Result::unwrap).collect();

        assert_eq!(
            docs,
            vec![
                TagFilterDocument::new(vec![TagFilter::new("env", ["staging"])]),
                TagFilterDocument::new(vec![TagFilter::any_value("team")]),
            ]
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let (docs, diagnostics) = read_all("   \n", false);
        assert!(docs.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_document_without_filters_is_empty() {
        let (docs, _) = read_all("{}", false);
        assert!(docs[0].as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_null_values_accepted_without_ignore() {
        let (docs, diagnostics) = read_all(r#"{"TagFilters":[{"Key":"env","Values":null}]}"#, false);
        assert_eq!(
            docs[0].as_ref().unwrap(),
            &TagFilterDocument::new(vec![TagFilter::any_value("env")])
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_shape_error_skipped_when_ignoring() {
        let input = r#"{"TagFilters":"nope"} {"TagFilters":[{"Key":"env"}]}"#;
        let (docs, diagnostics) = read_all(input, true);

        assert_eq!(docs.len(), 1);
        assert_eq!(
            docs[0].as_ref().unwrap(),
            &TagFilterDocument::new(vec![TagFilter::any_value("env")])
        );
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].starts_with("invalid tag filter document"));
    }

    #[test]
    fn test_shape_error_fatal_without_ignore() {
        let input = r#"{"TagFilters":"nope"} {"TagFilters":[{"Key":"env"}]}"#;
        let (docs, diagnostics) = read_all(input, false);

        assert_eq!(docs.len(), 1);
        assert!(matches!(docs[0], Err(ReadError::Shape(_))));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_syntax_error_ends_stream_when_ignoring() {
        let input = r#"{"TagFilters":[{"Key":"env"}]} {"TagFilters": [ oops"#;
        let (docs, diagnostics) = read_all(input, true);

        assert_eq!(docs.len(), 1);
        assert!(docs[0].is_ok());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].starts_with("malformed tag filter input"));
    }

    #[test]
    fn test_syntax_error_yielded_without_ignore() {
        let (docs, _) = read_all("not json", false);
        assert_eq!(docs.len(), 1);
        assert!(matches!(docs[0], Err(ReadError::Syntax(_))));
    }
}
