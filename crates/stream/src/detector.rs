//! Action-block detection over the visible stream.
//!
//! Some model outputs embed note-write instructions as tagged blocks:
//!
//! ```text
//! <writeNote><path>notes/today.md</path><content>…</content></writeNote>
//! ```
//!
//! The tags may be split across network chunks, so incoming text is held
//! in a bounded FIFO until it is provably safe to show. A complete block
//! is extracted, executed through the [`ActionHandler`], and replaced by
//! notices; a partial open tag is held back so broken markup never
//! reaches the UI; everything else drains with at most
//! [`CHUNK_CAPACITY`] chunks of latency.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use regex_lite::Regex;
use tracing::{debug, warn};
use vaultmind_core::error::ToolError;

/// Opening tag of a note-write block.
pub const NOTE_OPEN_TAG: &str = "<writeNote>";

/// Complete block grammar. Lazy groups keep two adjacent blocks from
/// being merged into one match.
const BLOCK_PATTERN: &str =
    r"(?s)<writeNote>\s*<path>(.*?)</path>\s*<content>(.*?)</content>\s*</writeNote>";

/// Most raw chunks held back while no partial tag is in sight.
const CHUNK_CAPACITY: usize = 5;

const GENERATING_NOTICE: &str = "Generating note…";
const WRITING_NOTICE: &str = "Writing note…";

/// The side effect behind a detected block.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Perform the write; the returned string becomes the result notice.
    async fn execute(&self, path: &str, content: &str) -> Result<String, ToolError>;
}

/// What the detector hands back to the caller, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorEvent {
    /// Plain text safe to append to the visible buffer.
    Text(String),
    /// A transient status line (generating, writing, result, error).
    Notice(String),
}

/// Sliding-window detector for note-write blocks.
pub struct BlockDetector {
    chunks: VecDeque<String>,
    pattern: Regex,
    handler: Arc<dyn ActionHandler>,
    /// Whether the generating notice has fired for the current
    /// open/incomplete cycle.
    announced: bool,
}

impl BlockDetector {
    pub fn new(handler: Arc<dyn ActionHandler>) -> Self {
        Self {
            chunks: VecDeque::new(),
            // Static pattern, checked by the tests below
            pattern: Regex::new(BLOCK_PATTERN).expect("block pattern compiles"),
            handler,
            announced: false,
        }
    }

    /// Process one incoming chunk of visible text.
    pub async fn push(&mut self, chunk: &str) -> Vec<DetectorEvent> {
        self.chunks.push_back(chunk.to_string());
        let mut buffer: String = self.chunks.iter().map(String::as_str).collect();
        let mut events = Vec::new();
        let mut consumed_block = false;

        // Extract and execute every complete block currently in view
        loop {
            let Some(caps) = self.pattern.captures(&buffer) else {
                break;
            };
            let Some(span) = caps.get(0) else { break };
            let (start, end) = (span.start(), span.end());
            let path = caps.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
            let content = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();

            if start > 0 {
                events.push(DetectorEvent::Text(buffer[..start].to_string()));
            }
            events.push(DetectorEvent::Notice(WRITING_NOTICE.to_string()));
            debug!(path = %path, bytes = content.len(), "Executing note-write block");
            match self.handler.execute(&path, &content).await {
                Ok(notice) => events.push(DetectorEvent::Notice(notice)),
                Err(e) => {
                    warn!(path = %path, error = %e, "Note-write action failed");
                    events.push(DetectorEvent::Notice(format!("Error: {e}")));
                }
            }

            buffer = buffer.split_off(end);
            consumed_block = true;
            self.announced = false;
        }

        // Hold back anything that could still grow into a block
        match partial_open_index(&buffer) {
            Some(idx) => {
                if idx > 0 {
                    events.push(DetectorEvent::Text(buffer[..idx].to_string()));
                }
                let held = buffer.split_off(idx);
                self.chunks.clear();
                self.chunks.push_back(held);
                if !self.announced {
                    events.push(DetectorEvent::Notice(GENERATING_NOTICE.to_string()));
                    self.announced = true;
                }
            }
            None => {
                self.announced = false;
                if consumed_block {
                    // Original chunk boundaries are gone after extraction
                    self.chunks.clear();
                    if !buffer.is_empty() {
                        self.chunks.push_back(buffer);
                    }
                }
                while self.chunks.len() > CHUNK_CAPACITY {
                    if let Some(oldest) = self.chunks.pop_front() {
                        events.push(DetectorEvent::Text(oldest));
                    }
                }
            }
        }

        events
    }

    /// End of stream: emit whatever is still held, including an
    /// unterminated open tag verbatim. The turn is over and hiding the
    /// text would lose content.
    pub fn flush(&mut self) -> Vec<DetectorEvent> {
        self.announced = false;
        let rest: String = self.chunks.drain(..).collect();
        if rest.is_empty() {
            Vec::new()
        } else {
            vec![DetectorEvent::Text(rest)]
        }
    }
}

/// Earliest index from which the buffer tail could be (the start of) an
/// open tag: a full `<writeNote>` occurrence missing its close, or a
/// trailing proper prefix of the tag split by a chunk boundary.
fn partial_open_index(buffer: &str) -> Option<usize> {
    if let Some(idx) = buffer.find(NOTE_OPEN_TAG) {
        return Some(idx);
    }
    for len in (1..NOTE_OPEN_TAG.len()).rev() {
        if buffer.ends_with(&NOTE_OPEN_TAG[..len]) {
            return Some(buffer.len() - len);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingHandler {
        calls: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl RecordingHandler {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail: true,
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ActionHandler for RecordingHandler {
        async fn execute(&self, path: &str, content: &str) -> Result<String, ToolError> {
            self.calls
                .lock()
                .unwrap()
                .push((path.to_string(), content.to_string()));
            if self.fail {
                Err(ToolError::ExecutionFailed {
                    tool_name: "note_write".into(),
                    reason: "disk full".into(),
                })
            } else {
                Ok(format!("Note written to {path}"))
            }
        }
    }

    fn texts(events: &[DetectorEvent]) -> String {
        events
            .iter()
            .filter_map(|e| match e {
                DetectorEvent::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    fn notices(events: &[DetectorEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                DetectorEvent::Notice(n) => Some(n.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn split_tag_is_never_shown_broken() {
        let handler = RecordingHandler::new();
        let mut d = BlockDetector::new(handler.clone());

        let first = d.push("<write").await;
        assert_eq!(texts(&first), "");
        assert_eq!(notices(&first), vec![GENERATING_NOTICE]);

        let second = d
            .push("Note><path>a</path><content>b</content></writeNote>")
            .await;
        assert_eq!(texts(&second), "");
        assert_eq!(
            notices(&second),
            vec![WRITING_NOTICE, "Note written to a"]
        );
        assert_eq!(handler.calls(), vec![("a".to_string(), "b".to_string())]);
        assert!(d.flush().is_empty());
    }

    #[tokio::test]
    async fn text_before_block_is_emitted_first() {
        let handler = RecordingHandler::new();
        let mut d = BlockDetector::new(handler.clone());

        let events = d
            .push("Sure, saving. <writeNote><path>x.md</path><content>hi</content></writeNote>")
            .await;
        assert_eq!(events[0], DetectorEvent::Text("Sure, saving. ".into()));
        assert_eq!(
            notices(&events),
            vec![WRITING_NOTICE, "Note written to x.md"]
        );
    }

    #[tokio::test]
    async fn two_blocks_in_one_chunk_both_execute() {
        let handler = RecordingHandler::new();
        let mut d = BlockDetector::new(handler.clone());

        d.push(
            "<writeNote><path>a</path><content>1</content></writeNote>\
             <writeNote><path>b</path><content>2</content></writeNote>",
        )
        .await;
        assert_eq!(
            handler.calls(),
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn handler_failure_surfaces_inline_error() {
        let handler = RecordingHandler::failing();
        let mut d = BlockDetector::new(handler);

        let events = d
            .push("<writeNote><path>a</path><content>b</content></writeNote>after")
            .await;
        assert!(
            notices(&events)
                .iter()
                .any(|n| n.starts_with("Error:") && n.contains("disk full"))
        );
        // Stream continues past the failure
        let mut d2_events = events;
        d2_events.extend(d.flush());
        assert_eq!(texts(&d2_events), "after");
    }

    #[tokio::test]
    async fn generating_notice_fires_once_per_open_cycle() {
        let handler = RecordingHandler::new();
        let mut d = BlockDetector::new(handler);

        let mut all = d.push("<writeNote><path>a</path>").await;
        all.extend(d.push("<content>still going").await);
        assert_eq!(
            all.iter()
                .filter(|e| **e == DetectorEvent::Notice(GENERATING_NOTICE.into()))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn plain_text_drains_with_bounded_latency() {
        let handler = RecordingHandler::new();
        let mut d = BlockDetector::new(handler);

        for i in 0..CHUNK_CAPACITY {
            assert!(d.push(&format!("c{i} ")).await.is_empty());
        }
        // Capacity exceeded: oldest chunk released verbatim
        let events = d.push("c5 ").await;
        assert_eq!(events, vec![DetectorEvent::Text("c0 ".into())]);

        let flushed = d.flush();
        assert_eq!(texts(&flushed), "c1 c2 c3 c4 c5 ");
    }

    #[tokio::test]
    async fn flush_emits_unterminated_tag_verbatim() {
        let handler = RecordingHandler::new();
        let mut d = BlockDetector::new(handler.clone());

        d.push("note: <writeNote><path>a</path><content>half").await;
        let flushed = d.flush();
        assert_eq!(
            texts(&flushed),
            "<writeNote><path>a</path><content>half"
        );
        assert!(handler.calls().is_empty());
    }

    #[tokio::test]
    async fn block_split_across_many_chunks() {
        let handler = RecordingHandler::new();
        let mut d = BlockDetector::new(handler.clone());

        let mut all = Vec::new();
        for piece in [
            "<writeNote>",
            "<path>daily/log.md</path>",
            "<content>first line\n",
            "second line</content>",
            "</writeNote>done",
        ] {
            all.extend(d.push(piece).await);
        }
        all.extend(d.flush());

        assert_eq!(
            handler.calls(),
            vec![(
                "daily/log.md".to_string(),
                "first line\nsecond line".to_string()
            )]
        );
        assert_eq!(texts(&all), "done");
    }
}
