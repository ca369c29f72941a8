//! Segment-by-segment glob expansion over registered backends.
//!
//! A compiled [`Pattern`] is applied one segment at a time. Literal
//! segments are checked with a join plus a fresh `stat`; wildcard segments
//! list the candidate directory once and re-test every returned name with
//! the pattern's own matcher, whatever the backend did with the pushdown
//! hint.
//!
//! Candidates are kept on a depth-first stack, children pushed in reverse
//! listing order. That emits matches in exactly the order a breadth-wise
//! expansion would (grouped by parent, then listing order) while only one
//! listing per open level is ever held in memory.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use urifs_glob::{Pattern, Segment};

use crate::vfs::{FileType, Handle, Registry, VfsError, VfsResult};

/// A matched handle and the names its wildcard segments matched.
///
/// `captures` holds one entry per wildcard segment, left to right. It is
/// empty for purely literal patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub handle: Handle,
    pub captures: Vec<String>,
}

/// Lazy stream of glob results. Ends after the first error.
pub type MatchStream = BoxStream<'static, VfsResult<Match>>;

/// Engine for glob pattern matching over the registry.
#[derive(Debug, Clone)]
pub struct GlobEngine {
    registry: Arc<Registry>,
}

impl GlobEngine {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Compile `raw` and glob it. Compile errors surface before any
    /// backend is touched.
    pub fn glob_str(
        &self,
        base: &Handle,
        raw: &str,
        cancel: CancellationToken,
    ) -> VfsResult<MatchStream> {
        let pattern = Pattern::compile(raw)?;
        Ok(self.glob(base, &pattern, cancel))
    }

    /// Expand `pattern` below `base`.
    ///
    /// Absolute patterns ignore `base`. Their origin and leading literal
    /// segments are resolved together through the registry, so a nested
    /// prefix such as `mem://cache/` owns `mem://cache/x/*`; a root with
    /// no registered backend yields nothing. Nothing happens until the
    /// stream is polled.
    pub fn glob(&self, base: &Handle, pattern: &Pattern, cancel: CancellationToken) -> MatchStream {
        let (start, depth) = match pattern.origin() {
            Some(origin) => {
                // `..` stays a segment; resolving it here would clean it away.
                let literals: Vec<&str> = pattern
                    .segments()
                    .iter()
                    .map_while(|segment| match segment {
                        Segment::Literal(name) if name != ".." => Some(name.as_str()),
                        _ => None,
                    })
                    .collect();
                let root_uri = format!("{origin}{}", literals.join("/"));
                let root = self.registry.handle(&root_uri);
                if root.is_invalid() {
                    tracing::debug!(root = %root_uri, "glob root has no backend");
                    return stream::empty().boxed();
                }
                (root, literals.len())
            }
            None => (base.clone(), 0),
        };

        let span = tracing::debug_span!("glob", start = %start, pattern = %pattern);
        let state = GlobState {
            pattern: Arc::new(pattern.clone()),
            start: Some((start, depth)),
            stack: Vec::new(),
            cancel,
        };

        stream::try_unfold(state, move |mut state| {
            let span = span.clone();
            async move {
                let next = state.next_match().await?;
                Ok(next.map(|m| (m, state)))
            }
            .instrument(span)
        })
        .boxed()
    }

    /// Glob and collect every match.
    pub async fn collect(
        &self,
        base: &Handle,
        raw: &str,
        cancel: CancellationToken,
    ) -> VfsResult<Vec<Match>> {
        self.glob_str(base, raw, cancel)?.try_collect().await
    }
}

/// A directory still to be expanded, or a finished candidate.
struct Frame {
    handle: Handle,
    captures: Vec<String>,
    /// Number of segments consumed so far.
    depth: usize,
    /// Kind from a fresh stat, when one was already made.
    fresh: Option<FileType>,
}

struct GlobState {
    pattern: Arc<Pattern>,
    /// Starting handle and the segments it already accounts for, consumed
    /// by the first step.
    start: Option<(Handle, usize)>,
    stack: Vec<Frame>,
    cancel: CancellationToken,
}

impl GlobState {
    /// Advance to the next match. Each loop turn makes at most one backend
    /// call, always after a cancellation check.
    async fn next_match(&mut self) -> VfsResult<Option<Match>> {
        let pattern = Arc::clone(&self.pattern);
        let segments = pattern.segments();

        loop {
            if self.cancel.is_cancelled() {
                self.start = None;
                self.stack.clear();
                return Err(VfsError::Cancelled);
            }

            if let Some((start, depth)) = self.start.take() {
                if segments.is_empty() {
                    return Ok(Some(Match {
                        handle: start,
                        captures: Vec::new(),
                    }));
                }
                let kind = start.stat().await.map_err(|e| e.at(start.uri()))?;
                match kind {
                    // A fully resolved start is a candidate, not a directory to expand.
                    Some(k) if depth == segments.len() || k.is_dir() => {
                        self.stack.push(Frame {
                            handle: start,
                            captures: Vec::new(),
                            depth,
                            fresh: kind,
                        });
                    }
                    _ => tracing::debug!(start = %start, "glob start is not a directory"),
                }
                continue;
            }

            let Some(frame) = self.stack.pop() else {
                return Ok(None);
            };

            if frame.depth == segments.len() {
                if pattern.is_dir_only() {
                    let kind = match frame.fresh {
                        Some(kind) => Some(kind),
                        None => frame
                            .handle
                            .stat()
                            .await
                            .map_err(|e| e.at(frame.handle.uri()))?,
                    };
                    if !kind.is_some_and(|k| k.is_dir()) {
                        continue;
                    }
                }
                return Ok(Some(Match {
                    handle: frame.handle,
                    captures: frame.captures,
                }));
            }

            let last = frame.depth + 1 == segments.len();
            match &segments[frame.depth] {
                Segment::Literal(name) => {
                    let joined = frame.handle.join(name);
                    let kind = joined.stat().await.map_err(|e| e.at(joined.uri()))?;
                    match kind {
                        Some(k) if last || k.is_dir() => {
                            tracing::trace!(candidate = %joined, "literal segment matched");
                            self.stack.push(Frame {
                                handle: joined,
                                captures: frame.captures,
                                depth: frame.depth + 1,
                                fresh: Some(k),
                            });
                        }
                        _ => {}
                    }
                }
                Segment::Wildcard(matcher) => {
                    let dir = &frame.handle;
                    let entries = dir
                        .backend()
                        .list(dir.path(), &[matcher.as_str()])
                        .await
                        .map_err(|e| e.at(dir.uri()))?;

                    let children: Vec<Frame> = entries
                        .into_iter()
                        .filter(|entry| matcher.matches(&entry.name))
                        .filter(|entry| last || entry.kind.is_dir())
                        .map(|entry| {
                            let mut captures = frame.captures.clone();
                            let handle = dir.join(&entry.name);
                            captures.push(entry.name);
                            Frame {
                                handle,
                                captures,
                                depth: frame.depth + 1,
                                fresh: None,
                            }
                        })
                        .collect();

                    tracing::trace!(dir = %dir, matched = children.len(), "wildcard segment expanded");
                    self.stack.extend(children.into_iter().rev());
                }
            }
        }
    }
}
