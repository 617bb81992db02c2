//! Command loop driving an [`AnnotationSession`].
//!
//! Reads commands line by line and writes one or more notice lines per
//! command. Exports are spawned into a [`JoinSet`] so that the loop keeps
//! accepting input while the remote sync is in flight; overlapping exports
//! are neither serialized nor debounced. When input ends, the loop waits for
//! every in-flight export to finish (there is no cancellation).

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::{JoinError, JoinSet};

use framemark_core::{
    AnnotationSession, CoreError, ExportPipeline, ExportReport, RemoteOutcome, VideoSource,
};

use crate::command::{Command, HELP};

type ExportResult = Result<ExportReport, CoreError>;

/// Whether the loop should keep reading input.
enum Flow {
    Continue,
    Quit,
}

enum Event {
    Line(std::io::Result<usize>),
    ExportFinished(Result<ExportResult, JoinError>),
}

pub struct Driver {
    session: AnnotationSession,
    pipeline: Arc<ExportPipeline>,
    exports: JoinSet<ExportResult>,
}

impl Driver {
    pub fn new(session: AnnotationSession, pipeline: Arc<ExportPipeline>) -> Self {
        Self {
            session,
            pipeline,
            exports: JoinSet::new(),
        }
    }

    pub fn session(&self) -> &AnnotationSession {
        &self.session
    }

    /// Run until `input` is exhausted or a `quit` command is read.
    ///
    /// In-flight exports are always awaited before returning, even when
    /// writing to `output` fails. The first write error is returned after
    /// the drain.
    pub async fn run<R, W>(&mut self, mut input: R, output: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut failure = self.read_commands(&mut input, output).await.err();

        if !self.exports.is_empty() {
            tracing::debug!(pending = self.exports.len(), "Waiting for in-flight exports");
        }
        while let Some(done) = self.exports.join_next().await {
            let notice = describe_export(done);
            if failure.is_none() {
                failure = write_line(output, &notice).await.err();
            }
        }

        match failure {
            Some(e) => Err(e),
            None => output.flush().await,
        }
    }

    async fn read_commands<R, W>(&mut self, input: &mut R, output: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        // `read_until` keeps partial data in `buf` when the export branch wins.
        let mut buf = Vec::new();

        loop {
            let event = tokio::select! {
                Some(done) = self.exports.join_next(), if !self.exports.is_empty() => {
                    Event::ExportFinished(done)
                }
                read = input.read_until(b'\n', &mut buf) => Event::Line(read),
            };

            let (flow, notices) = match event {
                Event::ExportFinished(done) => (Flow::Continue, vec![describe_export(done)]),
                Event::Line(Ok(0)) => return Ok(()),
                Event::Line(Ok(_)) => {
                    let handled = match std::str::from_utf8(&buf) {
                        Ok(line) => self.handle_line(line),
                        Err(e) => {
                            tracing::warn!(error = %e, "Skipping input line that is not valid UTF-8");
                            (
                                Flow::Continue,
                                vec!["error: input line is not valid UTF-8; skipped".to_string()],
                            )
                        }
                    };
                    buf.clear();
                    handled
                }
                Event::Line(Err(e)) => {
                    tracing::error!(error = %e, "Failed to read input");
                    (Flow::Quit, vec![format!("error: failed to read input: {e}")])
                }
            };

            for notice in notices {
                write_line(output, &notice).await?;
            }
            if let Flow::Quit = flow {
                return Ok(());
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> (Flow, Vec<String>) {
        match Command::parse(line) {
            Ok(Some(Command::Quit)) => (Flow::Quit, Vec::new()),
            Ok(Some(command)) => {
                let notices = match self.execute(command) {
                    Ok(notices) => notices,
                    Err(e) => vec![format!("error: {e}")],
                };
                (Flow::Continue, notices)
            }
            Ok(None) => (Flow::Continue, Vec::new()),
            Err(e) => (Flow::Continue, vec![format!("error: {e}")]),
        }
    }

    fn execute(&mut self, command: Command) -> Result<Vec<String>, CoreError> {
        let session = &mut self.session;
        let notice = match command {
            Command::Load {
                name,
                duration_secs,
            } => {
                let mut source = VideoSource::new(name.clone());
                if let Some(secs) = duration_secs {
                    source = source.with_duration(secs);
                }
                session.load_video(source);
                format!("Loaded {name} (bound {} frames)", session.frame_bound()?)
            }
            Command::Duration(secs) => {
                session.set_duration(secs)?;
                format!("Duration {secs} s (bound {} frames)", session.frame_bound()?)
            }
            Command::Tick(secs) => format!("Frame {}", session.on_time_update(secs)?),
            Command::Seek(frame) => {
                let secs = session.seek(frame)?;
                format!("Frame {frame} ({secs:.3} s)")
            }
            Command::Label(text) => {
                session.set_draft_label(text);
                format!("Label: \"{}\"", session.draft_label())
            }
            Command::Save => {
                let saved = session.save_label()?;
                format!("Saved label at frame {}", saved.frame)
            }
            Command::List => return Ok(self.list()),
            Command::Status => match session.video() {
                Some(video) => format!(
                    "video={} frame={} bound={} annotations={}",
                    video.name,
                    session.current_frame()?,
                    session.frame_bound()?,
                    session.store().len()
                ),
                None => "No video loaded".to_string(),
            },
            Command::Export => return Ok(vec![self.spawn_export()]),
            Command::Help => return Ok(HELP.iter().map(|l| l.to_string()).collect()),
            // Handled by the loop before dispatch.
            Command::Quit => return Ok(Vec::new()),
        };
        Ok(vec![notice])
    }

    fn list(&self) -> Vec<String> {
        let entries = self.session.store().list();
        if entries.is_empty() {
            return vec!["No annotations".to_string()];
        }
        std::iter::once("frame\tlabel".to_string())
            .chain(entries.iter().map(|a| format!("{}\t{}", a.frame, a.label)))
            .collect()
    }

    /// Snapshot the store and export it on a background task.
    fn spawn_export(&mut self) -> String {
        let store = self.session.store().clone();
        let count = store.len();
        let pipeline = Arc::clone(&self.pipeline);
        self.exports
            .spawn(async move { pipeline.export(&store).await });
        format!("Export started ({count} annotations, sink {})", self.pipeline.sink_name())
    }
}

fn describe_export(done: Result<ExportResult, JoinError>) -> String {
    match done {
        Ok(Ok(report)) => {
            let local = format!(
                "Exported {} annotations to {}",
                report.entry_count, report.artifact.file_name
            );
            match &report.remote {
                RemoteOutcome::Synced(receipt) => {
                    format!("{local}; synced to {}", receipt.location)
                }
                RemoteOutcome::Failed(err) => format!("{local}; remote sync failed: {err}"),
            }
        }
        Ok(Err(e)) => format!("error: export failed: {e}"),
        Err(e) => {
            tracing::error!(error = %e, "Export task aborted");
            format!("error: export task failed: {e}")
        }
    }
}

async fn write_line<W>(output: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
