//! `framemark-annotator` -- headless frame labelling session.
//!
//! Reads commands from stdin (see `help`), keeps the frame→label map for
//! the loaded video, and on `export` writes `annotations.json` locally
//! before pushing the same payload to the configured remote sink.
//!
//! # Environment variables
//!
//! | Variable               | Required        | Default                 | Description                        |
//! |------------------------|-----------------|-------------------------|------------------------------------|
//! | `SINK_KIND`            | no              | `endpoint`              | `endpoint` or `s3`                 |
//! | `SINK_ENDPOINT_URL`    | no              | `http://localhost:8000/api/v1/upload-annotations` | POST target |
//! | `SINK_TIMEOUT_SECS`    | no              | `30`                    | Endpoint request timeout           |
//! | `S3_BUCKET`            | for `s3`        | --                      | Destination bucket                 |
//! | `S3_REGION`            | no              | `us-east-1`             | Bucket region                      |
//! | `S3_ENDPOINT_URL`      | no              | --                      | S3-compatible endpoint             |
//! | `S3_ACCESS_KEY_ID`     | no              | --                      | Static credentials (with secret)   |
//! | `S3_SECRET_ACCESS_KEY` | no              | --                      | Static credentials (with key id)   |
//! | `EXPORT_DIR`           | no              | `.`                     | Where `annotations.json` is written |

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use framemark_annotator::config::AnnotatorConfig;
use framemark_annotator::driver::Driver;
use framemark_annotator::emitter::FileEmitter;
use framemark_core::{AnnotationSession, ExportPipeline, FrameClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "framemark_annotator=info,framemark_core=info,framemark_delivery=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AnnotatorConfig::from_env().context("Invalid configuration")?;

    let sink = framemark_delivery::build_sink(&config.sink)
        .await
        .context("Failed to construct remote sink")?;
    let emitter = Arc::new(FileEmitter::new(&config.export_dir));
    let pipeline = Arc::new(ExportPipeline::new(sink, emitter));

    tracing::info!(
        export_dir = %config.export_dir.display(),
        sink = pipeline.sink_name(),
        "Starting framemark-annotator",
    );

    let mut driver = Driver::new(AnnotationSession::new(FrameClock::new()), pipeline);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    driver.run(stdin, &mut stdout).await?;

    tracing::info!(
        annotations = driver.session().store().len(),
        "Session ended"
    );
    Ok(())
}
