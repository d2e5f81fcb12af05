// components/song_pipeline/src/batch.rs
use crate::config::RetryPolicy;
use crate::error::PipelineError;
use crate::hook::AnalysisHook;
use crate::queue::BatchQueue;
use crate::song::{SongDownloader, SongOutcome};
use song_primitives::SongReference;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What a batch run settled
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// References that completed, in completion order
    pub completed: Vec<SongReference>,
    /// References whose artifact was handed to the analysis hook
    pub analysed: Vec<SongReference>,
    /// References left in the list after exhausting their attempts
    pub abandoned: Vec<SongReference>,
}

/// Drives a list of songs through a `SongDownloader`
///
/// Transient failures move the reference to the end of the list and the
/// run continues; an expired catalog token is refreshed and the song is
/// retried once on the spot. Any other error ends the run with the list
/// file still holding every unsettled reference.
pub struct BatchDriver {
    songs: SongDownloader,
    hook: Option<Arc<dyn AnalysisHook>>,
    retry: RetryPolicy,
}

impl BatchDriver {
    pub fn new(songs: SongDownloader) -> Self {
        let retry = songs.config().retry.clone();
        Self {
            songs,
            hook: None,
            retry,
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn AnalysisHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub async fn run(&self, queue: &mut BatchQueue) -> Result<BatchReport, PipelineError> {
        let mut pending: Vec<SongReference> = queue.references().to_vec();
        let mut attempts: HashMap<SongReference, u32> = HashMap::new();
        let mut report = BatchReport::default();

        info!("Preparing to download {} songs", pending.len());

        let mut index = 0;
        while index < pending.len() {
            let reference = pending[index].clone();
            index += 1;

            match self.attempt(&reference, index).await {
                Ok(outcome) => {
                    debug!("removing settled song from the list");
                    queue.remove(&reference)?;
                    report.completed.push(reference.clone());

                    if let (Some(artifact), Some(hook)) = (outcome.artifact(), &self.hook) {
                        if let Err(e) = hook.analyse(artifact).await {
                            warn!(error = %e, artifact = %artifact.display(), "analysis failed");
                        }
                        report.analysed.push(reference);
                    }
                }
                Err(e) if e.is_transient() => {
                    let count = attempts.entry(reference.clone()).or_insert(0);
                    *count += 1;
                    if let Some(max) = self.retry.max_attempts {
                        if *count >= max {
                            error!(%reference, attempts = *count, error = %e, "giving up for this run, song stays in the list");
                            report.abandoned.push(reference);
                            continue;
                        }
                    }

                    warn!(%reference, error = %e, "Failed to download song, will retry after other songs");
                    queue.requeue(&reference)?;
                    pending.push(reference);
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            completed = report.completed.len(),
            abandoned = report.abandoned.len(),
            "batch finished"
        );
        Ok(report)
    }

    /// One attempt, refreshing the catalog token once if it has expired
    async fn attempt(
        &self,
        reference: &SongReference,
        number: usize,
    ) -> Result<SongOutcome, PipelineError> {
        match self.songs.download(reference, Some(number)).await {
            Err(PipelineError::CredentialExpired) => {
                debug!("token expired, authenticating again");
                self.songs.catalog().reauthenticate().await?;
                self.songs.download(reference, Some(number)).await
            }
            result => result,
        }
    }
}
