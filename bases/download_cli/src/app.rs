// bases/download_cli/src/app.rs
use crate::args::{Args, Input};
use crate::output::OutputHandler;
use crate::settings::Settings;
use catalog_client::{CatalogService, LrcLib, SpotifyClient};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use media_downloader::{Ffmpeg, YtDlp};
use song_pipeline::{
    export_collection, BatchDriver, BatchQueue, Collaborators, CommandHook, SongDownloader,
    StdinPrompt,
};
use song_primitives::SongReference;
use std::sync::Arc;
use track_tags::LoftyTags;
use tracing::{debug, info};

pub struct App {
    args: Args,
    output: OutputHandler,
}

impl App {
    pub fn new(args: Args) -> Self {
        let output = OutputHandler::new(args.verbose);
        Self { args, output }
    }

    pub async fn run(&self) -> Result<()> {
        let input = self.args.input().map_err(|e| eyre!(e))?;
        let settings = Settings::load(&self.args)?;
        debug!(pipeline = ?settings.pipeline, "settings resolved");

        let catalog = self.connect(&settings).await?;

        match input {
            Input::Collection(collection) => {
                let queue =
                    export_collection(catalog.as_ref(), &collection, self.args.write_to.clone())
                        .await?;
                self.output.print_list_written(&queue);
            }
            Input::Song(raw) => {
                let songs = self.downloader(&settings, catalog)?;
                let reference = SongReference::new(raw);
                let outcome = songs.download(&reference, None).await?;
                self.output.print_song_outcome(&reference, &outcome);
            }
            Input::List(path) => {
                let mut queue = BatchQueue::load(&path)?;
                let mut driver = BatchDriver::new(self.downloader(&settings, catalog)?);
                if let Some(hook) = &settings.hook {
                    let hook = CommandHook::parse(&hook.command)?.with_stdin(hook.stdin.clone());
                    driver = driver.with_hook(Arc::new(hook));
                }
                let report = driver.run(&mut queue).await?;
                self.output.print_batch_report(&report);
            }
        }

        Ok(())
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }

    pub fn print_interrupted(&self) {
        self.output.print_interrupted();
    }

    async fn connect(&self, settings: &Settings) -> Result<Arc<dyn CatalogService>> {
        let credentials = settings.credentials.clone().ok_or_else(|| {
            eyre!("catalog credentials missing: set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET")
        })?;

        let mut client = SpotifyClient::connect(credentials)
            .await
            .wrap_err("failed to authenticate with the catalog")?;
        if settings.with_lyrics {
            let lyrics = LrcLib::new(client.http());
            client = client.with_lyrics(Arc::new(lyrics));
        }

        info!("Connected to the catalog");
        Ok(Arc::new(client))
    }

    fn downloader(
        &self,
        settings: &Settings,
        catalog: Arc<dyn CatalogService>,
    ) -> Result<SongDownloader> {
        let platform = YtDlp::locate()
            .wrap_err("yt-dlp is required for downloading")?
            .with_preferred_ext(&settings.pipeline.input_ext);

        Ok(SongDownloader::new(
            settings.pipeline.clone(),
            Collaborators {
                catalog,
                platform: Arc::new(platform),
                transcoder: Arc::new(Ffmpeg),
                tags: Arc::new(LoftyTags),
                prompt: Arc::new(StdinPrompt),
            },
        ))
    }
}
