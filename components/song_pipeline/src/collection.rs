// components/song_pipeline/src/collection.rs
use crate::error::PipelineError;
use crate::naming::sanitize_title;
use crate::queue::BatchQueue;
use catalog_client::CatalogService;
use song_primitives::Collection;
use std::path::PathBuf;
use tracing::info;

/// Default list file for a collection: its sanitized name plus `.txt`
pub fn default_list_path(name: &str, fallback: &str) -> PathBuf {
    let name = sanitize_title(name);
    let name = if name.is_empty() { sanitize_title(fallback) } else { name };
    PathBuf::from(format!("{name}.txt"))
}

/// Enumerate `collection` and write its tracks to a batch list
///
/// The list goes to `target`, or to [`default_list_path`] in the working
/// directory.
pub async fn export_collection(
    catalog: &dyn CatalogService,
    collection: &Collection,
    target: Option<PathBuf>,
) -> Result<BatchQueue, PipelineError> {
    let enumerated = catalog.enumerate(collection).await?;
    let path = target.unwrap_or_else(|| default_list_path(&enumerated.name, &collection.id));

    info!(
        "Writing {} tracks of {} \"{}\" to {}",
        enumerated.references.len(),
        collection.kind,
        enumerated.name,
        path.display()
    );
    Ok(BatchQueue::create(path, enumerated.references)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{catalog_url, FakeCatalog};
    use catalog_client::EnumeratedCollection;
    use song_primitives::{CollectionKind, SongReference};

    #[test]
    fn default_path_uses_the_sanitized_name() {
        assert_eq!(default_list_path("Road Trip: 90s/00s", "id"), PathBuf::from("Road Trip 90s00s.txt"));
        assert_eq!(default_list_path("???", "37i9dQZF1DX"), PathBuf::from("37i9dQZF1DX.txt"));
    }

    #[tokio::test]
    async fn exported_collection_is_a_loadable_list() {
        let dir = tempfile::tempdir().unwrap();
        let references = vec![
            SongReference::new(catalog_url("a1")),
            SongReference::new(catalog_url("b2")),
        ];
        let catalog = FakeCatalog::default().with_collection(
            "2UJcKiJxNryhL050F5Z1Fk",
            EnumeratedCollection {
                name: "Nevermind".into(),
                references: references.clone(),
            },
        );
        let collection = Collection {
            kind: CollectionKind::Album,
            id: "2UJcKiJxNryhL050F5Z1Fk".into(),
        };
        let target = dir.path().join("nevermind.txt");

        let queue = export_collection(&catalog, &collection, Some(target.clone()))
            .await
            .unwrap();

        assert_eq!(queue.references(), references.as_slice());
        assert_eq!(BatchQueue::load(&target).unwrap().references(), references.as_slice());
    }
}
