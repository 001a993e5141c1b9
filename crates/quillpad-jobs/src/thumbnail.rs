//! Thumbnail generation pipeline handler.
//!
//! Runs as a queued job after notebook creation: describe the notebook with
//! the text model, render the description with the image model, upload the
//! bytes, then record the public URL on the note — but only if the note
//! still exists and has no thumbnail yet.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, instrument, warn};

use quillpad_core::{ImageGenerator, JobType, NoteRepository, ObjectStore, TextGenerator};
use quillpad_db::thumbnail_key;
use quillpad_inference::prompts::thumbnail_description_prompt;

use crate::handler::{JobContext, JobHandler, JobResult};

/// Handler for thumbnail generation jobs.
pub struct ThumbnailHandler {
    notes: Arc<dyn NoteRepository>,
    text: Arc<dyn TextGenerator>,
    image: Arc<dyn ImageGenerator>,
    store: Arc<dyn ObjectStore>,
}

impl ThumbnailHandler {
    /// Create a new thumbnail handler from its collaborators.
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        text: Arc<dyn TextGenerator>,
        image: Arc<dyn ImageGenerator>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            notes,
            text,
            image,
            store,
        }
    }
}

#[async_trait]
impl JobHandler for ThumbnailHandler {
    fn job_type(&self) -> JobType {
        JobType::Thumbnail
    }

    #[instrument(skip(self, ctx), fields(subsystem = "jobs", component = "thumbnail", job_id = %ctx.job.id, note_id = ctx.note_id()))]
    async fn execute(&self, ctx: JobContext) -> JobResult {
        let Some(note_id) = ctx.note_id() else {
            return JobResult::Failed("Thumbnail job has no note id".to_string());
        };

        // Re-read the note at execution time: it may have been deleted, or a
        // duplicate job may already have attached an image.
        let note = match self.notes.fetch(note_id).await {
            Ok(Some(note)) => note,
            Ok(None) => {
                info!(note_id, "Note no longer exists, skipping thumbnail");
                return JobResult::Success(Some(json!({"skipped": "note deleted"})));
            }
            Err(e) => return JobResult::Failed(format!("Failed to load note: {}", e)),
        };

        if note.image_url.is_some() {
            info!(note_id, "Note already has a thumbnail, skipping");
            return JobResult::Success(Some(json!({"skipped": "image already set"})));
        }

        ctx.report_progress(10, Some("Generating image description"));
        let description = match self
            .text
            .generate(&thumbnail_description_prompt(&note.name))
            .await
        {
            Ok(description) => description,
            Err(e) => return JobResult::Failed(format!("Description generation failed: {}", e)),
        };
        if description.trim().is_empty() {
            return JobResult::Failed("Text model returned an empty description".to_string());
        }

        ctx.report_progress(40, Some("Rendering thumbnail"));
        let rendered = match self.image.generate(&description).await {
            Ok(rendered) => rendered,
            Err(e) => return JobResult::Failed(format!("Image generation failed: {}", e)),
        };

        ctx.report_progress(70, Some("Uploading thumbnail"));
        let key = thumbnail_key(note_id, &note.name);
        let url = match self
            .store
            .put(&key, &rendered.bytes, &rendered.content_type)
            .await
        {
            Ok(url) => url,
            Err(e) => return JobResult::Failed(format!("Upload failed: {}", e)),
        };

        ctx.report_progress(90, Some("Recording thumbnail URL"));
        match self.notes.set_image_url(note_id, &url).await {
            Ok(true) => {
                info!(note_id, image_url = %url, "Thumbnail attached");
                JobResult::Success(Some(json!({"image_url": url})))
            }
            Ok(false) => {
                // Lost the race: note deleted meanwhile, or another attempt
                // already set the URL. Nothing to undo.
                warn!(note_id, "No row updated when recording thumbnail URL");
                JobResult::Success(Some(json!({"skipped": "note gone or image already set"})))
            }
            Err(e) => JobResult::Failed(format!("Failed to record thumbnail URL: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_job;
    use quillpad_core::{
        CreateNoteRequest, Error, Note, NoteSummary, Result,
    };
    use quillpad_inference::{MockImageGenerator, MockTextGenerator};
    use serde_json::Value as JsonValue;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// In-memory NoteRepository fake.
    #[derive(Default)]
    struct FakeNotes {
        notes: Mutex<HashMap<i64, Note>>,
    }

    impl FakeNotes {
        fn with_note(id: i64, name: &str, image_url: Option<&str>) -> Self {
            let fake = Self::default();
            fake.notes.lock().unwrap().insert(
                id,
                Note {
                    id,
                    owner_id: Uuid::new_v4(),
                    name: name.to_string(),
                    image_url: image_url.map(String::from),
                    editor_state: None,
                    created_at: chrono::Utc::now(),
                    updated_at: chrono::Utc::now(),
                },
            );
            fake
        }

        fn image_url(&self, id: i64) -> Option<String> {
            self.notes
                .lock()
                .unwrap()
                .get(&id)
                .and_then(|n| n.image_url.clone())
        }
    }

    #[async_trait]
    impl NoteRepository for FakeNotes {
        async fn insert(&self, _req: CreateNoteRequest) -> Result<i64> {
            unimplemented!("not needed by the handler")
        }

        async fn fetch_owned(&self, _id: i64, _owner_id: Uuid) -> Result<Option<Note>> {
            unimplemented!("not needed by the handler")
        }

        async fn fetch(&self, id: i64) -> Result<Option<Note>> {
            Ok(self.notes.lock().unwrap().get(&id).cloned())
        }

        async fn list_for_owner(&self, _owner_id: Uuid) -> Result<Vec<NoteSummary>> {
            unimplemented!("not needed by the handler")
        }

        async fn update_editor_state(
            &self,
            _id: i64,
            _owner_id: Uuid,
            _editor_state: &JsonValue,
        ) -> Result<bool> {
            unimplemented!("not needed by the handler")
        }

        async fn set_image_url(&self, id: i64, url: &str) -> Result<bool> {
            let mut notes = self.notes.lock().unwrap();
            match notes.get_mut(&id) {
                Some(note) if note.image_url.is_none() => {
                    note.image_url = Some(url.to_string());
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn delete_owned(&self, _id: i64, _owner_id: Uuid) -> Result<bool> {
            unimplemented!("not needed by the handler")
        }
    }

    /// In-memory ObjectStore fake.
    #[derive(Default)]
    struct FakeStore {
        objects: Mutex<HashMap<String, Vec<u8>>>,
        fail: bool,
    }

    impl FakeStore {
        fn failing() -> Self {
            Self {
                objects: Mutex::new(HashMap::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl ObjectStore for FakeStore {
        async fn put(&self, key: &str, data: &[u8], _content_type: &str) -> Result<String> {
            if self.fail {
                return Err(Error::Storage("fake upload failure".to_string()));
            }
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), data.to_vec());
            Ok(format!("http://localhost/files/{}", key))
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.objects.lock().unwrap().remove(key);
            Ok(())
        }

        async fn exists(&self, key: &str) -> Result<bool> {
            Ok(self.objects.lock().unwrap().contains_key(key))
        }
    }

    fn handler_with(
        notes: Arc<FakeNotes>,
        text: Arc<MockTextGenerator>,
        image: Arc<MockImageGenerator>,
        store: Arc<FakeStore>,
    ) -> ThumbnailHandler {
        ThumbnailHandler::new(notes, text, image, store)
    }

    #[tokio::test]
    async fn test_pipeline_attaches_thumbnail_url() {
        let notes = Arc::new(FakeNotes::with_note(7, "Trip Plan", None));
        let text = Arc::new(MockTextGenerator::new("a flat minimal mountain"));
        let image = Arc::new(MockImageGenerator::new(b"png".to_vec()));
        let store = Arc::new(FakeStore::default());

        let handler = handler_with(notes.clone(), text, image, store.clone());
        let result = handler
            .execute(JobContext::new(test_job(JobType::Thumbnail, Some(7))))
            .await;

        match result {
            JobResult::Success(Some(data)) => {
                assert_eq!(
                    data["image_url"],
                    "http://localhost/files/thumbnails/7-trip-plan.png"
                );
            }
            other => panic!("Expected success, got {:?}", other),
        }
        assert_eq!(
            notes.image_url(7).as_deref(),
            Some("http://localhost/files/thumbnails/7-trip-plan.png")
        );
        assert!(store.exists("thumbnails/7-trip-plan.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_note_skips_without_error() {
        let notes = Arc::new(FakeNotes::default());
        let text = Arc::new(MockTextGenerator::new("unused"));
        let image = Arc::new(MockImageGenerator::new(b"png".to_vec()));
        let store = Arc::new(FakeStore::default());

        let handler = handler_with(notes, text.clone(), image, store);
        let result = handler
            .execute(JobContext::new(test_job(JobType::Thumbnail, Some(404))))
            .await;

        assert!(matches!(result, JobResult::Success(Some(_))));
        // The pipeline never reached the text model.
        assert_eq!(text.call_count(), 0);
    }

    #[tokio::test]
    async fn test_existing_image_skips_pipeline() {
        let notes = Arc::new(FakeNotes::with_note(
            3,
            "Done",
            Some("http://localhost/files/thumbnails/3-done.png"),
        ));
        let text = Arc::new(MockTextGenerator::new("unused"));
        let image = Arc::new(MockImageGenerator::new(b"png".to_vec()));
        let store = Arc::new(FakeStore::default());

        let handler = handler_with(notes, text.clone(), image, store);
        let result = handler
            .execute(JobContext::new(test_job(JobType::Thumbnail, Some(3))))
            .await;

        assert!(matches!(result, JobResult::Success(Some(_))));
        assert_eq!(text.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_description_fails_job() {
        let notes = Arc::new(FakeNotes::with_note(7, "Trip Plan", None));
        let text = Arc::new(MockTextGenerator::new("   "));
        let image = Arc::new(MockImageGenerator::new(b"png".to_vec()));
        let store = Arc::new(FakeStore::default());

        let handler = handler_with(notes.clone(), text, image.clone(), store);
        let result = handler
            .execute(JobContext::new(test_job(JobType::Thumbnail, Some(7))))
            .await;

        match result {
            JobResult::Failed(msg) => assert!(msg.contains("empty description")),
            other => panic!("Expected failure, got {:?}", other),
        }
        // Pipeline abandoned before image generation; note untouched.
        assert_eq!(image.call_count(), 0);
        assert!(notes.image_url(7).is_none());
    }

    #[tokio::test]
    async fn test_image_generation_failure_fails_job() {
        let notes = Arc::new(FakeNotes::with_note(7, "Trip Plan", None));
        let text = Arc::new(MockTextGenerator::new("a description"));
        let image = Arc::new(MockImageGenerator::failing());
        let store = Arc::new(FakeStore::default());

        let handler = handler_with(notes.clone(), text, image, store);
        let result = handler
            .execute(JobContext::new(test_job(JobType::Thumbnail, Some(7))))
            .await;

        assert!(matches!(result, JobResult::Failed(_)));
        assert!(notes.image_url(7).is_none());
    }

    #[tokio::test]
    async fn test_upload_failure_leaves_image_url_null() {
        let notes = Arc::new(FakeNotes::with_note(7, "Trip Plan", None));
        let text = Arc::new(MockTextGenerator::new("a description"));
        let image = Arc::new(MockImageGenerator::new(b"png".to_vec()));
        let store = Arc::new(FakeStore::failing());

        let handler = handler_with(notes.clone(), text, image, store);
        let result = handler
            .execute(JobContext::new(test_job(JobType::Thumbnail, Some(7))))
            .await;

        match result {
            JobResult::Failed(msg) => assert!(msg.contains("Upload failed")),
            other => panic!("Expected failure, got {:?}", other),
        }
        // The generated bytes are discarded; the note keeps no URL.
        assert!(notes.image_url(7).is_none());
    }

    #[tokio::test]
    async fn test_job_without_note_id_fails() {
        let notes = Arc::new(FakeNotes::default());
        let text = Arc::new(MockTextGenerator::new("x"));
        let image = Arc::new(MockImageGenerator::new(b"png".to_vec()));
        let store = Arc::new(FakeStore::default());

        let handler = handler_with(notes, text, image, store);
        let result = handler
            .execute(JobContext::new(test_job(JobType::Thumbnail, None)))
            .await;

        assert!(matches!(result, JobResult::Failed(_)));
    }

    #[tokio::test]
    async fn test_progress_is_reported_in_order() {
        use std::sync::Mutex as StdMutex;

        let notes = Arc::new(FakeNotes::with_note(7, "Trip Plan", None));
        let text = Arc::new(MockTextGenerator::new("a description"));
        let image = Arc::new(MockImageGenerator::new(b"png".to_vec()));
        let store = Arc::new(FakeStore::default());

        let progress = Arc::new(StdMutex::new(Vec::new()));
        let progress_clone = progress.clone();

        let handler = handler_with(notes, text, image, store);
        let ctx = JobContext::new(test_job(JobType::Thumbnail, Some(7)))
            .with_progress_callback(move |percent, _| {
                progress_clone.lock().unwrap().push(percent);
            });

        let result = handler.execute(ctx).await;
        assert!(matches!(result, JobResult::Success(Some(_))));
        assert_eq!(*progress.lock().unwrap(), vec![10, 40, 70, 90]);
    }
}
