//! The resource list-editor shared by every catalog entity screen.
//!
//! A [`Resource`] describes one backend collection: how its records decode, what a
//! draft looks like, which draft fields are required and how a draft becomes a
//! request. [`ResourceEditor`] owns the cached list, one draft and the edit-target
//! id, and implements the submit / edit / delete cycle on top of that description.

use crate::client::{BackofficeClient, Outbound};
use crate::{BackofficeError, Result};
use serde::de::DeserializeOwned;

/// Whether a draft is about to be created or to update an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// Description of one backend collection.
pub trait Resource {
    /// Record as returned by the backend
    type Record: DeserializeOwned + Clone + Send;
    /// Form state for creating or editing a record
    type Draft: Default + Clone + Send;

    /// Collection path relative to the API base (`artists`, `albums`, ...)
    const COLLECTION: &'static str;

    /// Singular noun used in prompts and logs
    const NOUN: &'static str;

    fn record_id(record: &Self::Record) -> &str;

    /// Check required fields, naming the first blank one.
    fn validate(draft: &Self::Draft, mode: Mode) -> Result<()>;

    /// Copy a record into a draft for editing.
    fn draft_from_record(record: &Self::Record) -> Self::Draft;

    fn create_request(draft: &Self::Draft) -> Result<Outbound>;

    fn update_request(id: &str, draft: &Self::Draft) -> Result<Outbound>;

    fn list_path() -> String {
        Self::COLLECTION.to_string()
    }

    fn delete_path(id: &str) -> String {
        format!("{}/{}", Self::COLLECTION, urlencoding::encode(id))
    }

    fn delete_prompt() -> String {
        format!("Do you really want to delete this {}?", Self::NOUN)
    }
}

/// Fail with `Validation { field }` when `value` is blank.
pub fn require(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        Err(BackofficeError::Validation { field })
    } else {
        Ok(())
    }
}

/// Interactive confirmation for destructive operations.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// What a successful [`ResourceEditor::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    Updated { id: String },
}

/// What [`ResourceEditor::delete`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

/// List-editor for one resource.
///
/// # Examples
///
/// ```rust,no_run
/// use catalog_backoffice::artists::ArtistResource;
/// use catalog_backoffice::{BackofficeClient, ResourceEditor};
///
/// # tokio_test::block_on(async {
/// let client = BackofficeClient::new(Box::new(http_client::native::NativeClient::new()));
/// let mut artists = ResourceEditor::<ArtistResource>::new(client);
/// artists.refresh().await?;
///
/// artists.draft_mut().name = "Nina Simone".to_string();
/// artists.draft_mut().genre = "Jazz".to_string();
/// artists.submit().await?;
/// # Ok::<(), catalog_backoffice::BackofficeError>(())
/// # });
/// ```
pub struct ResourceEditor<R: Resource> {
    client: BackofficeClient,
    records: Vec<R::Record>,
    draft: R::Draft,
    edit_target: Option<String>,
}

impl<R: Resource> ResourceEditor<R> {
    pub fn new(client: BackofficeClient) -> Self {
        Self {
            client,
            records: Vec::new(),
            draft: R::Draft::default(),
            edit_target: None,
        }
    }

    pub fn client(&self) -> &BackofficeClient {
        &self.client
    }

    /// Records from the last successful refresh
    pub fn records(&self) -> &[R::Record] {
        &self.records
    }

    pub fn find(&self, id: &str) -> Option<&R::Record> {
        self.records.iter().find(|r| R::record_id(r) == id)
    }

    pub fn draft(&self) -> &R::Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut R::Draft {
        &mut self.draft
    }

    /// `None` in create mode, the record id in update mode
    pub fn edit_target(&self) -> Option<&str> {
        self.edit_target.as_deref()
    }

    pub fn mode(&self) -> Mode {
        if self.edit_target.is_some() {
            Mode::Update
        } else {
            Mode::Create
        }
    }

    /// Fetch the whole collection.
    pub async fn list(&self) -> Result<Vec<R::Record>> {
        self.client.get_json(&R::list_path()).await
    }

    /// Fetch the collection and replace the cached records.
    ///
    /// On failure the previous records are kept.
    pub async fn refresh(&mut self) -> Result<&[R::Record]> {
        let records = self.list().await?;
        log::debug!("Loaded {} {} records", records.len(), R::NOUN);
        self.records = records;
        Ok(&self.records)
    }

    pub async fn create(&self, draft: &R::Draft) -> Result<()> {
        R::validate(draft, Mode::Create)?;
        self.client.execute(R::create_request(draft)?).await?;
        log::info!("Created {}", R::NOUN);
        Ok(())
    }

    pub async fn update(&self, id: &str, draft: &R::Draft) -> Result<()> {
        R::validate(draft, Mode::Update)?;
        self.client.execute(R::update_request(id, draft)?).await?;
        log::info!("Updated {} {id}", R::NOUN);
        Ok(())
    }

    /// Delete a record after `confirm` agreed, then refresh the list.
    ///
    /// A declined confirmation sends nothing.
    pub async fn delete(&mut self, id: &str, confirm: &dyn Confirm) -> Result<DeleteOutcome> {
        if !confirm.confirm(&R::delete_prompt()) {
            log::debug!("Deletion of {} {id} declined", R::NOUN);
            return Ok(DeleteOutcome::Declined);
        }

        self.client.execute(Outbound::delete(R::delete_path(id))).await?;
        log::info!("Deleted {} {id}", R::NOUN);

        if self.edit_target.as_deref() == Some(id) {
            self.reset();
        }
        if let Err(e) = self.refresh().await {
            log::warn!("Deleted {} but could not reload the list: {e}", R::NOUN);
        }
        Ok(DeleteOutcome::Deleted)
    }

    /// Load `record` into the draft and switch to update mode.
    pub fn edit(&mut self, record: &R::Record) {
        self.draft = R::draft_from_record(record);
        self.edit_target = Some(R::record_id(record).to_string());
    }

    /// Load the cached record `id` into the draft.
    pub fn edit_by_id(&mut self, id: &str) -> Result<()> {
        let record = self
            .find(id)
            .cloned()
            .ok_or_else(|| BackofficeError::NotFound(format!("{} {id}", R::NOUN)))?;
        self.edit(&record);
        Ok(())
    }

    /// Clear the draft and return to create mode.
    pub fn reset(&mut self) {
        self.draft = R::Draft::default();
        self.edit_target = None;
    }

    /// Validate and save the draft.
    ///
    /// Creates when no edit target is set, updates otherwise. On success the list
    /// is refreshed and the draft reset; on failure both are left untouched so the
    /// user can fix the problem and submit again.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        let mode = self.mode();
        if let Err(e) = R::validate(&self.draft, mode) {
            log::debug!("Not submitting {}: {e}", R::NOUN);
            return Err(e);
        }

        let outcome = match self.edit_target.clone() {
            Some(id) => {
                self.update(&id, &self.draft).await?;
                SubmitOutcome::Updated { id }
            }
            None => {
                self.create(&self.draft).await?;
                SubmitOutcome::Created
            }
        };

        self.reset();
        if let Err(e) = self.refresh().await {
            log::warn!("Saved {} but could not reload the list: {e}", R::NOUN);
        }
        Ok(outcome)
    }
}
