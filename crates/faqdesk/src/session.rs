//! Per-client view state for the user and admin views.
//!
//! Sessions hold only presentation state: the filter, which entry is open,
//! the edit form. Record data always comes from the latest snapshot passed in
//! by the caller, and every change goes through [`FaqRepository`].

use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::faq::{Category, Faq, FaqDraft, FaqId, FeedbackKind};
use crate::filter::{CategoryFilter, FaqFilter, SearchScope};
use crate::repository::FaqRepository;

/// Remembers which records this session has already rated.
///
/// Lives in memory only; a new session starts empty.
#[derive(Debug, Clone, Default)]
pub struct FeedbackGuard {
    given: HashSet<FaqId>,
}

impl FeedbackGuard {
    /// Whether feedback for `id` was already recorded.
    #[must_use]
    pub fn has_given(&self, id: &FaqId) -> bool {
        self.given.contains(id)
    }

    /// Remember that feedback for `id` was recorded.
    pub fn mark(&mut self, id: &FaqId) {
        self.given.insert(id.clone());
    }
}

/// Result of [`UserSession::give_feedback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// The vote was written.
    Recorded,
    /// This session already voted on the record; nothing was written.
    AlreadyGiven,
}

/// State of the browsing view.
#[derive(Debug, Clone)]
pub struct UserSession {
    repository: FaqRepository,
    filter: FaqFilter,
    open: Option<FaqId>,
    feedback: FeedbackGuard,
}

impl UserSession {
    /// A fresh session with no search, all categories, nothing open.
    #[must_use]
    pub fn new(repository: FaqRepository) -> Self {
        Self {
            repository,
            filter: FaqFilter::new(SearchScope::QuestionAndAnswer),
            open: None,
            feedback: FeedbackGuard::default(),
        }
    }

    /// Set the search term.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    /// Select a category chip, or `None` for all.
    pub fn set_category(&mut self, category: Option<Category>) {
        self.filter.category = CategoryFilter::from(category);
    }

    /// The active filter.
    #[must_use]
    pub fn filter(&self) -> &FaqFilter {
        &self.filter
    }

    /// The records this view shows for `snapshot`.
    #[must_use]
    pub fn visible(&self, snapshot: &[Faq]) -> Vec<Faq> {
        self.filter.apply(snapshot)
    }

    /// The entry currently expanded, if any.
    #[must_use]
    pub fn open_id(&self) -> Option<&FaqId> {
        self.open.as_ref()
    }

    /// Expand `id`, or collapse it when it is already open.
    ///
    /// Expanding counts a view and collapses whatever was open before.
    /// Returns whether the entry is open afterwards.
    ///
    /// # Errors
    ///
    /// Returns the repository error if the view count could not be written.
    /// The entry is still opened in that case.
    pub async fn toggle(&mut self, id: &FaqId) -> Result<bool> {
        if self.open.as_ref() == Some(id) {
            self.open = None;
            return Ok(false);
        }
        self.open = Some(id.clone());
        self.repository.increment_view(id).await?;
        Ok(true)
    }

    /// Vote on a record, at most once per record in this session.
    ///
    /// # Errors
    ///
    /// Returns the repository error if the vote could not be written; the
    /// session may then vote again.
    pub async fn give_feedback(&mut self, id: &FaqId, kind: FeedbackKind) -> Result<FeedbackOutcome> {
        if self.feedback.has_given(id) {
            debug!(id = %id, "Feedback already given in this session");
            return Ok(FeedbackOutcome::AlreadyGiven);
        }
        self.repository.record_feedback(id, kind).await?;
        self.feedback.mark(id);
        Ok(FeedbackOutcome::Recorded)
    }

    /// Whether this session already voted on `id`.
    #[must_use]
    pub fn feedback_given(&self, id: &FaqId) -> bool {
        self.feedback.has_given(id)
    }
}

/// The admin create/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FaqForm {
    /// The record being edited, or `None` when creating.
    pub editing: Option<FaqId>,
    /// Field values.
    pub draft: FaqDraft,
}

impl FaqForm {
    /// An empty form for a new record.
    #[must_use]
    pub fn create() -> Self {
        Self::default()
    }

    /// A form prefilled from an existing record.
    #[must_use]
    pub fn edit(faq: &Faq) -> Self {
        Self {
            editing: Some(faq.id.clone()),
            draft: faq.draft(),
        }
    }

    /// Whether submitting updates an existing record.
    #[must_use]
    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }
}

/// State of the management view.
#[derive(Debug, Clone)]
pub struct AdminSession {
    repository: FaqRepository,
    filter: FaqFilter,
    form: Option<FaqForm>,
    pending_delete: Option<FaqId>,
}

impl AdminSession {
    /// A fresh session: question-only search, all categories, no form.
    #[must_use]
    pub fn new(repository: FaqRepository) -> Self {
        Self {
            repository,
            filter: FaqFilter::new(SearchScope::QuestionOnly),
            form: None,
            pending_delete: None,
        }
    }

    /// Set the search term.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    /// Select a category, or `None` for all.
    pub fn set_category(&mut self, category: Option<Category>) {
        self.filter.category = CategoryFilter::from(category);
    }

    /// The records this view shows for `snapshot`.
    #[must_use]
    pub fn visible(&self, snapshot: &[Faq]) -> Vec<Faq> {
        self.filter.apply(snapshot)
    }

    /// Open an empty create form, replacing any open form.
    pub fn open_new_form(&mut self) {
        self.form = Some(FaqForm::create());
    }

    /// Open the edit form for `faq`, replacing any open form.
    pub fn open_edit_form(&mut self, faq: &Faq) {
        self.form = Some(FaqForm::edit(faq));
    }

    /// The open form, if any.
    #[must_use]
    pub fn form(&self) -> Option<&FaqForm> {
        self.form.as_ref()
    }

    /// Mutable access to the open form's fields.
    pub fn form_mut(&mut self) -> Option<&mut FaqForm> {
        self.form.as_mut()
    }

    /// Discard the open form.
    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Submit the open form.
    ///
    /// The form closes only when the write succeeds. Returns `false` when no
    /// form was open.
    ///
    /// # Errors
    ///
    /// Returns a validation or store error; the form stays open with its
    /// values intact.
    pub async fn save_form(&mut self) -> Result<bool> {
        let Some(form) = self.form.as_ref() else {
            return Ok(false);
        };
        match &form.editing {
            Some(id) => self.repository.update(id, &form.draft).await?,
            None => self.repository.create(&form.draft).await?,
        }
        self.form = None;
        Ok(true)
    }

    /// Ask to delete `id`; nothing is written until confirmed.
    pub fn request_delete(&mut self, id: &FaqId) {
        self.pending_delete = Some(id.clone());
    }

    /// The record awaiting delete confirmation.
    #[must_use]
    pub fn pending_delete(&self) -> Option<&FaqId> {
        self.pending_delete.as_ref()
    }

    /// Drop the pending delete without writing anything.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the pending record. Returns `false` when nothing was pending.
    ///
    /// # Errors
    ///
    /// Returns the repository error; the request stays pending so it can be
    /// confirmed again.
    pub async fn confirm_delete(&mut self) -> Result<bool> {
        let Some(id) = self.pending_delete.as_ref() else {
            return Ok(false);
        };
        self.repository.remove(id).await?;
        self.pending_delete = None;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::testing::FailingStore;
    use crate::store::SqliteStore;

    fn create_repo() -> FaqRepository {
        let store = SqliteStore::open_in_memory().expect("failed to create test store");
        FaqRepository::new(Arc::new(store))
    }

    fn failing_repo() -> FaqRepository {
        FaqRepository::new(Arc::new(FailingStore::new()))
    }

    async fn seed(repo: &FaqRepository, question: &str, category: Category) -> Faq {
        repo.create(&FaqDraft::new(question, "answer", category))
            .await
            .unwrap();
        let faqs = repo.store().query_ordered().await.unwrap();
        faqs.into_iter().find(|f| f.question == question).unwrap()
    }

    async fn fetch(repo: &FaqRepository, id: &FaqId) -> Option<Faq> {
        let faqs = repo.store().query_ordered().await.unwrap();
        faqs.into_iter().find(|f| &f.id == id)
    }

    #[tokio::test]
    async fn test_toggle_opens_and_counts_view() {
        let repo = create_repo();
        let faq = seed(&repo, "Q1", Category::General).await;
        let mut session = UserSession::new(repo.clone());

        assert!(session.toggle(&faq.id).await.unwrap());
        assert_eq!(session.open_id(), Some(&faq.id));
        assert_eq!(fetch(&repo, &faq.id).await.unwrap().views, 1);
    }

    #[tokio::test]
    async fn test_toggle_open_entry_closes_without_counting() {
        let repo = create_repo();
        let faq = seed(&repo, "Q1", Category::General).await;
        let mut session = UserSession::new(repo.clone());

        session.toggle(&faq.id).await.unwrap();
        assert!(!session.toggle(&faq.id).await.unwrap());
        assert!(session.open_id().is_none());
        assert_eq!(fetch(&repo, &faq.id).await.unwrap().views, 1);
    }

    #[tokio::test]
    async fn test_opening_another_entry_closes_previous() {
        let repo = create_repo();
        let first = seed(&repo, "Q1", Category::General).await;
        let second = seed(&repo, "Q2", Category::Fine).await;
        let mut session = UserSession::new(repo.clone());

        session.toggle(&first.id).await.unwrap();
        session.toggle(&second.id).await.unwrap();
        assert_eq!(session.open_id(), Some(&second.id));
    }

    #[tokio::test]
    async fn test_feedback_recorded_once_per_session() {
        let repo = create_repo();
        let faq = seed(&repo, "Q1", Category::General).await;
        let mut session = UserSession::new(repo.clone());

        let outcome = session
            .give_feedback(&faq.id, FeedbackKind::Helpful)
            .await
            .unwrap();
        assert_eq!(outcome, FeedbackOutcome::Recorded);

        let outcome = session
            .give_feedback(&faq.id, FeedbackKind::NotHelpful)
            .await
            .unwrap();
        assert_eq!(outcome, FeedbackOutcome::AlreadyGiven);

        let stored = fetch(&repo, &faq.id).await.unwrap();
        assert_eq!(stored.helpful, 1);
        assert_eq!(stored.not_helpful, 0);

        let mut other = UserSession::new(repo.clone());
        let outcome = other
            .give_feedback(&faq.id, FeedbackKind::NotHelpful)
            .await
            .unwrap();
        assert_eq!(outcome, FeedbackOutcome::Recorded);
    }

    #[tokio::test]
    async fn test_failed_feedback_does_not_arm_guard() {
        let mut session = UserSession::new(failing_repo());
        let id = FaqId::new("x");

        assert!(session.give_feedback(&id, FeedbackKind::Helpful).await.is_err());
        assert!(!session.feedback_given(&id));
    }

    #[tokio::test]
    async fn test_user_visible_uses_question_and_answer() {
        let repo = create_repo();
        repo.create(&FaqDraft::new("Q", "방 안에서", Category::Apartment))
            .await
            .unwrap();
        let snapshot = repo.store().query_ordered().await.unwrap();

        let mut user = UserSession::new(repo.clone());
        user.set_search("방");
        assert_eq!(user.visible(&snapshot).len(), 1);

        user.set_category(Some(Category::Fine));
        assert!(user.visible(&snapshot).is_empty());

        let mut admin = AdminSession::new(repo);
        admin.set_search("방");
        assert!(admin.visible(&snapshot).is_empty());
    }

    #[test]
    fn test_new_form_defaults_to_general() {
        let form = FaqForm::create();
        assert!(!form.is_edit());
        assert_eq!(form.draft.category, Category::General);
        assert!(form.draft.question.is_empty());
    }

    #[tokio::test]
    async fn test_save_new_form_creates_and_closes() {
        let repo = create_repo();
        let mut admin = AdminSession::new(repo.clone());

        admin.open_new_form();
        let form = admin.form_mut().unwrap();
        form.draft.question = "Q1".to_string();
        form.draft.answer = "A1".to_string();

        assert!(admin.save_form().await.unwrap());
        assert!(admin.form().is_none());

        let faqs = repo.store().query_ordered().await.unwrap();
        assert_eq!(faqs.len(), 1);
        assert_eq!(faqs[0].category, Category::General);
    }

    #[tokio::test]
    async fn test_save_edit_form_updates_content_only() {
        let repo = create_repo();
        let faq = seed(&repo, "Q1", Category::General).await;
        repo.increment_view(&faq.id).await.unwrap();
        let mut admin = AdminSession::new(repo.clone());

        admin.open_edit_form(&faq);
        assert!(admin.form().unwrap().is_edit());
        admin.form_mut().unwrap().draft.category = Category::Fine;
        assert!(admin.save_form().await.unwrap());

        let stored = fetch(&repo, &faq.id).await.unwrap();
        assert_eq!(stored.category, Category::Fine);
        assert_eq!(stored.views, 1);
    }

    #[tokio::test]
    async fn test_invalid_form_stays_open() {
        let repo = create_repo();
        let mut admin = AdminSession::new(repo.clone());

        admin.open_new_form();
        admin.form_mut().unwrap().draft.question = "Q".to_string();

        let err = admin.save_form().await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(admin.form().unwrap().draft.question, "Q");
        assert!(repo.store().query_ordered().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_keeps_form_open() {
        let mut admin = AdminSession::new(failing_repo());
        admin.open_new_form();
        let form = admin.form_mut().unwrap();
        form.draft.question = "Q".to_string();
        form.draft.answer = "A".to_string();

        assert!(admin.save_form().await.unwrap_err().is_store_write());
        assert!(admin.form().is_some());
    }

    #[tokio::test]
    async fn test_save_without_form_is_noop() {
        let mut admin = AdminSession::new(create_repo());
        assert!(!admin.save_form().await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let repo = create_repo();
        let faq = seed(&repo, "Q1", Category::General).await;
        let mut admin = AdminSession::new(repo.clone());

        admin.request_delete(&faq.id);
        assert_eq!(admin.pending_delete(), Some(&faq.id));
        admin.cancel_delete();
        assert!(admin.pending_delete().is_none());
        assert!(!admin.confirm_delete().await.unwrap());
        assert!(fetch(&repo, &faq.id).await.is_some());

        admin.request_delete(&faq.id);
        assert!(admin.confirm_delete().await.unwrap());
        assert!(admin.pending_delete().is_none());
        assert!(fetch(&repo, &faq.id).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_delete_stays_pending() {
        let mut admin = AdminSession::new(failing_repo());
        let id = FaqId::new("x");
        admin.request_delete(&id);

        assert!(admin.confirm_delete().await.is_err());
        assert_eq!(admin.pending_delete(), Some(&id));
    }
}
