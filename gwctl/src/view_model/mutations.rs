//! Project and API-key mutations, and the dialog state around them.

use std::future::Future;

use super::ViewModel;
use super::state::Notice;
use crate::api::models::api_keys::{ApiKey, ApiKeyDraft, ApiKeyEdit};
use crate::charts::ChartSurface;
use crate::errors::Result;
use crate::http::HttpClient;

impl<H: HttpClient + 'static, S: ChartSurface + 'static> ViewModel<H, S> {
    /// Run a mutating request and report its outcome as a notice. Failures are not retried
    /// and nothing is substituted.
    async fn mutate(
        &self,
        operation: &str,
        success: &str,
        failure: &str,
        request: impl Future<Output = Result<()>>,
    ) -> Result<()> {
        match request.await {
            Ok(()) => {
                tracing::info!(operation, "Mutation succeeded");
                self.update(|store| store.push_notice(Notice::success(success)));
                Ok(())
            }
            Err(error) => {
                error.log(operation);
                let message = error.user_message(failure);
                self.update(|store| store.push_notice(Notice::error(message)));
                Err(error)
            }
        }
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<()> {
        self.mutate(
            "delete_project",
            "Project deleted",
            "Failed to delete project",
            self.inner.client.delete_project(project_id),
        )
        .await?;
        let _ = self.load_projects().await;
        Ok(())
    }

    /// Open the create dialog with an empty draft.
    pub fn show_create_api_key_dialog(&self) {
        self.update(|store| {
            store.view.new_api_key = ApiKeyDraft::default();
            store.view.create_dialog_open = true;
        });
    }

    pub fn set_new_api_key(&self, draft: ApiKeyDraft) {
        self.update(|store| store.view.new_api_key = draft);
    }

    pub fn close_create_api_key_dialog(&self) {
        self.update(|store| store.view.create_dialog_open = false);
    }

    /// Submit the create dialog. The dialog closes and the list reloads only on success.
    pub async fn create_api_key(&self) -> Result<()> {
        let draft = self.read(|view| view.new_api_key.clone());
        self.mutate("create_api_key", "API key created", "Failed to create API key", async {
            let body = draft.to_request()?;
            self.inner.client.create_api_key(&body).await
        })
        .await?;

        self.close_create_api_key_dialog();
        let _ = self.load_api_keys().await;
        Ok(())
    }

    /// Open the edit dialog for `key`.
    pub fn edit_api_key(&self, key: &ApiKey) {
        let edit = ApiKeyEdit::from(key);
        self.update(|store| {
            store.view.editing_api_key = edit;
            store.view.edit_dialog_open = true;
        });
    }

    pub fn set_editing_draft(&self, draft: ApiKeyDraft) {
        self.update(|store| store.view.editing_api_key.draft = draft);
    }

    pub fn close_edit_api_key_dialog(&self) {
        self.update(|store| store.view.edit_dialog_open = false);
    }

    /// Submit the edit dialog.
    pub async fn update_api_key(&self) -> Result<()> {
        let edit = self.read(|view| view.editing_api_key.clone());
        self.mutate("update_api_key", "API key updated", "Failed to update API key", async {
            let body = edit.draft.to_request()?;
            self.inner.client.update_api_key(&edit.id, &body).await
        })
        .await?;

        self.close_edit_api_key_dialog();
        let _ = self.load_api_keys().await;
        Ok(())
    }

    /// Revoke an active key or reactivate any other.
    pub async fn toggle_api_key_status(&self, key: &ApiKey) -> Result<()> {
        let status = key.status.toggled();
        self.mutate(
            "toggle_api_key_status",
            "API key status updated",
            "Failed to update API key status",
            self.inner.client.set_api_key_status(&key.id, status),
        )
        .await?;
        let _ = self.load_api_keys().await;
        Ok(())
    }

    pub async fn delete_api_key(&self, api_key_id: &str) -> Result<()> {
        self.mutate(
            "delete_api_key",
            "API key deleted",
            "Failed to delete API key",
            self.inner.client.delete_api_key(api_key_id),
        )
        .await?;
        let _ = self.load_api_keys().await;
        Ok(())
    }
}
