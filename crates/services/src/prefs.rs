use std::sync::Arc;

use tracing::debug;

use lingo_core::model::{Language, Theme};
use storage::repository::{ClientStateRepository, StateKey, StorageError};

/// Theme and selected-language preferences kept in client state.
#[derive(Clone)]
pub struct PrefsService {
    state: Arc<dyn ClientStateRepository>,
}

impl PrefsService {
    #[must_use]
    pub fn new(state: Arc<dyn ClientStateRepository>) -> Self {
        Self { state }
    }

    /// Stored theme, or the system preference when none is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn theme(&self, system_prefers_dark: bool) -> Result<Theme, StorageError> {
        let stored = self.state.get(StateKey::Theme).await?;
        Ok(Theme::resolve(stored.as_deref(), system_prefers_dark))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    pub async fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.state.set(StateKey::Theme, theme.as_str()).await
    }

    /// Flip the effective theme and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or written.
    pub async fn toggle_theme(&self, system_prefers_dark: bool) -> Result<Theme, StorageError> {
        let theme = self.theme(system_prefers_dark).await?.toggled();
        self.set_theme(theme).await?;
        debug!(%theme, "theme toggled");
        Ok(theme)
    }

    /// Last chosen language; French when nothing valid is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    pub async fn selected_language(&self) -> Result<Language, StorageError> {
        let stored = self.state.get(StateKey::SelectedLanguage).await?;
        Ok(stored
            .and_then(|code| code.parse::<Language>().ok())
            .unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    pub async fn set_selected_language(&self, language: Language) -> Result<(), StorageError> {
        self.state
            .set(StateKey::SelectedLanguage, language.code())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::repository::InMemoryRepository;

    fn prefs() -> (PrefsService, Arc<InMemoryRepository>) {
        let state = Arc::new(InMemoryRepository::new());
        (PrefsService::new(state.clone()), state)
    }

    #[tokio::test]
    async fn theme_falls_back_to_system_and_toggle_persists() {
        let (prefs, state) = prefs();
        assert_eq!(prefs.theme(true).await.unwrap(), Theme::Dark);

        let toggled = prefs.toggle_theme(true).await.unwrap();
        assert_eq!(toggled, Theme::Light);
        assert_eq!(
            state.get(StateKey::Theme).await.unwrap().as_deref(),
            Some("light")
        );
        assert_eq!(prefs.theme(true).await.unwrap(), Theme::Light);
    }

    #[tokio::test]
    async fn invalid_language_falls_back_to_french() {
        let (prefs, state) = prefs();
        state
            .set(StateKey::SelectedLanguage, "klingon")
            .await
            .unwrap();
        assert_eq!(prefs.selected_language().await.unwrap(), Language::Fr);

        prefs.set_selected_language(Language::De).await.unwrap();
        assert_eq!(prefs.selected_language().await.unwrap(), Language::De);
    }
}
