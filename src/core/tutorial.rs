use crate::core::steps::StepExtractor;
use crate::domain::model::{AccessToken, TutorialChecklist};
use crate::domain::ports::TrainingSource;
use crate::utils::error::Result;

pub struct TutorialService<T: TrainingSource> {
    source: T,
    extractor: StepExtractor,
}

impl<T: TrainingSource> TutorialService<T> {
    pub fn new(source: T, extractor: StepExtractor) -> Self {
        Self { source, extractor }
    }

    /// 取得教學並轉成清單；沒有步驟時 `steps` 為空，不視為錯誤
    pub async fn checklist(&self, id: &str, token: Option<&AccessToken>) -> Result<TutorialChecklist> {
        tracing::info!("📚 Loading training {}", id);
        let document = self.source.fetch_training(id, token).await?;
        let steps = self.extractor.extract(&document.content);

        if steps.is_empty() {
            tracing::info!("Training {} has no checklist steps", id);
        } else {
            tracing::info!("✅ Training {} has {} steps", id, steps.len());
        }

        Ok(TutorialChecklist { document, steps })
    }
}
