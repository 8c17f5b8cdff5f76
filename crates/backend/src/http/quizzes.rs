use async_trait::async_trait;
use course_core::model::{Quiz, QuizId};

use super::{Auth, HttpBackend};
use crate::repository::{BackendError, QuizBackend, QuizResultRecord};

#[async_trait]
impl QuizBackend for HttpBackend {
    async fn quiz(&self, quiz_id: QuizId) -> Result<Quiz, BackendError> {
        let url = self.endpoint(&format!("Quizz/{quiz_id}"))?;
        let response = self.send(self.client.get(url), Auth::IfAvailable).await?;
        Ok(response.json().await?)
    }

    async fn submit_result(&self, result: &QuizResultRecord) -> Result<(), BackendError> {
        let url = self.endpoint("QuizResult")?;
        self.send(self.client.post(url).json(result), Auth::Required)
            .await?;
        Ok(())
    }
}
