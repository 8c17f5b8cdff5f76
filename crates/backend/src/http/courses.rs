use async_trait::async_trait;
use course_core::model::{ChapterId, ContentId, Course, CourseId, EnrollmentId, Stars};
use serde::Serialize;

use super::{Auth, HttpBackend};
use crate::repository::{BackendError, CourseBackend};

#[derive(Serialize)]
struct RateRequest {
    stars: u8,
}

#[async_trait]
impl CourseBackend for HttpBackend {
    async fn course_progress(&self, course_id: CourseId) -> Result<Course, BackendError> {
        let url = self.endpoint(&format!("courses/{course_id}/progress"))?;
        let response = self.send(self.client.get(url), Auth::Required).await?;
        Ok(response.json().await?)
    }

    async fn complete_content(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
        content_id: ContentId,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&format!(
            "courses/{course_id}/chapters/{chapter_id}/content/{content_id}/complete"
        ))?;
        self.send(self.client.post(url), Auth::IfAvailable).await?;
        Ok(())
    }

    async fn rate_course(&self, course_id: CourseId, stars: Stars) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("courses/{course_id}/rate"))?;
        let body = RateRequest {
            stars: stars.value(),
        };
        self.send(self.client.post(url).json(&body), Auth::Required)
            .await?;
        Ok(())
    }

    async fn certificate(&self, enrollment_id: EnrollmentId) -> Result<Vec<u8>, BackendError> {
        let url = self.endpoint(&format!("certificate/{enrollment_id}"))?;
        let response = self.send(self.client.get(url), Auth::Required).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
