use crate::{
    client::ApiClient,
    dto::review::CreateReviewRequest,
    error::{AppError, AppResult},
    models::Id,
    validation::{Field, FieldErrors},
};

#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub transaction_id: String,
    pub restaurant_id: Id,
    pub star: u8,
    pub comment: String,
    pub menu_ids: Vec<Id>,
}

impl ReviewDraft {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if !(1..=5).contains(&self.star) {
            errors.add(Field::Star, "Rating must be between 1 and 5");
        }
        errors.into_result()
    }
}

#[derive(Clone)]
pub struct ReviewService {
    client: ApiClient,
}

impl ReviewService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn create_review(&self, draft: ReviewDraft) -> AppResult<()> {
        draft.validate().map_err(AppError::Validation)?;
        let url = self.client.endpoint("/api/review")?;
        let body = CreateReviewRequest {
            transaction_id: draft.transaction_id,
            restaurant_id: draft.restaurant_id,
            star: draft.star,
            comment: draft.comment.trim().to_string(),
            menu_ids: draft.menu_ids,
        };
        self.client
            .post::<_, serde_json::Value>(url, &body)
            .await?;
        tracing::info!(restaurant_id = body.restaurant_id, star = body.star, "review sent");
        Ok(())
    }
}
