use serde::Serialize;

use crate::models::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub transaction_id: String,
    pub restaurant_id: Id,
    pub star: u8,
    pub comment: String,
    pub menu_ids: Vec<Id>,
}
