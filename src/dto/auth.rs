use serde::{Deserialize, Serialize};

use crate::models::User;

#[derive(Serialize, Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub token: String,
}
