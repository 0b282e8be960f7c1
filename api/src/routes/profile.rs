use actix_web::HttpResponse;

use crate::dto::ProfileResponse;
use crate::middleware::AuthenticatedUser;

/// Handler for GET /profile-info
pub async fn profile_info(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(ProfileResponse {
        user_id: user.get_str("user_id").map(str::to_string),
        username: user.get_str("username").map(str::to_string),
    })
}
