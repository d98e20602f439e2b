use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Banner;

#[derive(Debug, Serialize, ToSchema)]
pub struct BannerList {
    pub items: Vec<Banner>,
}
