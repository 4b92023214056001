//! Class gallery events.

use serde::{Deserialize, Serialize};

use crate::types::{ClassId, PostId, TenantId};

/// A gallery post was published to a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryPostCreated {
    /// Tenant of the class.
    pub tenant_id: TenantId,
    /// The new post.
    pub post_id: PostId,
    /// Class the post was published to.
    pub class_id: ClassId,
    /// Class display name.
    pub class_name: String,
    /// Optional caption.
    #[serde(default)]
    pub caption: Option<String>,
    /// Optional cover image shown in the notification.
    #[serde(default)]
    pub image_url: Option<String>,
}
