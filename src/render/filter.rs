//! Request filtering for the rendering session
//!
//! Only the resource kinds needed to build the DOM are let through. Images,
//! fonts, stylesheets and media are aborted before they reach the network;
//! the snapshot never needs them and they dominate page weight.

use chromiumoxide::cdp::browser_protocol::network::ResourceType;

/// Resource kinds that may proceed while rendering
pub const ALLOWED_RESOURCES: &[ResourceType] = &[
    ResourceType::Document,
    ResourceType::Script,
    ResourceType::Fetch,
    ResourceType::Xhr,
];

/// Returns true if a paused request of this kind should be continued
pub fn is_allowed_resource(kind: &ResourceType) -> bool {
    ALLOWED_RESOURCES.contains(kind)
}
