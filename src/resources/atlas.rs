//! Atlas manifests: named frames within a single base image.
//!
//! Provides simple serializable structs for texture-packer output and a
//! loader for manifest files. Registering a manifest with the
//! [`TextureStore`](crate::resources::texturestore::TextureStore) creates
//! one binding per frame, all sharing the manifest's base image.
//!
//! # Manifest File Format
//!
//! ```json
//! {
//!   "image": "atlas.png",
//!   "frames": [
//!     { "key": "hero_idle", "x": 0, "y": 0, "width": 32, "height": 48 },
//!     { "key": "hero_walk", "x": 32, "y": 0, "width": 32, "height": 48 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// One named sub-region of the atlas image.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AtlasFrame {
    /// Cache key the frame is registered under.
    pub key: String,
    /// Left edge within the atlas image, in pixels.
    pub x: f32,
    /// Top edge within the atlas image, in pixels.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Frame table for one atlas image.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AtlasManifest {
    /// Source image the frames index into.
    pub image: String,
    pub frames: Vec<AtlasFrame>,
}

/// Load an atlas manifest from a JSON file.
pub fn load_atlas_manifest(path: impl AsRef<Path>) -> Result<AtlasManifest, String> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read atlas manifest {}: {}", path.display(), e))?;
    serde_json::from_str(&json)
        .map_err(|e| format!("Failed to parse atlas manifest {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_parses_from_json() {
        let json = r#"{
            "image": "atlas.png",
            "frames": [
                { "key": "hero_idle", "x": 0, "y": 0, "width": 32, "height": 48 },
                { "key": "hero_walk", "x": 32, "y": 0, "width": 32, "height": 48 }
            ]
        }"#;
        let manifest: AtlasManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.image, "atlas.png");
        assert_eq!(manifest.frames.len(), 2);
        assert_eq!(manifest.frames[1].key, "hero_walk");
        assert_eq!(manifest.frames[1].x, 32.0);
    }
}
