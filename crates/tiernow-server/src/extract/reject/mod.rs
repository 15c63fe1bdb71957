//! Extractors that reject with structured error responses.

mod enhanced_json;
mod enhanced_path;
mod validated_json;

pub use enhanced_json::Json;
pub use enhanced_path::Path;
pub use validated_json::ValidateJson;
