//! Generation settings and target-version configuration

mod settings;
mod version;

pub use settings::{
    load_settings, ModelGenerationSettings, DEFAULT_MODEL_NAMESPACE,
    DEFAULT_PROVIDER_INVARIANT_NAME, DEFAULT_PROVIDER_MANIFEST_TOKEN,
};
pub use version::{TargetSchemaVersion, VersionCapabilities};
