//! Convenience macros for plugin development.

/// Macro for creating a plugin info struct.
///
/// # Example
/// ```rust,ignore
/// let info = plugin_info!(
///     name: "my-plugin",
///     version: "1.0.0",
///     description: "Does things"
/// );
/// ```
#[macro_export]
macro_rules! plugin_info {
    (name: $name:expr) => {
        $crate::prelude::PluginInfo {
            name: Some($name.to_string()),
            version: None,
            description: None,
        }
    };
    (name: $name:expr, version: $version:expr) => {
        $crate::prelude::PluginInfo {
            name: Some($name.to_string()),
            version: Some($version.to_string()),
            description: None,
        }
    };
    (name: $name:expr, version: $version:expr, description: $desc:expr) => {
        $crate::prelude::PluginInfo {
            name: Some($name.to_string()),
            version: Some($version.to_string()),
            description: Some($desc.to_string()),
        }
    };
}
