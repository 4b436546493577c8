//! Embedded specification documents.
//!
//! The document bodies live under `documents/` and are baked into the binary
//! at compile time; generation never reads them from disk.

/// Macro to embed documents at compile time as text.
///
/// Generates:
/// - Public constants for each embedded document
/// - `get_embedded_doc(file_name)` function for lookup
/// - `list_docs()` function for discovery
macro_rules! embedded_docs {
    ($($path:expr => $const_name:ident),* $(,)?) => {
        $(
            pub const $const_name: &str =
                include_str!(concat!("../../documents/", $path));
        )*

        pub fn get_embedded_doc(file_name: &str) -> Option<&'static str> {
            match file_name {
                $( $path => Some($const_name), )*
                _ => None,
            }
        }

        pub fn list_docs() -> Vec<&'static str> {
            vec![ $( $path, )* ]
        }
    };
}

embedded_docs! {
    "authentication-requirements.md" => DOC_AUTHENTICATION,
    "authorization-requirements.md" => DOC_AUTHORIZATION,
    "monitoring-requirements.md" => DOC_MONITORING,
    "deployment-architectures.md" => DOC_DEPLOYMENT,
    "disaster-recovery.md" => DOC_DISASTER_RECOVERY,
    "api-specifications.md" => DOC_API,
    "security-requirements.md" => DOC_SECURITY,
    "performance-requirements.md" => DOC_PERFORMANCE,
}
