/// Configuration macros for zero-repetition config definitions

/// Define a configuration struct with embedded defaults
///
/// One declaration lists each field's name, type and default value, and
/// generates:
/// - The struct with public fields
/// - The Default implementation
/// - Serde support with `#[serde(default)]`, so a TOML file only needs the
///   fields it overrides
///
/// # Example
/// ```
/// v4swap::config_struct! {
///     pub struct ReceiptConfig {
///         poll_interval_ms: u64 = 2000,
///         verbose: bool = false,
///     }
/// }
///
/// let cfg = ReceiptConfig::default();
/// assert_eq!(cfg.poll_interval_ms, 2000);
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_name:ident: $field_type:ty = $default_value:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field_name: $field_type,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field_name: $default_value,
                    )*
                }
            }
        }
    };
}
