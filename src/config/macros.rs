/// Configuration macros for single-declaration config structs
///
/// `config_struct!` takes field name, type and default in one place and
/// generates the struct (public fields), its `Default` implementation, and
/// serde support with `#[serde(default)]` so partial TOML files load.
///
/// ```
/// solswap::config_struct! {
///     pub struct ExampleConfig {
///         enabled: bool = true,
///         timeout_secs: u64 = 15,
///     }
/// }
///
/// let cfg: ExampleConfig = toml::from_str("timeout_secs = 3").unwrap();
/// assert!(cfg.enabled);
/// assert_eq!(cfg.timeout_secs, 3);
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
