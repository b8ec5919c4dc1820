/// Declare a config section with its defaults inline
///
/// Generates the struct (public fields, `#[serde(default)]` so a TOML file
/// only lists what it overrides), its `Default` impl, and `KEYS`, the
/// accepted TOML key names used to warn about typos in the config file.
///
/// ```
/// salesboard::config_struct! {
///     pub struct CacheSection {
///         ttl_secs: u64 = 30,
///         enabled: bool = true,
///     }
/// }
///
/// assert_eq!(CacheSection::default().ttl_secs, 30);
/// assert_eq!(CacheSection::KEYS, &["ttl_secs", "enabled"]);
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $ty:ty = $default:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $( $(#[$field_meta])* pub $field: $ty, )*
        }

        impl $name {
            pub const KEYS: &'static [&'static str] = &[$(stringify!($field)),*];
        }

        impl Default for $name {
            fn default() -> Self {
                Self { $( $field: $default, )* }
            }
        }
    };
}
