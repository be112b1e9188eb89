/// Declares a configuration group: a `ConfigValueGroup` struct with typed fields, their defaults, and
/// environment variable overrides.
///
/// Usage:
/// ```ignore
/// zsync_config::config_group!({
///     /// How many bytes to read per network chunk.
///     ref chunk_bytes: usize = 65536;
/// });
/// ```
///
/// The environment variable for a field is `ZSYNC_<GROUP>_<FIELD>`, where `<GROUP>` is the last
/// component of the module path the macro is invoked in (so `groups::client` gives `ZSYNC_CLIENT_*`).
#[macro_export]
macro_rules! config_group {
    ({
        $(
            $(#[$meta:meta])*
            ref $name:ident : $type:ty = $value:expr;
        )+
    }) => {
        #[allow(unused_imports)]
        use $crate::ParsableConfigValue;

        #[derive(Debug, Clone)]
        pub struct ConfigValueGroup {
            $(
                $(#[$meta])*
                pub $name: $type,
            )+
        }

        impl Default for ConfigValueGroup {
            fn default() -> Self {
                Self {
                    $(
                        $name: {
                            let v: $type = $value;
                            v
                        },
                    )+
                }
            }
        }

        impl AsRef<ConfigValueGroup> for ConfigValueGroup {
            fn as_ref(&self) -> &ConfigValueGroup {
                self
            }
        }

        impl ConfigValueGroup {
            pub fn new() -> Self {
                Self::default()
            }

            /// The environment variable consulted for `field`.
            pub fn env_var_name(field: &str) -> String {
                let group = module_path!().rsplit("::").next().unwrap_or_default();
                format!("{}{}_{}", $crate::ENV_PREFIX, group.to_ascii_uppercase(), field.to_ascii_uppercase())
            }

            /// Replace each field whose environment variable is set (and parses) with the user value.
            pub fn apply_env_overrides(&mut self) {
                $(
                    {
                        let env_name = Self::env_var_name(stringify!($name));
                        let maybe_env_value = std::env::var(&env_name).ok();
                        let default_value: $type = $value;
                        self.$name = <$type>::parse(&env_name, maybe_env_value, default_value);
                    }
                )+
            }
        }

        pub type ConfigValues = ConfigValueGroup;
    };
}
