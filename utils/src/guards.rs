use std::env;
use std::ffi::OsStr;

/// Sets an environment variable for the lifetime of the guard, restoring the previous value
/// (or removing the variable) when dropped.
///
/// Environment mutation is process-wide; tests using this should be marked `#[serial]`.
pub struct EnvVarGuard {
    key: &'static str,
    prev: Option<String>,
}

impl EnvVarGuard {
    pub fn set(key: &'static str, value: impl AsRef<OsStr>) -> Self {
        let prev = env::var(key).ok();
        unsafe {
            env::set_var(key, value);
        }
        Self { key, prev }
    }

    pub fn remove(key: &'static str) -> Self {
        let prev = env::var(key).ok();
        unsafe {
            env::remove_var(key);
        }
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => unsafe { env::set_var(self.key, v) },
            None => unsafe { env::remove_var(self.key) },
        }
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial(env)]
    fn test_guard_restores_previous_value() {
        let key = "ZSYNC_TEST_GUARD_RESTORE";
        unsafe {
            env::set_var(key, "initial");
        }

        {
            let _guard = EnvVarGuard::set(key, "temporary");
            assert_eq!(env::var(key).unwrap(), "temporary");
        }

        assert_eq!(env::var(key).unwrap(), "initial");
    }

    #[test]
    #[serial(env)]
    fn test_guard_removes_unset_variable() {
        let key = "ZSYNC_TEST_GUARD_REMOVE";
        unsafe {
            env::remove_var(key);
        }

        {
            let _guard = EnvVarGuard::set(key, "temporary");
            assert!(env::var(key).is_ok());
        }

        assert!(env::var(key).is_err());
    }

    #[test]
    #[serial(env)]
    fn test_remove_guard() {
        let key = "ZSYNC_TEST_GUARD_UNSET";
        let _outer = EnvVarGuard::set(key, "present");

        {
            let _guard = EnvVarGuard::remove(key);
            assert!(env::var(key).is_err());
        }

        assert_eq!(env::var(key).unwrap(), "present");
    }
}
