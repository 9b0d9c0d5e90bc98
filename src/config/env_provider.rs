#[cfg(test)]
use std::collections::HashMap;

/// Source of environment variables
///
/// Settings read through this trait so tests can supply values without
/// touching the process environment.
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production environment provider that reads from system environment
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables for tests
#[cfg(test)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

#[cfg(test)]
impl MockEnvironment {
    pub fn empty() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_vars(mut self, vars: &[(&str, &str)]) -> Self {
        for (key, value) in vars {
            self.vars.insert(key.to_string(), value.to_string());
        }
        self
    }
}

#[cfg(test)]
impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_environment_provider() {
        let provider = SystemEnvironment;

        unsafe {
            std::env::set_var("CORELOG_TEST_VAR_12345", "test_value");
        }

        assert_eq!(provider.get_var("CORELOG_TEST_VAR_12345"), Some("test_value".to_string()));
        assert_eq!(provider.get_var("CORELOG_NON_EXISTENT_98765"), None);

        unsafe {
            std::env::remove_var("CORELOG_TEST_VAR_12345");
        }
    }

    #[test]
    fn test_mock_environment_with_vars() {
        let provider = MockEnvironment::empty()
            .with_vars(&[("KEY1", "value1"), ("KEY2", "value2")])
            .with_var("KEY3", "value3");

        assert_eq!(provider.get_var("KEY1"), Some("value1".to_string()));
        assert_eq!(provider.get_var("KEY3"), Some("value3".to_string()));
        assert_eq!(provider.get_var("KEY4"), None);
    }
}
