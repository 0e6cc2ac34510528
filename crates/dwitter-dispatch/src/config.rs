use serde::{Deserialize, Serialize};

/// Bounds applied by the validators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationLimits {
    pub password_min_length: usize,
    pub post_max_length: usize,
}

impl ValidationLimits {
    pub const DEFAULT: Self = Self {
        password_min_length: 8,
        post_max_length: 280,
    };

    pub fn with_password_min_length(mut self, length: usize) -> Self {
        self.password_min_length = length;
        self
    }

    pub fn with_post_max_length(mut self, length: usize) -> Self {
        self.post_max_length = length;
        self
    }
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub limits: ValidationLimits,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            limits: ValidationLimits::DEFAULT,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: ValidationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_page_sizes(mut self, default_page_size: usize, max_page_size: usize) -> Self {
        self.default_page_size = default_page_size.max(1);
        self.max_page_size = max_page_size.max(self.default_page_size);
        self
    }

    /// Requested page size clamped to `1..=max_page_size`
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_clamped() {
        let config = ServiceConfig::new().with_page_sizes(20, 100);
        assert_eq!(config.page_size(None), 20);
        assert_eq!(config.page_size(Some(0)), 1);
        assert_eq!(config.page_size(Some(500)), 100);
    }

    #[test]
    fn test_max_page_size_never_below_default() {
        let config = ServiceConfig::new().with_page_sizes(50, 10);
        assert_eq!(config.max_page_size, 50);
    }
}
