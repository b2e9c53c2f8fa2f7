use super::ConfigError;

/// Constructor validation lifecycle shared by kernel structs.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, KernelLifecycle};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct FrameConfig {
        framelength: usize,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct FrameKernel {
        framelength: usize,
    }

    impl KernelLifecycle for FrameKernel {
        type Config = FrameConfig;

        fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
            if config.framelength == 0 || config.framelength % 2 != 0 {
                return Err(ConfigError::InvalidArgument {
                    arg: "framelength",
                    reason: "framelength must be a positive even integer",
                });
            }
            Ok(Self {
                framelength: config.framelength,
            })
        }
    }

    #[test]
    fn lifecycle_constructor_accepts_valid_config() {
        let kernel = FrameKernel::try_new(FrameConfig { framelength: 1024 }).expect("valid config");
        assert_eq!(kernel.framelength, 1024);
    }

    #[test]
    fn lifecycle_constructor_rejects_invalid_config() {
        let err = FrameKernel::try_new(FrameConfig { framelength: 7 }).expect_err("invalid config");
        assert_eq!(
            err,
            ConfigError::InvalidArgument {
                arg: "framelength",
                reason: "framelength must be a positive even integer",
            }
        );
    }
}
