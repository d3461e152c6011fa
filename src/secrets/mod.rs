//! Secret detection and masking.
//!
//! This module provides functionality for detecting and masking sensitive data:
//!
//! - [`Classifier`] - Decides whether a `KEY=value` pair is a secret
//! - [`OutputMasker`] - Masks secret values in displayed text
//!
//! # Example
//!
//! ```
//! use vault_onboard::secrets::{Classifier, OutputMasker};
//!
//! let classifier = Classifier::with_builtins();
//! assert!(classifier.classify("DB_PASSWORD", "hunter2"));
//! assert!(!classifier.classify("PORT", "3000"));
//!
//! let mut masker = OutputMasker::new();
//! masker.add_secret("hunter2");
//! assert!(!masker.mask("password is hunter2").contains("hunter2"));
//! ```

pub mod classifier;
pub mod mask;

pub use classifier::{Classifier, Verdict};
pub use mask::{preview, OutputMasker};
