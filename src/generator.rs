//! Fanning one logical test out over Java versions.

use std::rc::Rc;

use crate::config::HarnessConfig;
use crate::context::ParsingContext;
use crate::diagnostics::HarnessError;
use crate::parser::{JavaParser, ParseInvoker};
use crate::version::JavaVersion;

/// A registered test: runs once, reports failure as an error.
pub type TestBody = Box<dyn FnOnce() -> Result<(), HarnessError>>;

/// Where generated tests go. Registration order is run order.
pub trait TestRegistry {
    fn register(&mut self, name: String, body: TestBody);
}

/// Register `body` once per entry of `versions` with the default config.
/// See [`Generator::parser_test`].
pub fn parser_test<R, F>(registry: &mut R, name: &str, versions: &[JavaVersion], body: F) -> Result<(), HarnessError>
where
    R: TestRegistry + ?Sized,
    F: Fn(&mut ParsingContext) -> Result<(), HarnessError> + 'static,
{
    Generator::default().parser_test(registry, name, versions, body)
}

pub fn parser_test_for<R, F>(registry: &mut R, name: &str, version: JavaVersion, body: F) -> Result<(), HarnessError>
where
    R: TestRegistry + ?Sized,
    F: Fn(&mut ParsingContext) -> Result<(), HarnessError> + 'static,
{
    parser_test(registry, name, &[version], body)
}

pub fn parser_test_latest<R, F>(registry: &mut R, name: &str, body: F) -> Result<(), HarnessError>
where
    R: TestRegistry + ?Sized,
    F: Fn(&mut ParsingContext) -> Result<(), HarnessError> + 'static,
{
    parser_test(registry, name, &[JavaVersion::LATEST], body)
}

/// Test generator with a fixed config and parser for every context it
/// builds.
pub struct Generator {
    config: HarnessConfig,
    parser: Rc<dyn ParseInvoker>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}

impl Generator {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            parser: Rc::new(JavaParser),
        }
    }

    pub fn with_parser(mut self, parser: Rc<dyn ParseInvoker>) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Register one test per entry of `versions`, named
    /// `"{name} (Java {version})"`. Each run gets a fresh context bound to
    /// its version. Duplicate versions give duplicate tests.
    pub fn parser_test<R, F>(
        &self,
        registry: &mut R,
        name: &str,
        versions: &[JavaVersion],
        body: F,
    ) -> Result<(), HarnessError>
    where
        R: TestRegistry + ?Sized,
        F: Fn(&mut ParsingContext) -> Result<(), HarnessError> + 'static,
    {
        if versions.is_empty() {
            return Err(HarnessError::malformed(format!(
                "parser test '{name}' has no Java versions to run on"
            )));
        }

        let body = Rc::new(body);
        for &version in versions {
            let test_name = format!("{name} (Java {version})");
            tracing::debug!(test = %test_name, "registering parser test");

            let body = Rc::clone(&body);
            let config = self.config.clone();
            let parser = Rc::clone(&self.parser);
            registry.register(
                test_name,
                Box::new(move || {
                    let mut ctx = ParsingContext::new(version).with_config(config).with_parser(parser);
                    body(&mut ctx)
                }),
            );
        }
        Ok(())
    }

    pub fn parser_test_for<R, F>(&self, registry: &mut R, name: &str, version: JavaVersion, body: F) -> Result<(), HarnessError>
    where
        R: TestRegistry + ?Sized,
        F: Fn(&mut ParsingContext) -> Result<(), HarnessError> + 'static,
    {
        self.parser_test(registry, name, &[version], body)
    }

    /// Single test on the config's default version.
    pub fn parser_test_default<R, F>(&self, registry: &mut R, name: &str, body: F) -> Result<(), HarnessError>
    where
        R: TestRegistry + ?Sized,
        F: Fn(&mut ParsingContext) -> Result<(), HarnessError> + 'static,
    {
        self.parser_test(registry, name, &[self.config.default_version], body)
    }
}
