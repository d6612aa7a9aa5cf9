// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! The component registry adapters register their constructors with.
//!
//! Adapters are not discovered; each registers a named constructor at
//! program start and the runtime instantiates components from configuration
//! by name. This keeps the set of loadable components explicit and fully
//! resolved at build time.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use crate::dispatch::Dispatcher;

/// A running adapter component (an app adapter or a backbone).
#[async_trait]
pub trait Component: Send + Sync {
    /// The component's registered name.
    fn name(&self) -> &str;

    /// Spawns the component's workers.
    ///
    /// # Errors
    ///
    /// Returns an error if startup fails (e.g. transport or configuration).
    async fn start(&self) -> anyhow::Result<()>;

    /// Stops the component's workers.
    ///
    /// # Errors
    ///
    /// Returns an error if shutdown fails.
    async fn stop(&self) -> anyhow::Result<()>;
}

/// Constructs a component from its configuration section and the dispatcher.
pub type ComponentFactory =
    Box<dyn Fn(&Value, &Dispatcher) -> anyhow::Result<Box<dyn Component>> + Send + Sync>;

/// The registration table mapping component names to constructors.
#[derive(Default)]
pub struct ComponentRegistry {
    factories: IndexMap<String, ComponentFactory>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(ComponentRegistry))
            .field("names", &self.names())
            .finish()
    }
}

impl ComponentRegistry {
    /// Creates a new empty [`ComponentRegistry`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already registered.
    pub fn register<T: Into<String>>(
        &mut self,
        name: T,
        factory: ComponentFactory,
    ) -> anyhow::Result<()> {
        let name = name.into();
        anyhow::ensure!(
            !self.factories.contains_key(&name),
            "Component '{name}' already registered"
        );
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Instantiates the component registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or construction fails
    /// (e.g. invalid configuration).
    pub fn build(
        &self,
        name: &str,
        config: &Value,
        dispatcher: &Dispatcher,
    ) -> anyhow::Result<Box<dyn Component>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown component '{name}'"))?;
        factory(config, dispatcher)
    }

    /// Returns the registered component names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    struct StubComponent;

    #[async_trait]
    impl Component for StubComponent {
        fn name(&self) -> &str {
            "stub"
        }

        async fn start(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn stub_factory() -> ComponentFactory {
        Box::new(|_config, _dispatcher| Ok(Box::new(StubComponent) as Box<dyn Component>))
    }

    #[rstest]
    fn test_register_and_build() {
        let mut registry = ComponentRegistry::new();
        registry.register("stub", stub_factory()).unwrap();
        assert_eq!(registry.names(), vec!["stub"]);

        let component = registry
            .build("stub", &json!({}), &Dispatcher::default())
            .unwrap();
        assert_eq!(component.name(), "stub");
    }

    #[rstest]
    fn test_duplicate_registration_fails() {
        let mut registry = ComponentRegistry::new();
        registry.register("stub", stub_factory()).unwrap();
        assert!(registry.register("stub", stub_factory()).is_err());
    }

    #[rstest]
    fn test_unknown_component_fails() {
        let registry = ComponentRegistry::new();
        let result = registry.build("missing", &json!({}), &Dispatcher::default());
        assert!(result.is_err());
    }
}
