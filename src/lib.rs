//! # modreg
//!
//! A directory-driven module registry. Module files (`<name>.<ext>`) are
//! manifests declaring `properties` (which must carry the identifier), an
//! optional factory `kind` and its `settings`. The registry discovers them,
//! loads each through an explicit evaluation cache, indexes them by
//! identifier and runs every module's init hook at most once.
//!
//! ```rust,no_run
//! use modreg::{ModuleParts, ModuleRegistry};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let mut registry: ModuleRegistry<AtomicUsize> = ModuleRegistry::new();
//! registry.register_factory_fn("counter", |_settings| {
//!     Ok(ModuleParts::new().with_init(|ctx: &AtomicUsize| {
//!         ctx.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     }))
//! });
//! registry.load("./modules")?;
//! registry.init_modules(&AtomicUsize::new(0))?;
//! # Ok::<(), modreg::RegistryError>(())
//! ```

pub mod builtin;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod factory;
pub mod initializer;
pub mod loader;
pub mod logging;
pub mod module;
pub mod registry;

pub use config::{CollisionPolicy, RegistryConfig};
pub use discovery::{identify_modules, is_module_file};
pub use error::{BoxError, LoadError, RegistryError, Result};
pub use factory::{FactoryTable, ModuleFactory};
pub use logging::LogSink;
pub use module::{Executable, InitHook, ModuleEntry, ModuleManifest, ModuleParts};
pub use registry::{LoadOutcome, ModuleRegistry};
