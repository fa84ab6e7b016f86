//! Package of modules to be emitted together.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use thiserror::Error;
use tracing::info;

use crate::module::Module;

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("file system error: {error:?}")]
    Fs { error: io::Error },

    #[error("duplicated module name: {name}")]
    DuplicatedName { name: String },
}

/// Package.
#[derive(Debug, Default)]
pub struct Package {
    /// Modules.
    pub modules: Vec<Rc<dyn Module>>,
}

impl Package {
    /// Adds the given module to package.
    pub fn add(&mut self, module: Rc<dyn Module>) { self.modules.push(module); }

    fn gen_vir_module<P: AsRef<Path>>(&self, module: &dyn Module, path_dir: P) -> Result<(), PackageError> {
        let path = path_dir.as_ref().join(format!("{}.v", module.name()));
        let mut file = File::create(&path).map_err(|error| PackageError::Fs { error })?;

        writeln!(file, "{}", module.to_vir()).map_err(|error| PackageError::Fs { error })?;
        info!(module = module.name(), path = %path.display(), "generated verilog");

        Ok(())
    }

    /// Generates Verilog code at the given directory path, one `{name}.v` file per module.
    pub fn gen_vir<P: AsRef<Path>>(&self, path_dir: P) -> Result<(), PackageError> {
        let mut names = self.modules.iter().map(|module| module.name()).collect::<Vec<_>>();
        names.sort_unstable();
        if let Some(name) = names.windows(2).find(|pair| pair[0] == pair[1]).map(|pair| pair[0]) {
            return Err(PackageError::DuplicatedName { name: name.to_string() });
        }

        fs::create_dir_all(path_dir.as_ref()).map_err(|error| PackageError::Fs { error })?;

        for module in &self.modules {
            self.gen_vir_module(module.as_ref(), path_dir.as_ref())?;
        }

        Ok(())
    }
}
