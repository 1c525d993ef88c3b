//! The `dprt config` command for configuration management.

use clap::{Args, Subcommand};
use dprt_core::Config;

use super::Session;

/// Property file written by `config init` when none exists yet.
const DEFAULT_PROPERTIES: &str = "\
# DpRt reduction properties
dprt.fake=true
dprt.full_reduction=false
dprt.make_master_bias=false
dprt.make_master_flat=false
dprt.fake.best_focus=27.0
dprt.fake.fwhm_per_mm=3.0
dprt.fake.atmospheric_seeing=0.8
dprt.fake.atmospheric_variation=0.2
";

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show config file and property file paths
    Path,

    /// Initialize a config file and a fake-mode property file
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command.
pub async fn execute(session: Session, args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let toml = session.config.to_toml()?;
            println!("{}", toml);
        }

        ConfigCommand::Path => {
            println!("config:     {}", Config::default_path().display());
            println!("properties: {}", session.property_file().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let config = Config::default();
            std::fs::write(&path, config.to_toml()?)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());

            let properties = config.property_file();
            if !properties.exists() || force {
                if let Some(parent) = properties.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&properties, DEFAULT_PROPERTIES)?;
                println!("Property file initialized at: {}", properties.display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dprt_core::{Dprt, ExposureResult};

    #[test]
    fn test_default_properties_run_fake_exposure_setup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dprt.properties");
        std::fs::write(&path, DEFAULT_PROPERTIES).unwrap();

        let mut dprt = Dprt::with_property_file(&path).unwrap();
        let mut result = ExposureResult::default();
        // Properties resolve; the frame itself is missing.
        assert!(!dprt.expose_reduce(&dir.path().join("missing.fits"), &mut result));
        assert_eq!(dprt.error_number(), 2200);
    }
}
