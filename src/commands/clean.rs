use postsmith::build::base_path_from_config;
use postsmith::config::Config;

use crate::CleanArgs;

pub async fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    // Determine the config file path
    let config_path = args
        .config_file
        .clone()
        .unwrap_or_else(|| "site.yaml".into());
    let config_path = if config_path.is_relative() {
        std::env::current_dir()?.join(&config_path)
    } else {
        config_path
    };

    let config = Config::load_from_arg(Some(config_path.as_path()))?;

    // Get the base path for resolving relative paths
    let base_path = base_path_from_config(&config_path);

    // Delete the generated site folder
    let site_path = config.output_dir(&base_path);
    let site_path = site_path.canonicalize().unwrap_or(site_path);
    if site_path == base_path.canonicalize().unwrap_or_else(|_| base_path.clone()) {
        return Err(anyhow::anyhow!(
            "Refusing to delete the project folder {}",
            site_path.display()
        ));
    }

    if site_path.exists() {
        if args.dry_run {
            println!("Would delete {}", site_path.display());
        } else {
            tokio::fs::remove_dir_all(&site_path).await?;
            println!("Deleted {}", site_path.display());
        }
    } else {
        println!("Nothing to clean at {}", site_path.display());
    }

    Ok(())
}
