use postsmith::config::{BuildConfig, Config, MarkdownConfig, MenuEntry, SiteConfig};

use crate::InitArgs;

const WELCOME_POST: &str = "---
title: Hello, world
published_on: 1 Jan 2024 09:00:00
tags: welcome
---
# Hello, world

This is the first post of the site.
";

const ABOUT_PAGE: &str = "---
title: About
---
# About

Tell your readers who you are.
";

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            tokio::fs::create_dir_all(&path).await?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    let config_file = path.join("site.yaml");
    if config_file.exists() {
        return Err(anyhow::anyhow!(
            "Config file already exists: {config_file}",
            config_file = config_file.display()
        ));
    }

    let default_config = Config {
        site: SiteConfig::new("My Blog", "https://my-blog.example.com"),
        build: BuildConfig::default(),
        menu: vec![
            MenuEntry {
                text: "Home".into(),
                link: "/".into(),
            },
            MenuEntry {
                text: "About".into(),
                link: "/about.html".into(),
            },
        ],
        markdown: MarkdownConfig::default(),
    };

    println!("Initializing project in {}", path.display());

    let config_text = serde_yaml::to_string(&default_config)?;
    tokio::fs::write(&config_file, config_text).await?;
    println!(
        "Created config file {config_file}",
        config_file = config_file.display()
    );

    for (relative, content) in [("posts/hello-world.md", WELCOME_POST), ("pages/about.md", ABOUT_PAGE)] {
        let file = path.join(relative);
        if let Some(parent) = file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if !file.exists() {
            tokio::fs::write(&file, content).await?;
            println!("Created {}", file.display());
        }
    }

    Ok(())
}
