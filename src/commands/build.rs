use std::path::Path;

use postsmith::build::{BuildResult, Document, SiteBuilder, base_path_from_config, components};
use postsmith::config::Config;

use crate::BuildArgs;

/// Output-relative path of the syntax highlighting stylesheet.
const HIGHLIGHT_CSS: &str = "css/highlight.css";

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
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

    // Hooks are not Send, so the builder lives entirely on a blocking thread
    let result = tokio::task::spawn_blocking(move || build_site(&config, &base_path)).await??;

    println!(
        "Built site to {} ({} posts, {} pages, {} sitemap entries, {} feed items)",
        result.output_dir.display(),
        result.posts,
        result.pages,
        result.sitemap_entries,
        result.feed_items
    );

    Ok(())
}

/// Run a full build with the standard blog layout.
fn build_site(config: &Config, base_path: &Path) -> Result<BuildResult, anyhow::Error> {
    let mut builder = SiteBuilder::from_config(config, base_path)?;
    builder.load()?;

    // Head and header
    builder.add_head_hook(components::standard_head(&config.site));
    if builder.install_highlight_css(HIGHLIGHT_CSS)? {
        builder.add_head_hook(components::stylesheet(format!("/{HIGHLIGHT_CSS}")));
    }
    if !config.menu.is_empty() {
        builder.add_header_hook(components::menu(&config.menu));
    }

    // Content: title above the body, then tags, navigation and listings
    let navigation = components::post_navigation(builder.content());
    let latest = components::latest_listing(builder.content());
    builder
        .insert_content_hook(0, components::post_header())
        .add_content_hook(components::tags())
        .add_content_hook(navigation)
        .add_content_hook(latest);

    // Footer and end
    if let Some(text) = &config.build.footer {
        builder.add_footer_hook(components::footer(text.clone()));
    }
    if config.build.cookie_notice {
        builder.add_end_hook(components::cookie_notice());
        builder.install_cookie_script()?;
    }

    // Static files
    for folder in &config.build.static_folders {
        builder.sync_and_process_folder(folder, folder, config.build.include_hidden)?;
    }
    builder.install_file("favicon.ico", ".")?;

    // Pages, sitemap and feed
    let pages = builder.output_pages()?;
    let posts = builder.output_posts()?;
    builder.output_sitemap()?;
    let public: Vec<&Document> = builder.content().public_posts().collect();
    let feed_items = builder.output_rss_feed(Some(public.as_slice()))?;

    Ok(BuildResult {
        output_dir: builder.output_root().to_path_buf(),
        posts,
        pages,
        sitemap_entries: builder.sitemap().len(),
        feed_items,
    })
}
