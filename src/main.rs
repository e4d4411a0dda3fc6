mod args;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use log::info;
use logo_qr::docs::{default_title, DocsClient, DocsConfig, DocumentEmbedder};
use logo_qr::logo::read_logo;
use logo_qr::{compose_with_logo, ComposeOptions, LogoUnavailable, RenderOptions};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let options = ComposeOptions {
        render: RenderOptions {
            box_size: args.box_size,
            border: args.border,
            dark: args.dark,
            light: args.light,
        },
        logo_ratio: args.ratio,
    };

    info!("Generating QR code for: {}", args.text);
    let logo = match args.logo.as_deref() {
        Some(path) => {
            info!("Loading logo: {}", path.display());
            read_logo(path).map_err(LogoUnavailable::Unreadable)
        }
        None => Err(LogoUnavailable::Missing),
    };

    let composition = compose_with_logo(&args.text, logo, &options)
        .context("Failed to generate QR code")?;

    std::fs::write(&args.output, &composition.png)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!(
        "Saved {}x{} QR code to: {}",
        composition.width,
        composition.height,
        args.output.display()
    );

    if args.upload {
        let config = DocsConfig {
            access_token: args.access_token.unwrap_or_default(),
            share_with: args.share_with,
            image_size_pt: args.image_size_pt,
        };
        let client = DocsClient::new(config).context("Invalid document API configuration")?;
        let title = args.title.unwrap_or_else(|| default_title(&args.text));

        info!("Creating document {title:?}");
        let document = client
            .embed(&composition.png, &title)
            .context("Failed to create document with QR code")?;
        println!("Document created: {}", document.edit_url);
    }

    Ok(())
}
