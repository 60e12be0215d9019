use image_uploader::app::ImageUploader;
use image_uploader::AppConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    log::info!("Using API at {} ({:?})", config.api_url, config);
    let app = ImageUploader::new(config)?;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([640.0, 720.0])
            .with_min_inner_size([420.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Image Uploader",
        options,
        Box::new(move |_cc: &eframe::CreationContext| Box::new(app)),
    )?;
    Ok(())
}
