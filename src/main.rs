use scanpipe_rs::image_pipeline::{
    ColorOrder, ConversionConfig, ScanLayout, ScanToTiffPipeline, TiffCompression,
};
use scanpipe_rs::logger;

use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting scanpipe...");

    let debug_dump_dir = std::env::var_os("SCANPIPE_DEBUG_DIR").map(std::path::PathBuf::from);
    let config = ConversionConfig::builder()
        .compression(TiffCompression::DeflateBalanced)
        .predictor(Some(2))
        .debug_dump_dir(debug_dump_dir)
        .build();

    // 600 dpi color CIS scan of a letter-width strip, delivered as three mono lines per row
    let layout = ScanLayout::builder()
        .width(5100)
        .lines(3 * 300)
        .depth(16)
        .channels(3)
        .color_order(ColorOrder::Rgb)
        .cis(true)
        .segments(vec![0, 1, 2], 1700)
        .requested_pixels(Some(5100))
        .build();

    let pipeline = ScanToTiffPipeline::new(config);

    info!("Scan to TIFF pipeline initialized");
    info!("Compression: {:?}", pipeline.config().compression);
    info!(
        "Stage dumps: {}",
        match &pipeline.config().debug_dump_dir {
            Some(dir) => dir.display().to_string(),
            None => "disabled".to_string(),
        }
    );

    match pipeline.convert_file("scan.raw", &layout, "scan.tiff") {
        Ok(_) => info!("Conversion successful!"),
        Err(e) => error!("Conversion failed: {}", e),
    }

    Ok(())
}
