use std::path::Path;

use tokio_util::sync::CancellationToken;

use apacal_lib::led::Apa102;
use apacal_lib::mirror::{Mirror, run_mirror};
use apacal_lib::stream::ColorStream;

use super::*;

/// Open the strip named by `config`, mapping failures to a message with the path.
fn open_strip(config: &Config) -> Result<Apa102<std::fs::File>> {
    let path = Path::new(config.spi_device.trim());
    Apa102::open(path, config.num_pixels, config.intensity).map_err(|e| {
        ApacalError::Io(std::io::Error::new(
            e.kind(),
            format!("open SPI device {}: {e}", path.display()),
        ))
    })
}

pub(super) async fn cmd_mirror(
    args: &MirrorArgs,
    config_path: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut config = load_config(config_path);
    args.apply(&mut config);
    check_config(&config)?;

    let base = config.web_url()?;
    let layout = config.layout()?;
    let sink = open_strip(&config)?;
    let stream = ColorStream::with_connect_timeout(base, config.connect_timeout())?;

    let window = layout.window();
    let w = kv_width(&["Web interface:", "Strip:", "Lit pixels:", "Intensity:"], &[]);
    println!("apacal — mirroring DisplayCAL's requested color.");
    kv("Web interface:", stream.base(), w);
    kv(
        "Strip:",
        format!("{} pixels on {}", layout.num_pixels(), config.spi_device),
        w,
    );
    kv(
        "Lit pixels:",
        format!("{}..{}", window.start, window.end),
        w,
    );
    kv("Intensity:", config.intensity, w);
    println!("Press Ctrl+C to exit (turns the strip off).");

    let mut mirror = Mirror::new(sink, layout);
    run_mirror(&mut mirror, stream, config.reconnect(), cancel).await?;

    println!("Strip turned off.");
    Ok(())
}
