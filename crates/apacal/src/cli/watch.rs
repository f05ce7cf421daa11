use std::path::Path;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use apacal_lib::reconnect::supervise;
use apacal_lib::stream::ColorStream;

use super::*;

fn format_color_line(color: Color) -> String {
    format!("{color}  rgb({}, {}, {})", color.r, color.g, color.b)
}

/// Print every color the web interface asks for until Ctrl+C.
pub(super) async fn cmd_watch(
    web: Option<String>,
    config_path: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut config = load_config(config_path);
    if let Some(web) = web {
        config.web_url = web;
    }

    let mut stream =
        ColorStream::with_connect_timeout(config.web_url()?, config.connect_timeout())?;
    eprintln!("Watching {} (Ctrl+C to stop)", stream.base());

    let reconnect = config.reconnect();
    let (tx, mut rx) = mpsc::channel(1);
    let task = tokio::spawn({
        let cancel = cancel.clone();
        async move { supervise(&mut stream, &cancel, &tx, reconnect).await }
    });

    // The channel closes once the supervisor returns.
    while let Some(color) = rx.recv().await {
        println!("{}", format_color_line(color));
    }

    match task.await {
        Ok(err) if err.is_cancelled() => Ok(()),
        Ok(err) => Err(err.into()),
        Err(e) => Err(ApacalError::Io(std::io::Error::other(e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_line_shows_hex_and_decimal() {
        assert_eq!(
            format_color_line(Color::rgb(0x0A, 0xA1, 0xF0)),
            "#0AA1F0  rgb(10, 161, 240)"
        );
    }

    #[tokio::test]
    async fn cancelled_watch_exits_cleanly() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("missing.toml");
        cmd_watch(Some("http://127.0.0.1:1".into()), Some(&config), &cancel)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn bad_scheme_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("missing.toml");
        let err = cmd_watch(
            Some("ftp://calibrator".into()),
            Some(&config),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("ftp"), "got {err}");
    }
}
