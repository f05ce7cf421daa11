//! Mirror loop — forwards streamed colors to an LED sink.
//!
//! [`Mirror`] renders colors into the strip's pixel window and writes them
//! to the sink. [`run_mirror`] wires it to a supervised [`ColorStream`]:
//! white while waiting for the first color, every received color in order,
//! and black on the way out. CLI front ends only open the sink and the
//! stream and hand both over.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::color::Color;
use crate::error::{ApacalError, Result};
use crate::led::{LedSink, StripLayout};
use crate::reconnect::{ReconnectConfig, supervise};
use crate::stream::ColorStream;

/// How long to wait for the polling task after cancellation.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// A sink plus the pixel window colors are painted into.
pub struct Mirror<S: LedSink> {
    sink: S,
    layout: StripLayout,
    shown: Option<Color>,
}

impl<S: LedSink> Mirror<S> {
    pub fn new(sink: S, layout: StripLayout) -> Self {
        Self {
            sink,
            layout,
            shown: None,
        }
    }

    /// Fill the window with `color`. Returns pixel bytes written.
    pub fn show(&mut self, color: Color) -> std::io::Result<usize> {
        let pixels = self.layout.fill(color);
        let n = self.sink.write(&pixels)?;
        self.shown = Some(color);
        Ok(n)
    }

    /// Turn every pixel off.
    pub fn blank(&mut self) -> std::io::Result<usize> {
        self.show(Color::BLACK)
    }

    /// Last color successfully written.
    pub fn shown(&self) -> Option<Color> {
        self.shown
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// Show colors from `stream` on `mirror` until `cancel` fires.
///
/// Returns an error only if the strip cannot be initialised. Failed sink
/// writes and stream faults are logged; the stream is reconnected according
/// to `reconnect`.
pub async fn run_mirror<S: LedSink>(
    mirror: &mut Mirror<S>,
    mut stream: ColorStream,
    reconnect: ReconnectConfig,
    cancel: &CancellationToken,
) -> Result<()> {
    mirror.show(Color::WHITE).map_err(ApacalError::Io)?;
    log::info!(
        "waiting for colors from the web interface at {}",
        stream.base()
    );

    let (tx, mut rx) = mpsc::channel(1);
    let mut task = tokio::spawn({
        let cancel = cancel.clone();
        async move { supervise(&mut stream, &cancel, &tx, reconnect).await }
    });

    // Buffered colors are drained before the task result is looked at.
    let joined = loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break None,
            Some(color) = rx.recv() => {
                log::info!("received color {color}");
                if let Err(e) = mirror.show(color) {
                    log::warn!("set leds: {e}");
                }
            }
            joined = &mut task => break Some(joined),
        }
    };

    let joined = match joined {
        Some(joined) => Some(joined),
        None => match tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await {
            Ok(joined) => Some(joined),
            Err(_) => {
                log::warn!("timeout waiting for web interface loop to stop");
                task.abort();
                None
            }
        },
    };
    match joined {
        Some(Ok(err)) if !err.is_cancelled() => log::warn!("read color: {err}"),
        Some(Err(e)) => log::error!("web interface loop panicked: {e}"),
        _ => {}
    }

    if let Err(e) = mirror.blank() {
        log::warn!("set leds to black: {e}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led::mock::MockSink;

    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mirror(num_pixels: usize) -> Mirror<MockSink> {
        Mirror::new(MockSink::new(), StripLayout::full(num_pixels))
    }

    #[test]
    fn show_writes_window() {
        let mut m = Mirror::new(MockSink::new(), StripLayout::new(3, 1, Some(2)).unwrap());
        assert_eq!(m.show(Color::rgb(5, 6, 7)).unwrap(), 9);
        assert_eq!(m.sink().last(), Some(&[0u8, 0, 0, 5, 6, 7, 0, 0, 0][..]));
        assert_eq!(m.shown(), Some(Color::rgb(5, 6, 7)));
    }

    #[test]
    fn blank_turns_everything_off() {
        let mut m = mirror(2);
        m.show(Color::WHITE).unwrap();
        m.blank().unwrap();
        assert_eq!(m.sink().last(), Some(&[0u8; 6][..]));
        assert_eq!(m.shown(), Some(Color::BLACK));
    }

    #[test]
    fn failed_write_is_not_recorded_as_shown() {
        let sink = MockSink {
            fail: true,
            ..Default::default()
        };
        let mut m = Mirror::new(sink, StripLayout::full(1));
        assert!(m.show(Color::WHITE).is_err());
        assert_eq!(m.shown(), None);
    }

    #[tokio::test]
    async fn mirrors_colors_between_white_and_black() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ajax/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("#FF0000"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ajax/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("#00FF00"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ajax/messages"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("#0000FF")
                    .set_delay(Duration::from_secs(60)),
            )
            .mount(&server)
            .await;

        let stream = ColorStream::new(Url::parse(&server.uri()).unwrap()).unwrap();
        let cancel = CancellationToken::new();
        tokio::spawn({
            let cancel = cancel.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                cancel.cancel();
            }
        });

        let mut m = mirror(1);
        tokio::time::timeout(
            Duration::from_secs(5),
            run_mirror(&mut m, stream, ReconnectConfig::default(), &cancel),
        )
        .await
        .expect("mirror should stop after cancellation")
        .unwrap();

        assert_eq!(
            m.sink().frames,
            vec![
                vec![255, 255, 255],
                vec![255, 0, 0],
                vec![0, 255, 0],
                vec![0, 0, 0],
            ]
        );
    }

    #[tokio::test]
    async fn unusable_sink_fails_before_polling() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("#FFFFFF"))
            .expect(0)
            .mount(&server)
            .await;

        let stream = ColorStream::new(Url::parse(&server.uri()).unwrap()).unwrap();
        let sink = MockSink {
            fail: true,
            ..Default::default()
        };
        let mut m = Mirror::new(sink, StripLayout::full(1));
        let cancel = CancellationToken::new();
        let err = run_mirror(&mut m, stream, ReconnectConfig::default(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ApacalError::Io(_)));
    }
}
