//! Credential masking for log output.
//!
//! [`Redactor`] knows the secrets that must never reach a log sink. The
//! request pipeline uses it directly for parameter sets (adding the per-request
//! signature), and [`RedactingMakeWriter`] applies it to every formatted event
//! as a last line of masking.

use crate::config::Credentials;
use crate::domain::trading::params::RequestParams;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

pub const REDACTED: &str = "[REDACTED]";

#[derive(Clone, Default)]
pub struct Redactor {
    secrets: Vec<String>,
}

impl Redactor {
    pub fn new<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let secrets = secrets
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.is_empty())
            .collect();
        Self { secrets }
    }

    /// Redactor masking the API key and secret
    pub fn for_credentials(credentials: &Credentials) -> Self {
        Self::new([credentials.api_key(), credentials.api_secret()])
    }

    /// Replaces every occurrence of a known secret (or an `extra` one) in free text
    pub fn redact(&self, text: &str, extra: &[&str]) -> String {
        let mut out = text.to_string();
        for secret in self.all_secrets(extra) {
            if out.contains(secret) {
                out = out.replace(secret, REDACTED);
            }
        }
        out
    }

    /// Encodes `params` for logging, masking any value that equals or contains a secret
    pub fn redact_params(&self, params: &RequestParams, extra: &[&str]) -> String {
        params
            .iter()
            .map(|(key, value)| {
                let value = value.to_string();
                if self.all_secrets(extra).any(|secret| value.contains(secret)) {
                    format!("{}={}", key, REDACTED)
                } else {
                    format!("{}={}", key, value)
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    fn all_secrets<'a>(&'a self, extra: &'a [&'a str]) -> impl Iterator<Item = &'a str> {
        self.secrets
            .iter()
            .map(String::as_str)
            .chain(extra.iter().copied())
            .filter(|s| !s.is_empty())
    }
}

/// `MakeWriter` wrapper masking secrets in every formatted log line
#[derive(Clone)]
pub struct RedactingMakeWriter<M> {
    inner: M,
    redactor: Arc<Redactor>,
}

impl<M> RedactingMakeWriter<M> {
    pub fn new(inner: M, redactor: Arc<Redactor>) -> Self {
        Self { inner, redactor }
    }
}

pub struct RedactingWriter<W> {
    inner: W,
    redactor: Arc<Redactor>,
}

impl<W: io::Write> io::Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Formatting layers hand over one complete event per write
        let text = String::from_utf8_lossy(buf);
        let masked = self.redactor.redact(&text, &[]);
        self.inner.write_all(masked.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer(),
            redactor: Arc::clone(&self.redactor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    #[test]
    fn test_redact_free_text() {
        let redactor = Redactor::new(["api-key-1", "api-secret-2"]);
        let text = "key=api-key-1 secret=api-secret-2 sig=abc";

        assert_eq!(
            redactor.redact(text, &["abc"]),
            "key=[REDACTED] secret=[REDACTED] sig=[REDACTED]"
        );
    }

    #[test]
    fn test_redact_params_masks_matching_values_only() {
        let redactor = Redactor::new(["KEY123"]);
        let params = RequestParams::new()
            .with("symbol", "BTCUSDT")
            .with("note", "prefix-KEY123-suffix")
            .with("signature", "f00d");

        assert_eq!(
            redactor.redact_params(&params, &["f00d"]),
            "symbol=BTCUSDT&note=[REDACTED]&signature=[REDACTED]"
        );
    }

    #[test]
    fn test_empty_secrets_are_ignored() {
        let redactor = Redactor::new(["", "k"]);
        assert_eq!(redactor.redact("a k b", &[""]), "a [REDACTED] b");
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_redacting_writer_masks_before_sink() {
        let buffer = SharedBuffer::default();
        let sink = buffer.clone();
        let make_writer = RedactingMakeWriter::new(
            move || sink.clone(),
            Arc::new(Redactor::new(["super-secret"])),
        );

        let mut writer = make_writer.make_writer();
        let line = b"loaded credentials super-secret\n";
        assert_eq!(writer.write(line).unwrap(), line.len());

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(written, "loaded credentials [REDACTED]\n");
    }
}
