use std::io;
use std::sync::{Arc, Mutex};

use knit_yang::Schema;
use tracing_subscriber::fmt::MakeWriter;

use crate::module::Module;
use crate::wool::Wool;

pub fn yin(name: &str, body: &str) -> String {
    format!(
        r#"<module name="{name}" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
             <namespace uri="urn:example:{name}"/>
             <prefix value="{name}"/>{body}</module>"#
    )
}

pub fn load(modules: &[String]) -> Schema {
    knit_yang::read_schema(modules, &[]).unwrap()
}

/// Wraps module `name` with the default wool.
pub fn wrap(schema: &Schema, name: &str) -> Module {
    let wool = Wool::default_wool();
    Module::wrap(schema, &wool, schema.module(name).unwrap())
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Runs `f` with every log event down to `DEBUG` recorded, returning the formatted output.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);

    let output = capture.0.lock().unwrap().clone();
    (result, String::from_utf8_lossy(&output).into_owned())
}
